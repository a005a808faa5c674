//! Fetch-then-aggregate orchestration.
//!
//! Each chart owns its own load: fetch the raw payloads, validate them at
//! the pipeline boundary, aggregate. The three loads run concurrently and
//! a failure in one leaves the others untouched.

use crate::analysis::{self, validate};
use crate::api::SurveySource;
use crate::config::{QuestionsConfig, ReportConfig};
use crate::error::ChartError;
use crate::models::{AgeGenderChart, AnswerTally, ChartState, LocationTally};
use futures::future::try_join;
use tracing::{error, info, warn};

/// Settings that shape one dashboard run.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub questions: QuestionsConfig,
    pub label_max: usize,
}

impl DashboardSettings {
    pub fn new(questions: &QuestionsConfig, report: &ReportConfig) -> Self {
        Self {
            questions: questions.clone(),
            label_max: report.label_max_chars,
        }
    }
}

/// The three charts of one run.
#[derive(Debug, Clone)]
pub struct Charts {
    pub age_gender: ChartState<AgeGenderChart>,
    pub locations: ChartState<LocationTally>,
    pub answers: ChartState<AnswerTally>,
}

/// Load every chart concurrently.
pub async fn load_charts<S: SurveySource>(source: &S, settings: &DashboardSettings) -> Charts {
    let (age_gender, locations, answers) = tokio::join!(
        load_age_gender(source, &settings.questions),
        load_locations(source, &settings.questions),
        load_answers(source, settings),
    );

    Charts {
        age_gender: settle("age & gender", age_gender),
        locations: settle("locations", locations),
        answers: settle("answers", answers),
    }
}

/// Age and gender are fetched concurrently; the cross-tab waits for both.
pub async fn load_age_gender<S: SurveySource>(
    source: &S,
    questions: &QuestionsConfig,
) -> Result<AgeGenderChart, ChartError> {
    let (age, gender) = try_join(
        source.answers(questions.age),
        source.answers(questions.gender),
    )
    .await?;

    let age = validate::age_records(&age)?;
    let gender = validate::gender_records(&gender)?;
    info!(
        "Age & gender: {} age answers, {} gender answers",
        age.len(),
        gender.len()
    );

    Ok(analysis::age_gender_chart(&age, &gender))
}

pub async fn load_locations<S: SurveySource>(
    source: &S,
    questions: &QuestionsConfig,
) -> Result<LocationTally, ChartError> {
    let payload = source.answers(questions.location).await?;
    let records = validate::location_records(&payload)?;
    info!("Locations: {} answers", records.len());

    Ok(analysis::tally_locations(&records))
}

/// The tally is required; the question metadata is not.
pub async fn load_answers<S: SurveySource>(
    source: &S,
    settings: &DashboardSettings,
) -> Result<AnswerTally, ChartError> {
    let (tally, questions) = tokio::join!(source.answer_tally(), source.questions());

    let tuples = validate::answer_tuples(&tally?)?;

    let metadata = match questions {
        Ok(questions) => validate::question_meta(&questions, settings.questions.metadata_index),
        Err(e) => {
            warn!("Question metadata unavailable, showing no free-text answers: {}", e);
            None
        }
    };
    info!("Answers: {} rows", tuples.len());

    Ok(analysis::build_answer_rows(tuples, metadata, settings.label_max))
}

fn settle<T>(chart: &str, result: Result<T, ChartError>) -> ChartState<T> {
    match result {
        Ok(model) => ChartState::Ready(model),
        Err(e) => {
            error!("Chart '{}' unavailable: {}", chart, e);
            ChartState::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}
