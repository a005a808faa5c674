//! Survey Insights - survey response dashboard
//!
//! A CLI tool that fetches survey answers from the survey API, aggregates
//! them into the age & gender, location and multi-choice answer charts, and
//! writes the dashboard as a Markdown or JSON report.
//!
//! Exit codes:
//!   0   - Success
//!   1   - Runtime error (arguments, config, report write failure, etc.)
//!   2   - A chart was unavailable and --fail-on-unavailable was set
//!   130 - Interrupted while fetching

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use survey_insights::api::SurveyClient;
use survey_insights::cli::{Args, OutputFormat};
use survey_insights::config::{Config, CONFIG_FILE};
use survey_insights::dashboard::{self, DashboardSettings};
use survey_insights::models::{DashboardReport, ReportMetadata};
use survey_insights::report::{self, RenderOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const EXIT_ERROR: i32 = 1;
const EXIT_UNAVAILABLE: i32 = 2;
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_ERROR);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        let code = handle_init_config()?;
        std::process::exit(code);
    }

    match run_dashboard(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(EXIT_ERROR);
        }
    }
}

/// Handle --init-config: generate a default .survey-insights.toml.
fn handle_init_config() -> Result<i32> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        return Ok(EXIT_ERROR);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to point at your survey API and adjust question indices.");
    Ok(0)
}

/// Initialize logging on stderr, so a report piped to stdout stays clean.
///
/// `RUST_LOG` takes precedence over the verbosity flags when set.
fn init_logging(level: tracing::Level) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// Run one fetch-aggregate-render cycle. Returns the exit code.
async fn run_dashboard(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let (mut config, config_source) = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };
    init_logging(level)?;

    info!("Survey Insights v{}", env!("CARGO_PKG_VERSION"));
    match config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }
    debug!("Arguments: {:?}", args);

    let output = PathBuf::from(&config.general.output);
    let to_stdout = is_stdout(&output);
    let announce = shows_progress(args.quiet, &output);

    let client = SurveyClient::new(&config.api, &config.questions)?;
    let settings = DashboardSettings::new(&config.questions, &config.report);

    if announce {
        println!("📡 Fetching survey data from {}", config.api.base_url);
    }

    // Step 1: fetch and aggregate; Ctrl-C drops the in-flight requests
    let spinner = fetch_spinner(announce);
    let charts = tokio::select! {
        charts = dashboard::load_charts(&client, &settings) => charts,
        Ok(()) = tokio::signal::ctrl_c() => {
            if let Some(pb) = &spinner {
                pb.finish_and_clear();
            }
            warn!("Interrupted, abandoning in-flight requests");
            eprintln!("\n⛔ Interrupted.");
            return Ok(EXIT_INTERRUPTED);
        }
    };
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    // Step 2: build the report
    let report = DashboardReport {
        metadata: ReportMetadata {
            api_url: config.api.base_url.clone(),
            generated_at: Utc::now(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        age_gender: charts.age_gender,
        locations: charts.locations,
        answers: charts.answers,
    };

    // Step 3: render and save
    let rendered = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &RenderOptions::from(&config.report))
        }
    };

    if to_stdout {
        print!("{}", rendered);
    } else {
        report::write_report(&rendered, &output)?;
    }

    let unavailable = report.unavailable_count();

    if announce {
        print_summary(&report, &output, unavailable);
    }

    if unavailable > 0 && args.fail_on_unavailable {
        eprintln!(
            "\n⛔ {} chart(s) unavailable. Failing (exit code {}).",
            unavailable, EXIT_UNAVAILABLE
        );
        return Ok(EXIT_UNAVAILABLE);
    }

    Ok(0)
}

fn print_summary(report: &DashboardReport, output: &Path, unavailable: usize) {
    println!("\n📊 Dashboard Summary:");
    match report.age_gender.ready() {
        Some(chart) => println!(
            "   Age & Gender: {} respondents ({} Male, {} Female)",
            chart.genders.respondents, chart.genders.male, chart.genders.female
        ),
        None => println!("   Age & Gender: unavailable"),
    }
    match report.locations.ready() {
        Some(tally) => println!(
            "   Locations: {} respondents, {} distinct",
            tally.total_count,
            tally.entries.len()
        ),
        None => println!("   Locations: unavailable"),
    }
    match report.answers.ready() {
        Some(tally) => println!(
            "   Answers: {} rows, {} other",
            tally.rows.len(),
            tally.other_options.len()
        ),
        None => println!("   Answers: unavailable"),
    }
    println!("   Duration: {:.1}s", report.metadata.duration_seconds);

    if unavailable > 0 {
        println!("\n⚠️  Report saved to {} with {} unavailable chart(s).", output.display(), unavailable);
    } else {
        println!("\n✅ Report saved to: {}", output.display());
    }
}

fn is_stdout(output: &Path) -> bool {
    output.as_os_str() == "-"
}

/// Banner, spinner and summary are shown unless quiet or piping the report.
fn shows_progress(quiet: bool, output: &Path) -> bool {
    !quiet && !is_stdout(output)
}

/// Spinner on stderr while the charts load.

fn fetch_spinner(enabled: bool) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message("Loading charts...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Load configuration from file or use defaults.
///
/// Also returns the path the configuration came from, if any, so it can be
/// logged once logging is up.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(CONFIG_FILE)))),
        None => Ok((Config::default(), None)),
    }
}
