use clap::{Parser, Subcommand, builder::styling};
use eyre::{Context, Result};
use log_harvester::{
    cli,
    harvester::{DEFAULT_CUT_OFF_SECS, DEFAULT_SAVE_DIR},
    job::JobFile,
    search::{DEFAULT_LIMIT, DEFAULT_STEP_MS},
    sources::SourceKind,
};
use owo_colors::OwoColorize;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Log Harvester: page log hits out of a search index, one time window at a time
#[derive(Parser)]
#[command(name = "harvest", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Test authorization to the search cluster
    Auth,

    /// Harvest one time range of a log source into text and CSV files
    Pull {
        /// Log source to harvest
        #[arg(value_enum)]
        source: SourceKind,

        /// Range start, e.g. 2025-01-02T00:00:00.000Z
        #[arg(short, long)]
        start: String,

        /// Range end (exclusive)
        #[arg(short = 'E', long)]
        end: String,

        /// Paging increment in milliseconds
        #[arg(long, default_value_t = DEFAULT_STEP_MS)]
        step: u64,

        /// Maximum hits per page
        #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Window length in seconds
        #[arg(short, long, default_value_t = DEFAULT_CUT_OFF_SECS)]
        cut_off: u64,

        /// Directory the window folders are written to
        #[arg(long, default_value = DEFAULT_SAVE_DIR)]
        save_dir: PathBuf,

        /// Query string filter, e.g. a service node id
        #[arg(short, long)]
        query: Option<String>,

        /// Move each page's lower bound up to the previous page's upper bound
        #[arg(long)]
        sliding: bool,

        /// Replay a stored search response instead of querying the cluster
        #[arg(short, long)]
        fixture: Option<PathBuf>,
    },

    /// Harvest every range listed in a YAML job file
    Batch {
        /// The job file to run
        #[arg(default_value = "job.yml")]
        job: PathBuf,
    },

    /// Parse an access log into a CSV file
    Parse {
        /// The access log to parse
        log: PathBuf,

        /// Regular expression with named groups to parse lines with
        #[arg(short, long)]
        pattern: Option<String>,

        /// CSV file to write, defaults to the log path with a .parsed.csv extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print request charts for an access log
    Report {
        /// The access log to summarise
        log: PathBuf,

        /// Regular expression with named groups to parse lines with
        #[arg(short, long)]
        pattern: Option<String>,

        /// Number of user agents to show
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match dotenvy::from_filename(&cli.env) {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).with_context(|| format!("Failed to load {}", cli.env)),
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match cli.command {
        Commands::Auth => {
            log::info!("Testing authorization");
            cli::test_connection().await?;
        }
        Commands::Pull {
            source,
            start,
            end,
            step,
            limit,
            cut_off,
            save_dir,
            query,
            sliding,
            fixture,
        } => {
            log::info!(
                "Pulling {} logs to: {}",
                source.cyan(),
                save_dir.display().bright_black()
            );
            let mut job = JobFile::new(source);
            job.query = query;
            job.step = step;
            job.limit = limit;
            job.cut_off = cut_off;
            job.save_dir = save_dir;
            job.sliding = sliding;
            job.fixture = fixture;
            job.add_range(start, end);
            cli::run_job(&job).await?;
        }
        Commands::Batch { job } => {
            cli::run_job_file(&job).await?;
        }
        Commands::Parse {
            log,
            pattern,
            output,
        } => {
            log::info!("Parsing access log: {}", log.display().bright_black());
            cli::parse_access_log(&log, pattern.as_deref(), output.as_deref())?;
        }
        Commands::Report { log, pattern, top } => {
            log::info!("Summarising access log: {}", log.display().bright_black());
            let report = cli::report_access_log(&log, pattern.as_deref(), top)?;
            println!("{}", report.render());
        }
    }

    Ok(())
}
