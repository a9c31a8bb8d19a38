use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use gcp_log_tools::audit::filter::FilterMode;
use gcp_log_tools::commands;
use gcp_log_tools::error::ToolboxError;
use gcp_log_tools::utils::context::{init_logging, RunContext};

#[derive(Parser)]
#[command(name = "gcp-log")]
#[command(about = "GCP audit log toolbox", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer yes to every confirmation prompt
    #[arg(long, global = true)]
    accept_all: bool,

    /// Hide progress bars
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert `gcloud logging read --format=json` output to one record per line
    Format {
        /// JSON array file produced by gcloud
        #[arg(short, long)]
        file: String,

        /// Output file (appended to)
        #[arg(short, long)]
        output: String,
    },

    /// Include or exclude records matching field conditions
    Filter {
        /// Filter mode
        #[arg(value_enum)]
        mode: FilterMode,

        /// Line-per-record log file(s)
        #[arg(short, long, required = true)]
        file: Vec<String>,

        /// Conditions as comma-separated path=value pairs
        /// (e.g., "severity=NOTICE,resource.type=gce_instance")
        #[arg(short = 't', long = "type")]
        conditions: String,

        /// Output file (appended to)
        #[arg(short, long)]
        output: String,

        /// Write each record at most once in include mode
        #[arg(long)]
        unique: bool,
    },

    /// Extract records within a window centred on a time
    Timeslice {
        /// Centre of the window, "YYYY-MM-DD HH:MM:SS"
        time: String,

        /// Line-per-record log file(s)
        #[arg(short, long, required = true)]
        file: Vec<String>,

        /// Total window width in minutes (fractions allowed)
        #[arg(short, long, default_value_t = commands::timeslice::DEFAULT_SIZE_MINUTES)]
        size: f64,

        /// Output file (appended to)
        #[arg(short, long)]
        output: String,
    },

    /// Extract records between two times
    Timeframe {
        /// Range as "YYYY-MM-DD HH:MM:SS > YYYY-MM-DD HH:MM:SS"
        range: String,

        /// Line-per-record log file(s)
        #[arg(short, long, required = true)]
        file: Vec<String>,

        /// Output file (appended to)
        #[arg(short, long)]
        output: String,
    },

    /// Concatenate files matching a pattern into one
    Merge {
        /// Directory and file-name wildcard (e.g., "./sink/*.json")
        #[arg(short, long)]
        file: String,

        /// Search subdirectories too
        #[arg(short, long)]
        recurse: bool,

        /// Output file (appended to)
        #[arg(short, long)]
        output: String,
    },

    /// Totals, chronology and counts by resource type, account and severity
    Statistics {
        /// Line-per-record log file(s); multiple files are read in parallel
        #[arg(short, long, required = true)]
        file: Vec<String>,

        /// Rows to show per table (0 = all)
        #[arg(long, default_value = "0")]
        top: usize,

        /// Export the counts to a CSV file
        #[arg(long)]
        csv: Option<String>,
    },

    /// Download exported logs from a Cloud Storage bucket
    Download {
        /// Bucket name
        #[arg(short, long)]
        bucket: String,

        /// Object name wildcard (e.g., "cloudaudit.googleapis.com/activity/2019/*")
        #[arg(short, long)]
        file: Option<String>,

        /// Destination directory
        #[arg(short, long, default_value = ".")]
        output: String,

        /// OAuth2 access token (or set GOOGLE_OAUTH_ACCESS_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = RunContext::new(cli.verbose, !cli.no_progress, cli.accept_all);

    match dispatch(cli.command, &mut ctx).await {
        Err(err) if matches!(err.downcast_ref::<ToolboxError>(), Some(ToolboxError::Aborted)) => {
            eprintln!("Aborted.");
            std::process::exit(1);
        }
        other => other,
    }
}

async fn dispatch(command: Commands, ctx: &mut RunContext) -> Result<()> {
    match command {
        Commands::Format { file, output } => {
            commands::format::run(ctx, &file, &output)?;
        }
        Commands::Filter {
            mode,
            file,
            conditions,
            output,
            unique,
        } => {
            commands::filter::run(ctx, &file, &output, mode, &conditions, unique)?;
        }
        Commands::Timeslice {
            time,
            file,
            size,
            output,
        } => {
            commands::timeslice::run(ctx, &file, &output, &time, size)?;
        }
        Commands::Timeframe {
            range,
            file,
            output,
        } => {
            commands::timeframe::run(ctx, &file, &output, &range)?;
        }
        Commands::Merge {
            file,
            recurse,
            output,
        } => {
            commands::merge::run(ctx, &file, &output, recurse)?;
        }
        Commands::Statistics { file, top, csv } => {
            commands::statistics::run(&file, top, csv.as_deref())?;
        }
        Commands::Download {
            bucket,
            file,
            output,
            token,
        } => {
            commands::download::run(ctx, &bucket, file.as_deref(), &output, token.as_deref())
                .await?;
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "gcp-log", &mut std::io::stdout());
        }
    }
    Ok(())
}
