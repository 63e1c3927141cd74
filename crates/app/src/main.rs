//! `exam`: headless driver for the test session engine.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use exam_core::model::{SessionId, SessionMode};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod db;

use commands::grade::GradeArgs;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "exam", version, about = "Run and grade practice tests and assessments")]
struct Cli {
    /// Config file path (defaults to ./exam.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Practice,
    Assessment,
}

impl From<ModeArg> for SessionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Practice => SessionMode::Practice,
            ModeArg::Assessment => SessionMode::Assessment,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check a question bank and list its questions
    Validate {
        /// Question bank JSON file
        #[arg(long)]
        bank: PathBuf,
    },

    /// Run a session from an answers file and print the result
    Grade {
        /// Question bank JSON file
        #[arg(long)]
        bank: PathBuf,

        /// JSON array of {"index", "answer"} entries
        #[arg(long)]
        answers: PathBuf,

        /// Override the configured session mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Database URL (e.g. sqlite://exam.sqlite3); results stay in memory without one
        #[arg(long)]
        db: Option<String>,

        /// Continue a saved session
        #[arg(long)]
        resume: Option<SessionId>,

        /// Save progress instead of finishing; prints the session id
        #[arg(long)]
        save: bool,
    },

    /// Show progress of a saved session
    Status {
        /// Question bank JSON file the session was started with
        #[arg(long)]
        bank: PathBuf,

        /// Session id printed by `grade --save`
        #[arg(long)]
        session: SessionId,

        /// Database URL
        #[arg(long)]
        db: Option<String>,
    },

    /// List recently stored results
    Results {
        /// Maximum rows to show
        #[arg(long, default_value = "10")]
        limit: u32,

        /// Database URL
        #[arg(long)]
        db: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => run(&config, cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(config: &AppConfig, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Validate { bank } => commands::validate::execute(&bank),
        Commands::Grade {
            bank,
            answers,
            mode,
            db,
            resume,
            save,
        } => {
            let args = GradeArgs {
                bank,
                answers,
                mode: mode.map(SessionMode::from),
                db,
                resume,
                save,
            };
            commands::grade::execute(config, args).await
        }
        Commands::Status { bank, session, db } => {
            commands::status::execute(config, &bank, session, db.as_deref()).await
        }
        Commands::Results { limit, db } => {
            commands::results::execute(config, limit, db.as_deref()).await
        }
    }
}
