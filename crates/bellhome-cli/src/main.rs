//! CLI for Bell@Home — run a classical CHSH experiment under biased settings.

mod commands;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bellhome")]
#[command(about = "bellhome — a local-hidden-variable Bell test with budget-bounded bias injection")]
#[command(version = bellhome_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Run parameters shared by every pipeline command.
#[derive(Args, Clone, Copy)]
struct RunArgs {
    /// Number of rounds
    #[arg(short = 'n', long, default_value_t = bellhome_core::DEFAULT_ROUNDS)]
    rounds: usize,

    /// Raw bits combined into one setting per round
    #[arg(short = 'k', long, default_value_t = bellhome_core::DEFAULT_GROUP_SIZE)]
    group_size: usize,

    /// Maximum flip probability per raw bit, in [0, 1]
    #[arg(short, long, default_value_t = bellhome_core::DEFAULT_EPSILON)]
    epsilon: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both devices end to end and print bias and CHSH score
    Run {
        #[command(flatten)]
        params: RunArgs,

        /// Persist sequences and run.json in this directory (default: in memory)
        #[arg(long)]
        dir: Option<String>,

        /// Write the run manifest as JSON to this path
        #[arg(long)]
        output: Option<String>,
    },

    /// Generate a device's raw randomness file
    Generate {
        #[command(flatten)]
        params: RunArgs,

        /// Device name: alice or bob (case-insensitive)
        #[arg(long)]
        device: String,

        /// Data directory
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Bias a device's raw randomness and write its questions
    Questions {
        #[command(flatten)]
        params: RunArgs,

        /// Device name: alice or bob (case-insensitive)
        #[arg(long)]
        device: String,

        /// Data directory
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Answer a device's questions with its local strategy
    Answers {
        #[command(flatten)]
        params: RunArgs,

        /// Device name: alice or bob (case-insensitive)
        #[arg(long)]
        device: String,

        /// Data directory
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Report the realised average bias of a device
    Bias {
        #[command(flatten)]
        params: RunArgs,

        /// Device name: alice or bob (case-insensitive)
        #[arg(long)]
        device: String,

        /// Data directory
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Compute the CHSH score from both devices' questions and answers
    Chsh {
        #[command(flatten)]
        params: RunArgs,

        /// Data directory
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Run the statistical battery over a persisted run
    Report {
        #[command(flatten)]
        params: RunArgs,

        /// Data directory
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Remove all .dat files from the data directory
    Clean {
        /// Data directory
        #[arg(long, default_value = ".")]
        dir: String,
    },
}

impl RunArgs {
    fn config(&self) -> bellhome_core::Result<bellhome_core::RunConfig> {
        bellhome_core::RunConfig::new(self.rounds, self.group_size, self.epsilon)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            params,
            dir,
            output,
        } => params
            .config()
            .and_then(|c| commands::run::run(c, dir.as_deref(), output.as_deref())),
        Commands::Generate {
            params,
            device,
            dir,
        } => params.config().and_then(|c| {
            commands::stage::run(c, &device, &dir, commands::stage::Stage::Generate)
        }),
        Commands::Questions {
            params,
            device,
            dir,
        } => params.config().and_then(|c| {
            commands::stage::run(c, &device, &dir, commands::stage::Stage::Questions)
        }),
        Commands::Answers {
            params,
            device,
            dir,
        } => params.config().and_then(|c| {
            commands::stage::run(c, &device, &dir, commands::stage::Stage::Answers)
        }),
        Commands::Bias {
            params,
            device,
            dir,
        } => params
            .config()
            .and_then(|c| commands::stage::run(c, &device, &dir, commands::stage::Stage::Bias)),
        Commands::Chsh { params, dir } => params
            .config()
            .and_then(|c| commands::chsh::run(c, &dir)),
        Commands::Report { params, dir } => params
            .config()
            .and_then(|c| commands::report::run(c, &dir)),
        Commands::Clean { dir } => commands::clean::run(&dir),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
