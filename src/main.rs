use std::path::PathBuf;
use std::process;

use batchflow::{build_repository, run_step, show_step, AppConfig, AppError, CommandTasklet};
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "batchflow", version, about = "Run a single batch step and record its lifecycle")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program as one step execution.
    Run {
        /// Step name recorded in the execution.
        #[arg(long)]
        step: String,
        /// Parent job execution id (random when omitted).
        #[arg(long)]
        job: Option<Uuid>,
        /// Working directory for the program.
        #[arg(long)]
        workdir: Option<PathBuf>,
        /// Program and arguments, after `--`.
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Print a stored step execution and its checkpoints (postgres only).
    Show { id: Uuid },
}

fn main() {
    let cli = Cli::parse();
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[batchflow] {e}");
            process::exit(e.exit_code());
        }
    };
    batchflow::logging::init_logging(&config.log_filter);

    if let Err(e) = dispatch(cli.command, &config) {
        tracing::error!("{e}");
        process::exit(e.exit_code());
    }
}

fn dispatch(command: Commands, config: &AppConfig) -> Result<(), AppError> {
    match command {
        Commands::Run { step, job, workdir, command } => {
            let mut tasklet = CommandTasklet::from_argv(&command)
                .ok_or_else(|| AppError::Config("missing program after `--`".into()))?;
            if let Some(dir) = workdir {
                tasklet = tasklet.working_dir(dir);
            }
            let repository = build_repository(config)?;
            let job = job.unwrap_or_else(Uuid::new_v4);
            tracing::info!(step = %step, job = %job, backend = ?config.repository, "running step");
            let (execution, result) = run_step(&step, job, tasklet, repository);
            println!("{}", serde_json::to_string_pretty(&execution)?);
            result.map_err(AppError::from)
        }
        Commands::Show { id } => {
            let view = show_step(config, id)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(())
        }
    }
}
