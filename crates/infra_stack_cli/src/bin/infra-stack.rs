use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use infra_stack_cli::adapters::output::{ArtifactSink, DirectorySink, FileSink, StdoutSink};
use infra_stack_cli::commands::profiles::render_profiles;
use infra_stack_cli::commands::synth::{run_assemble, run_synth, SynthFormat};
use infra_stack_cli::commands::validate::run_validate;
use infra_stack_cli::config::{
    load_catalog, process_env, SourceOptions, StackSelection, DEFAULT_PROFILE,
};
use infra_stack_cli::logging::init_tracing;
use tracing::{error, info};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "infra-stack",
    about = "Validate deploy settings and declare the backend API stack",
    long_about = "Reads required settings from an env file and the process environment,\n\
                  validates them for the selected profile, and emits the desired\n\
                  resource graph for the provisioning engine."
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "INFRA_STACK_LOG_JSON")]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StackArgs {
    /// Stack profile to evaluate
    #[arg(long, env = "INFRA_STACK_PROFILE", default_value = DEFAULT_PROFILE)]
    profile: String,
    /// Env file read before the process environment (defaults to .env when present)
    #[arg(long, env = "INFRA_STACK_ENV_FILE")]
    env_file: Option<PathBuf>,
    /// JSON document with additional profiles
    #[arg(long, env = "INFRA_STACK_PROFILE_FILE")]
    profile_file: Option<PathBuf>,
    /// Read settings from the env file only
    #[arg(long)]
    no_process_env: bool,
}

impl StackArgs {
    fn selection(&self) -> StackSelection {
        StackSelection {
            profile: self.profile.clone(),
            profile_file: self.profile_file.clone(),
            source: SourceOptions {
                env_file: self.env_file.clone(),
                include_process_env: !self.no_process_env,
                ..SourceOptions::default()
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List profiles and their required settings
    Profiles {
        /// JSON document with additional profiles
        #[arg(long, env = "INFRA_STACK_PROFILE_FILE")]
        profile_file: Option<PathBuf>,
    },
    /// Check that every required setting is present and non-empty
    Validate(StackArgs),
    /// Evaluate the descriptor and write a single JSON document
    Synth {
        #[command(flatten)]
        stack: StackArgs,
        /// Document to produce
        #[arg(value_enum, long, default_value_t = SynthFormat::Template)]
        format: SynthFormat,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write graph, template and manifest into a cloud assembly directory
    Assemble {
        #[command(flatten)]
        stack: StackArgs,
        /// Assembly directory
        #[arg(long, default_value = "cdk.out")]
        out_dir: PathBuf,
    },
}

// ── main ───────────────────────────────────────────────────────────

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Profiles { profile_file } => {
            let catalog = load_catalog(profile_file.as_deref())?;
            StdoutSink.write_artifact("profiles", &render_profiles(&catalog))
        }
        Commands::Validate(stack) => {
            let (profile, source) = stack.selection().resolve(process_env())?;
            run_validate(&profile, &source)?;
            Ok(())
        }
        Commands::Synth {
            stack,
            format,
            output,
        } => {
            let (profile, source) = stack.selection().resolve(process_env())?;
            let graph = match output {
                Some(path) => run_synth(&profile, &source, format, &FileSink::new(path))?,
                None => run_synth(&profile, &source, format, &StdoutSink)?,
            };
            info!(fingerprint = %graph.fingerprint(), "synth complete");
            Ok(())
        }
        Commands::Assemble { stack, out_dir } => {
            let (profile, source) = stack.selection().resolve(process_env())?;
            let sink = DirectorySink::new(out_dir);
            let graph = run_assemble(&profile, &source, &sink)?;
            info!(
                dir = %sink.dir().display(),
                fingerprint = %graph.fingerprint(),
                "assembly complete"
            );
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(error) = init_tracing(cli.log_json) {
        eprintln!("error: {error:#}");
        exit(1);
    }

    if let Err(error) = run(cli.command) {
        error!(error = %format!("{error:#}"), "infra-stack failed");
        exit(1);
    }
}
