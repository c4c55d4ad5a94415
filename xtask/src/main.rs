use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const ASSEMBLY_DIR: &str = "cdk.out";
const DIST_DIR: &str = "dist";
const ASSEMBLY_FILES: [&str; 3] = ["graph.json", "template.json", "manifest.json"];

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the infra stack workspace",
    long_about = "A unified CLI for CI checks, template synthesis, and packaging\n\
                  the cloud assembly handed to the provisioning engine."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Synthesize the CloudFormation template for a profile
    Synth {
        /// Stack profile to evaluate
        #[arg(long, env = "INFRA_STACK_PROFILE", default_value = "extended")]
        profile: String,
        /// Env file holding the required settings
        #[arg(long, env = "INFRA_STACK_ENV_FILE")]
        env_file: Option<String>,
        /// Output file path
        #[arg(long, default_value = "template.json")]
        output: String,
    },
    /// Write the cloud assembly and package it as a zip artifact
    Assemble {
        /// Stack profile to evaluate
        #[arg(long, env = "INFRA_STACK_PROFILE", default_value = "extended")]
        profile: String,
        /// Env file holding the required settings
        #[arg(long, env = "INFRA_STACK_ENV_FILE")]
        env_file: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Lint,
    /// Workspace tests
    Test,
    /// Lint + test
    Check,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn infra_stack_args<'a>(
    command: &'a str,
    profile: &'a str,
    env_file: Option<&'a str>,
) -> Vec<&'a str> {
    let mut args = vec![
        "run",
        "-q",
        "-p",
        "infra_stack_cli",
        "--bin",
        "infra-stack",
        "--",
        command,
        "--profile",
        profile,
    ];
    if let Some(path) = env_file {
        args.push("--env-file");
        args.push(path);
    }
    args
}

fn package_assembly(profile: &str, env_file: Option<&str>) {
    step("Synthesize cloud assembly");
    let mut args = infra_stack_args("assemble", profile, env_file);
    args.extend(["--out-dir", ASSEMBLY_DIR]);
    run_cargo(&args);

    step("Package cloud assembly zip artifact");
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create dist directory");
    let zip_path = dist_dir.join(format!("assembly-{profile}.zip"));
    package_assembly_zip(Path::new(ASSEMBLY_DIR), &zip_path);

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

fn package_assembly_zip(assembly_dir: &Path, zip_path: &Path) {
    let file = fs::File::create(zip_path).expect("failed to create assembly zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for name in ASSEMBLY_FILES {
        let path = assembly_dir.join(name);
        if !path.exists() {
            panic!("expected assembly file at '{}'", path.display());
        }
        let contents = fs::read(&path).expect("failed to read assembly file");
        zip.start_file(name, options)
            .expect("failed to start assembly entry in zip");
        zip.write_all(&contents)
            .expect("failed to write assembly entry");
    }

    zip.finish().expect("failed to finish assembly zip");
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_lint() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test infra_stack_core");
    run_cargo(&["test", "-p", "infra_stack_core"]);

    step("Test infra_stack_cli");
    run_cargo(&["test", "-p", "infra_stack_cli"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { job } => {
            match job {
                CiJob::Lint => ci_lint(),
                CiJob::Test => ci_test(),
                CiJob::Check => {
                    ci_lint();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::Synth {
            profile,
            env_file,
            output,
        } => {
            let mut args = infra_stack_args("synth", &profile, env_file.as_deref());
            args.extend(["--format", "template", "--output", output.as_str()]);
            run_cargo(&args);
        }
        Commands::Assemble { profile, env_file } => {
            package_assembly(&profile, env_file.as_deref());
        }
    }
}
