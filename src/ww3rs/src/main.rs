// ww3rs/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use ww3rs::cli::{check_config, generate_run, print_context};
use ww3rs::constants::DEFAULT_CONFIG_NAME;

#[derive(Parser)]
#[command(name = "ww3rs")]
#[command(about = "Namelist generation for WAVEWATCH III runs", long_about = None)]
#[command(version = env!("WW3RS_CLI_VERSION"))]
struct Cli {
    /// Run configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        env = "WW3RS_CONFIG",
        default_value = DEFAULT_CONFIG_NAME
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the namelists of every configured program
    Generate {
        /// Parent of the run directory
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
    },
    /// Validate the configuration and print warnings
    Check,
    /// Print the template context as JSON
    Context,
}

fn entrypoint() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { output_dir } => generate_run(&cli.config, &output_dir),
        Commands::Check => check_config(&cli.config),
        Commands::Context => print_context(&cli.config),
    }
}

fn main() -> ExitCode {
    match entrypoint() {
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}
