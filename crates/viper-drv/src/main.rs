use std::path::PathBuf;

use clap::Parser;

/// Tree-walking interpreter for the Viper scripting language.
#[derive(Parser)]
#[command(name = "viper", version, about)]
struct Cli {
    /// Script to run. Omit to start the REPL.
    script: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.script {
        Some(path) => viper_drv::run_file(&path),
        None => viper_drv::repl(),
    }
}
