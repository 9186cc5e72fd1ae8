use clap::Parser;
use std::process::ExitCode;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = cli::Cli::parse();
    match cli::run(cli).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        },
        Err(error) => {
            eprintln!("ERROR: {error}");
            ExitCode::FAILURE
        },
    }
}
