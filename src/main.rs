use clap::Parser;
use coinbook::cli::{check, output, run, CheckCommand, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Run(args) => run::execute(args).await,
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.config),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
