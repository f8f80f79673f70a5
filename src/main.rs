use clap::Parser;
use marketwatch::cli::{check, run, status, CheckCommands, Cli, Commands};
use tracing::error;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run(args) => run::execute(&cli.config, cli.log_level.as_deref(), args).await,
        Commands::Status => status::execute(&cli.config),
        Commands::Check(CheckCommands::Config) => check::execute_config(&cli.config),
        Commands::Check(CheckCommands::Connection) => check::execute_connection(&cli.config).await,
        Commands::Check(CheckCommands::Telegram) => check::execute_telegram(&cli.config).await,
        Commands::Check(CheckCommands::Slack) => check::execute_slack(&cli.config).await,
    };

    if let Err(e) = result {
        error!(error = %e, "fatal error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
