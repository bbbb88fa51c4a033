use clap::Parser;
use linebook::cli::{self, output, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync(ref args) => cli::sync::execute(args).await,
        Commands::Run(ref args) => cli::run::execute(args).await,
        Commands::Odds(ref args) => cli::odds::execute(args).await,
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        if let linebook::error::Error::Venue(ref venue) = e {
            if let Some(hint) = venue.hint {
                output::hint(hint);
            }
        }
        std::process::exit(1);
    }
}
