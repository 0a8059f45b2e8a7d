use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use edumarket_core::{format_vnd, seed_catalog};
use edumarket_storage::SessionStore;
use edumarket_suggest::CannedSuggestionSource;
use edumarket_web::AppState;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "edumarket-cli")]
#[command(about = "EduMarket command-line interface")]
struct Cli {
    /// Directory holding the persisted session state.
    #[arg(long, default_value = ".edumarket")]
    session_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the web UI.
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Print the seeded catalog.
    Catalog,
    /// Ask the assistant a one-shot question.
    Chat { message: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let catalog = seed_catalog();

    match cli.command.unwrap_or(Commands::Serve { port: 8000 }) {
        Commands::Serve { port } => {
            let store = SessionStore::load(&cli.session_dir).await?;
            let state = Arc::new(AppState::new(
                catalog,
                store,
                Arc::new(CannedSuggestionSource::stock()),
            ));
            edumarket_web::serve(state, port).await?;
        }
        Commands::Catalog => {
            for course in &catalog {
                println!(
                    "{:>2}  {:<55} {:>12}  {}",
                    course.id,
                    course.title,
                    format_vnd(course.price),
                    course.category
                );
            }
        }
        Commands::Chat { message } => {
            let reply = edumarket_engine::respond(&message, &catalog);
            println!("{}", reply.text);
            for course in &reply.courses {
                println!("  - {} ({})", course.title, format_vnd(course.price));
            }
        }
    }

    Ok(())
}
