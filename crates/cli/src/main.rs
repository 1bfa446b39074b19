use anyhow::Result;
use assistant_core::config;
use assistant_core::history::ConversationHistory;
use assistant_core::models::Domain;
use assistant_core::pipeline::{self, Secrets};
use clap::{Parser, Subcommand};
use cli::{chat, render};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    let router = pipeline::build_router(&cfg, &Secrets::from_env()).await?;

    match cli.command {
        Commands::Ask { message, json } => {
            let reply = router.route(&message.join(" ")).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&render::reply_json(&reply))?);
            } else {
                println!("{}", render::reply(&reply));
            }
        }
        Commands::Chat => {
            let mut history = ConversationHistory::new();
            let stdin = std::io::stdin();
            chat::run_session(&router, &mut history, stdin.lock(), std::io::stdout()).await?;
        }
        Commands::Classify { message } => {
            println!("{}", router.classify(&message.join(" ")).await?);
        }
        Commands::Search { index, query, topk } => {
            let k = topk.unwrap_or(router.top_k());
            let hits = router.retrieve(index, &query.join(" "), k).await?;
            if hits.is_empty() {
                println!("(aucun résultat dans l'index {})", index.as_str());
            } else {
                println!("{}", render::hits(&hits));
            }
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "campus-assistant", version, about = "School assistant chatbot")]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a single message and print the answer
    Ask {
        #[arg(required = true)]
        message: Vec<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive session on stdin
    Chat,
    /// Print only the detected intent
    Classify {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Show the chunks retrieved from one index
    Search {
        /// site or regulation
        #[arg(long, default_value = "site")]
        index: Domain,
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(long)]
        topk: Option<usize>,
    },
}
