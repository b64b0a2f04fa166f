mod cli;
mod config;
mod openai_client;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_print::cformat;
use dotenv::dotenv;
use eyre::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::gateway::CompletionGateway;
use crate::cli::chat::ChatContext;
use crate::config::Settings;
use crate::openai_client::OpenAiClient;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Send a single message, print the reply and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Secrets file holding OPENAI_API_KEY (TOML)
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Send a single message, print the reply and exit
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let input = match cli.command {
        Some(Commands::Chat { input }) => input.or(cli.input),
        None => cli.input,
    };

    let settings = match Settings::load(cli.secrets.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", cformat!("<red,bold>❌ {}</>", e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = OpenAiClient::new(&settings);
    info!("Starting GPT Chat CLI (model {}, endpoint {})", settings.model, client.endpoint());

    let gateway = CompletionGateway::new(Box::new(client), &settings.model);
    let mut chat_context = ChatContext::new(Box::new(io::stdout()), input, true, gateway);
    chat_context.run().await
}
