//! krod: render chat messages with code, math and cited sources

mod logging;
mod tui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use krod_core::content::html::message_to_html;
use krod_core::{
    parse_sources, render_message, ContentCache, KrodConfig, Message, MessageRole, SourceCards,
};

#[derive(Parser, Debug)]
#[command(
    name = "krod",
    about = "Render chat messages with code, math and cited sources",
    version,
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ~/.krod/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a message once and exit
    Render {
        /// Message text, or a JSON message with role, content and sources
        file: PathBuf,

        /// JSON array of sources for a plain text message
        #[arg(long, short = 's', value_name = "PATH")]
        sources: Option<PathBuf>,

        /// Emit HTML instead of terminal output
        #[arg(long)]
        html: bool,

        /// Show every source card
        #[arg(long, short = 'e')]
        expand: bool,

        /// Wrap width in columns (defaults to the terminal width)
        #[arg(long, short = 'w')]
        width: Option<usize>,

        /// Treat a plain text message as written by the user
        #[arg(long)]
        user: bool,
    },

    /// Browse a message interactively
    View {
        file: PathBuf,

        #[arg(long, short = 's', value_name = "PATH")]
        sources: Option<PathBuf>,

        #[arg(long, short = 'e')]
        expand: bool,

        #[arg(long)]
        user: bool,
    },
}

/// Load a message from `.json` or plain text plus an optional sources file
fn load_message(file: &Path, sources: Option<&Path>, user: bool) -> Result<Message> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    if file.extension().is_some_and(|ext| ext == "json") {
        let message = Message::from_json(&raw)
            .with_context(|| format!("invalid message {}", file.display()))?;
        if sources.is_some() {
            tracing::warn!("Ignoring --sources for a JSON message");
        }
        return Ok(message);
    }

    let sources = match sources {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_sources(&json).with_context(|| format!("invalid sources {}", path.display()))?
        }
        None => Vec::new(),
    };
    let role = if user {
        MessageRole::User
    } else {
        MessageRole::Assistant
    };
    Ok(Message::new(role, raw, sources))
}

fn load_config(path: Option<&Path>) -> Result<KrodConfig> {
    let config = match path {
        Some(path) => KrodConfig::load_from(path)?,
        None => KrodConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Render {
            file,
            sources,
            html,
            expand,
            width,
            user,
        } => {
            logging::init_stderr(cli.verbose);
            let config = load_config(cli.config.as_deref())?;
            let message = load_message(&file, sources.as_deref(), user)?;

            if html {
                let mut cache = ContentCache::new(config.cache.capacity);
                let rendered = render_message(&message, &mut cache);
                let mut cards = SourceCards::with_limit(config.sources.collapsed_limit);
                cards.set_expanded(expand);
                println!(
                    "{}",
                    message_to_html(&rendered, &message.sources, &cards, |_| false)
                );
                Ok(())
            } else {
                tui::print_message(&message, &config, expand, width)
            }
        }
        Command::View {
            file,
            sources,
            expand,
            user,
        } => {
            if let Err(e) = logging::init_file(cli.verbose) {
                eprintln!("Logging disabled: {:#}", e);
            }
            let config = load_config(cli.config.as_deref())?;
            let message = load_message(&file, sources.as_deref(), user)?;
            tui::run_viewer(message, &config, Arc::new(tui::SystemClipboard::new()), expand).await
        }
    }
}
