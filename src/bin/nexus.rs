//! `nexus-cli`: talk to a running Nexus server from the terminal and manage
//! the Telegram webhook.
//!
//! ```text
//! nexus-cli chat
//! nexus-cli ask "what is a monad?"
//! nexus-cli telegram set-webhook --url https://nexus.example/telegram/webhook
//! ```

use clap::{Parser, Subcommand};
use nexus::cli::ask::AskCommand;
use nexus::cli::chat::ChatCommand;
use nexus::cli::telegram::{TelegramWebhookCommand, WebhookCommandKind};
use nexus::cli::{CallableTrait, DEFAULT_SERVER_URL};
use nexus::telemetry::{get_subscriber, init_subscriber};

#[derive(Parser, Debug)]
#[command(name = "nexus-cli", version, about = "Chat with a Nexus server from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: NexusCommands,
}

#[derive(Debug, Subcommand)]
enum NexusCommands {
    /// Interactive chat; replies stream as they arrive
    Chat {
        /// Nexus server base URL
        #[arg(long, env = "NEXUS_URL", default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Ask a single question and print the streamed answer
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
        /// Optional system prompt sent before the question
        #[arg(long)]
        system: Option<String>,
        #[arg(long, env = "NEXUS_URL", default_value = DEFAULT_SERVER_URL)]
        server: String,
    },
    /// Telegram webhook management (uses TELEGRAM_BOT_TOKEN)
    Telegram {
        #[command(subcommand)]
        command: TelegramCommands,
    },
}

#[derive(Debug, Subcommand)]
enum TelegramCommands {
    /// Register the webhook
    SetWebhook {
        /// Defaults to {telegram.public_url}/telegram/webhook
        #[arg(long)]
        url: Option<String>,
    },
    /// Remove the webhook
    DeleteWebhook,
    /// Show the current webhook registration
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // stdout carries the replies; logs go to stderr
    init_subscriber(get_subscriber("nexus-cli".into(), "warn".into(), std::io::stderr));
    let command = get_command(cli);
    command.call()?;
    Ok(())
}

fn get_command(cli: Cli) -> Box<dyn CallableTrait> {
    match cli.command {
        NexusCommands::Chat { server } => Box::new(ChatCommand::new(server)),
        NexusCommands::Ask {
            question,
            system,
            server,
        } => Box::new(AskCommand::new(server, question, system)),
        NexusCommands::Telegram { command } => {
            let kind = match command {
                TelegramCommands::SetWebhook { url } => WebhookCommandKind::Set { url },
                TelegramCommands::DeleteWebhook => WebhookCommandKind::Delete,
                TelegramCommands::Info => WebhookCommandKind::Info,
            };
            Box::new(TelegramWebhookCommand::new(kind))
        }
    }
}
