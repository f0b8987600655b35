use super::{runtime, CallableTrait, CliError, Interrupts};
use crate::models::ChatMessage;
use crate::stream::{Callbacks, CancelToken, ChatStreamClient, StreamOutcome};
use std::io::Write;

/// `nexus-cli ask <question...>`
///
/// Streams a single answer from a running server to stdout.
pub struct AskCommand {
    pub server: String,
    pub question: String,
    pub system: Option<String>,
}

impl AskCommand {
    pub fn new(server: String, question: Vec<String>, system: Option<String>) -> Self {
        Self {
            server,
            question: question.join(" "),
            system,
        }
    }

    fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system.as_deref().filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(self.question.as_str()));
        messages
    }
}

impl CallableTrait for AskCommand {
    fn call(&self) -> Result<(), CliError> {
        if self.question.trim().is_empty() {
            return Err(CliError::Usage("Question is empty".to_string()));
        }

        let client = ChatStreamClient::new(&self.server)?;
        let messages = self.messages();

        runtime()?.block_on(async {
            let cancel = CancelToken::new();
            let interrupts = Interrupts::listen();
            interrupts.track(&cancel);

            let mut stdout = std::io::stdout();
            let mut sink = Callbacks::new(
                |delta: &str| {
                    let _ = write!(stdout, "{}", delta);
                    let _ = stdout.flush();
                },
                || {},
            );
            let result = client.stream_chat(&messages, &mut sink, &cancel).await;
            interrupts.clear();

            let summary = result?;
            println!();
            if summary.outcome == StreamOutcome::Cancelled {
                eprintln!("(cancelled)");
            }
            Ok(())
        })
    }
}
