use super::{runtime, CallableTrait, CliError, Interrupts};
use crate::models::AgentStatus;
use crate::session::ChatSession;
use crate::store::{ConversationStore, MemoryStore};
use crate::stream::{CancelToken, ChatStreamClient};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// `nexus-cli chat`
///
/// Interactive session against a running server. Replies stream as they
/// arrive; Ctrl-C stops the current reply, or exits at the prompt. `/new` starts a new conversation,
/// `/quit` exits. History lives for the duration of the process.
pub struct ChatCommand {
    pub server: String,
}

impl ChatCommand {
    pub fn new(server: String) -> Self {
        Self { server }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    NewConversation,
    Skip,
    Message(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "/quit" | "/exit" => Input::Quit,
        "/new" => Input::NewConversation,
        text => Input::Message(text),
    }
}

impl CallableTrait for ChatCommand {
    fn call(&self) -> Result<(), CliError> {
        let client = ChatStreamClient::new(&self.server)?;
        let store: Arc<dyn ConversationStore> = Arc::new(MemoryStore::new());
        let mut session = ChatSession::new(store, client);

        runtime()?.block_on(async {
            let mut status = session.subscribe();
            tokio::spawn(async move {
                while status.changed().await.is_ok() {
                    if *status.borrow() == AgentStatus::Thinking {
                        eprint!("… ");
                    }
                }
            });

            eprintln!("Connected to {}. /new starts over, /quit exits.", self.server);
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let interrupts = Interrupts::listen();

            loop {
                eprint!("> ");
                let line = tokio::select! {
                    line = lines.next_line() => line?,
                    _ = interrupts.idle() => {
                        eprintln!();
                        break;
                    }
                };
                let Some(line) = line else {
                    break;
                };

                let text = match parse_input(&line) {
                    Input::Quit => break,
                    Input::Skip => continue,
                    Input::NewConversation => {
                        session.select(None);
                        eprintln!("(new conversation)");
                        continue;
                    }
                    Input::Message(text) => text,
                };

                let cancel = CancelToken::new();
                interrupts.track(&cancel);
                let mut stdout = std::io::stdout();
                let result = session
                    .send(text, &cancel, |delta| {
                        let _ = write!(stdout, "{}", delta);
                        let _ = stdout.flush();
                    })
                    .await;
                interrupts.clear();
                println!();

                if let Err(err) = result {
                    eprintln!("Error: {}", err);
                }
            }

            Ok(())
        })
    }
}
