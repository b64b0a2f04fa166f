pub mod command;
pub mod conversation_state;
pub mod gateway;
pub mod prompt;
pub mod render;

use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use command::ChatEvent;
use conversation_state::ConversationState;
use eyre::Result;
use gateway::{reply_text, CompletionGateway};
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use tracing::debug;

const WELCOME_TEXT: &str = "
⚡ GPT-4o-mini Chatbot

Type a message and press enter. The whole conversation is sent with every message.

/clear        Clear the conversation history
/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
GPT Chat CLI

/clear        Clear the conversation history
/history      Show the full conversation so far
/help         Show this help dialogue
/quit         Quit the application
";

/// What the input loop should do after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One chat session: its history, the gateway it talks through, and the
/// terminal it renders to. Dropping the context ends the session.
pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    conversation_state: ConversationState,
    gateway: CompletionGateway,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        gateway: CompletionGateway,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            conversation_state: ConversationState::new(),
            gateway,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            self.dispatch(ChatEvent::parse(&input)).await?;
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            self.print_welcome()?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation_state
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(None);

            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str());
                    }

                    if self.dispatch(ChatEvent::parse(&line)).await? == Flow::Quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one input event to completion before the next one is read.
    pub async fn dispatch(&mut self, event: ChatEvent) -> Result<Flow> {
        match event {
            ChatEvent::Submit(text) => self.submit(&text).await?,
            ChatEvent::Clear => {
                if !self.conversation_state.is_empty() {
                    debug!("Clearing {} messages", self.conversation_state.len());
                }
                self.conversation_state.clear();
                writeln!(self.output, "{}", cformat!("<dim>Conversation cleared.</>"))?;
            }
            ChatEvent::History => {
                render::render_transcript(&mut *self.output, self.conversation_state.snapshot())?;
            }
            ChatEvent::Help => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            ChatEvent::Unknown(cmd) => {
                writeln!(self.output, "Unknown command: {} (try /help)", cmd)?;
            }
            ChatEvent::Empty => {}
            ChatEvent::Quit => return Ok(Flow::Quit),
        }

        self.output.flush()?;
        Ok(Flow::Continue)
    }

    /// Run one turn: record the user message, ask the model with the full
    /// history, record whatever came back, then render both entries.
    async fn submit(&mut self, text: &str) -> Result<()> {
        self.conversation_state.add_user_message(text);

        let outcome = self
            .gateway
            .complete(self.conversation_state.snapshot())
            .await;
        if outcome.is_err() {
            debug!("Completion failed; recording the error as the assistant turn");
        }
        self.conversation_state.add_assistant_message(&reply_text(outcome));

        let messages = self.conversation_state.snapshot();
        for message in &messages[messages.len() - 2..] {
            render::render_message(&mut *self.output, message)?;
        }

        debug!(
            "Turn complete, {} messages in conversation (model {})",
            messages.len(),
            self.gateway.model()
        );
        Ok(())
    }
}
