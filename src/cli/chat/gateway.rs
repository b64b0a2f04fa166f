use crate::cli::chat::conversation_state::Message;
use crate::openai_client::{CompletionProvider, ProviderError};

/// Prefix marking an assistant turn that carries a provider failure.
pub const ERROR_MARKER: &str = "⚠️ Error:";

/// Turns a conversation snapshot into one provider call.
///
/// Holds no conversation state of its own; the caller passes the full
/// history on every call. A single attempt is made per call.
pub struct CompletionGateway {
    provider: Box<dyn CompletionProvider>,
    model: String,
}

impl CompletionGateway {
    pub fn new(provider: Box<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the provider for the next assistant turn.
    ///
    /// `history` must hold at least the user message just submitted. The
    /// successful reply is returned untouched. Failures come back as the
    /// `Err` arm; callers decide how to surface them (see [`reply_text`]).
    pub async fn complete(&self, history: &[Message]) -> Result<String, ProviderError> {
        self.provider.complete(&self.model, history).await
    }
}

/// Render a completion outcome as transcript text: the reply itself, or the
/// error marker followed by the failure description.
pub fn reply_text(outcome: Result<String, ProviderError>) -> String {
    match outcome {
        Ok(reply) => reply,
        Err(e) => format!("{ERROR_MARKER} {e}"),
    }
}
