use serde::Serialize;

/// Who authored a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation, serialized as-is into the provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered message history for a single chat session.
///
/// The store is append-only: messages are never reordered or edited once
/// pushed, and the only way to remove anything is [`ConversationState::clear`].
#[derive(Debug, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    pub fn add_user_message(&mut self, message: &str) {
        self.append(Role::User, message);
    }

    pub fn add_assistant_message(&mut self, message: &str) {
        self.append(Role::Assistant, message);
    }

    /// Every message appended so far, oldest first.
    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let state = ConversationState::new();
        assert!(state.is_empty());
        assert!(state.snapshot().is_empty());
    }

    #[test]
    fn append_keeps_insertion_order() {
        let mut state = ConversationState::new();
        state.add_user_message("first");
        state.add_assistant_message("second");
        state.add_assistant_message("third");

        let contents: Vec<&str> = state.snapshot().iter().map(Message::content).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(state.snapshot()[0].role(), Role::User);
        assert_eq!(state.snapshot()[2].role(), Role::Assistant);
    }

    #[test]
    fn append_never_touches_existing_entries() {
        let mut state = ConversationState::new();
        state.add_user_message("hello");
        let before = state.snapshot().to_vec();

        state.add_assistant_message("hi");
        state.add_user_message("again");

        assert_eq!(&state.snapshot()[..1], before.as_slice());
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn clear_empties_any_history() {
        for n in [0usize, 1, 2, 17] {
            let mut state = ConversationState::new();
            for i in 0..n {
                state.add_user_message(&format!("message {i}"));
            }
            state.clear();
            assert!(state.snapshot().is_empty(), "history of {n} survived clear");
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        let message = Message::new(Role::Assistant, "ok");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "ok"}));
    }
}
