/// A single line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Free-form text to send to the model.
    Submit(String),
    Clear,
    History,
    Help,
    Quit,
    /// Looked like a slash command but isn't one we know.
    Unknown(String),
    /// Nothing but whitespace.
    Empty,
}

impl ChatEvent {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ChatEvent::Empty;
        }

        match trimmed {
            "/clear" => ChatEvent::Clear,
            "/history" => ChatEvent::History,
            "/help" => ChatEvent::Help,
            "/quit" | "/exit" => ChatEvent::Quit,
            cmd if cmd.starts_with('/') && !cmd.contains(char::is_whitespace) => {
                ChatEvent::Unknown(cmd.to_string())
            }
            // Submitted as typed; only the emptiness check looks at the trimmed form.
            _ => ChatEvent::Submit(line.to_string()),
        }
    }
}
