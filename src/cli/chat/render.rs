use std::io::Write;

use color_print::cformat;
use eyre::Result;

use crate::cli::chat::conversation_state::{Message, Role};

fn role_tag(role: Role) -> String {
    match role {
        Role::User => cformat!("<cyan,bold>you</>"),
        Role::Assistant => cformat!("<magenta,bold>assistant</>"),
    }
}

/// Write one transcript entry, tagged with its role.
pub fn render_message(output: &mut dyn Write, message: &Message) -> Result<()> {
    writeln!(output, "{} › {}", role_tag(message.role()), message.content())?;
    writeln!(output)?;
    Ok(())
}

/// Write every entry of `messages` in order.
pub fn render_transcript(output: &mut dyn Write, messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
        writeln!(output, "{}", cformat!("<dim>(no messages yet)</>"))?;
        return Ok(());
    }

    for message in messages {
        render_message(output, message)?;
    }
    Ok(())
}
