//! Prompt assembly from chat history.

use super::ChatMessage;

/// Messages beyond this many (oldest first) are left out of the prompt.
pub const MAX_CONTEXT_MESSAGES: usize = 20;

pub const SYSTEM_PRIMER: &str = "You are StudioFlow, an assistant that helps developers \
understand GitHub repositories. Answer concisely, reference file paths when relevant, \
and say so when the provided context is not enough to answer.";

/// Render the primer, optional context and the last [`MAX_CONTEXT_MESSAGES`]
/// messages as `ROLE: content` lines.
pub fn build_prompt(messages: &[ChatMessage], context: Option<&str>) -> String {
    build_prompt_with_window(messages, context, MAX_CONTEXT_MESSAGES)
}

pub fn build_prompt_with_window(
    messages: &[ChatMessage],
    context: Option<&str>,
    window: usize,
) -> String {
    let start = messages.len().saturating_sub(window);
    let header = match context.filter(|c| !c.is_empty()) {
        Some(context) => format!("{SYSTEM_PRIMER}\nContext:\n{context}\n"),
        None => format!("{SYSTEM_PRIMER}\n"),
    };
    let body = messages[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n");
    header + &body
}
