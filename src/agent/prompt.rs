//! Prompt assembly for the upstream call.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::llm::ChatMessage;

/// Build the message list sent upstream.
///
/// Order: configured system prompt, current UTC time, caller profile, then
/// the conversation history unchanged.
pub fn build_messages(
    system_prompt: Option<&str>,
    user_profile: Option<&Value>,
    history: &[ChatMessage],
    now: DateTime<Utc>,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);

    if let Some(prompt) = system_prompt {
        messages.push(ChatMessage::system(prompt));
    }

    messages.push(ChatMessage::system(format!(
        "Current date/time (UTC): {}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    )));

    if let Some(profile) = user_profile.filter(|p| !is_blank(p)) {
        messages.push(ChatMessage::system(format!("User profile: {}", profile)));
    }

    messages.extend(history.iter().cloned());
    messages
}

/// Null and `{}` profiles carry no context.
fn is_blank(profile: &Value) -> bool {
    match profile {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    #[test]
    fn history_follows_context() {
        let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        let messages = build_messages(Some("Be kind."), None, &history, fixed_now());

        assert_eq!(
            messages,
            vec![
                ChatMessage::system("Be kind."),
                ChatMessage::system("Current date/time (UTC): 2024-05-17 09:30:00 UTC"),
                ChatMessage::user("hi"),
                ChatMessage::assistant("hello"),
            ]
        );
    }

    #[test]
    fn profile_rendered_as_json() {
        let profile = json!({"name": "Аня", "city": "Казань"});
        let messages =
            build_messages(None, Some(&profile), &[ChatMessage::user("?")], fixed_now());

        assert_eq!(messages.len(), 3);
        // Non-ASCII text is kept as-is, not escaped.
        assert_eq!(
            messages[1].content,
            r#"User profile: {"city":"Казань","name":"Аня"}"#
        );
    }

    #[test]
    fn null_and_empty_profiles_skipped() {
        let messages = build_messages(None, Some(&Value::Null), &[], fixed_now());
        assert_eq!(messages.len(), 1);

        let messages = build_messages(None, Some(&json!({})), &[], fixed_now());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.starts_with("Current date/time"));
    }
}
