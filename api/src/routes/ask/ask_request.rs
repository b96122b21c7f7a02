use ai_llm_service::ChatMessage;
use serde::Deserialize;

/// Request payload for /ask.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// Accepted for compatibility; the configured primary model is used.
    #[serde(default)]
    pub model1: Option<String>,
    /// Accepted for compatibility; the configured secondary model is used.
    #[serde(default)]
    pub model2: Option<String>,
    /// Accepted for compatibility; the judge always runs.
    #[serde(default)]
    pub use_judge: Option<bool>,
    /// Prior conversation turns, oldest first.
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    #[serde(alias = "user")]
    Human,
    #[serde(alias = "assistant")]
    Ai,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl From<ChatTurn> for ChatMessage {
    fn from(turn: ChatTurn) -> Self {
        match turn.role {
            TurnRole::Human => ChatMessage::user(turn.content),
            TurnRole::Ai => ChatMessage::assistant(turn.content),
        }
    }
}

impl AskRequest {
    /// Names of supplied fields whose value differs from what the pipeline
    /// actually does.
    pub fn ignored_fields(&self, primary: &str, secondary: &str) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.model1.as_deref().is_some_and(|m| m != primary) {
            out.push("model1");
        }
        if self.model2.as_deref().is_some_and(|m| m != secondary) {
            out.push("model2");
        }
        if self.use_judge == Some(false) {
            out.push("use_judge");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::ChatRole;

    #[test]
    fn minimal_body_parses() {
        let req: AskRequest = serde_json::from_str(r#"{"question":"hi"}"#).unwrap();
        assert_eq!(req.question, "hi");
        assert!(req.chat_history.is_empty());
        assert!(req.ignored_fields("a", "b").is_empty());
    }

    #[test]
    fn matching_overrides_are_not_flagged() {
        let req: AskRequest = serde_json::from_str(
            r#"{"question":"hi","model1":"a","model2":"other","use_judge":false}"#,
        )
        .unwrap();
        assert_eq!(req.ignored_fields("a", "b"), ["model2", "use_judge"]);
    }

    #[test]
    fn turns_map_to_chat_roles() {
        let req: AskRequest = serde_json::from_str(
            r#"{"question":"q","chat_history":[{"role":"human","content":"x"},{"role":"ai","content":"y"}]}"#,
        )
        .unwrap();
        let msgs: Vec<ChatMessage> = req.chat_history.into_iter().map(Into::into).collect();
        assert_eq!(msgs[0].role, ChatRole::User);
        assert_eq!(msgs[1].role, ChatRole::Assistant);
    }
}
