use serde::{Deserialize, Serialize};

/// ========================================
/// Chat wire types shared by every provider
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Ordered chat history. Order is the turn order sent to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Serialized form used as the reply cache key.
    pub fn cache_key(&self) -> String {
        // Vec<Message> of plain strings cannot fail to serialize.
        serde_json::to_string(&self.messages).unwrap_or_default()
    }
}

/// What a provider receives for one completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Conversation,
    pub temperature: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let mut convo = Conversation::new();
        convo.push(Message::system("sys"));
        convo.push(Message::user("hi"));
        let json = serde_json::to_string(&convo).unwrap();
        assert_eq!(
            json,
            r#"[{"role":"system","content":"sys"},{"role":"user","content":"hi"}]"#
        );
    }

    #[test]
    fn cache_key_differs_by_content() {
        let mut a = Conversation::new();
        a.push(Message::user("one"));
        let mut b = Conversation::new();
        b.push(Message::user("two"));
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), a.clone().cache_key());
    }
}
