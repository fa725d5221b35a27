use std::fmt;

use crate::config::AiConfig;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatProvider {
    VertexAi,
    OpenRouter,
}

impl fmt::Display for ChatProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatProvider::VertexAi => write!(f, "Vertex AI"),
            ChatProvider::OpenRouter => write!(f, "OpenRouter"),
        }
    }
}

/// Everything a provider backend needs to answer the latest prompt.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub provider: ChatProvider,
    pub api_key: String,
    pub history: Vec<ChatMessage>,
}

/// Pick the provider with a configured key, preferring Vertex AI.
///
/// # Errors
///
/// Returns [`Error::Config`] when no key is configured.
pub fn resolve_provider(config: &AiConfig) -> Result<(ChatProvider, String)> {
    if let Some(key) = config.vertex_key() {
        return Ok((ChatProvider::VertexAi, key.to_string()));
    }
    if let Some(key) = config.openrouter_key() {
        return Ok((ChatProvider::OpenRouter, key.to_string()));
    }
    Err(Error::Config(
        "No AI provider API key configured. Add one in Preferences.".to_string(),
    ))
}

/// Transcript of one chat conversation.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
}

impl ChatSession {
    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Record a user prompt and build the request for it.
    ///
    /// Blank prompts are ignored (`Ok(None)`). A missing provider key is
    /// recorded in the transcript as an error entry and returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no provider key is configured.
    pub fn submit(&mut self, prompt: &str, config: &AiConfig) -> Result<Option<ChatRequest>> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }

        self.push(ChatRole::User, prompt);
        match resolve_provider(config) {
            Ok((provider, api_key)) => Ok(Some(ChatRequest {
                provider,
                api_key,
                history: self.transcript.clone(),
            })),
            Err(e) => {
                self.push(ChatRole::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub fn push(&mut self, role: ChatRole, text: &str) {
        self.transcript.push(ChatMessage {
            role,
            text: text.to_string(),
        });
    }

    pub fn clear(&mut self) {
        self.transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vertex: Option<&str>, openrouter: Option<&str>) -> AiConfig {
        AiConfig {
            vertex_api_key: vertex.map(String::from),
            openrouter_api_key: openrouter.map(String::from),
        }
    }

    #[test]
    fn test_resolve_prefers_vertex() {
        let (provider, key) = resolve_provider(&config(Some("v"), Some("o"))).unwrap();
        assert_eq!(provider, ChatProvider::VertexAi);
        assert_eq!(key, "v");
    }

    #[test]
    fn test_resolve_falls_back_to_openrouter() {
        let (provider, _) = resolve_provider(&config(Some("   "), Some("o"))).unwrap();
        assert_eq!(provider, ChatProvider::OpenRouter);
    }

    #[test]
    fn test_resolve_without_keys_fails() {
        let err = resolve_provider(&config(None, None)).unwrap_err();
        assert!(err.to_string().contains("No AI provider API key"));
    }

    #[test]
    fn test_submit_blank_prompt_is_ignored() {
        let mut session = ChatSession::default();
        assert!(session.submit("  ", &config(Some("v"), None)).unwrap().is_none());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_submit_builds_request_with_history() {
        let mut session = ChatSession::default();
        let request = session
            .submit(" hello ", &config(None, Some("o")))
            .unwrap()
            .unwrap();
        assert_eq!(request.provider, ChatProvider::OpenRouter);
        assert_eq!(request.history.len(), 1);
        assert_eq!(request.history[0].text, "hello");
    }

    #[test]
    fn test_submit_without_key_records_error() {
        let mut session = ChatSession::default();
        assert!(session.submit("hi", &config(None, None)).is_err());
        let roles: Vec<_> = session.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Error]);
    }
}
