//! LLM source proposal over an OpenAI-compatible chat API.
//!
//! Asks a chat model for the quoted sources in an article and parses the
//! JSON it returns. The proposer is a best-effort collaborator: any failure
//! (network, HTTP error, unparseable output) yields `None` and the article
//! proceeds on pattern extraction alone.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use quotewatch_core::CandidateSource;

const SYSTEM_PROMPT: &str = "You identify quoted sources in news articles. \
Respond with a JSON array only. Each element: {\"name\": string, \
\"gender\": \"m\"|\"f\"|\"unknown\", \"type\": string}. List every person \
who is directly quoted or whose speech is reported. Return [] if none.";

/// A source proposed by the LLM, before reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposedSource {
    pub name: String,
    /// Raw gender label as emitted by the model; advisory only. Known bad
    /// values ("they") are normalized downstream.
    #[serde(default)]
    pub gender: Option<String>,
    /// Free-text source type ("expert", "official", ...).
    #[serde(default, rename = "type")]
    pub source_type: Option<String>,
}

impl ProposedSource {
    pub fn to_candidate(&self) -> CandidateSource {
        CandidateSource::ner(self.name.clone())
    }
}

/// Proposes an initial quoted-source list from free text.
///
/// `None` means the proposer could not produce a usable answer; callers fall
/// back to the other extraction method.
#[async_trait]
pub trait SourceProposer: Send + Sync {
    async fn propose(&self, article_text: &str) -> Option<Vec<ProposedSource>>;
}

/// Connection settings for the chat API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Debug, Deserialize)]
struct ChatMessageContent {
    content: String,
}

/// Thin OpenAI-compatible chat client.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    /// Run one chat completion and return the assistant message text.
    pub async fn complete(&self, system: &str, user: &str) -> anyhow::Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("chat API error ({status}): {body}");
        }

        let chat: ChatResponse = response.json().await?;
        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no completion choices returned"))?;
        Ok(choice.message.content)
    }
}

/// LLM-backed [`SourceProposer`].
pub struct LlmSourceProposer {
    client: LlmClient,
}

impl LlmSourceProposer {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: LlmClient::new(config)?,
        })
    }
}

#[async_trait]
impl SourceProposer for LlmSourceProposer {
    async fn propose(&self, article_text: &str) -> Option<Vec<ProposedSource>> {
        let content = match self.client.complete(SYSTEM_PROMPT, article_text).await {
            Ok(content) => content,
            Err(err) => {
                warn!(error = %err, "source proposal request failed");
                return None;
            }
        };
        match parse_proposals(&content) {
            Ok(sources) => Some(sources),
            Err(err) => {
                warn!(error = %err, "unparseable source proposal output");
                None
            }
        }
    }
}

/// Parse the model's JSON array, tolerating markdown code fences.
fn parse_proposals(content: &str) -> anyhow::Result<Vec<ProposedSource>> {
    let stripped = strip_code_fences(content);
    let sources: Vec<ProposedSource> = serde_json::from_str(stripped.trim())?;
    Ok(sources)
}

/// Remove a surrounding ```json ... ``` fence if present. Chat models keep
/// emitting these despite instructions not to.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language hint on the opening fence line.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    rest.strip_suffix("```").map(str::trim).unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_array() {
        let out = parse_proposals(
            r#"[{"name": "Becca Parker", "gender": "f", "type": "student"}]"#,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Becca Parker");
        assert_eq!(out[0].gender.as_deref(), Some("f"));
        assert_eq!(out[0].source_type.as_deref(), Some("student"));
    }

    #[test]
    fn parses_fenced_json() {
        let content = "```json\n[{\"name\": \"Andoni Iraola\", \"gender\": \"m\", \"type\": \"coach\"}]\n```";
        let out = parse_proposals(content).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Andoni Iraola");
    }

    #[test]
    fn parses_fence_without_language_hint() {
        let content = "```\n[]\n```";
        assert!(parse_proposals(content).unwrap().is_empty());
    }

    #[test]
    fn missing_optional_fields_default_to_none() {
        let out = parse_proposals(r#"[{"name": "Abi Paler"}]"#).unwrap();
        assert_eq!(out[0].gender, None);
        assert_eq!(out[0].source_type, None);
    }

    #[test]
    fn prose_output_is_an_error() {
        assert!(parse_proposals("I found two sources in this article.").is_err());
    }

    #[test]
    fn proposal_converts_to_ner_candidate() {
        let p = ProposedSource {
            name: "Abi Paler".to_string(),
            gender: Some("they".to_string()),
            source_type: None,
        };
        let c = p.to_candidate();
        assert_eq!(c.name, "Abi Paler");
        assert_eq!(c.position, None);
    }
}
