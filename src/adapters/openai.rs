use crate::domain::model::TrendItem;
use crate::domain::ports::TrendGenerator;
use crate::utils::error::{Result, TrendError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1500;

const TRENDS_SYSTEM_PROMPT: &str = "You are a technology analyst. You answer with strict JSON \
    and nothing else: no prose, no markdown fences.";

const REPLACEMENT_SYSTEM_PROMPT: &str = "You suggest one replacement URL for a broken link. \
    Answer with the bare URL and nothing else.";

pub struct OpenAiGenerator {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    async fn chat(&self, system: &str, user: String) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(model = %self.model, "sending chat-completion request");
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendError::generation(format!(
                "chat-completion endpoint returned {}: {}",
                status, body
            )));
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(TrendError::generation("model returned empty content"));
        }
        Ok(content)
    }
}

#[async_trait]
impl TrendGenerator for OpenAiGenerator {
    async fn fetch_trends(&self, count: usize) -> Result<Vec<TrendItem>> {
        let prompt = format!(
            "List exactly {count} current software technology trends as a JSON array. \
             Each element must be an object with keys \"title\" (short trend name), \
             \"description\" (2-3 sentences), and optionally \"example_title\" and \"url\" \
             (a link to a relevant article). Respond with the JSON array only."
        );

        let content = self.chat(TRENDS_SYSTEM_PROMPT, prompt).await?;
        let json = strip_code_fences(&content);

        let trends: Vec<TrendItem> = serde_json::from_str(json).map_err(|e| {
            TrendError::generation(format!("model output is not a valid trend list: {}", e))
        })?;

        if trends.is_empty() {
            return Err(TrendError::generation("no trends produced"));
        }
        tracing::info!(count = trends.len(), "parsed trend items");
        Ok(trends)
    }

    async fn suggest_replacement(&self, topic: &str, allowed_domains: &[&str]) -> Result<String> {
        let prompt = format!(
            "Suggest one working URL about \"{}\". It must be on one of these domains: {}. \
             Respond with the URL only.",
            topic,
            allowed_domains.join(", ")
        );

        let content = self.chat(REPLACEMENT_SYSTEM_PROMPT, prompt).await?;
        // take the first token in case the model added trailing commentary
        let url = content
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        if url.is_empty() {
            return Err(TrendError::generation("model returned no replacement URL"));
        }
        Ok(url)
    }
}

/// Models wrap JSON in ``` fences often enough that tolerating it is cheaper
/// than re-asking.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .trim_end_matches('`')
        .trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
