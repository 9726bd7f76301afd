//! Oracle backed by an OpenAI-style chat-completions endpoint.
//!
//! The model is asked to reply with a JSON object
//! `{"slide_index": <int or null>, "justification": "<text>"}`.

use crate::compose::error::OracleError;
use crate::config::OracleConfig;
use crate::oracle::{OracleAnswer, SelectionOracle};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::fmt::Write as _;

const SYSTEM_PROMPT: &str = "You select slides for a presentation. You are given the text of every slide of a deck and a keyword. Pick the single slide whose content best matches the keyword. Reply with a JSON object with the keys \"slide_index\" (the zero-based slide number, or null if no slide fits) and \"justification\" (one sentence).";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpOracle {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HttpOracle {
    /// Build an oracle from configuration, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| OracleError::Unavailable(format!("environment variable {} is not set", config.api_key_env)))?;
        Self::new(config, api_key)
    }

    pub fn new(config: &OracleConfig, api_key: impl Into<String>) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    fn request_body(&self, corpus: &[String], query: &str, corpus_label: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt(corpus, query, corpus_label) },
            ],
        })
    }
}

fn user_prompt(corpus: &[String], query: &str, corpus_label: &str) -> String {
    let mut prompt = format!("Slides of the {} ({} in total):\n\n", corpus_label, corpus.len());
    for (index, text) in corpus.iter().enumerate() {
        let _ = write!(prompt, "Slide {}:\n{}\n\n", index, text);
    }
    let _ = write!(prompt, "Keyword: {}", query);
    prompt
}

/// Pull the answer out of a chat-completions response body.
fn parse_reply(body: &str) -> Result<OracleAnswer, OracleError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(format!("response body: {}", e)))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| OracleError::Malformed("response has no message content".to_string()))?;
    serde_json::from_str(content.trim()).map_err(|e| OracleError::Malformed(format!("message content: {}", e)))
}

impl SelectionOracle for HttpOracle {
    async fn find_best_slide(
        &self,
        corpus: &[String],
        query: &str,
        corpus_label: &str,
    ) -> Result<OracleAnswer, OracleError> {
        tracing::debug!("Querying {} for '{}'", self.endpoint, query);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(corpus, query, corpus_label))
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(OracleError::Service(format!("{}: {}", status, body)));
        }
        parse_reply(&body)
    }
}
