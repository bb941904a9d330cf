use std::time::Duration;

use anyhow::anyhow;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::{chat::worker::Generator, sys::llm::Content};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatReply {
    message: ReplyMessage,
}

/// Generates replies with an Ollama server's `/api/chat`.
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaGenerator {
    pub fn new(
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        })
    }

    fn request_body<'a>(&'a self, prompts: &'a [Content]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: prompts
                .iter()
                .map(|c| ChatMessage {
                    role: c.role.as_ref(),
                    content: &c.message,
                })
                .collect(),
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        }
    }
}

impl Generator for OllamaGenerator {
    fn generate(&mut self, prompts: &[Content]) -> anyhow::Result<String> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(prompts))
            .send()
            .map_err(|e| anyhow!("ollama request to {url} failed: {e}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "ollama request failed with status: {}",
                response.status()
            ));
        }

        let body = response.text()?;
        let content = parse_reply(&body)?;
        log::debug!("ollama reply:\n{}", content);
        Ok(content)
    }
}

fn parse_reply(body: &str) -> anyhow::Result<String> {
    let reply: ChatReply =
        serde_json::from_str(body).map_err(|e| anyhow!("unexpected ollama reply: {e}"))?;
    Ok(reply.message.content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let generator =
            OllamaGenerator::new("http://localhost:11434/", "llama3.2", 0.5, Duration::from_secs(1))
                .unwrap();
        let prompts = [Content::system("be an npc"), Content::user("hi")];

        let body = serde_json::to_value(generator.request_body(&prompts)).unwrap();

        assert_eq!(generator.base_url, "http://localhost:11434");
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama3.2",
                "messages": [
                    {"role": "system", "content": "be an npc"},
                    {"role": "user", "content": "hi"},
                ],
                "stream": false,
                "options": {"temperature": 0.5},
            })
        );
    }

    #[test]
    fn reply_parsing() {
        let content = parse_reply(
            r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hello."},"done":true}"#,
        )
        .unwrap();
        assert_eq!(content, "Hello.");
    }

    #[test]
    fn malformed_reply_is_an_error() {
        let err = parse_reply(r#"{"error":"model 'nope' not found"}"#).unwrap_err();
        assert!(err.to_string().starts_with("unexpected ollama reply"));
    }
}
