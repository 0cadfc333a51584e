use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::profile::Tier;
use crate::tone::WARNING_SIGIL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponderProvider {
    HuggingFace,
    Ollama,
}

impl std::fmt::Display for ResponderProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponderProvider::HuggingFace => write!(f, "huggingface"),
            ResponderProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for ResponderProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(ResponderProvider::HuggingFace),
            "ollama" => Ok(ResponderProvider::Ollama),
            _ => Err(anyhow!("Unknown responder provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub provider: ResponderProvider,
    pub model: String,
    pub api_token: Option<String>,
    pub base_url: Option<String>,
    pub max_new_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        ResponderConfig {
            provider: ResponderProvider::HuggingFace,
            model: "microsoft/DialoGPT-medium".to_string(),
            api_token: None,
            base_url: None,
            max_new_tokens: Some(100),
            temperature: Some(0.7),
        }
    }
}

/// Client for the external text-generation backends. The engine never calls
/// this; the caller invokes it between scoring and tone adaptation.
pub struct ResponderClient {
    config: ResponderConfig,
    http_client: reqwest::Client,
}

impl ResponderClient {
    pub fn new(config: ResponderConfig) -> Self {
        ResponderClient {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Generates a reply for the prompt. Failures never surface as errors:
    /// they come back as a reply string carrying the warning sigil, which the
    /// tone adapter passes through untouched.
    pub async fn generate(&self, prompt: &str) -> String {
        let result = match self.config.provider {
            ResponderProvider::HuggingFace => self.generate_huggingface(prompt).await,
            ResponderProvider::Ollama => self.generate_ollama(prompt).await,
        };

        match result {
            Ok(reply) => reply,
            Err(e) => format!("{} {}", WARNING_SIGIL, e),
        }
    }

    async fn generate_huggingface(&self, prompt: &str) -> Result<String> {
        let api_token = self
            .config
            .api_token
            .as_ref()
            .ok_or_else(|| anyhow!("Hugging Face token missing (set HF_TOKEN)"))?;

        let default_base = "https://api-inference.huggingface.co/models".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_base);

        let request_body = serde_json::json!({
            "inputs": prompt,
            "parameters": {
                "max_new_tokens": self.config.max_new_tokens,
                "temperature": self.config.temperature,
                "do_sample": true,
                "return_full_text": false
            }
        });

        let url = format!("{}/{}", base_url.trim_end_matches('/'), self.config.model);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_token))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Hugging Face API error ({}): {}", status, error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json
            .get(0)
            .and_then(|entry| entry.get("generated_text"))
            .and_then(|text| text.as_str())
            .ok_or_else(|| anyhow!("Invalid Hugging Face response format"))?;

        Ok(content.trim().to_string())
    }

    async fn generate_ollama(&self, prompt: &str) -> Result<String> {
        let default_base = "http://localhost:11434".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_base);

        let request_body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false
        });

        let url = format!("{}/api/generate", base_url);
        let response = self.http_client.post(&url).json(&request_body).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Ollama API error: {}", error_text));
        }

        let response_json: serde_json::Value = response.json().await?;
        let content = response_json["response"]
            .as_str()
            .ok_or_else(|| anyhow!("Invalid Ollama response format"))?;

        Ok(content.trim().to_string())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

/// Offline fallback used when no AI provider is requested: canned replies
/// keyed on rough message intent and the current tier.
pub fn canned_reply(input: &str, tier: Tier) -> String {
    let lower = input.to_lowercase();

    if ["bonjour", "salut", "hello", "coucou"]
        .iter()
        .any(|greeting| lower.contains(greeting))
    {
        return match tier {
            Tier::Formal => "Comment puis-je vous aider aujourd'hui ?",
            Tier::Friendly | Tier::Familiar => "Comment ça va ? Quoi de neuf ?",
            Tier::Close | Tier::Intimate => {
                "Hey ! Content de te revoir ! Comment tu te sens aujourd'hui ?"
            }
        }
        .to_string();
    }

    if ["triste", "déprimé", "mal", "difficile"]
        .iter()
        .any(|word| lower.contains(word))
    {
        return match tier {
            Tier::Formal | Tier::Friendly => {
                "Je suis désolé d'apprendre que vous traversez une période difficile."
            }
            Tier::Familiar => {
                "Oh non, ça me fait de la peine de savoir que tu ne vas pas bien. Tu veux en parler ?"
            }
            Tier::Close | Tier::Intimate => {
                "Mon cœur se serre de te voir comme ça... Je suis là pour toi. Dis-moi tout."
            }
        }
        .to_string();
    }

    if ["heureux", "content", "joie", "super", "génial"]
        .iter()
        .any(|word| lower.contains(word))
    {
        return match tier {
            Tier::Formal | Tier::Friendly => {
                "C'est merveilleux d'entendre que tout va bien pour vous !"
            }
            Tier::Familiar => "Ça me fait plaisir de te voir si heureux ! Raconte-moi !",
            Tier::Close | Tier::Intimate => {
                "Ton bonheur fait chaud au cœur ! J'adore te voir rayonner comme ça !"
            }
        }
        .to_string();
    }

    if lower.contains("merci") || lower.contains("remercie") {
        return match tier {
            Tier::Formal | Tier::Friendly => {
                "Je vous en prie, c'est avec plaisir que je vous aide."
            }
            Tier::Familiar => "De rien ! C'est normal, on est là pour s'entraider !",
            Tier::Close | Tier::Intimate => {
                "Ça me touche que tu me remercies... Notre amitié compte tellement pour moi !"
            }
        }
        .to_string();
    }

    match tier {
        Tier::Formal => "C'est intéressant ce que vous me dites. Pouvez-vous m'en dire davantage ?",
        Tier::Friendly | Tier::Familiar => "Ah je vois ! Dis-moi en plus, ça m'intéresse.",
        Tier::Close | Tier::Intimate => {
            "J'écoute avec attention... Continue, tu sais que je suis toujours là pour toi."
        }
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert!(matches!(
            "huggingface".parse::<ResponderProvider>().unwrap(),
            ResponderProvider::HuggingFace
        ));
        assert!(matches!(
            "hf".parse::<ResponderProvider>().unwrap(),
            ResponderProvider::HuggingFace
        ));
        assert!(matches!(
            "Ollama".parse::<ResponderProvider>().unwrap(),
            ResponderProvider::Ollama
        ));
        assert!("mistral".parse::<ResponderProvider>().is_err());
    }

    #[test]
    fn test_canned_reply_follows_tier_register() {
        let formal = canned_reply("Bonjour", Tier::Formal);
        assert!(formal.contains("vous"));

        let intimate = canned_reply("Bonjour", Tier::Intimate);
        assert!(intimate.contains("tu"));
    }

    #[test]
    fn test_canned_reply_covers_intents() {
        assert!(canned_reply("je suis triste", Tier::Familiar).contains("peine"));
        assert!(canned_reply("merci beaucoup", Tier::Formal).contains("prie"));
        assert!(canned_reply("c'est génial", Tier::Close).contains("bonheur"));
        assert!(!canned_reply("hmm", Tier::Friendly).is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_yields_warning_reply() {
        let client = ResponderClient::new(ResponderConfig::default());
        let reply = client.generate("Bonjour").await;
        assert!(reply.starts_with(WARNING_SIGIL));
    }
}
