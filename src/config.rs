use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::responder::{ResponderConfig, ResponderProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub default_provider: String,
    pub providers: HashMap<String, ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub default_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("aicompanion")
        });

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = data_dir.join("config.json");

        if config_path.exists() {
            let config_str =
                std::fs::read_to_string(&config_path).context("Failed to read config.json")?;

            match serde_json::from_str::<Config>(&config_str) {
                Ok(mut config) => {
                    config.data_dir = data_dir;
                    // Tokens left empty in the file fall back to the environment
                    if let Some(hf) = config.providers.get_mut("huggingface") {
                        if hf.api_token.as_ref().map_or(true, |token| token.is_empty()) {
                            hf.api_token = std::env::var("HF_TOKEN").ok();
                        }
                    }
                    return Ok(config);
                }
                Err(e) => {
                    eprintln!("Failed to parse existing config.json: {}", e);
                    eprintln!("Recreating default configuration...");
                }
            }
        }

        let config = Self::default_config(data_dir);
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join("config.json");
        let json_str = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, json_str).context("Failed to write config.json")?;
        Ok(())
    }

    fn default_config(data_dir: PathBuf) -> Self {
        let mut providers = HashMap::new();

        providers.insert(
            "huggingface".to_string(),
            ProviderConfig {
                default_model: "microsoft/DialoGPT-medium".to_string(),
                host: None,
                api_token: std::env::var("HF_TOKEN").ok(),
            },
        );

        providers.insert(
            "ollama".to_string(),
            ProviderConfig {
                default_model: "llama2".to_string(),
                host: Some("http://localhost:11434".to_string()),
                api_token: None,
            },
        );

        Config {
            data_dir,
            default_provider: "huggingface".to_string(),
            providers,
        }
    }

    pub fn get_provider(&self, provider_name: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider_name)
    }

    pub fn responder_config(
        &self,
        provider: Option<String>,
        model: Option<String>,
    ) -> Result<ResponderConfig> {
        let provider_name = provider.as_deref().unwrap_or(&self.default_provider);
        let provider_config = self
            .get_provider(provider_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown provider: {}", provider_name))?;

        let responder_provider: ResponderProvider = provider_name.parse()?;
        let model_name = model.unwrap_or_else(|| provider_config.default_model.clone());

        Ok(ResponderConfig {
            provider: responder_provider,
            model: model_name,
            api_token: provider_config.api_token.clone(),
            base_url: provider_config.host.clone(),
            max_new_tokens: Some(100),
            temperature: Some(0.7),
        })
    }

    pub fn profiles_file(&self) -> PathBuf {
        self.data_dir.join("profiles.json")
    }
}
