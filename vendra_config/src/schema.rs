use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    pub model: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub gemini: GeminiConfig,
    pub qdrant: QdrantConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QdrantConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "RetrievalConfig::default_product_collection")]
    pub product_collection: String,
    #[serde(default = "RetrievalConfig::default_faq_collection")]
    pub faq_collection: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            product_collection: Self::default_product_collection(),
            faq_collection: Self::default_faq_collection(),
        }
    }
}

impl RetrievalConfig {
    fn default_product_collection() -> String {
        "products".to_string()
    }

    fn default_faq_collection() -> String {
        "faq".to_string()
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("vendra");

        let config_path = config_dir.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'vendra init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("vendra");

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "agents": {
    "defaults": {
      "model": "gemini-2.5-flash-lite"
    }
  },
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here"
    },
    "qdrant": {
      "url": "http://localhost:6333"
    }
  },
  "retrieval": {
    "product_collection": "products",
    "faq_collection": "faq"
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Gemini API key");
        println!("   2. Ensure Qdrant is running at the specified URL");
        println!("   3. Run 'vendra chat' to start a conversation");
        println!();
        Ok(())
    }
}
