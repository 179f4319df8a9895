use crate::clinical::DraftRequest;
use crate::config::{DraftingSettings, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use crate::error::Result;
use crate::llm::client::GeminiClient;
use crate::llm::types::Content;
use log::{error, info};

/// Sends one draft request to Gemini. No retry, no timeout.
pub struct ClinicalDrafter {
    model: String,
    temperature: f32,
    base_url: Option<String>,
}

impl Default for ClinicalDrafter {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: None,
        }
    }
}

impl ClinicalDrafter {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &DraftingSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            base_url: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn draft(&self, request: &DraftRequest) -> Result<String> {
        let mut client = GeminiClient::new(request.credential.clone());
        if let Some(base_url) = &self.base_url {
            client = client.with_base_url(base_url.clone());
        }

        info!("Requesting {} draft from {}", request.task, self.model);

        client
            .generate_text(
                &self.model,
                &request.system_prompt(),
                vec![Content::user_text(request.context.clone())],
                self.temperature,
            )
            .await
            .inspect_err(|e| error!("Gemini API Error: {}", e))
    }
}
