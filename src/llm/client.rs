use crate::error::{BluFinanceError, Result};
use crate::llm::types::*;
use reqwest::{Client, StatusCode};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn generate_text(
        &self,
        model: &str,
        system_prompt: &str,
        contents: Vec<Content>,
        temperature: f32,
    ) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::user_text(system_prompt)),
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: "text/plain".to_string(),
            },
        };

        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await?;
            return Err(classify_failure(status, err_text));
        }

        let body: GenerateContentResponse = res.json().await?;

        body.text().ok_or_else(|| {
            BluFinanceError::DraftingFailed("Model returned no text candidates".to_string())
        })
    }
}

/// Maps a non-success response to a credential or generic drafting error.
pub(crate) fn classify_failure(status: StatusCode, body: String) -> BluFinanceError {
    let mentions_key = body.contains("API_KEY_INVALID")
        || body.to_lowercase().contains("api key");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BluFinanceError::InvalidCredential(body),
        StatusCode::BAD_REQUEST if mentions_key => BluFinanceError::InvalidCredential(body),
        _ => BluFinanceError::DraftingFailed(format!(
            "Gemini API Error (status {}): {}",
            status, body
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_is_a_credential_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, body.to_string()),
            BluFinanceError::InvalidCredential(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "denied".to_string()),
            BluFinanceError::InvalidCredential(_)
        ));
    }

    #[test]
    fn test_unauthorized_is_a_credential_error_without_key_text() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "".to_string()),
            BluFinanceError::InvalidCredential(_)
        ));
    }

    #[test]
    fn test_other_failures_are_drafting_errors() {
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "bad contents".to_string()),
            BluFinanceError::DraftingFailed(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops".to_string()),
            BluFinanceError::DraftingFailed(msg) if msg.contains("500")
        ));
    }

    #[test]
    fn test_base_url_override() {
        let client = GeminiClient::new("k".to_string()).with_base_url("http://localhost:9/");
        assert_eq!(client.base_url(), "http://localhost:9");
    }
}
