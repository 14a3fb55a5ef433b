use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{
    RecommendationError, RecommendationOutcome, RecommendationRequest, RecommendationResponse,
};

/// Client for the symptom-to-specialty recommendation service.
/// POST {base}/get_recommendation with `{"problem": ...}`.
#[derive(Debug)]
pub struct RecommendationClient {
    client: Client,
    base_url: String,
    fallback_specialty: String,
}

impl RecommendationClient {
    pub fn new(config: &AppConfig) -> Result<Self, RecommendationError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.recommendation_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RecommendationError::Network(e.to_string()))?;

        let base_url = config.recommendation_service_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RecommendationError::InvalidUrl(base_url));
        }

        Ok(Self {
            client,
            base_url,
            fallback_specialty: config.recommendation_fallback_specialty.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/get_recommendation", self.base_url)
    }

    /// Asks the service which specialty fits `problem`.
    ///
    /// A well-formed answer without suggestions resolves to the configured
    /// fallback. The first suggestion is used as given, even when blank. Transport errors, non-2xx statuses and bodies that are not
    /// `{"doctors": [string, ...]}` are errors.
    pub async fn recommend(&self, problem: &str) -> Result<RecommendationOutcome, RecommendationError> {
        let url = self.endpoint();
        debug!("Requesting recommendation from {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&RecommendationRequest {
                problem: problem.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("Recommendation service failed: {} - {}", status, response_text);
            return Err(RecommendationError::Status {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let outcome = self.parse_outcome(&response_text)?;
        info!("Recommendation resolved: {:?}", outcome);
        Ok(outcome)
    }

    fn parse_outcome(&self, body: &str) -> Result<RecommendationOutcome, RecommendationError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| RecommendationError::MalformedResponse(e.to_string()))?;

        if !value.is_object() {
            return Err(RecommendationError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                value
            )));
        }

        let parsed: RecommendationResponse = serde_json::from_value(value)
            .map_err(|e| RecommendationError::MalformedResponse(e.to_string()))?;

        let first = parsed
            .doctors
            .unwrap_or_default()
            .into_iter()
            .next();

        Ok(match first {
            Some(specialty) => RecommendationOutcome::Suggested(specialty),
            None => RecommendationOutcome::Fallback(self.fallback_specialty.clone()),
        })
    }
}
