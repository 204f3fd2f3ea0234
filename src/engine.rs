//! Analysis engine gateway
//!
//! HTTP client for the external analysis engine plus the gateway that owns
//! the failure-to-default contract: any transport failure, non-success
//! status, or malformed response becomes the canonical degraded
//! [`AnalysisResult`]. The degraded result is a first-class, well-formed
//! value - downstream stages must treat it identically to a genuine
//! low-confidence result.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::metrics;

// =============================================================================
// ENGINE RESPONSE TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Raw extraction block in the engine response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    /// Detected mood label; empty string means none detected
    #[serde(default)]
    pub mood: String,
    /// Confidence for the mood detection, when the engine scores it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_confidence: Option<f32>,
    #[serde(default)]
    pub todos: Vec<ExtractedTodo>,
    #[serde(default)]
    pub media: Vec<ExtractedMedia>,
    #[serde(default)]
    pub habits: Vec<ExtractedHabit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTodo {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMedia {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedHabit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Parsed analysis engine response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub insights: String,
    #[serde(default)]
    pub extracted: ExtractedFields,
}

impl AnalysisResult {
    /// The canonical degraded result returned when the engine is slow,
    /// rate-limited, unavailable, or talking nonsense.
    pub fn degraded() -> Self {
        Self {
            summary: "Could not analyze entry.".to_string(),
            sentiment: Sentiment::Neutral,
            keywords: Vec::new(),
            suggestions: Vec::new(),
            insights: "No insights available.".to_string(),
            extracted: ExtractedFields::default(),
        }
    }
}

// =============================================================================
// ANALYSIS REQUEST
// =============================================================================

/// Analysis request forwarded to the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub content: String,
    #[serde(default)]
    pub mood: Option<crate::domain::MoodLevel>,
    #[serde(default)]
    pub energy: Option<crate::domain::EnergyLevel>,
    #[serde(default)]
    pub activities: Vec<String>,
}

// =============================================================================
// ENGINE HTTP CLIENT
// =============================================================================

/// Thin HTTP client for the analysis engine
///
/// One bounded round trip per call; the caller's own bearer credential is
/// forwarded, never a service-level token.
pub struct EngineClient {
    base_url: String,
    client: reqwest::Client,
}

impl EngineClient {
    pub fn new(config: &ServerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.engine_timeout)
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.engine_url.clone(),
            client,
        }
    }

    /// POST a payload to an engine endpoint and parse the JSON response
    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        bearer: &str,
        body: &B,
    ) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("User-Agent", "reverie-journal")
            .json(body)
            .send()
            .await
            .context("Failed to send request to analysis engine")?;

        if !response.status().is_success() {
            let status = response.status();
            anyhow::bail!("Analysis engine error: {status}");
        }

        response
            .json()
            .await
            .context("Failed to parse analysis engine response")
    }

    pub async fn analyze(&self, bearer: &str, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        self.post_json("/v1/analyze", bearer, request).await
    }

    pub async fn prompt(
        &self,
        bearer: &str,
        request: &serde_json::Value,
    ) -> Result<PromptReply> {
        self.post_json("/v1/prompt", bearer, request).await
    }
}

/// Engine reply for prompt generation
#[derive(Debug, Clone, Deserialize)]
pub struct PromptReply {
    pub prompt: String,
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Gateway owning validation and the failure-to-default contract
pub struct AnalysisGateway {
    engine: EngineClient,
}

impl AnalysisGateway {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            engine: EngineClient::new(config),
        }
    }

    /// Analyze entry text, degrading to the canonical default on any
    /// upstream failure.
    ///
    /// Empty content is the one hard error here: it is rejected before any
    /// network call is attempted.
    pub async fn analyze(&self, bearer: &str, request: &AnalyzeRequest) -> Result<AnalysisResult> {
        if request.content.trim().is_empty() {
            return Err(anyhow!("content is required"));
        }

        match self.engine.analyze(bearer, request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::warn!(error = %e, "Analysis engine call failed, returning degraded result");
                metrics::ANALYSIS_DEGRADED_TOTAL.inc();
                Ok(AnalysisResult::degraded())
            }
        }
    }

    /// Raw prompt call; fallback handling lives in the prompt generator.
    pub async fn prompt_raw(
        &self,
        bearer: &str,
        payload: &serde_json::Value,
    ) -> Result<PromptReply> {
        self.engine.prompt(bearer, payload).await
    }
}
