//! Wire types for the RankScope ranking service.
//!
//! Field names match the service's JSON (camelCase). Optional remote
//! fields default instead of failing the whole payload — the service adds
//! fields between dashboard releases.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Externally-assigned identifier for a business location. Keys every
/// analysis/review call; distinct from the local dashboard id.
pub type PlaceId = String;

/// A business the account tracks. Created on track, destroyed on untrack,
/// read-only in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRef {
    pub id: String,
    #[serde(alias = "placeId")]
    pub external_place_id: PlaceId,
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// Full analysis for one place. Ephemeral: recomputed on every analyze
/// request, never persisted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall visibility score, 0–100.
    pub score: f64,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<CompetitorSnapshot>,
    /// Present only on paid plans.
    #[serde(default)]
    pub premium: Option<PremiumInsights>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSnapshot {
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub rank_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumInsights {
    #[serde(default)]
    pub visibility_percent: Option<f64>,
    #[serde(default)]
    pub action_plan: Vec<String>,
}

/// One customer review. Identified by its index in the fetched list —
/// the service exposes no stable review id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub author_name: String,
    pub rating: u8,
    pub text: String,
    /// Human-readable recency, e.g. "2 weeks ago".
    #[serde(default)]
    pub time_descriptor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentScore {
    pub sentiment: Sentiment,
    /// Model confidence, 0–1.
    pub confidence: f64,
}

/// Requested voice for AI-generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Friendly,
    Apologetic,
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Professional
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDraft {
    pub draft_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordTracking {
    pub id: String,
    pub term: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingPoint {
    pub date: NaiveDate,
    pub score: f64,
    pub rank_position: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAudit {
    pub overall_score: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDescription {
    pub description: String,
}

/// What-if input for the ranking simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Baseline,
    ReviewBoost,
    ListingOptimized,
    ContentRefresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub predicted_score: f64,
    pub improvement_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub redirect_url: String,
}
