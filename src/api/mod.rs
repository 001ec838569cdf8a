//! Remote ranking service interface.
//!
//! The dashboard treats the service as an opaque capability behind one
//! dyn-compatible trait: resolution, analysis, reviews, AI text, billing.
//! Production wires in [`http::HttpRankApi`]; tests swap in fakes. Every
//! implementation must funnel credential rejections through the session
//! policy so the sign-out behavior stays uniform across operations.

#[cfg(test)]
pub mod fake;
pub mod http;
pub mod types;

pub use http::HttpRankApi;
pub use types::*;

use async_trait::async_trait;

use crate::error::CoreError;

#[async_trait]
pub trait RankApi: Send + Sync {
    /// The caller's tracked businesses.
    async fn list_businesses(&self) -> Result<Vec<BusinessRef>, CoreError>;

    /// Start tracking a place. Duplicate conflicts surface as
    /// `CoreError::Duplicate` (or the legacy message the dispatcher maps).
    async fn add_business(
        &self,
        place_id: &str,
        name: &str,
        address: &str,
    ) -> Result<BusinessRef, CoreError>;

    async fn remove_business(&self, business_id: &str) -> Result<(), CoreError>;

    /// Full analysis for a place. Slow and billed — never call without an
    /// explicit user trigger or a page load that needs it.
    async fn get_business(&self, place_id: &str) -> Result<AnalysisResult, CoreError>;

    async fn list_keywords(&self, business_id: &str) -> Result<Vec<KeywordTracking>, CoreError>;

    async fn add_keyword(
        &self,
        business_id: &str,
        term: &str,
        location: &str,
    ) -> Result<KeywordTracking, CoreError>;

    async fn delete_keyword(&self, business_id: &str, keyword_id: &str)
        -> Result<(), CoreError>;

    async fn ranking_history(&self, business_id: &str) -> Result<Vec<RankingPoint>, CoreError>;

    async fn get_reviews(&self, place_id: &str) -> Result<Vec<ReviewItem>, CoreError>;

    async fn generate_reply_draft(
        &self,
        review: &ReviewItem,
        tone: Tone,
    ) -> Result<ReplyDraft, CoreError>;

    async fn analyze_sentiment(&self, review_text: &str) -> Result<SentimentScore, CoreError>;

    async fn run_seo_audit(&self, business_id: &str) -> Result<SeoAudit, CoreError>;

    async fn generate_description(
        &self,
        category: &str,
        location: &str,
        keywords: &[String],
        tone: Tone,
    ) -> Result<GeneratedDescription, CoreError>;

    async fn run_prediction(
        &self,
        business_id: &str,
        keyword: &str,
        scenario: Scenario,
    ) -> Result<Prediction, CoreError>;

    async fn checkout(&self, plan_id: &str) -> Result<CheckoutSession, CoreError>;

    async fn open_billing_portal(&self) -> Result<CheckoutSession, CoreError>;
}
