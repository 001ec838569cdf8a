//! HTTP implementation of [`RankApi`] against the ranking service.
//!
//! One `reqwest::Client` per instance, bearer token attached per request
//! from the session. Requests are sent exactly once — analysis and AI
//! endpoints are billed, so no transport-level retry loop lives here.
//! Credential rejections (401/403) trigger the session's one-shot
//! invalidation before the error is returned.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::types::{
    AnalysisResult, BusinessRef, CheckoutSession, GeneratedDescription, KeywordTracking,
    Prediction, RankingPoint, ReplyDraft, ReviewItem, Scenario, SentimentScore, SeoAudit, Tone,
};
use super::RankApi;
use crate::config::AppConfig;
use crate::error::CoreError;
use crate::session::Session;

pub struct HttpRankApi {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl HttpRankApi {
    pub fn new(config: &AppConfig, session: Arc<Session>) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        // Url::join drops the last path segment unless the base ends in a
        // slash, so normalize before any endpoint is built.
        let mut base = config.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| CoreError::Validation(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CoreError> {
        self.base_url
            .join(path)
            .map_err(|e| CoreError::Validation(format!("Invalid API path {path:?}: {e}")))
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, CoreError> {
        Ok(self.client.get(self.endpoint(path)?))
    }

    fn post(&self, path: &str, body: serde_json::Value) -> Result<RequestBuilder, CoreError> {
        Ok(self.client.post(self.endpoint(path)?).json(&body))
    }

    fn delete(&self, path: &str) -> Result<RequestBuilder, CoreError> {
        Ok(self.client.delete(self.endpoint(path)?))
    }

    /// Send one request with the current bearer token and decode the JSON
    /// body. Exactly one attempt; callers decide whether a failure is
    /// worth re-triggering.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CoreError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send one request where only the status matters (deletes).
    async fn execute_empty(&self, request: RequestBuilder) -> Result<(), CoreError> {
        self.send(request).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, CoreError> {
        let token = self.session.bearer()?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.session.auth_failed();
            return Err(CoreError::Auth);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(service_error(status.as_u16(), &body));
        }
        Ok(response)
    }
}

/// Error payload shape the service uses. Older deployments send only
/// `detail`; newer ones add a machine `code`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Map a non-success response onto the error taxonomy. Conflict status or
/// a `duplicate` code collapses to [`CoreError::Duplicate`]; otherwise the
/// service's own `detail` text is carried verbatim so the UI shows what
/// the backend said.
fn service_error(status: u16, body: &str) -> CoreError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|p| p.code.as_deref());

    if status == 409 || code == Some("duplicate") {
        return CoreError::Duplicate;
    }

    let message = parsed
        .and_then(|p| p.detail)
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("The ranking service returned status {status}"));
    CoreError::Service { status, message }
}

#[async_trait]
impl RankApi for HttpRankApi {
    async fn list_businesses(&self) -> Result<Vec<BusinessRef>, CoreError> {
        self.execute(self.get("businesses")?).await
    }

    async fn add_business(
        &self,
        place_id: &str,
        name: &str,
        address: &str,
    ) -> Result<BusinessRef, CoreError> {
        let body = json!({
            "placeId": place_id,
            "name": name,
            "address": address,
        });
        self.execute(self.post("businesses", body)?).await
    }

    async fn remove_business(&self, business_id: &str) -> Result<(), CoreError> {
        self.execute_empty(self.delete(&format!("businesses/{business_id}"))?)
            .await
    }

    async fn get_business(&self, place_id: &str) -> Result<AnalysisResult, CoreError> {
        self.execute(self.get(&format!("places/{place_id}/analysis"))?)
            .await
    }

    async fn list_keywords(&self, business_id: &str) -> Result<Vec<KeywordTracking>, CoreError> {
        self.execute(self.get(&format!("businesses/{business_id}/keywords"))?)
            .await
    }

    async fn add_keyword(
        &self,
        business_id: &str,
        term: &str,
        location: &str,
    ) -> Result<KeywordTracking, CoreError> {
        let body = json!({
            "term": term,
            "location": location,
        });
        self.execute(self.post(&format!("businesses/{business_id}/keywords"), body)?)
            .await
    }

    async fn delete_keyword(
        &self,
        business_id: &str,
        keyword_id: &str,
    ) -> Result<(), CoreError> {
        self.execute_empty(
            self.delete(&format!("businesses/{business_id}/keywords/{keyword_id}"))?,
        )
        .await
    }

    async fn ranking_history(&self, business_id: &str) -> Result<Vec<RankingPoint>, CoreError> {
        self.execute(self.get(&format!("businesses/{business_id}/rankings"))?)
            .await
    }

    async fn get_reviews(&self, place_id: &str) -> Result<Vec<ReviewItem>, CoreError> {
        self.execute(self.get(&format!("places/{place_id}/reviews"))?)
            .await
    }

    async fn generate_reply_draft(
        &self,
        review: &ReviewItem,
        tone: Tone,
    ) -> Result<ReplyDraft, CoreError> {
        let body = json!({
            "reviewText": review.text,
            "rating": review.rating,
            "authorName": review.author_name,
            "tone": tone,
        });
        self.execute(self.post("ai/reply-draft", body)?).await
    }

    async fn analyze_sentiment(&self, review_text: &str) -> Result<SentimentScore, CoreError> {
        let body = json!({ "reviewText": review_text });
        self.execute(self.post("ai/sentiment", body)?).await
    }

    async fn run_seo_audit(&self, business_id: &str) -> Result<SeoAudit, CoreError> {
        self.execute(self.post(&format!("businesses/{business_id}/audit"), json!({}))?)
            .await
    }

    async fn generate_description(
        &self,
        category: &str,
        location: &str,
        keywords: &[String],
        tone: Tone,
    ) -> Result<GeneratedDescription, CoreError> {
        let body = json!({
            "category": category,
            "location": location,
            "keywords": keywords,
            "tone": tone,
        });
        self.execute(self.post("ai/description", body)?).await
    }

    async fn run_prediction(
        &self,
        business_id: &str,
        keyword: &str,
        scenario: Scenario,
    ) -> Result<Prediction, CoreError> {
        let body = json!({
            "keyword": keyword,
            "scenario": scenario,
        });
        self.execute(self.post(&format!("businesses/{business_id}/predictions"), body)?)
            .await
    }

    async fn checkout(&self, plan_id: &str) -> Result<CheckoutSession, CoreError> {
        let body = json!({ "planId": plan_id });
        self.execute(self.post("billing/checkout", body)?).await
    }

    async fn open_billing_portal(&self) -> Result<CheckoutSession, CoreError> {
        self.execute(self.post("billing/portal", json!({}))?).await
    }
}
