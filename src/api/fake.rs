//! In-memory stand-in for the remote service, used across the
//! orchestration tests.
//!
//! Collections are plain mutex-held vectors the tests can reshape.
//! Failure switches make one operation family fail with a realistic
//! service error. Gates let a test park one specific request until it
//! says go, which is how the resolution-order tests are driven.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::types::*;
use super::RankApi;
use crate::core::DashboardCore;
use crate::error::CoreError;
use crate::nav::RecordingNavigator;
use crate::session::{MemoryCredentialStore, Session};

pub struct FakeRankApi {
    pub businesses: Mutex<Vec<BusinessRef>>,
    pub keywords: Mutex<Vec<KeywordTracking>>,
    pub reviews: Mutex<Vec<ReviewItem>>,
    pub history: Mutex<Vec<RankingPoint>>,

    pub fail_analysis: AtomicBool,
    pub fail_history: AtomicBool,
    pub fail_sentiment: AtomicBool,
    pub fail_keyword_mutations: AtomicBool,
    pub fail_remove_business: AtomicBool,
    pub fail_billing: AtomicBool,
    pub mangle_billing_redirect: AtomicBool,
    pub duplicate_business: AtomicBool,

    pub list_calls: AtomicUsize,
    pub analysis_calls: AtomicUsize,
    pub sentiment_calls: AtomicUsize,
    pub draft_calls: AtomicUsize,
    pub audit_calls: AtomicUsize,
    pub prediction_calls: AtomicUsize,
    pub checkout_calls: AtomicUsize,

    gates: Mutex<HashMap<String, Arc<Notify>>>,
    next_id: AtomicUsize,
}

impl FakeRankApi {
    /// A fake seeded with one tracked pizzeria, two reviews, and a short
    /// ranking history.
    pub fn new() -> Self {
        Self {
            businesses: Mutex::new(vec![BusinessRef {
                id: "local-1".to_string(),
                external_place_id: "place-abc".to_string(),
                name: "Mario's Pizzeria".to_string(),
                address: "12 Elm St".to_string(),
            }]),
            keywords: Mutex::new(Vec::new()),
            reviews: Mutex::new(vec![
                ReviewItem {
                    author_name: "Alice".to_string(),
                    rating: 5,
                    text: "Best crust in town".to_string(),
                    time_descriptor: "2 weeks ago".to_string(),
                },
                ReviewItem {
                    author_name: "Bob".to_string(),
                    rating: 2,
                    text: "Waited forty minutes".to_string(),
                    time_descriptor: "a month ago".to_string(),
                },
            ]),
            history: Mutex::new(vec![
                RankingPoint {
                    date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                    score: 64.0,
                    rank_position: 9,
                },
                RankingPoint {
                    date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                    score: 71.0,
                    rank_position: 6,
                },
            ]),
            fail_analysis: AtomicBool::new(false),
            fail_history: AtomicBool::new(false),
            fail_sentiment: AtomicBool::new(false),
            fail_keyword_mutations: AtomicBool::new(false),
            fail_remove_business: AtomicBool::new(false),
            fail_billing: AtomicBool::new(false),
            mangle_billing_redirect: AtomicBool::new(false),
            duplicate_business: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            analysis_calls: AtomicUsize::new(0),
            sentiment_calls: AtomicUsize::new(0),
            draft_calls: AtomicUsize::new(0),
            audit_calls: AtomicUsize::new(0),
            prediction_calls: AtomicUsize::new(0),
            checkout_calls: AtomicUsize::new(0),
            gates: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
        }
    }

    /// Park the next request matching `key` until the returned handle is
    /// notified. Keys: `"businesses"` (the business list), place id
    /// (analysis), review text (sentiment), author name (draft),
    /// `term/scenario` (prediction), plan id (checkout).
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert(key.to_string(), notify.clone());
        notify
    }

    async fn wait_if_gated(&self, key: &str) {
        let gate = self.gates.lock().remove(key);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn service_error(status: u16, message: &str) -> CoreError {
        CoreError::Service {
            status,
            message: message.to_string(),
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for FakeRankApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RankApi for FakeRankApi {
    async fn list_businesses(&self) -> Result<Vec<BusinessRef>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_gated("businesses").await;
        Ok(self.businesses.lock().clone())
    }

    async fn add_business(
        &self,
        place_id: &str,
        name: &str,
        address: &str,
    ) -> Result<BusinessRef, CoreError> {
        if self.duplicate_business.load(Ordering::SeqCst) {
            return Err(Self::service_error(400, "Business already exists"));
        }
        let business = BusinessRef {
            id: self.fresh_id("local"),
            external_place_id: place_id.to_string(),
            name: name.to_string(),
            address: address.to_string(),
        };
        self.businesses.lock().push(business.clone());
        Ok(business)
    }

    async fn remove_business(&self, business_id: &str) -> Result<(), CoreError> {
        if self.fail_remove_business.load(Ordering::SeqCst) {
            return Err(Self::service_error(500, "Could not remove business"));
        }
        self.businesses.lock().retain(|b| b.id != business_id);
        Ok(())
    }

    async fn get_business(&self, place_id: &str) -> Result<AnalysisResult, CoreError> {
        self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_gated(place_id).await;
        if self.fail_analysis.load(Ordering::SeqCst) {
            return Err(Self::service_error(503, "Analysis engine unavailable"));
        }
        Ok(AnalysisResult {
            score: 71.0,
            metrics: [("visibility".to_string(), 54.0)].into_iter().collect(),
            recommendations: vec!["Add photos".to_string()],
            competitors: vec![
                CompetitorSnapshot {
                    name: "Luigi's Pizza".to_string(),
                    score: 84.5,
                    rank_position: Some(1),
                },
                CompetitorSnapshot {
                    name: "Slice House".to_string(),
                    score: 55.0,
                    rank_position: Some(7),
                },
            ],
            premium: None,
        })
    }

    async fn list_keywords(&self, _business_id: &str) -> Result<Vec<KeywordTracking>, CoreError> {
        Ok(self.keywords.lock().clone())
    }

    async fn add_keyword(
        &self,
        _business_id: &str,
        term: &str,
        location: &str,
    ) -> Result<KeywordTracking, CoreError> {
        if self.fail_keyword_mutations.load(Ordering::SeqCst) {
            return Err(Self::service_error(422, "Keyword limit reached"));
        }
        let keyword = KeywordTracking {
            id: self.fresh_id("kw"),
            term: term.to_string(),
            location: location.to_string(),
        };
        self.keywords.lock().push(keyword.clone());
        Ok(keyword)
    }

    async fn delete_keyword(&self, _business_id: &str, keyword_id: &str) -> Result<(), CoreError> {
        if self.fail_keyword_mutations.load(Ordering::SeqCst) {
            return Err(Self::service_error(500, "Could not delete keyword"));
        }
        let mut keywords = self.keywords.lock();
        let before = keywords.len();
        keywords.retain(|k| k.id != keyword_id);
        if keywords.len() == before {
            return Err(Self::service_error(404, "Keyword not found"));
        }
        Ok(())
    }

    async fn ranking_history(&self, _business_id: &str) -> Result<Vec<RankingPoint>, CoreError> {
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(Self::service_error(500, "Ranking history unavailable"));
        }
        Ok(self.history.lock().clone())
    }

    async fn get_reviews(&self, _place_id: &str) -> Result<Vec<ReviewItem>, CoreError> {
        Ok(self.reviews.lock().clone())
    }

    async fn generate_reply_draft(
        &self,
        review: &ReviewItem,
        tone: Tone,
    ) -> Result<ReplyDraft, CoreError> {
        self.draft_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_gated(&review.author_name).await;
        Ok(ReplyDraft {
            draft_text: format!("Reply to {} ({:?})", review.author_name, tone),
        })
    }

    async fn analyze_sentiment(&self, review_text: &str) -> Result<SentimentScore, CoreError> {
        self.sentiment_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_gated(review_text).await;
        if self.fail_sentiment.load(Ordering::SeqCst) {
            return Err(Self::service_error(503, "Sentiment model unavailable"));
        }
        Ok(SentimentScore {
            sentiment: Sentiment::Positive,
            confidence: 0.92,
        })
    }

    async fn run_seo_audit(&self, _business_id: &str) -> Result<SeoAudit, CoreError> {
        self.audit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SeoAudit {
            overall_score: 67.0,
            recommendations: vec!["Fill out business hours".to_string()],
        })
    }

    async fn generate_description(
        &self,
        category: &str,
        location: &str,
        _keywords: &[String],
        _tone: Tone,
    ) -> Result<GeneratedDescription, CoreError> {
        Ok(GeneratedDescription {
            description: format!("A {} in {}", category, location),
        })
    }

    async fn run_prediction(
        &self,
        _business_id: &str,
        keyword: &str,
        scenario: Scenario,
    ) -> Result<Prediction, CoreError> {
        self.prediction_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_gated(&format!("{}/{:?}", keyword, scenario)).await;
        let predicted_score = match scenario {
            Scenario::Baseline => 71.0,
            Scenario::ReviewBoost => 78.5,
            Scenario::ListingOptimized => 76.0,
            Scenario::ContentRefresh => 74.0,
        };
        Ok(Prediction {
            predicted_score,
            improvement_factor: predicted_score / 71.0,
        })
    }

    async fn checkout(&self, plan_id: &str) -> Result<CheckoutSession, CoreError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_if_gated(plan_id).await;
        if self.fail_billing.load(Ordering::SeqCst) {
            return Err(Self::service_error(502, "Billing provider unreachable"));
        }
        if self.mangle_billing_redirect.load(Ordering::SeqCst) {
            return Ok(CheckoutSession {
                redirect_url: "not a link".to_string(),
            });
        }
        Ok(CheckoutSession {
            redirect_url: format!("https://billing.example/checkout/{}", plan_id),
        })
    }

    async fn open_billing_portal(&self) -> Result<CheckoutSession, CoreError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_billing.load(Ordering::SeqCst) {
            return Err(Self::service_error(502, "Billing provider unreachable"));
        }
        Ok(CheckoutSession {
            redirect_url: "https://billing.example/portal".to_string(),
        })
    }
}

/// Wait until a fake call counter reaches `at_least`, so a test knows a
/// gated request is parked inside the fake before it proceeds.
pub async fn wait_for_calls(counter: &AtomicUsize, at_least: usize) {
    for _ in 0..500 {
        if counter.load(Ordering::SeqCst) >= at_least {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    panic!("request never reached the fake");
}

/// A dashboard core wired to a fresh fake and a recording navigator.
pub fn test_core() -> (Arc<DashboardCore>, Arc<FakeRankApi>, Arc<RecordingNavigator>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let api = Arc::new(FakeRankApi::new());
    let nav = Arc::new(RecordingNavigator::new());
    let session = Arc::new(Session::new(
        Box::new(MemoryCredentialStore::with_token("tok-test")),
        nav.clone(),
    ));
    let core = Arc::new(DashboardCore::new(api.clone(), session, nav.clone()));
    (core, api, nav)
}
