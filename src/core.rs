//! Shared wiring for every dashboard page.
//!
//! One `DashboardCore` is constructed at startup and handed to each
//! workflow. It owns the remote client, the session, the navigator, the
//! per-item AI result caches shared across panels, and the tracked
//! business list itself. Everything else is owned by its workflow.

use std::sync::Arc;

use crate::actions::{ActionFlag, BillingFlow};
use crate::api::{BusinessRef, Prediction, RankApi, ReplyDraft, Scenario, SentimentScore, Tone};
use crate::cache::RequestCache;
use crate::error::Notice;
use crate::nav::Navigator;
use crate::session::Session;
use crate::view_state::{ViewSlot, ViewState};

/// Cache key for one reply draft: review index in the current list plus
/// the requested tone.
pub type DraftKey = (usize, Tone);

/// Cache key for one simulation: keyword term plus scenario.
pub type PredictionKey = (String, Scenario);

pub struct DashboardCore {
    api: Arc<dyn RankApi>,
    session: Arc<Session>,
    nav: Arc<dyn Navigator>,
    billing: BillingFlow,
    sentiment_cache: RequestCache<usize, SentimentScore>,
    draft_cache: RequestCache<DraftKey, ReplyDraft>,
    prediction_cache: RequestCache<PredictionKey, Prediction>,
    businesses: ViewSlot<Vec<BusinessRef>>,
    business_flag: ActionFlag,
}

impl DashboardCore {
    pub fn new(api: Arc<dyn RankApi>, session: Arc<Session>, nav: Arc<dyn Navigator>) -> Self {
        Self {
            billing: BillingFlow::new(api.clone(), nav.clone()),
            api,
            session,
            nav,
            sentiment_cache: RequestCache::new(),
            draft_cache: RequestCache::new(),
            prediction_cache: RequestCache::new(),
            businesses: ViewSlot::new("businesses"),
            business_flag: ActionFlag::new(),
        }
    }

    pub fn api(&self) -> &Arc<dyn RankApi> {
        &self.api
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn nav(&self) -> &Arc<dyn Navigator> {
        &self.nav
    }

    pub fn billing(&self) -> &BillingFlow {
        &self.billing
    }

    /// Sentiment results, scoped per business and review-list generation.
    pub fn sentiment_cache(&self) -> &RequestCache<usize, SentimentScore> {
        &self.sentiment_cache
    }

    /// Reply drafts, scoped like the sentiment cache.
    pub fn draft_cache(&self) -> &RequestCache<DraftKey, ReplyDraft> {
        &self.draft_cache
    }

    /// Simulation results, scoped per business.
    pub fn prediction_cache(&self) -> &RequestCache<PredictionKey, Prediction> {
        &self.prediction_cache
    }

    // ------------------------------------------------------------------
    // Tracked business list (dashboard page)
    // ------------------------------------------------------------------

    pub fn businesses(&self) -> ViewState<Vec<BusinessRef>> {
        self.businesses.snapshot()
    }

    pub async fn load_businesses(&self) {
        let ticket = self.businesses.begin();
        let result = self.api.list_businesses().await;
        self.businesses.complete(ticket, result);
    }

    /// Start tracking a place. A duplicate conflict is soft-success: the
    /// business is already on the backend list, so the action proceeds as
    /// done with an informational notice.
    pub async fn track_business(
        &self,
        place_id: &str,
        name: &str,
        address: &str,
    ) -> Option<Notice> {
        if place_id.trim().is_empty() || name.trim().is_empty() {
            return Some(Notice::error("Pick a business from the search results first."));
        }
        if !self.business_flag.try_begin() {
            log::debug!("track ignored: business mutation already in progress");
            return None;
        }

        let result = self.api.add_business(place_id, name, address).await;
        self.business_flag.finish();

        match result {
            Ok(business) => {
                let notice = Notice::success(format!("Now tracking {}.", business.name));
                if !self.businesses.update_ready(|list| list.push(business.clone())) {
                    self.businesses.publish(vec![business]);
                }
                Some(notice)
            }
            Err(err) if err.is_duplicate() => {
                Some(Notice::info("This business is already being tracked."))
            }
            Err(err) => {
                log::warn!("track business failed: {}", err);
                Some(Notice::from(&err))
            }
        }
    }

    /// Stop tracking a business. Failure leaves the local list unchanged.
    pub async fn untrack_business(&self, business_id: &str) -> Option<Notice> {
        if !self.business_flag.try_begin() {
            log::debug!("untrack ignored: business mutation already in progress");
            return None;
        }

        let result = self.api.remove_business(business_id).await;
        self.business_flag.finish();

        match result {
            Ok(()) => {
                self.businesses
                    .update_ready(|list| list.retain(|b| b.id != business_id));
                Some(Notice::success("Stopped tracking."))
            }
            Err(err) => {
                log::warn!("untrack business failed: {}", err);
                Some(Notice::from(&err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use crate::api::fake::test_core;
    use crate::error::NoticeLevel;

    #[tokio::test]
    async fn test_load_businesses_fills_the_dashboard_list() {
        let (core, _api, _nav) = test_core();

        core.load_businesses().await;

        let state = core.businesses();
        let list = state.ready_data().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Mario's Pizzeria");
    }

    #[tokio::test]
    async fn test_track_business_appends_after_confirmation() {
        let (core, _api, _nav) = test_core();
        core.load_businesses().await;

        let notice = core
            .track_business("place-xyz", "Corner Bakery", "48 Oak Ave")
            .await
            .unwrap();

        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.message, "Now tracking Corner Bakery.");
        let state = core.businesses();
        assert_eq!(state.ready_data().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_track_duplicate_is_reported_as_already_tracked() {
        let (core, api, _nav) = test_core();
        core.load_businesses().await;
        api.duplicate_business.store(true, Ordering::SeqCst);

        let notice = core
            .track_business("place-abc", "Mario's Pizzeria", "12 Elm St")
            .await
            .unwrap();

        assert_eq!(notice.level, NoticeLevel::Info);
        assert_eq!(notice.message, "This business is already being tracked.");
        let state = core.businesses();
        assert_eq!(state.ready_data().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_track_requires_a_selected_place() {
        let (core, api, _nav) = test_core();

        let notice = core.track_business("", "", "").await.unwrap();

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(api.businesses.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_untrack_failure_leaves_the_list_unchanged() {
        let (core, api, _nav) = test_core();
        core.load_businesses().await;
        api.fail_remove_business.store(true, Ordering::SeqCst);

        let notice = core.untrack_business("local-1").await.unwrap();

        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Could not remove business");
        let state = core.businesses();
        assert_eq!(state.ready_data().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_untrack_removes_after_confirmation() {
        let (core, _api, _nav) = test_core();
        core.load_businesses().await;

        let notice = core.untrack_business("local-1").await.unwrap();

        assert_eq!(notice.level, NoticeLevel::Success);
        let state = core.businesses();
        assert_eq!(state.ready_data().map(Vec::len), Some(0));
    }
}
