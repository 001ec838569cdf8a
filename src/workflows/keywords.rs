//! Keyword tracking page.
//!
//! Once the business is resolved, the tracked keyword list (required) and
//! the ranking history (optional chart) load concurrently in separate
//! slots, so a history failure degrades only its own panel. The tracked
//! list is the source of truth for the prediction simulator's targets.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::actions::ActionFlag;
use crate::api::{KeywordTracking, RankingPoint};
use crate::core::DashboardCore;
use crate::error::Notice;
use crate::view_state::{ViewSlot, ViewState};

use super::resolve_for_page;

pub struct KeywordsPage {
    core: Arc<DashboardCore>,
    business_id: Mutex<Option<String>>,
    keywords: ViewSlot<Vec<KeywordTracking>>,
    history: ViewSlot<Vec<RankingPoint>>,
    current: Mutex<Option<String>>,
    mutation_flag: ActionFlag,
}

impl KeywordsPage {
    pub fn new(core: Arc<DashboardCore>) -> Self {
        Self {
            core,
            business_id: Mutex::new(None),
            keywords: ViewSlot::new("keywords"),
            history: ViewSlot::new("keyword-history"),
            current: Mutex::new(None),
            mutation_flag: ActionFlag::new(),
        }
    }

    pub fn keywords_state(&self) -> ViewState<Vec<KeywordTracking>> {
        self.keywords.snapshot()
    }

    pub fn history_state(&self) -> ViewState<Vec<RankingPoint>> {
        self.history.snapshot()
    }

    /// The backend id of the loaded business, once resolved.
    pub fn business_id(&self) -> Option<String> {
        self.business_id.lock().clone()
    }

    /// Currently tracked keywords, empty until the list is Ready.
    pub fn tracked(&self) -> Vec<KeywordTracking> {
        match self.keywords.snapshot() {
            ViewState::Ready { data } => data,
            _ => Vec::new(),
        }
    }

    pub async fn load(&self, local_id: &str) {
        {
            let mut current = self.current.lock();
            if current.as_deref() == Some(local_id) && !self.keywords.snapshot().is_idle() {
                return;
            }
            *current = Some(local_id.to_string());
        }

        // Both tickets are minted before the first await, so a newer load
        // supersedes this one's list and chart together. Mutations are
        // blocked until the new list publishes.
        let keywords_ticket = self.keywords.begin();
        let history_ticket = self.history.begin();
        *self.business_id.lock() = None;

        let Some(business) =
            resolve_for_page(&self.core, &self.keywords, keywords_ticket, local_id).await
        else {
            self.history.reset_if(history_ticket);
            return;
        };

        let api = self.core.api();
        let (keywords, history) = tokio::join!(
            api.list_keywords(&business.id),
            api.ranking_history(&business.id),
        );

        // The mutation target flips in lockstep with the list it serves;
        // a superseded load cannot repoint it.
        self.keywords.complete_with(keywords_ticket, keywords, || {
            *self.business_id.lock() = Some(business.id.clone());
        });
        if let Err(err) = &history {
            log::warn!("keyword history degraded: {}", err);
        }
        self.history.complete(history_ticket, history);
    }

    /// Track a new keyword. The local list is updated only after the
    /// service confirms; failures leave it unchanged.
    pub async fn add_keyword(&self, term: &str, location: &str) -> Option<Notice> {
        let term = term.trim();
        let location = location.trim();
        if term.is_empty() || location.is_empty() {
            return Some(Notice::error("Keyword and location are both required."));
        }
        let Some(business_id) = self.business_id() else {
            return Some(Notice::error("Load a business before adding keywords."));
        };
        if !self.mutation_flag.try_begin() {
            log::debug!("add keyword ignored: keyword mutation already in progress");
            return None;
        }

        let result = self.core.api().add_keyword(&business_id, term, location).await;
        self.mutation_flag.finish();

        match result {
            Ok(keyword) => {
                let notice = Notice::success(format!("Tracking \"{}\".", keyword.term));
                if !self.keywords.update_ready(|list| list.push(keyword.clone())) {
                    self.keywords.publish(vec![keyword]);
                }
                Some(notice)
            }
            Err(err) => {
                log::warn!("add keyword failed: {}", err);
                Some(Notice::from(&err))
            }
        }
    }

    /// Stop tracking a keyword by id. Failure leaves the list unchanged.
    pub async fn delete_keyword(&self, keyword_id: &str) -> Option<Notice> {
        let Some(business_id) = self.business_id() else {
            return Some(Notice::error("Load a business before removing keywords."));
        };
        if !self.mutation_flag.try_begin() {
            log::debug!("delete keyword ignored: keyword mutation already in progress");
            return None;
        }

        let result = self.core.api().delete_keyword(&business_id, keyword_id).await;
        self.mutation_flag.finish();

        match result {
            Ok(()) => {
                self.keywords
                    .update_ready(|list| list.retain(|k| k.id != keyword_id));
                Some(Notice::success("Keyword removed."))
            }
            Err(err) => {
                log::warn!("delete keyword failed: {}", err);
                Some(Notice::from(&err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::NaiveDate;

    use super::*;
    use crate::api::fake::{test_core, wait_for_calls};
    use crate::error::NoticeLevel;

    #[tokio::test]
    async fn test_load_fills_both_panels() {
        let (core, _api, _nav) = test_core();
        let page = KeywordsPage::new(core);

        page.load("local-1").await;

        assert_eq!(page.business_id().as_deref(), Some("local-1"));
        assert!(page.keywords_state().is_ready());
        let history = page.history_state();
        assert_eq!(history.ready_data().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_history_failure_degrades_only_the_chart() {
        let (core, api, _nav) = test_core();
        api.fail_history.store(true, Ordering::SeqCst);
        let page = KeywordsPage::new(core);

        page.load("local-1").await;

        assert!(page.keywords_state().is_ready());
        let state = page.history_state();
        let notice = state.failure().expect("chart should fail");
        assert_eq!(notice.message, "Ranking history unavailable");
    }

    #[tokio::test]
    async fn test_superseded_load_cannot_repoint_the_page() {
        let (core, api, _nav) = test_core();
        api.businesses.lock().push(crate::api::BusinessRef {
            id: "local-2".to_string(),
            external_place_id: "place-def".to_string(),
            name: "Corner Bakery".to_string(),
            address: "48 Oak Ave".to_string(),
        });
        let page = Arc::new(KeywordsPage::new(core));

        // Park the first load inside business resolution.
        let gate = api.gate("businesses");
        let stale = tokio::spawn({
            let page = page.clone();
            async move { page.load("local-1").await }
        });
        wait_for_calls(&api.list_calls, 1).await;

        // The second business loads to completion with its own history.
        *api.history.lock() = vec![RankingPoint {
            date: NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
            score: 80.0,
            rank_position: 3,
        }];
        page.load("local-2").await;

        // Reshape what the parked load will fetch, then release it.
        *api.history.lock() = vec![RankingPoint {
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            score: 12.0,
            rank_position: 40,
        }];
        gate.notify_one();
        stale.await.unwrap();

        // The superseded load may neither repoint mutations at the old
        // business nor publish its history over the newer page's.
        assert_eq!(page.business_id().as_deref(), Some("local-2"));
        let history = page.history_state();
        let points = history.ready_data().expect("history should stay ready");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].score, 80.0);
    }

    #[tokio::test]
    async fn test_add_and_delete_keyword() {
        let (core, _api, _nav) = test_core();
        let page = KeywordsPage::new(core);
        page.load("local-1").await;

        let notice = page.add_keyword("best pizza", "Austin").await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        let tracked = page.tracked();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].term, "best pizza");

        let id = tracked[0].id.clone();
        let notice = page.delete_keyword(&id).await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(page.tracked().is_empty());
    }

    #[tokio::test]
    async fn test_add_keyword_failure_leaves_list_unchanged() {
        let (core, api, _nav) = test_core();
        let page = KeywordsPage::new(core);
        page.load("local-1").await;
        page.add_keyword("best pizza", "Austin").await;

        api.fail_keyword_mutations.store(true, Ordering::SeqCst);
        let notice = page.add_keyword("late night slice", "Austin").await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Keyword limit reached");
        assert_eq!(page.tracked().len(), 1);
    }

    #[tokio::test]
    async fn test_add_keyword_requires_both_inputs() {
        let (core, api, _nav) = test_core();
        let page = KeywordsPage::new(core);
        page.load("local-1").await;

        let notice = page.add_keyword("  ", "Austin").await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        let notice = page.add_keyword("best pizza", "").await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(page.tracked().is_empty());

        // Validation does not hold the mutation flag.
        assert!(page.add_keyword("best pizza", "Austin").await.is_some());
        assert_eq!(api.keywords.lock().len(), 1);
    }
}
