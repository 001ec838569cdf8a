//! Review management page.
//!
//! The review list is index-keyed: a review has no stable external id, so
//! every sentiment score and reply draft is cached against its position
//! in the current list. Publishing a refetched list therefore swaps the
//! cache scopes and per-review widget states in the same critical
//! section, so an index from the old list can never alias a value onto
//! the new one.
//!
//! The draft composer is a single slot: one review at a time may hold an
//! in-flight or displayed draft, and selecting a new review resets it.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::api::{PlaceId, ReplyDraft, ReviewItem, SentimentScore, Tone};
use crate::core::DashboardCore;
use crate::view_state::{ViewSlot, ViewState};

use super::resolve_for_page;

pub struct ReviewsPage {
    core: Arc<DashboardCore>,
    current: Mutex<Option<String>>,
    place_id: Mutex<Option<PlaceId>>,
    reviews: ViewSlot<Vec<ReviewItem>>,
    sentiments: DashMap<usize, Arc<ViewSlot<SentimentScore>>>,
    draft: ViewSlot<ReplyDraft>,
    selected: Mutex<Option<usize>>,
    tone: Mutex<Tone>,
}

impl ReviewsPage {
    pub fn new(core: Arc<DashboardCore>) -> Self {
        Self {
            core,
            current: Mutex::new(None),
            place_id: Mutex::new(None),
            reviews: ViewSlot::new("reviews"),
            sentiments: DashMap::new(),
            draft: ViewSlot::new("reply-draft"),
            selected: Mutex::new(None),
            tone: Mutex::new(Tone::default()),
        }
    }

    pub fn reviews_state(&self) -> ViewState<Vec<ReviewItem>> {
        self.reviews.snapshot()
    }

    pub fn draft_state(&self) -> ViewState<ReplyDraft> {
        self.draft.snapshot()
    }

    pub fn selected(&self) -> Option<usize> {
        *self.selected.lock()
    }

    pub fn tone(&self) -> Tone {
        *self.tone.lock()
    }

    /// Widget state of one review's sentiment badge.
    pub fn sentiment_state(&self, index: usize) -> ViewState<SentimentScore> {
        self.sentiments
            .get(&index)
            .map(|slot| slot.snapshot())
            .unwrap_or(ViewState::Idle)
    }

    pub async fn load(&self, local_id: &str) {
        {
            let mut current = self.current.lock();
            if current.as_deref() == Some(local_id) && !self.reviews.snapshot().is_idle() {
                return;
            }
            *current = Some(local_id.to_string());
        }
        self.run(local_id).await;
    }

    /// Explicit refetch of the current business's reviews.
    pub async fn reload(&self) {
        let local_id = match self.current.lock().clone() {
            Some(id) => id,
            None => return,
        };
        self.run(&local_id).await;
    }

    async fn run(&self, local_id: &str) {
        let ticket = self.reviews.begin();
        let Some(business) = resolve_for_page(&self.core, &self.reviews, ticket, local_id).await
        else {
            return;
        };
        let owner = business.external_place_id.clone();

        match self.core.api().get_reviews(&owner).await {
            Ok(list) => {
                // Swap the owner key, cache scopes, and widget states in
                // lockstep with the list publish: old indices must be dead
                // before the new list is observable, and a superseded load
                // cannot repoint the caches at the old business.
                self.reviews.complete_with(ticket, Ok(list), || {
                    *self.place_id.lock() = Some(owner.clone());
                    self.core.sentiment_cache().refresh(&owner);
                    self.core.draft_cache().refresh(&owner);
                    self.sentiments.clear();
                    self.draft.reset();
                    *self.selected.lock() = None;
                });
            }
            Err(err) => {
                self.reviews.complete_with(ticket, Err(err), || {
                    *self.place_id.lock() = Some(owner.clone());
                });
            }
        }
    }

    /// Pick the review the draft composer works on. Resets any displayed
    /// or in-flight draft; the tone selection survives.
    pub fn select_review(&self, index: usize) {
        let valid = matches!(
            self.reviews.snapshot(),
            ViewState::Ready { ref data } if index < data.len()
        );
        if !valid {
            log::debug!("select_review ignored: index {} out of range", index);
            return;
        }
        *self.selected.lock() = Some(index);
        self.draft.reset();
    }

    pub fn set_tone(&self, tone: Tone) {
        *self.tone.lock() = tone;
    }

    /// Sentiment for one review, through the cache: repeat lookups for
    /// the same index reuse the stored score, and concurrent lookups
    /// share one in-flight request.
    pub async fn lookup_sentiment(&self, index: usize) {
        let Some((review, owner)) = self.review_context(index) else {
            return;
        };
        let slot = self
            .sentiments
            .entry(index)
            .or_insert_with(|| Arc::new(ViewSlot::new("sentiment")))
            .value()
            .clone();
        if slot.snapshot().is_ready() {
            return;
        }

        let ticket = slot.begin();
        let scope = self.core.sentiment_cache().scope(&owner);
        let api = self.core.api();
        let result = scope
            .get_or_compute(index, || api.analyze_sentiment(&review.text))
            .await;
        slot.complete(ticket, result);
    }

    /// Generate a reply draft for the selected review in the selected
    /// tone. A cached draft for that review and tone is reused; rapid
    /// re-triggers keep only the latest result.
    pub async fn generate_draft(&self) {
        let Some(index) = self.selected() else {
            log::debug!("generate_draft ignored: no review selected");
            return;
        };
        let Some((review, owner)) = self.review_context(index) else {
            return;
        };
        let tone = self.tone();

        let ticket = self.draft.begin();
        let scope = self.core.draft_cache().scope(&owner);
        let api = self.core.api();
        let result = scope
            .get_or_compute((index, tone), || api.generate_reply_draft(&review, tone))
            .await;
        self.draft.complete(ticket, result);
    }

    /// Regenerate, bypassing the cached draft. The stored draft is
    /// overwritten only when the new request succeeds.
    pub async fn regenerate_draft(&self) {
        let Some(index) = self.selected() else {
            log::debug!("regenerate_draft ignored: no review selected");
            return;
        };
        let Some((review, owner)) = self.review_context(index) else {
            return;
        };
        let tone = self.tone();

        let ticket = self.draft.begin();
        let result = self.core.api().generate_reply_draft(&review, tone).await;
        if let Ok(draft) = &result {
            self.core
                .draft_cache()
                .scope(&owner)
                .insert((index, tone), draft.clone());
        }
        self.draft.complete(ticket, result);
    }

    /// The review at `index` in the Ready list plus the cache owner key.
    fn review_context(&self, index: usize) -> Option<(ReviewItem, PlaceId)> {
        let owner = self.place_id.lock().clone()?;
        match self.reviews.snapshot() {
            ViewState::Ready { data } => data.get(index).cloned().map(|review| (review, owner)),
            _ => None,
        }
    }
}
