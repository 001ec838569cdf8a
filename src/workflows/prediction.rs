//! Ranking prediction simulator.
//!
//! Simulates "what happens to my score if ..." for one tracked keyword
//! and scenario at a time. The tracked keyword list is the source of
//! truth for selectable targets: a keyword that is not on it is rejected
//! before any network call. Results are cached per (keyword, scenario)
//! within the business, so flipping between scenarios the user already
//! ran is instant and unbilled.

use std::sync::Arc;

use crate::api::{Prediction, Scenario};
use crate::core::DashboardCore;
use crate::error::CoreError;
use crate::view_state::{ViewSlot, ViewState};

use super::keywords::KeywordsPage;

pub struct PredictionPanel {
    core: Arc<DashboardCore>,
    keywords: Arc<KeywordsPage>,
    slot: ViewSlot<Prediction>,
}

impl PredictionPanel {
    /// The panel shares the keyword page's tracked list; both sit on the
    /// rank-tracker page.
    pub fn new(core: Arc<DashboardCore>, keywords: Arc<KeywordsPage>) -> Self {
        Self {
            core,
            keywords,
            slot: ViewSlot::new("prediction"),
        }
    }

    pub fn state(&self) -> ViewState<Prediction> {
        self.slot.snapshot()
    }

    /// Clear the displayed result (target re-selection).
    pub fn reset(&self) {
        self.slot.reset();
    }

    /// Run one simulation. Rapid re-triggers keep only the latest result.
    pub async fn simulate(&self, keyword: &str, scenario: Scenario) {
        let Some(business_id) = self.keywords.business_id() else {
            self.slot.reject(CoreError::Validation(
                "Load a business before running a simulation.".to_string(),
            ));
            return;
        };

        // Client-side gate: only tracked keywords are valid targets.
        if !self.keywords.tracked().iter().any(|k| k.term == keyword) {
            self.slot.reject(CoreError::Validation(format!(
                "\"{}\" is not a tracked keyword.",
                keyword
            )));
            return;
        }

        let ticket = self.slot.begin();
        let scope = self.core.prediction_cache().scope(&business_id);
        let api = self.core.api();
        let key = (keyword.to_string(), scenario);
        let result = scope
            .get_or_compute(key, || api.run_prediction(&business_id, keyword, scenario))
            .await;
        self.slot.complete(ticket, result);
    }
}
