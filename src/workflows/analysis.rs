//! "Analyze a business" page.
//!
//! Driven by the local business id from navigation state: resolve it to a
//! place id, then request the full analysis. The analysis call is slow
//! and billed, so it runs once per identifier; an explicit re-trigger is
//! the only repeat path.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::AnalysisResult;
use crate::core::DashboardCore;
use crate::view_state::{ViewSlot, ViewState};

use super::resolve_for_page;

pub struct AnalysisPage {
    core: Arc<DashboardCore>,
    slot: ViewSlot<AnalysisResult>,
    current: Mutex<Option<String>>,
}

impl AnalysisPage {
    pub fn new(core: Arc<DashboardCore>) -> Self {
        Self {
            core,
            slot: ViewSlot::new("analysis"),
            current: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ViewState<AnalysisResult> {
        self.slot.snapshot()
    }

    /// Load for the given navigation id. A repeat call with the same id is
    /// a no-op so remounting never silently re-runs the analysis; use
    /// [`reload`] for an explicit re-trigger.
    ///
    /// [`reload`]: AnalysisPage::reload
    pub async fn load(&self, local_id: &str) {
        {
            let mut current = self.current.lock();
            if current.as_deref() == Some(local_id) && !self.slot.snapshot().is_idle() {
                return;
            }
            *current = Some(local_id.to_string());
        }
        self.run(local_id).await;
    }

    /// Explicit user-triggered re-analysis of the current business.
    pub async fn reload(&self) {
        let local_id = match self.current.lock().clone() {
            Some(id) => id,
            None => return,
        };
        self.run(&local_id).await;
    }

    async fn run(&self, local_id: &str) {
        let ticket = self.slot.begin();
        let Some(business) = resolve_for_page(&self.core, &self.slot, ticket, local_id).await
        else {
            return;
        };

        let result = self
            .core
            .api()
            .get_business(&business.external_place_id)
            .await;
        self.slot.complete(ticket, result);
    }
}
