//! SEO audit panel.
//!
//! One widget slot. The audit is an expensive remote computation, so
//! nothing here runs it implicitly: `run` is wired to the panel's button
//! and re-running it is the only recompute path. Rapid re-triggers keep
//! only the latest result.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::SeoAudit;
use crate::core::DashboardCore;
use crate::view_state::{ViewSlot, ViewState};

pub struct AuditPanel {
    core: Arc<DashboardCore>,
    slot: ViewSlot<SeoAudit>,
    business_id: Mutex<Option<String>>,
}

impl AuditPanel {
    pub fn new(core: Arc<DashboardCore>) -> Self {
        Self {
            core,
            slot: ViewSlot::new("seo-audit"),
            business_id: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ViewState<SeoAudit> {
        self.slot.snapshot()
    }

    /// Point the panel at a business. Clears any previous audit so a
    /// stale report is never shown against a new target.
    pub fn set_business(&self, business_id: &str) {
        let mut current = self.business_id.lock();
        if current.as_deref() == Some(business_id) {
            return;
        }
        *current = Some(business_id.to_string());
        self.slot.reset();
    }

    /// Run the audit. Explicit trigger only.
    pub async fn run(&self) {
        let Some(business_id) = self.business_id.lock().clone() else {
            log::debug!("audit ignored: no business selected");
            return;
        };

        let ticket = self.slot.begin();
        let result = self.core.api().run_seo_audit(&business_id).await;
        self.slot.complete(ticket, result);
    }
}
