//! AI consultant page: business description generator.
//!
//! Resolves the business first so the form can prefill location and show
//! who it is writing for, then generates descriptions on explicit
//! triggers only. Single slot; regenerating simply runs the same
//! explicit trigger again, and rapid triggers keep only the latest text.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::{BusinessRef, GeneratedDescription, Tone};
use crate::core::DashboardCore;
use crate::error::CoreError;
use crate::view_state::{ViewSlot, ViewState};

use super::resolve_for_page;

pub struct ConsultantPage {
    core: Arc<DashboardCore>,
    context: ViewSlot<BusinessRef>,
    description: ViewSlot<GeneratedDescription>,
    current: Mutex<Option<String>>,
}

impl ConsultantPage {
    pub fn new(core: Arc<DashboardCore>) -> Self {
        Self {
            core,
            context: ViewSlot::new("consultant-context"),
            description: ViewSlot::new("description"),
            current: Mutex::new(None),
        }
    }

    /// The resolved business the form is writing for.
    pub fn context_state(&self) -> ViewState<BusinessRef> {
        self.context.snapshot()
    }

    pub fn description_state(&self) -> ViewState<GeneratedDescription> {
        self.description.snapshot()
    }

    /// Suggested location input, taken from the business address.
    pub fn default_location(&self) -> Option<String> {
        match self.context.snapshot() {
            ViewState::Ready { data } => Some(data.address),
            _ => None,
        }
    }

    pub async fn load(&self, local_id: &str) {
        {
            let mut current = self.current.lock();
            if current.as_deref() == Some(local_id) && !self.context.snapshot().is_idle() {
                return;
            }
            *current = Some(local_id.to_string());
        }

        let ticket = self.context.begin();
        let Some(business) = resolve_for_page(&self.core, &self.context, ticket, local_id).await
        else {
            return;
        };
        self.context.complete_with(ticket, Ok(business), || {
            // New business, new blank composer.
            self.description.reset();
        });
    }

    /// Generate a description from the form inputs. Explicit trigger; a
    /// repeat click regenerates.
    pub async fn generate(&self, category: &str, location: &str, keywords: &[String], tone: Tone) {
        let category = category.trim();
        let location = location.trim();
        if category.is_empty() || location.is_empty() {
            self.description.reject(CoreError::Validation(
                "Category and location are both required.".to_string(),
            ));
            return;
        }

        let ticket = self.description.begin();
        let result = self
            .core
            .api()
            .generate_description(category, location, keywords, tone)
            .await;
        self.description.complete(ticket, result);
    }
}
