//! Page and panel controllers.
//!
//! One module per user workflow. A controller owns its view slots and
//! borrows shared services (API, caches, navigator) from
//! [`DashboardCore`]. All follow the same shape: resolve the business
//! from the navigation id, run the dependent fetches, publish slot
//! transitions. A failure in one panel never touches another panel's
//! state.
//!
//! [`DashboardCore`]: crate::core::DashboardCore

pub mod analysis;
pub mod audit;
pub mod benchmark;
pub mod consultant;
pub mod keywords;
pub mod prediction;
pub mod reviews;

use crate::api::BusinessRef;
use crate::core::DashboardCore;
use crate::nav::Destination;
use crate::resolver;
use crate::view_state::{Ticket, ViewSlot};

/// Resolve the navigation id for a page load.
///
/// `NotFound` means the business is gone: the page is sent back to the
/// dashboard (exactly once, and only if this load is still the page's
/// latest) and the slot returns to Idle so a fresh mount starts over.
/// Any other failure lands in the slot as a rendered error. Returns
/// `None` whenever the caller must bail out without downstream calls.
pub(crate) async fn resolve_for_page<T: Clone>(
    core: &DashboardCore,
    slot: &ViewSlot<T>,
    ticket: Ticket,
    local_id: &str,
) -> Option<BusinessRef> {
    match resolver::resolve_business(core.api().as_ref(), local_id).await {
        Ok(business) => Some(business),
        Err(err) if err.redirects_to_fallback() => {
            if slot.reset_if(ticket) {
                log::warn!("business {} not found, falling back to dashboard", local_id);
                core.nav().go(Destination::Dashboard);
            }
            None
        }
        Err(err) => {
            slot.complete(ticket, Err(err));
            None
        }
    }
}
