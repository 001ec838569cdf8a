//! Action dispatch plumbing for user-triggered mutations.
//!
//! Mutating controls (add keyword, run audit, start checkout) share two
//! behaviors: an in-progress guard so a double click never fires twice,
//! and a user-facing notice on completion. Workflow modules own the
//! mutations themselves; this module owns the shared pieces plus the
//! billing flow, whose only job is to fetch a redirect URL and hand it to
//! the navigator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use url::Url;

use crate::api::{CheckoutSession, RankApi};
use crate::error::{CoreError, Notice};
use crate::nav::{Destination, Navigator};

/// In-progress guard for one mutating control. Re-entrant triggers are
/// rejected while an action is pending.
#[derive(Default)]
pub struct ActionFlag {
    busy: AtomicBool,
}

impl ActionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag. False when an action is already in progress.
    pub fn try_begin(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn finish(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

/// Checkout and billing-portal actions. Both end in a full-page redirect
/// to a service-provided URL, so on success the in-progress flag stays
/// set; the page is navigating away. Failure releases the flag and
/// surfaces a notice. No retry.
pub struct BillingFlow {
    api: Arc<dyn RankApi>,
    nav: Arc<dyn Navigator>,
    flag: ActionFlag,
}

impl BillingFlow {
    pub fn new(api: Arc<dyn RankApi>, nav: Arc<dyn Navigator>) -> Self {
        Self {
            api,
            nav,
            flag: ActionFlag::new(),
        }
    }

    pub fn in_progress(&self) -> bool {
        self.flag.is_busy()
    }

    /// Start a checkout for `plan_id`. Returns the error notice on
    /// failure; `None` means the redirect was issued (or the trigger was
    /// dropped because a billing action is already in progress).
    pub async fn checkout(&self, plan_id: &str) -> Option<Notice> {
        if !self.flag.try_begin() {
            log::debug!("checkout ignored: billing action already in progress");
            return None;
        }
        let result = self.api.checkout(plan_id).await;
        self.follow_redirect(result, "checkout")
    }

    /// Open the hosted billing portal. Same contract as [`checkout`].
    ///
    /// [`checkout`]: BillingFlow::checkout
    pub async fn open_portal(&self) -> Option<Notice> {
        if !self.flag.try_begin() {
            log::debug!("portal open ignored: billing action already in progress");
            return None;
        }
        let result = self.api.open_billing_portal().await;
        self.follow_redirect(result, "billing portal")
    }

    /// Hand the redirect to the navigator, but only for a well-formed
    /// URL; a mangled one from the service is a failure, not a page load.
    fn follow_redirect(
        &self,
        result: Result<CheckoutSession, CoreError>,
        action: &str,
    ) -> Option<Notice> {
        match result {
            Ok(session) => match Url::parse(&session.redirect_url) {
                Ok(_) => {
                    self.nav.go(Destination::External(session.redirect_url));
                    None
                }
                Err(e) => {
                    log::warn!(
                        "{} returned an unusable redirect {:?}: {}",
                        action,
                        session.redirect_url,
                        e
                    );
                    self.flag.finish();
                    Some(Notice::error("The billing service returned an invalid link."))
                }
            },
            Err(err) => {
                log::warn!("{} failed: {}", action, err);
                self.flag.finish();
                Some(Notice::from(&err))
            }
        }
    }
}
