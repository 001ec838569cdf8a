//! Navigation seam between the core and the shell.
//!
//! The core decides *that* a redirect happens (auth failure, resolver
//! fallback, billing checkout); the shell decides how. Workflows hold a
//! `dyn Navigator` and never touch routing directly.

use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Destination {
    /// Sign-in screen. Issued by the session layer on credential failure.
    SignIn,
    /// The business-list overview, the safe fallback for missing entities.
    Dashboard,
    /// Full-page redirect to a service-provided URL (checkout, portal).
    External(String),
}

pub trait Navigator: Send + Sync {
    fn go(&self, destination: Destination);
}

/// Navigator that records every redirect instead of performing one.
///
/// Used by headless embedding and throughout the test suite to assert
/// redirect counts (the auth policy promises exactly one sign-in redirect
/// per invalidation).
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<Destination> {
        self.visits.lock().clone()
    }

    pub fn count(&self, destination: &Destination) -> usize {
        self.visits
            .lock()
            .iter()
            .filter(|d| *d == destination)
            .count()
    }
}

impl Navigator for RecordingNavigator {
    fn go(&self, destination: Destination) {
        log::debug!("navigate: {:?}", destination);
        self.visits.lock().push(destination);
    }
}
