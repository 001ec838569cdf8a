//! Async view state for pages and widgets.
//!
//! Every independently loading unit (a page body, the audit panel, one
//! review's draft composer) owns a [`ViewSlot`]. The state is a tagged
//! union, so "loading with an error showing" is unrepresentable, and the
//! slot carries a generation counter so a late result from a superseded
//! request or a torn-down widget can never overwrite newer state.

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{CoreError, Notice};

/// Render state the shell consumes. Serialized with a `status` tag
/// (`{"status":"ready","data":...}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewState<T> {
    Idle,
    Pending,
    Ready { data: T },
    Failed { error: Notice },
}

impl<T> ViewState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, ViewState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ViewState::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewState::Failed { .. })
    }

    pub fn ready_data(&self) -> Option<&T> {
        match self {
            ViewState::Ready { data } => Some(data),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Notice> {
        match self {
            ViewState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Idle
    }
}

/// Generation token handed out by [`ViewSlot::begin`]. A completion is
/// applied only while its ticket is still the slot's latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

struct SlotInner<T> {
    generation: u64,
    state: ViewState<T>,
}

/// One widget's state cell. Interior-mutable so workflows can share it
/// behind `Arc` with the shell's render loop.
pub struct ViewSlot<T> {
    label: &'static str,
    inner: Mutex<SlotInner<T>>,
}

impl<T: Clone> ViewSlot<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            inner: Mutex::new(SlotInner {
                generation: 0,
                state: ViewState::Idle,
            }),
        }
    }

    /// Start a new load: supersede any in-flight request and show Pending.
    pub fn begin(&self) -> Ticket {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = ViewState::Pending;
        Ticket {
            generation: inner.generation,
        }
    }

    /// Return to Idle and supersede any in-flight request. Used when the
    /// widget's target changes or the widget is torn down.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = ViewState::Idle;
    }

    /// As [`reset`], but only while `ticket` is still the latest. Used
    /// when a load ends in a redirect instead of a rendered state, so a
    /// superseded load cannot blank out its successor.
    ///
    /// [`reset`]: ViewSlot::reset
    pub fn reset_if(&self, ticket: Ticket) -> bool {
        let mut inner = self.inner.lock();
        if ticket.generation != inner.generation {
            return false;
        }
        inner.generation += 1;
        inner.state = ViewState::Idle;
        true
    }

    /// Apply a finished request. No-op (returning false) when the ticket
    /// has been superseded by a newer `begin`/`reset` — last request wins.
    pub fn complete(&self, ticket: Ticket, result: Result<T, CoreError>) -> bool {
        self.complete_with(ticket, result, || {})
    }

    /// As [`complete`], running `on_apply` under the slot lock just before
    /// the new state is stored. Lets a caller swap cache scopes in
    /// lockstep with publishing the list they index, so a superseded load
    /// can neither publish nor clear anything. `on_apply` must not block.
    ///
    /// [`complete`]: ViewSlot::complete
    pub fn complete_with(
        &self,
        ticket: Ticket,
        result: Result<T, CoreError>,
        on_apply: impl FnOnce(),
    ) -> bool {
        let mut inner = self.inner.lock();
        if ticket.generation != inner.generation {
            log::debug!(
                "{}: discarding stale result (ticket {} < current {})",
                self.label,
                ticket.generation,
                inner.generation
            );
            return false;
        }
        on_apply();
        inner.state = match result {
            Ok(data) => ViewState::Ready { data },
            Err(err) => {
                log::warn!("{}: {}", self.label, err);
                ViewState::Failed {
                    error: Notice::from(&err),
                }
            }
        };
        true
    }

    /// Store a ready value directly, superseding anything in flight.
    /// Used by actions that update local state after confirmation.
    pub fn publish(&self, data: T) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        inner.state = ViewState::Ready { data };
    }

    /// Fail immediately, superseding anything in flight. Used for
    /// client-side rejections that never issue a request.
    pub fn reject(&self, err: CoreError) {
        let mut inner = self.inner.lock();
        inner.generation += 1;
        log::debug!("{}: rejected: {}", self.label, err);
        inner.state = ViewState::Failed {
            error: Notice::from(&err),
        };
    }

    /// Current state, cloned for the shell.
    pub fn snapshot(&self) -> ViewState<T> {
        self.inner.lock().state.clone()
    }

    /// Run `update` against the Ready value, if there is one. Returns
    /// whether the update ran. In-flight generations are not disturbed.
    pub fn update_ready<F: FnOnce(&mut T)>(&self, update: F) -> bool {
        let mut inner = self.inner.lock();
        if let ViewState::Ready { data } = &mut inner.state {
            update(data);
            true
        } else {
            false
        }
    }
}
