//! Orchestration core for the RankScope dashboard.
//!
//! Everything between "the user opened a page or clicked a button" and
//! "here is the state the shell should render" lives here: resolving
//! navigation ids to place ids, sequencing dependent fetches, caching
//! per-item AI results, keeping each widget's async state isolated, and
//! dispatching user-triggered mutations. Rendering, routing, and charts
//! belong to the shell; it drives this crate through [`DashboardCore`]
//! and the controllers in [`workflows`].

pub mod actions;
pub mod api;
pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod nav;
pub mod resolver;
pub mod session;
pub mod util;
pub mod view_state;
pub mod workflows;

pub use crate::core::DashboardCore;
pub use crate::error::{CoreError, Notice, NoticeLevel};
