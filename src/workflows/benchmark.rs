//! Competitor benchmark page.
//!
//! Two sub-fetches once the business is resolved: the full analysis
//! (required) and the ranking history (optional trend sparkline). They
//! run concurrently; the page is Ready as soon as the analysis lands,
//! even when the trend degraded to empty.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::api::{AnalysisResult, RankingPoint};
use crate::core::DashboardCore;
use crate::view_state::{ViewSlot, ViewState};

use super::resolve_for_page;

/// What the benchmark page renders. `trend` is None when the history
/// fetch degraded; the rest of the page does not care.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkView {
    pub analysis: AnalysisResult,
    pub trend: Option<Vec<RankingPoint>>,
}

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub name: String,
    pub score: f64,
    pub rank_position: Option<u32>,
    pub is_self: bool,
}

impl BenchmarkView {
    /// The business and its competitors in one table, best score first.
    pub fn comparison(&self, business_name: &str) -> Vec<ComparisonRow> {
        let mut rows: Vec<ComparisonRow> = self
            .analysis
            .competitors
            .iter()
            .map(|c| ComparisonRow {
                name: c.name.clone(),
                score: c.score,
                rank_position: c.rank_position,
                is_self: false,
            })
            .collect();
        rows.push(ComparisonRow {
            name: business_name.to_string(),
            score: self.analysis.score,
            rank_position: None,
            is_self: true,
        });
        rows.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        rows
    }
}

pub struct BenchmarkPage {
    core: Arc<DashboardCore>,
    slot: ViewSlot<BenchmarkView>,
    business_name: Mutex<Option<String>>,
    current: Mutex<Option<String>>,
}

impl BenchmarkPage {
    pub fn new(core: Arc<DashboardCore>) -> Self {
        Self {
            core,
            slot: ViewSlot::new("benchmark"),
            business_name: Mutex::new(None),
            current: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ViewState<BenchmarkView> {
        self.slot.snapshot()
    }

    /// Comparison rows for the current Ready view, best score first.
    pub fn comparison(&self) -> Option<Vec<ComparisonRow>> {
        let name = self.business_name.lock().clone()?;
        match self.slot.snapshot() {
            ViewState::Ready { data } => Some(data.comparison(&name)),
            _ => None,
        }
    }

    pub async fn load(&self, local_id: &str) {
        {
            let mut current = self.current.lock();
            if current.as_deref() == Some(local_id) && !self.slot.snapshot().is_idle() {
                return;
            }
            *current = Some(local_id.to_string());
        }

        let ticket = self.slot.begin();
        let Some(business) = resolve_for_page(&self.core, &self.slot, ticket, local_id).await
        else {
            return;
        };

        // Required analysis and optional trend, concurrently.
        let api = self.core.api();
        let (analysis, history) = tokio::join!(
            api.get_business(&business.external_place_id),
            api.ranking_history(&business.id),
        );

        let result = analysis.map(|analysis| {
            let trend = match history {
                Ok(points) => Some(points),
                Err(err) => {
                    log::warn!("benchmark trend degraded: {}", err);
                    None
                }
            };
            BenchmarkView { analysis, trend }
        });
        // The comparison label flips in lockstep with the view it names;
        // a superseded load cannot relabel the newer page's table.
        self.slot.complete_with(ticket, result, || {
            *self.business_name.lock() = Some(business.name.clone());
        });
    }
}
