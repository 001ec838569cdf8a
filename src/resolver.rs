//! Identifier resolution: local business id → external place id.
//!
//! Navigation state only carries the local id, but analysis and review
//! calls key on the externally-assigned place id. There is no dedicated
//! lookup endpoint, so resolution refetches the caller's business
//! collection and matches exactly. One extra round trip per page load,
//! accepted for the request volume this dashboard sees.

use crate::api::{BusinessRef, PlaceId, RankApi};
use crate::error::CoreError;

/// Exact-match lookup by local id. Pure; never mutates the collection.
pub fn find_business<'a>(businesses: &'a [BusinessRef], local_id: &str) -> Option<&'a BusinessRef> {
    businesses.iter().find(|b| b.id == local_id)
}

/// Find the tracked business for `local_id`, or `NotFound`.
///
/// Callers that get `NotFound` must fall back to the dashboard instead of
/// issuing any downstream call for this load.
pub async fn resolve_business(
    api: &dyn RankApi,
    local_id: &str,
) -> Result<BusinessRef, CoreError> {
    let businesses = api.list_businesses().await?;
    find_business(&businesses, local_id)
        .cloned()
        .ok_or_else(|| CoreError::NotFound("Business".to_string()))
}

/// As [`resolve_business`], returning only the place id downstream calls
/// need.
pub async fn resolve_place_id(api: &dyn RankApi, local_id: &str) -> Result<PlaceId, CoreError> {
    Ok(resolve_business(api, local_id).await?.external_place_id)
}
