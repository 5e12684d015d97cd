//! Country profile lookup.

use axum::extract::Path;
use axum::Json;

use crate::location::lookup_location;
use crate::models::LocationInfo;

/// `GET /api/locations/:country`. Unknown countries get the fallback profile.
pub async fn lookup(Path(country): Path<String>) -> Json<LocationInfo> {
    Json(lookup_location(&country))
}
