use axum::Json;

use crate::models::communities::{self, Community};

/// The community catalog is hardcoded, so this endpoint never touches
/// the database.
pub async fn list_communities_handle() -> Json<Vec<Community>> {
    Json(communities::all().to_vec())
}
