//! Read-only ledger endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use ledger::{LedgerFields, LedgerStore};
use saga::order_fulfillment::COLLECTION_INVENTORY;
use serde::Serialize;

use super::orders::AppState;
use crate::error::ApiError;

/// Maximum number of collection names listed.
pub const TABLE_LIST_LIMIT: usize = 5;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TablesResponse {
    pub table_names: Vec<String>,
}

/// GET /tables: lists up to five ledger collections.
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<TablesResponse>, ApiError> {
    let table_names = state
        .saga_coordinator
        .ledger()
        .list_collections(TABLE_LIST_LIMIT)
        .await?;
    Ok(Json(TablesResponse { table_names }))
}

/// GET /getItem/{itemId}: fetches one inventory record.
#[tracing::instrument(skip(state))]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<LedgerFields>, ApiError> {
    state
        .saga_coordinator
        .ledger()
        .get(COLLECTION_INVENTORY, &item_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Item {item_id} not found")))
}
