//! HTTP handlers for client registry and balance endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::clients::{ClientService, CreateClientInput};
use crate::services::movements::MovementService;
use crate::AppState;
use shared::models::{Client, StockBalance};

/// List all clients
pub async fn list_clients(State(state): State<AppState>) -> AppResult<Json<Vec<Client>>> {
    let service = ClientService::new(state.db);
    let clients = service.list().await?;
    Ok(Json(clients))
}

/// Register a client
pub async fn create_client(
    State(state): State<AppState>,
    Json(input): Json<CreateClientInput>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let service = ClientService::new(state.db);
    let client = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub product: Option<String>,
}

/// Balance for a client across all products
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBalanceResponse {
    pub client_id: Uuid,
    #[serde(flatten)]
    pub balance: StockBalance,
}

/// Balance for one product of a client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBalanceResponse {
    pub client_id: Uuid,
    pub product: String,
    pub product_weight: Decimal,
}

/// Current balance for a client, either the full position or scoped to one
/// product via `?product=`
pub async fn get_client_balance(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Response> {
    let service = MovementService::new(state.db);

    match query.product {
        Some(product) => {
            let product_weight = service.product_balance(client_id, &product).await?;
            Ok(Json(ProductBalanceResponse {
                client_id,
                product,
                product_weight,
            })
            .into_response())
        }
        None => {
            let balance = service.client_balance(client_id).await?;
            Ok(Json(ClientBalanceResponse { client_id, balance }).into_response())
        }
    }
}
