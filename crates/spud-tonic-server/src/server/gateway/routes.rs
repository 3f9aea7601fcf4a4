use super::{PotatoClient, error::GatewayError};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde_json::{Value, json};
use spud_tonic_core::proto::{
    GetPotatoRequest, GetPotatoResponse, GetPotatoesRequest, GetPotatoesResponse,
};

pub async fn health() -> Json<Value> {
    Json(json!({ "message": "OK" }))
}

pub async fn list_potatoes(
    State(mut client): State<PotatoClient>,
    query: Result<Query<GetPotatoesRequest>, QueryRejection>,
) -> Result<Json<GetPotatoesResponse>, GatewayError> {
    let Query(req) = query?;
    let response = client.get_potatoes(req).await?;
    Ok(Json(response.into_inner()))
}

pub async fn get_potato(
    State(mut client): State<PotatoClient>,
    Path(potato_id): Path<String>,
) -> Result<Json<GetPotatoResponse>, GatewayError> {
    let response = client.get_potato(GetPotatoRequest { potato_id }).await?;
    Ok(Json(response.into_inner()))
}
