use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "parkade-api",
    };

    success(payload, "Health check successful").into_response()
}

#[derive(Deserialize)]
pub struct EntryParams {
    plate: String,
    #[serde(rename = "parkingLot")]
    parking_lot: String,
}

#[derive(Deserialize)]
pub struct TicketParams {
    #[serde(rename = "ticketId")]
    ticket_id: String,
}

/// `POST /entry?plate=123-12-123&parkingLot=382`
pub async fn vehicle_entry(
    State(state): State<AppState>,
    Query(params): Query<EntryParams>,
) -> Result<Response, AppError> {
    let receipt = state.service.entry(&params.plate, &params.parking_lot).await?;
    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}

/// `POST /exit?ticketId=<uuid>`
pub async fn vehicle_exit(
    State(state): State<AppState>,
    Query(params): Query<TicketParams>,
) -> Result<Response, AppError> {
    let summary = state.service.exit(&params.ticket_id).await?;
    Ok(Json(summary).into_response())
}

/// `POST /pay?ticketId=<uuid>`
pub async fn pay_ticket(
    State(state): State<AppState>,
    Query(params): Query<TicketParams>,
) -> Result<Response, AppError> {
    let receipt = state.service.pay(&params.ticket_id).await?;
    Ok(Json(receipt).into_response())
}
