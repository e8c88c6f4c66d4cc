use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::handlers::{health_check, pay_ticket, vehicle_entry, vehicle_exit};
use crate::lifecycle::TicketService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TicketService>,
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/entry", post(vehicle_entry))
        .route("/exit", post(vehicle_exit))
        .route("/pay", post(pay_ticket))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::RateTable;
    use crate::store::MemoryTicketStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let store = Arc::new(MemoryTicketStore::new());
        let service = Arc::new(TicketService::new(store, RateTable::default()));
        create_routes(AppState { service })
    }

    async fn post_to(router: &Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn error_code(body: &Value) -> &str {
        body["error"]["code"].as_str().unwrap_or_default()
    }

    #[tokio::test]
    async fn health_endpoint_responds_ok() {
        let router = test_router();
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn entry_returns_created_with_ticket_id() {
        let router = test_router();
        let (status, body) = post_to(&router, "/entry?plate=123-12-123&parkingLot=382").await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["ticketId"].as_str().is_some());
    }

    #[tokio::test]
    async fn entry_rejects_bad_plate_format() {
        let router = test_router();
        let (status, body) = post_to(&router, "/entry?plate=nope&parkingLot=382").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "INVALID_FORMAT");
    }

    #[tokio::test]
    async fn entry_conflicts_while_plate_is_parked() {
        let router = test_router();
        post_to(&router, "/entry?plate=123-12-123&parkingLot=382").await;
        let (status, body) = post_to(&router, "/entry?plate=123-12-123&parkingLot=382").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error_code(&body), "DUPLICATE_ACTIVE");
    }

    #[tokio::test]
    async fn exit_unknown_ticket_is_not_found() {
        let router = test_router();
        let (status, body) = post_to(&router, "/exit?ticketId=no-such-ticket").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), "NOT_FOUND");
    }

    #[tokio::test]
    async fn full_ticket_lifecycle_over_http() {
        let router = test_router();

        let (status, body) = post_to(&router, "/entry?plate=AB-1234&parkingLot=L1").await;
        assert_eq!(status, StatusCode::CREATED);
        let ticket_id = body["ticketId"].as_str().unwrap().to_string();

        // Pay before exit is a conflict, not a missing ticket.
        let (status, body) = post_to(&router, &format!("/pay?ticketId={ticket_id}")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error_code(&body), "PAY_BEFORE_EXIT");

        let (status, body) = post_to(&router, &format!("/exit?ticketId={ticket_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["licensePlate"], "AB-1234");
        assert_eq!(body["parkingLot"], "L1");
        assert!(body["totalParkedTime"].as_f64().is_some());
        assert!(body["charge"].is_string() || body["charge"].is_number());

        let (status, body) = post_to(&router, &format!("/exit?ticketId={ticket_id}")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error_code(&body), "ALREADY_EXITED");

        let (status, body) = post_to(&router, &format!("/pay?ticketId={ticket_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticketId"], ticket_id.as_str());
        assert_eq!(body["licensePlate"], "AB-1234");
        assert_eq!(body["currency"], "USD");
        assert_eq!(body["payment_status"], "paid");
        assert!(body["transactionId"].as_str().unwrap().starts_with("tx-"));

        let (status, body) = post_to(&router, &format!("/pay?ticketId={ticket_id}")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error_code(&body), "ALREADY_PAID");
    }
}
