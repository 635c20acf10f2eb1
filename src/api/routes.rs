use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::store::CommissionStore;

pub fn create_router<S: CommissionStore + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Reference data
        .route("/rules", get(handlers::list_rules::<S>))
        .route("/vendors", get(handlers::list_vendors::<S>))
        .route("/vendors/:vendor_id", get(handlers::get_vendor::<S>))
        .route(
            "/vendors/:vendor_id/commissions",
            get(handlers::get_vendor_commissions::<S>),
        )
        // Sales
        .route(
            "/sales",
            get(handlers::list_sales::<S>).post(handlers::create_sale::<S>),
        )
        // Commission reports
        .route("/commissions", get(handlers::list_commissions::<S>))
        .route(
            "/commissions/vendors",
            get(handlers::list_vendor_commissions::<S>),
        )
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use crate::store::SqlStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn seeded_router() -> Router {
        let store = SqlStore::connect("sqlite::memory:", 1).await.unwrap();
        store.ensure_schema().await.unwrap();
        seed::seed(&store).await.unwrap();
        create_router().with_state(Arc::new(store))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_store_failure_hides_database_error() {
        // No schema: every query fails with "no such table".
        let store = SqlStore::connect("sqlite::memory:", 1).await.unwrap();
        let app = create_router().with_state(Arc::new(store));

        let (status, body) = send(app, get_request("/rules")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("no such table"));
    }

    #[tokio::test]
    async fn test_list_rules() {
        let (status, body) = send(seeded_router().await, get_request("/rules")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);
        assert_eq!(body["items"][0]["minimum_amount"], 1000.0);
    }

    #[tokio::test]
    async fn test_get_unknown_vendor_is_not_found() {
        let (status, body) = send(seeded_router().await, get_request("/vendors/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Vendor 99 not found");
    }

    #[tokio::test]
    async fn test_vendor_commissions() {
        let (status, body) =
            send(seeded_router().await, get_request("/vendors/4/commissions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"][0]["commission"], 150.0);
        assert_eq!(body["items"][1]["rule_id"], 3);
        assert_eq!(body["items"][1]["vendor_name"], "Johny M");
    }

    #[tokio::test]
    async fn test_create_sale_rejects_negative_amount() {
        let request = post_json(
            "/sales",
            json!({"sale_date": "2025-08-01", "vendor_id": 1, "quota_amount": -5.0}),
        );
        let (status, _) = send(seeded_router().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_sale_for_unknown_vendor() {
        let request = post_json(
            "/sales",
            json!({"sale_date": "2025-08-01", "vendor_id": 42, "quota_amount": 900.0}),
        );
        let (status, _) = send(seeded_router().await, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_sale() {
        let request = post_json(
            "/sales",
            json!({"sale_date": "2025-08-01", "vendor_id": 3, "quota_amount": 850.0}),
        );
        let (status, body) = send(seeded_router().await, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 11);
        assert_eq!(body["sale_date"], "2025-08-01");
        assert_eq!(body["vendor_id"], 3);
    }
}
