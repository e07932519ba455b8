//! Spot price endpoints
//!
//! The cache is shared by every session; a refresh fetches all metals
//! concurrently and keeps whatever succeeded.

use axum::{extract::State, routing::get, routing::post, Json, Router};

use sv_core::prices::SpotPrices;

use crate::state::AppState;

async fn current_prices(State(state): State<AppState>) -> Json<SpotPrices> {
    Json(state.prices().await)
}

async fn refresh_prices(State(state): State<AppState>) -> Json<SpotPrices> {
    Json(state.refresh_prices().await)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/prices", get(current_prices))
        .route("/api/v1/prices/refresh", post(refresh_prices))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::super::auth::tests::build_state;

    #[tokio::test]
    async fn prices_start_unavailable() {
        let (state, _tmp) = build_state().await;
        let app = super::router().with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/prices")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert!(payload["gold"].is_null());
        assert!(payload["silver"].is_null());
        assert!(payload["platinum"].is_null());
        assert!(payload["updatedAt"].is_null());
    }
}
