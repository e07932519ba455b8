//! Inventory item endpoints
//!
//! CRUD, filtering and valuation against the session's resolved scope:
//! the active household in shared mode, the personal collection in
//! legacy mode. Callers never name a collection directly.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sv_core::household::resolution::resolve_or_legacy;
use sv_core::identity::Identity;
use sv_core::inventory::{coins, ItemFilter, ItemScope, ItemStore};
use sv_core::inventory::model::{InventoryItem, ItemDraft, Metal};
use sv_core::session::SessionContext;
use sv_core::valuation::{compute_totals, ValuationTotals};

use crate::state::AppState;

use super::auth::{
    bad_request, map_core_error, require_identity, route_error, ErrorResponse, RouteError,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub metal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoinOptionsQuery {
    pub metal: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinOption {
    pub name: String,
    pub grams: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinOptionsResponse {
    pub metal: Metal,
    pub label: String,
    pub category_label: String,
    pub options: Vec<CoinOption>,
}

async fn resolved_scope(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(Identity, SessionContext, ItemScope), RouteError> {
    let identity = require_identity(headers)?;
    let session =
        resolve_or_legacy(state.household_store(), state.item_store(), &identity).await;
    let scope = session.item_scope(&identity).ok_or_else(|| {
        route_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "No inventory is available for this session",
        )
    })?;
    Ok((identity, session, scope))
}

fn parse_metal_filter(raw: Option<&str>) -> Result<Option<Metal>, RouteError> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() || value.trim() == "all" => Ok(None),
        Some(value) => value
            .parse::<Metal>()
            .map(Some)
            .map_err(|err| bad_request(err.to_string())),
    }
}

async fn list_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<Vec<InventoryItem>>, (StatusCode, Json<ErrorResponse>)> {
    let (_identity, _session, scope) = resolved_scope(&state, &headers).await?;
    let items = state
        .item_store()
        .list(&scope)
        .await
        .map_err(map_core_error)?;

    let filter = ItemFilter::new(
        query.search.unwrap_or_default(),
        parse_metal_filter(query.metal.as_deref())?,
    );
    Ok(Json(filter.apply(items)))
}

async fn add_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut draft): Json<ItemDraft>,
) -> Result<(StatusCode, Json<InventoryItem>), (StatusCode, Json<ErrorResponse>)> {
    let (_identity, _session, scope) = resolved_scope(&state, &headers).await?;

    coins::apply_coin_grams(&mut draft);
    draft.validate().map_err(map_core_error)?;

    let item = state
        .item_store()
        .add(&scope, draft)
        .await
        .map_err(map_core_error)?;
    state.notify_scope(&scope, "items:changed").await;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(mut draft): Json<ItemDraft>,
) -> Result<Json<InventoryItem>, (StatusCode, Json<ErrorResponse>)> {
    let (_identity, _session, scope) = resolved_scope(&state, &headers).await?;

    // A known coin type always re-derives its grams; Custom keeps the
    // user-entered weight.
    coins::apply_coin_grams(&mut draft);
    draft.validate().map_err(map_core_error)?;

    let item = state
        .item_store()
        .update(&scope, id, draft)
        .await
        .map_err(map_core_error)?;
    state.notify_scope(&scope, "items:changed").await;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let (_identity, _session, scope) = resolved_scope(&state, &headers).await?;

    let removed = state
        .item_store()
        .delete(&scope, id)
        .await
        .map_err(map_core_error)?;
    if !removed {
        return Err(route_error(
            StatusCode::NOT_FOUND,
            format!("Item not found: {}", id),
        ));
    }
    state.notify_scope(&scope, "items:changed").await;
    Ok(StatusCode::NO_CONTENT)
}

async fn coin_options(
    Query(query): Query<CoinOptionsQuery>,
) -> Result<Json<CoinOptionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let metal = query
        .metal
        .parse::<Metal>()
        .map_err(|err| bad_request(err.to_string()))?;
    let config = coins::coin_config(metal);

    Ok(Json(CoinOptionsResponse {
        metal,
        label: config.label.to_string(),
        category_label: coins::category_label(metal).to_string(),
        options: config
            .entries
            .iter()
            .map(|(name, grams)| CoinOption {
                name: name.to_string(),
                grams: *grams,
            })
            .collect(),
    }))
}

async fn valuation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ValuationTotals>, (StatusCode, Json<ErrorResponse>)> {
    let (_identity, _session, scope) = resolved_scope(&state, &headers).await?;
    let items = state
        .item_store()
        .list(&scope)
        .await
        .map_err(map_core_error)?;
    let prices = state.prices().await;
    Ok(Json(compute_totals(&items, &prices)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/items", get(list_items).post(add_item))
        .route("/api/v1/items/coin-options", get(coin_options))
        .route(
            "/api/v1/items/{id}",
            axum::routing::put(update_item).delete(delete_item),
        )
        .route("/api/v1/valuation", get(valuation))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::super::auth;
    use super::super::auth::tests::{build_state, register_request};

    async fn register(app: &axum::Router) -> String {
        let response = app
            .clone()
            .oneshot(register_request("alice@example.com", "Alice"))
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        payload["token"].as_str().unwrap().to_string()
    }

    fn post_item(token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/items")
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_json(token: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn known_coin_type_derives_grams_from_table() {
        let (state, _tmp) = build_state().await;
        let app = super::router().merge(auth::router()).with_state(state);
        let token = register(&app).await;

        let response = app
            .oneshot(post_item(
                &token,
                json!({
                    "metal": "silver",
                    "category": "coin",
                    "itemType": "Dime",
                    "gramsPerItem": 0.0,
                    "quantity": 4,
                    "year": 1962
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let item = body_json(response).await;
        assert_eq!(item["gramsPerItem"], 2.5);
    }

    #[tokio::test]
    async fn custom_coin_requires_positive_grams() {
        let (state, _tmp) = build_state().await;
        let app = super::router().merge(auth::router()).with_state(state);
        let token = register(&app).await;

        let response = app
            .oneshot(post_item(
                &token,
                json!({
                    "metal": "silver",
                    "category": "coin",
                    "itemType": "Custom",
                    "gramsPerItem": 0.0,
                    "quantity": 1
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_filters_by_metal_and_search() {
        let (state, _tmp) = build_state().await;
        let app = super::router().merge(auth::router()).with_state(state);
        let token = register(&app).await;

        for body in [
            json!({
                "metal": "gold",
                "category": "bullion",
                "itemType": "Gold bar",
                "gramsPerItem": 31.1034768,
                "quantity": 1
            }),
            json!({
                "metal": "silver",
                "category": "coin",
                "itemType": "Dime",
                "gramsPerItem": 2.5,
                "quantity": 10,
                "notes": "inherited"
            }),
        ] {
            let response = app.clone().oneshot(post_item(&token, body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let all = body_json(
            app.clone()
                .oneshot(get_json(&token, "/api/v1/items"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let silver = body_json(
            app.clone()
                .oneshot(get_json(&token, "/api/v1/items?metal=silver"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(silver.as_array().unwrap().len(), 1);
        assert_eq!(silver[0]["metal"], "silver");

        let none = body_json(
            app.clone()
                .oneshot(get_json(&token, "/api/v1/items?search=palladium"))
                .await
                .unwrap(),
        )
        .await;
        assert!(none.as_array().unwrap().is_empty());

        let notes = body_json(
            app.oneshot(get_json(&token, "/api/v1/items?search=inherited"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(notes.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn edit_recomputes_known_coin_grams() {
        let (state, _tmp) = build_state().await;
        let app = super::router().merge(auth::router()).with_state(state);
        let token = register(&app).await;

        let created = body_json(
            app.clone()
                .oneshot(post_item(
                    &token,
                    json!({
                        "metal": "silver",
                        "category": "coin",
                        "itemType": "Dime",
                        "gramsPerItem": 2.5,
                        "quantity": 1
                    }),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/v1/items/{}", id))
                    .header("Authorization", format!("Bearer {}", token))
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({
                            "metal": "silver",
                            "category": "coin",
                            "itemType": "Half Dollar",
                            "gramsPerItem": 999.0,
                            "quantity": 1
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["gramsPerItem"], 11.25);
    }

    #[tokio::test]
    async fn delete_removes_item() {
        let (state, _tmp) = build_state().await;
        let app = super::router().merge(auth::router()).with_state(state);
        let token = register(&app).await;

        let created = body_json(
            app.clone()
                .oneshot(post_item(
                    &token,
                    json!({
                        "metal": "platinum",
                        "category": "bullion",
                        "itemType": "Platinum bar",
                        "gramsPerItem": 31.1034768,
                        "quantity": 1
                    }),
                ))
                .await
                .unwrap(),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let delete = |id: String, token: String, app: axum::Router| async move {
            app.oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/items/{}", id))
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        };

        let first = delete(id.clone(), token.clone(), app.clone()).await;
        assert_eq!(first.status(), StatusCode::NO_CONTENT);

        let second = delete(id, token, app).await;
        assert_eq!(second.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn coin_options_reflect_metal_tables() {
        let (state, _tmp) = build_state().await;
        let app = super::router().merge(auth::router()).with_state(state);

        let gold = body_json(
            app.clone()
                .oneshot(
                    Request::builder()
                        .method("GET")
                        .uri("/api/v1/items/coin-options?metal=gold")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(gold["label"], "Goldback");
        assert_eq!(gold["categoryLabel"], "Goldback");
        assert!(gold["options"]
            .as_array()
            .unwrap()
            .iter()
            .any(|option| option["name"] == "1 Goldback (1/1000 oz)"));

        let silver = body_json(
            app.oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/items/coin-options?metal=silver")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap(),
        )
        .await;
        let half_dollar = silver["options"]
            .as_array()
            .unwrap()
            .iter()
            .find(|option| option["name"] == "Half Dollar")
            .unwrap();
        assert_eq!(half_dollar["grams"], 11.25);
    }

    #[tokio::test]
    async fn valuation_counts_grams_without_prices() {
        let (state, _tmp) = build_state().await;
        let app = super::router().merge(auth::router()).with_state(state);
        let token = register(&app).await;

        app.clone()
            .oneshot(post_item(
                &token,
                json!({
                    "metal": "silver",
                    "category": "coin",
                    "itemType": "Dime",
                    "gramsPerItem": 2.5,
                    "quantity": 4
                }),
            ))
            .await
            .unwrap();

        let totals = body_json(
            app.oneshot(get_json(&token, "/api/v1/valuation"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(totals["totalValue"], 0.0);
        assert_eq!(totals["byMetal"]["silver"]["grams"], 10.0);
        assert_eq!(totals["coinCounts"][0]["label"], "Dime");
        assert_eq!(totals["coinCounts"][0]["quantity"], 4);
    }
}
