use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use biomed_search::{
    api::{build_router, AppState},
    config::SearchConfig,
    models::{DataProduct, Study},
    search::SearchService,
    state::{InMemoryStore, RecordStore},
};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let service = Arc::new(SearchService::new(
        store.clone(),
        store.clone(),
        SearchConfig::default(),
    ));
    let state = AppState::new(service, store.clone());
    (build_router(state), store)
}

async fn seed_studies(store: &InMemoryStore) {
    for i in 0..3 {
        let study = Study::new(
            format!("Immunotherapy Trial {}", i),
            "Novel immune treatment".to_string(),
            "Recruiting".to_string(),
            "Phase I".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        store.save_study(&study).await.unwrap();
        store
            .save_data_product(&DataProduct::new(
                study.id,
                format!("Trial {} Data", i),
                "Clinical measurements".to_string(),
                "raw".to_string(),
                "CSV".to_string(),
            ))
            .await
            .unwrap();
    }
    for i in 0..27 {
        store
            .save_study(&Study::new(
                format!("Radiation Trial {}", i),
                "Radiation treatment".to_string(),
                "Active".to_string(),
                "Phase II".to_string(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            ))
            .await
            .unwrap();
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // Framework-level rejections (e.g. a missing required query parameter)
    // produce plain-text bodies
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_search_counts_full_filtered_set() {
    let (app, store) = test_app();
    seed_studies(&store).await;

    let (status, body) = get(&app, "/api/search?q=Immunotherapy&page=1&per_page=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 10);

    for result in body["results"].as_array().unwrap() {
        assert_eq!(result["type"], "study");
        assert_eq!(result["status"], "Recruiting");
        assert_eq!(result["data_products"].as_array().unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_search_pagination_is_consistent() {
    let (app, store) = test_app();
    seed_studies(&store).await;

    let (_, page1) = get(&app, "/api/search?q=Trial&page=1&per_page=10").await;
    let (_, page3) = get(&app, "/api/search?q=Trial&page=3&per_page=10").await;

    assert_eq!(page1["total"], 30);
    assert_eq!(page3["total"], 30);
    assert_eq!(page1["results"].as_array().unwrap().len(), 10);
    assert_eq!(page3["results"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_search_or_query() {
    let (app, store) = test_app();
    seed_studies(&store).await;

    let (status, body) =
        get(&app, "/api/search?q=Immunotherapy%20OR%20Radiation&per_page=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 30);
}

#[tokio::test]
async fn test_search_status_filter() {
    let (app, store) = test_app();
    seed_studies(&store).await;

    let (status, body) = get(&app, "/api/search?q=Trial&status=Active&per_page=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 27);
    for result in body["results"].as_array().unwrap() {
        assert_eq!(result["status"], "Active");
    }
}

#[tokio::test]
async fn test_search_validation_errors() {
    let (app, _) = test_app();

    // Missing q
    let (status, _) = get(&app, "/api/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty q
    let (status, body) = get(&app, "/api/search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Page below 1
    let (status, _) = get(&app, "/api/search?q=cancer&page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // per_page out of range
    let (status, _) = get(&app, "/api/search?q=cancer&per_page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(&app, "/api/search?q=cancer&per_page=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown category
    let (status, _) = get(&app, "/api/search?q=cancer&category=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suggest_endpoint() {
    let (app, store) = test_app();
    for title in ["Cancer Study 1", "Cardiac Study", "Diabetes Study"] {
        store
            .save_study(&Study::new(
                title.to_string(),
                "Description".to_string(),
                "Active".to_string(),
                "Phase I".to_string(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            ))
            .await
            .unwrap();
    }

    let (status, body) = get(&app, "/api/suggest?q=Ca").await;
    assert_eq!(status, StatusCode::OK);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 2);
    for suggestion in suggestions {
        assert_eq!(suggestion["type"], "study");
    }

    // Fragment below the minimum length
    let (status, _) = get(&app, "/api/suggest?q=C").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_requires_user_context() {
    let (app, _) = test_app();

    let (status, body) = get(&app, "/api/search-history").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
}

#[tokio::test]
async fn test_search_with_user_records_history() {
    let (app, store) = test_app();
    seed_studies(&store).await;
    let user_id = Uuid::new_v4();

    let (status, _) = send(
        &app,
        Request::get("/api/search?q=Immunotherapy&status=Recruiting&category=studies")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Request::get("/api/search-history")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["query"], "Immunotherapy");
    assert_eq!(entries[0]["category"], "studies");
    assert_eq!(entries[0]["results_count"], 3);
    assert_eq!(entries[0]["filters"], serde_json::json!({"status": "Recruiting"}));
    assert_eq!(entries[0]["is_saved"], false);
}

#[tokio::test]
async fn test_saved_search_lifecycle() {
    let (app, store) = test_app();
    seed_studies(&store).await;
    let user_id = Uuid::new_v4();

    // Run a search to create a history entry
    send(
        &app,
        Request::get("/api/search?q=Immunotherapy&phase=Phase%20I")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    let (_, history) = send(
        &app,
        Request::get("/api/search-history")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let entry_id = history[0]["id"].as_str().unwrap().to_string();

    // Pin it as a saved search
    let (status, _) = send(
        &app,
        Request::post(format!("/api/search-history/{}/save", entry_id))
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, saved) = send(
        &app,
        Request::get("/api/saved-searches")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(saved.as_array().unwrap().len(), 1);

    // Execute reproduces the stored parameters exactly
    let (status, executed) = send(
        &app,
        Request::post(format!("/api/saved-searches/{}/execute", entry_id))
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(executed["query"], "Immunotherapy");
    assert_eq!(executed["filters"], serde_json::json!({"phase": "Phase I"}));
    assert_eq!(executed["success"], true);

    let (_, saved) = send(
        &app,
        Request::get("/api/saved-searches")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(saved[0]["use_count"], 2);

    // Deleting only unpins; the history row survives
    let (status, _) = send(
        &app,
        Request::delete(format!("/api/saved-searches/{}", entry_id))
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, saved) = send(
        &app,
        Request::get("/api/saved-searches")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert!(saved.as_array().unwrap().is_empty());

    let (_, history) = send(
        &app,
        Request::get("/api/search-history")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["is_saved"], false);

    // Executing an unpinned search is a 404
    let (status, _) = send(
        &app,
        Request::post(format!("/api/saved-searches/{}/execute", entry_id))
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_saved_search_is_scoped_to_owner() {
    let (app, store) = test_app();
    seed_studies(&store).await;
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    send(
        &app,
        Request::get("/api/search?q=Immunotherapy")
            .header("x-user-id", owner.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    let (_, history) = send(
        &app,
        Request::get("/api/search-history")
            .header("x-user-id", owner.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let entry_id = history[0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Request::post(format!("/api/search-history/{}/save", entry_id))
            .header("x-user-id", intruder.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_search_explicitly() {
    let (app, _) = test_app();
    let user_id = Uuid::new_v4();

    let payload = serde_json::json!({
        "query": "cancer OR diabetes",
        "category": "all",
        "filters": {"severity": "Severe"},
        "results_count": 12,
        "is_saved": true
    });

    let (status, body) = send(
        &app,
        Request::post("/api/search-history")
            .header("x-user-id", user_id.to_string())
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, saved) = send(
        &app,
        Request::get("/api/saved-searches")
            .header("x-user-id", user_id.to_string())
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(saved.as_array().unwrap().len(), 1);
    assert_eq!(saved[0]["query"], "cancer OR diabetes");
    assert_eq!(saved[0]["filters"], serde_json::json!({"severity": "Severe"}));
}
