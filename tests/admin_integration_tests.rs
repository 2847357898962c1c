use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use deepwiki_mcp::test_utils::{
    TestServerBuilder, create_test_jwt, create_test_provider, create_test_user,
};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json");
    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn admin_server() -> (deepwiki_mcp::Server, String) {
    let server = TestServerBuilder::new().build().await;
    create_test_user(&server.database, "admin-1", "Admin", "admin").await;
    let token = create_test_jwt(&server.jwt_service, "admin-1", "admin");
    (server, token)
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let server = TestServerBuilder::new().build().await;
    create_test_user(&server.database, "user-1", "User", "user").await;

    let app = server.create_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/mcp-providers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = create_test_jwt(&server.jwt_service, "user-1", "user");
    let response = app
        .oneshot(authed_request("GET", "/api/admin/mcp-providers", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn provider_crud_round_trip() {
    let (server, token) = admin_server().await;
    let app = server.create_app();

    // Create
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/admin/mcp-providers",
            &token,
            Some(json!({
                "name": "Claude",
                "description": "Claude provider",
                "transportType": "streamable_http",
                "requiresApiKey": true,
                "systemApiKey": "sk-secret",
                "isActive": true,
                "maxRequestsPerDay": 1000
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["success"], true);
    let data = &created["data"];
    assert_eq!(data["name"], "Claude");
    assert_eq!(data["serverUrl"], "/api/mcp/{owner}/{repo}");
    assert_eq!(data["hasSystemApiKey"], true);
    assert!(data.get("systemApiKey").is_none());
    let id = data["id"].as_str().unwrap().to_string();

    // List
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/admin/mcp-providers", &token, None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    // Update without systemApiKey keeps the stored key
    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            &format!("/api/admin/mcp-providers/{}", id),
            &token,
            Some(json!({
                "name": "Claude v2",
                "requiresApiKey": true,
                "isActive": false,
                "maxRequestsPerDay": 500
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/admin/mcp-providers", &token, None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    let item = &listed["data"][0];
    assert_eq!(item["name"], "Claude v2");
    assert_eq!(item["isActive"], false);
    assert_eq!(item["hasSystemApiKey"], true);

    // Delete (soft)
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/admin/mcp-providers/{}", id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/admin/mcp-providers", &token, None))
        .await
        .unwrap();
    let listed = body_json(response).await;
    assert!(listed["data"].as_array().unwrap().is_empty());

    // Updating a deleted provider is a 404
    let response = app
        .oneshot(authed_request(
            "PUT",
            &format!("/api/admin/mcp-providers/{}", id),
            &token,
            Some(json!({ "name": "x" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn public_listing_excludes_inactive_and_secrets() {
    let (server, token) = admin_server().await;
    let app = server.create_app();

    app.clone()
        .oneshot(authed_request(
            "POST",
            "/api/admin/mcp-providers",
            &token,
            Some(json!({
                "name": "Active",
                "systemApiKey": "sk-secret",
                "isActive": true
            })),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(authed_request(
            "POST",
            "/api/admin/mcp-providers",
            &token,
            Some(json!({ "name": "Inactive", "isActive": false })),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/mcp-providers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Active");
    assert_eq!(data[0]["serverUrl"], "/api/mcp/{owner}/{repo}");
    assert!(data[0].get("systemApiKey").is_none());
    assert!(data[0].get("hasSystemApiKey").is_none());
}

#[tokio::test]
async fn usage_log_listing_paginates_and_resolves_names() {
    let (server, token) = admin_server().await;
    create_test_provider(&server.database, "prov-1", "Claude").await;

    for i in 0..3 {
        let log = deepwiki_mcp::database::entities::UsageLog {
            id: format!("log-{}", i),
            user_id: Some("admin-1".to_string()),
            mcp_provider_id: Some("prov-1".to_string()),
            tool_name: if i == 0 { "read_file" } else { "search_doc" }.to_string(),
            request_summary: None,
            response_status: 200,
            duration_ms: 10,
            input_tokens: 0,
            output_tokens: 0,
            ip_address: None,
            user_agent: None,
            error_message: None,
            is_deleted: false,
            created_at: chrono::Utc::now(),
        };
        server.database.usage_logs().insert(log).await.unwrap();
    }

    let app = server.create_app();

    // Substring filter on tool name
    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            "/api/admin/mcp-providers/usage-logs?toolName=search&page=1&pageSize=2",
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["items"].as_array().unwrap().len(), 2);
    assert_eq!(data["items"][0]["userName"], "Admin");
    assert_eq!(data["items"][0]["mcpProviderName"], "Claude");

    // Page size clamps at 100, page floors at 1
    let response = app
        .oneshot(authed_request(
            "GET",
            "/api/admin/mcp-providers/usage-logs?page=0&pageSize=500",
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["pageSize"], 100);
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn statistics_series_is_zero_filled() {
    let (server, token) = admin_server().await;
    create_test_provider(&server.database, "prov-1", "Claude").await;

    let today = chrono::Utc::now()
        .date_naive()
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    server
        .database
        .usage_logs()
        .upsert_daily_statistic(
            "prov-1",
            today,
            &deepwiki_mcp::database::dao::DayAggregate {
                request_count: 5,
                success_count: 4,
                error_count: 1,
                total_duration_ms: 100,
                input_tokens: 10,
                output_tokens: 20,
            },
        )
        .await
        .unwrap();

    let app = server.create_app();
    let response = app
        .oneshot(authed_request(
            "GET",
            "/api/admin/mcp-providers/statistics?days=7",
            &token,
            None,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let data = &body["data"];
    let daily = data["dailyUsages"].as_array().unwrap();
    assert_eq!(daily.len(), 7);
    // Six empty days plus today's rollup.
    assert_eq!(daily[6]["requestCount"], 5);
    assert_eq!(daily[0]["requestCount"], 0);
    assert_eq!(data["totalRequests"], 5);
    assert_eq!(data["totalSuccessful"], 4);
    assert_eq!(data["totalErrors"], 1);
    assert_eq!(data["totalInputTokens"], 10);
    assert_eq!(data["totalOutputTokens"], 20);
}
