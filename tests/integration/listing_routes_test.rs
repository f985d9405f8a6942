//! Integration tests for the listing routes
//!
//! The data-access layer is replaced by a scripted mock so each test pins both
//! the repository call the handler makes and the HTTP response it produces.

#[path = "../common/mod.rs"]
mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::*;
use listings_api::database::UpdateOutcome;
use listings_api::models::{ListingFields, ListingFilter};

mod listing_get {
    use super::*;

    #[tokio::test]
    async fn test_returns_array_of_all_listings() {
        let mock = MockListingRepository::new();
        mock.expect(Call::FindAll, Reply::Many(vec![expected_listing()]));

        let response = send(test_app(mock.clone()), Method::GET, "/listings", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([expected_body()]));
        mock.verify();
    }

    #[tokio::test]
    async fn test_returns_empty_array_when_collection_is_empty() {
        let mock = MockListingRepository::new();
        mock.expect(Call::FindAll, Reply::Many(vec![]));

        let response = send(test_app(mock.clone()), Method::GET, "/listings/", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
        mock.verify();
    }

    #[tokio::test]
    async fn test_gets_listing_by_price() {
        let mock = MockListingRepository::new();
        mock.expect(
            Call::FindOne(ListingFilter::by_price("888")),
            Reply::Maybe(Some(expected_listing())),
        );

        let response = send(test_app(mock.clone()), Method::GET, "/listings?price=888", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, expected_body());
        mock.verify();
    }

    #[tokio::test]
    async fn test_unmatched_price_is_not_found() {
        let mock = MockListingRepository::new();
        mock.expect(
            Call::FindOne(ListingFilter::by_price("1")),
            Reply::Maybe(None),
        );

        let response = send(test_app(mock.clone()), Method::GET, "/listings?price=1", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RES_4001");
        mock.verify();
    }

    #[tokio::test]
    async fn test_gets_listing_by_id() {
        let mock = MockListingRepository::new();
        mock.expect(
            Call::FindById(LISTING_ID.to_string()),
            Reply::Maybe(Some(expected_listing())),
        );

        let uri = format!("/listings/{}", LISTING_ID);
        let response = send(test_app(mock.clone()), Method::GET, &uri, None).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, expected_body());
        mock.verify();
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let mock = MockListingRepository::new();
        mock.expect(Call::FindById("missing".to_string()), Reply::Maybe(None));

        let response = send(test_app(mock.clone()), Method::GET, "/listings/missing", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        mock.verify();
    }

    #[tokio::test]
    async fn test_error_body_carries_response_request_id() {
        let mock = MockListingRepository::new();
        mock.expect(Call::FindById("missing".to_string()), Reply::Maybe(None));

        let response = send(test_app(mock.clone()), Method::GET, "/listings/missing", None).await;

        let header = response.headers()["x-request-id"].to_str().unwrap().to_string();
        let body = body_json(response).await;
        assert_eq!(body["request_id"], header.as_str());
        mock.verify();
    }

    #[tokio::test]
    async fn test_error_body_keeps_upstream_request_id() {
        let mock = MockListingRepository::new();

        let request = axum::http::Request::builder()
            .method(Method::GET)
            .uri("/listings/bad%20id")
            .header("x-request-id", "edge-proxy-1")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(test_app(mock.clone()), request)
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "edge-proxy-1");
        assert_eq!(body_json(response).await["request_id"], "edge-proxy-1");
        mock.verify();
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque_server_error() {
        let mock = MockListingRepository::new();
        mock.expect(Call::FindAll, Reply::Fail("socket closed by 10.0.0.7".into()));

        let response = send(test_app(mock.clone()), Method::GET, "/listings", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INT_9999");
        assert!(!body.to_string().contains("10.0.0.7"));
        mock.verify();
    }
}

mod listing_post {
    use super::*;

    #[tokio::test]
    async fn test_creates_listing() {
        let mock = MockListingRepository::new();
        mock.expect(Call::Create(request_fields()), Reply::One(expected_listing()));

        let response = send(
            test_app(mock.clone()),
            Method::POST,
            "/listings/",
            Some(request_body()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, expected_body());
        mock.verify();
    }

    #[tokio::test]
    async fn test_numeric_scalars_are_stored_as_strings() {
        let mock = MockListingRepository::new();
        mock.expect(Call::Create(request_fields()), Reply::One(expected_listing()));

        let mut body = request_body();
        body["price"] = json!(888);
        body["fee"] = json!(888);
        body["active"] = json!(true);
        body["address"]["geo"] = json!({ "lat": 4, "lng": 4 });

        let response = send(test_app(mock.clone()), Method::POST, "/listings", Some(body)).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        mock.verify();
    }

    #[tokio::test]
    async fn test_missing_required_field_is_rejected() {
        let mock = MockListingRepository::new();

        let mut body = request_body();
        body.as_object_mut().unwrap().remove("fee");

        let response = send(test_app(mock.clone()), Method::POST, "/listings", Some(body)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        mock.verify();
    }

    #[tokio::test]
    async fn test_empty_required_field_is_rejected() {
        let mock = MockListingRepository::new();

        let mut body = request_body();
        body["type"] = json!("");

        let response = send(test_app(mock.clone()), Method::POST, "/listings", Some(body)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["field"], "type");
        mock.verify();
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let mock = MockListingRepository::new();

        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/listings")
            .header("content-type", "application/json")
            .body(axum::body::Body::from("{\"type\": "))
            .unwrap();
        let response = tower::ServiceExt::oneshot(test_app(mock.clone()), request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VAL_3003");
        mock.verify();
    }
}

mod listing_put {
    use super::*;

    fn uri() -> String {
        format!("/listings/{}", LISTING_ID)
    }

    #[tokio::test]
    async fn test_upsert_returns_created() {
        let mock = MockListingRepository::new();
        mock.expect(
            Call::UpdateOne(LISTING_ID.to_string(), request_fields()),
            Reply::Updated(UpdateOutcome::Upserted, expected_listing()),
        );

        let response = send(test_app(mock.clone()), Method::PUT, &uri(), Some(request_body())).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, expected_body());
        mock.verify();
    }

    #[tokio::test]
    async fn test_modification_returns_ok() {
        let mock = MockListingRepository::new();
        mock.expect(
            Call::UpdateOne(LISTING_ID.to_string(), request_fields()),
            Reply::Updated(UpdateOutcome::Modified, expected_listing()),
        );

        let response = send(test_app(mock.clone()), Method::PUT, &uri(), Some(request_body())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, expected_body());
        mock.verify();
    }

    #[tokio::test]
    async fn test_unchanged_returns_no_content() {
        let mock = MockListingRepository::new();
        mock.expect(
            Call::UpdateOne(LISTING_ID.to_string(), request_fields()),
            Reply::Updated(UpdateOutcome::Unchanged, expected_listing()),
        );

        let response = send(test_app(mock.clone()), Method::PUT, &uri(), Some(request_body())).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(response).await.is_empty());
        mock.verify();
    }

    #[tokio::test]
    async fn test_partial_payload_is_passed_through() {
        let mock = MockListingRepository::new();
        let patch = ListingFields {
            price: Some("999".into()),
            ..Default::default()
        };
        mock.expect(
            Call::UpdateOne(LISTING_ID.to_string(), patch),
            Reply::Updated(UpdateOutcome::Modified, expected_listing()),
        );

        let response = send(
            test_app(mock.clone()),
            Method::PUT,
            &uri(),
            Some(json!({ "price": "999" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        mock.verify();
    }

    #[tokio::test]
    async fn test_invalid_id_is_rejected() {
        let mock = MockListingRepository::new();

        let response = send(
            test_app(mock.clone()),
            Method::PUT,
            "/listings/not%20an%20id",
            Some(request_body()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["field"], "id");
        mock.verify();
    }
}

mod listing_delete {
    use super::*;

    #[tokio::test]
    async fn test_deletes_listing() {
        let mock = MockListingRepository::new();
        mock.expect(
            Call::DeleteById(LISTING_ID.to_string()),
            Reply::Maybe(Some(expected_listing())),
        );

        let uri = format!("/listings/{}", LISTING_ID);
        let response = send(test_app(mock.clone()), Method::DELETE, &uri, Some(request_body())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, expected_body());
        mock.verify();
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let mock = MockListingRepository::new();
        mock.expect(Call::DeleteById("gone".to_string()), Reply::Maybe(None));

        let response = send(test_app(mock.clone()), Method::DELETE, "/listings/gone", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        mock.verify();
    }
}

mod service_routes {
    use super::*;
    use listings_api::database::InMemoryListingRepository;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_health_reports_storage() {
        let app = test_app(Arc::new(InMemoryListingRepository::new()));

        let response = send(app, Method::GET, "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["dependencies"][0]["name"], "storage:memory");
    }

    #[tokio::test]
    async fn test_health_hides_store_failure_cause() {
        let mock = MockListingRepository::new();
        mock.fail_ping("auth failed for user admin at 10.0.0.7:5432");

        let response = send(test_app(mock.clone()), Method::GET, "/health", None).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["dependencies"][0]["status"], "unhealthy");
        let text = body.to_string();
        assert!(!text.contains("10.0.0.7"));
        assert!(!text.contains("auth failed"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_openapi_document_lists_listing_paths() {
        let app = test_app(Arc::new(InMemoryListingRepository::new()));

        let response = send(app, Method::GET, "/api/docs/openapi.json", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["paths"]["/listings"].is_object());
        assert!(body["paths"]["/listings/{id}"]["put"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let app = test_app(Arc::new(InMemoryListingRepository::new()));

        let response = send(app, Method::GET, "/nope", None).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers().get("x-content-type-options").unwrap(), "nosniff");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder_is_server_error() {
        let app = test_app(Arc::new(InMemoryListingRepository::new()));

        let response = send(app, Method::GET, "/metrics", None).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_full_lifecycle_against_in_memory_store() {
        let store = Arc::new(InMemoryListingRepository::new());

        let created = send(test_app(store.clone()), Method::POST, "/listings", Some(request_body())).await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        let id = created["_id"].as_str().unwrap().to_string();
        assert_eq!(created["__v"], 0);

        let uri = format!("/listings/{}", id);
        let unchanged = send(test_app(store.clone()), Method::PUT, &uri, Some(request_body())).await;
        assert_eq!(unchanged.status(), StatusCode::NO_CONTENT);

        let modified = send(
            test_app(store.clone()),
            Method::PUT,
            &uri,
            Some(json!({ "address": { "city": "Uppsala" } })),
        )
        .await;
        assert_eq!(modified.status(), StatusCode::OK);
        let modified = body_json(modified).await;
        assert_eq!(modified["address"]["city"], "Uppsala");
        assert_eq!(modified["address"]["street"], "hello");

        let by_price = send(test_app(store.clone()), Method::GET, "/listings?price=888", None).await;
        assert_eq!(body_json(by_price).await["_id"], id.as_str());

        let deleted = send(test_app(store.clone()), Method::DELETE, &uri, None).await;
        assert_eq!(deleted.status(), StatusCode::OK);

        let all = send(test_app(store.clone()), Method::GET, "/listings", None).await;
        assert_eq!(body_json(all).await, json!([]));
    }
}
