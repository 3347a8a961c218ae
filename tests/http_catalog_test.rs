use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use uni_scout::{
    ApplicationRequest, CatalogService, CriteriaStore, CriteriaUpdate, DegreeLevel, FinderError,
    FinderSession, HttpCatalogService, ItemId, SessionOptions,
};

fn catalog_payload() -> serde_json::Value {
    json!([
        {"id": 1, "name": "Massachusetts Institute of Technology", "city": "Cambridge",
         "country": "USA", "degree_level": "Bachelor", "tuition_fee": 53790,
         "required_gpa": 3.9, "required_ielts": 7.0, "ranking": 1,
         "logo_url": "https://example.com/mit.png"},
        {"id": 2, "name": "University of Toronto", "city": "Toronto",
         "country": "Canada", "degree_level": "Master", "tuition_fee": 18000,
         "required_gpa": 3.3, "required_ielts": 6.5, "ranking": 21}
    ])
}

#[tokio::test]
async fn test_list_all_decodes_catalog() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET).path("/universities");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(catalog_payload());
    });

    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();
    let items = service.list_all().await.unwrap();

    listing.assert();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, ItemId(1));
    assert_eq!(items[0].degree_level, DegreeLevel::Bachelor);
    assert_eq!(items[0].initials(), "MI");
    assert_eq!(items[1].location(), "Toronto, Canada");
    assert_eq!(items[1].logo_url, None);
}

#[tokio::test]
async fn test_list_all_skips_invalid_records() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/universities");
        then.status(200).json_body(json!([
            {"id": 1, "name": "Valid", "city": "A", "country": "UK",
             "degree_level": "PhD", "tuition_fee": 20000, "ranking": 4},
            {"id": 2, "name": "Negative fee", "city": "B", "country": "UK",
             "degree_level": "PhD", "tuition_fee": -5, "ranking": 5},
            {"id": 3, "name": "Bad GPA", "city": "C", "country": "UK",
             "degree_level": "PhD", "tuition_fee": 100, "required_gpa": 5.5, "ranking": 6},
            {"id": 4, "name": "Unknown degree", "city": "D", "country": "UK",
             "degree_level": "Diploma", "tuition_fee": 100, "ranking": 7}
        ]));
    });

    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();
    let items = service.list_all().await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Valid");
    assert_eq!(items[0].required_gpa, 0.0);
}

#[tokio::test]
async fn test_query_sends_criteria_as_parameters() {
    let server = MockServer::start();
    let filter = server.mock(|when, then| {
        when.method(GET)
            .path("/universities/filter")
            .query_param("country", "Canada")
            .query_param("degree_level", "Master")
            .query_param("min_fee", "0")
            .query_param("max_fee", "20000")
            .query_param("user_gpa", "3.5");
        then.status(200).json_body(json!([catalog_payload()[1]]));
    });

    let mut store = CriteriaStore::default();
    store.update(CriteriaUpdate::Country("Canada".to_string()));
    store.update(CriteriaUpdate::Degree("Master's".to_string()));
    store.update(CriteriaUpdate::MaxFee("20000".to_string()));
    store.update(CriteriaUpdate::UserGpa("3.5".to_string()));

    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();
    let items = service.query(store.current()).await.unwrap();

    filter.assert();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "University of Toronto");
}

#[tokio::test]
async fn test_query_omits_wildcard_filters() {
    let server = MockServer::start();
    let filter = server.mock(|when, then| {
        when.method(GET)
            .path("/universities/filter")
            .query_param("min_fee", "0")
            .query_param("max_fee", "60000");
        then.status(200).json_body(catalog_payload());
    });
    let with_country = server.mock(|when, then| {
        when.method(GET)
            .path("/universities/filter")
            .query_param_exists("country");
        then.status(500);
    });

    let store = CriteriaStore::default();
    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();
    let items = service.query(store.current()).await.unwrap();

    assert_eq!(items.len(), 2);
    filter.assert();
    with_country.assert_hits(0);
}

#[tokio::test]
async fn test_server_error_uses_error_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/universities/filter");
        then.status(500)
            .json_body(json!({"error": "Database connection lost"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/universities");
        then.status(503).body("<html>maintenance</html>");
    });

    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();

    let err = service
        .query(CriteriaStore::default().current())
        .await
        .unwrap_err();
    match err {
        FinderError::ServiceStatus { status, ref message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Database connection lost");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = service.list_all().await.unwrap_err();
    assert_eq!(err.user_friendly_message(), "Error: Something went wrong");
}

#[tokio::test]
async fn test_unreachable_service_is_api_error() {
    let service =
        HttpCatalogService::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
    let err = service.list_all().await.unwrap_err();
    assert!(matches!(err, FinderError::Api(_)));
    assert_eq!(err.user_friendly_message(), "Network error. Please try again.");
}

#[tokio::test]
async fn test_submit_application_posts_form() {
    let server = MockServer::start();
    let submit = server.mock(|when, then| {
        when.method(POST)
            .path("/universities/applications")
            .json_body(json!({
                "university_id": 2,
                "university_name": "University of Toronto",
                "full_name": "Jane Doe",
                "email": "jane@example.com",
                "phone": "+1 555 0100",
                "country": "Canada",
                "gpa": "3.6",
                "ielts": "7",
                "message": ""
            }));
        then.status(201)
            .json_body(json!({"message": "Application received"}));
    });

    let request = ApplicationRequest {
        university_id: ItemId(2),
        university_name: "University of Toronto".to_string(),
        full_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "+1 555 0100".to_string(),
        country: "Canada".to_string(),
        gpa: "3.6".to_string(),
        ielts: "7".to_string(),
        ..ApplicationRequest::default()
    };

    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();
    let ack = assert_ok!(service.submit_application(&request).await);

    submit.assert();
    assert_eq!(ack.university_id, ItemId(2));
    assert_eq!(ack.message, "Application received");
}

#[tokio::test]
async fn test_rejected_application_reports_service_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/universities/applications");
        then.status(400)
            .json_body(json!({"error": "Missing required fields"}));
    });

    let request = ApplicationRequest {
        university_id: ItemId(1),
        university_name: "MIT".to_string(),
        full_name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        ..ApplicationRequest::default()
    };

    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();
    let err = assert_err!(service.submit_application(&request).await);
    assert_eq!(err.user_friendly_message(), "Error: Missing required fields");
}

#[tokio::test]
async fn test_invalid_application_is_not_sent() {
    let server = MockServer::start();
    let submit = server.mock(|when, then| {
        when.method(POST).path("/universities/applications");
        then.status(201);
    });

    let request = ApplicationRequest {
        university_id: ItemId(1),
        university_name: "MIT".to_string(),
        full_name: "Jane Doe".to_string(),
        email: "not-an-email".to_string(),
        ..ApplicationRequest::default()
    };

    let service = HttpCatalogService::new(&server.base_url(), None).unwrap();
    let err = service.submit_application(&request).await.unwrap_err();

    assert!(matches!(err, FinderError::Validation { .. }));
    submit.assert_hits(0);
}

#[tokio::test]
async fn test_session_over_http_sends_one_filtered_query() {
    let server = MockServer::start();
    let filter = server.mock(|when, then| {
        when.method(GET)
            .path("/universities/filter")
            .query_param("country", "USA")
            .query_param("max_fee", "55000");
        then.status(200).json_body(json!([catalog_payload()[0]]));
    });

    let service = Arc::new(HttpCatalogService::new(&server.base_url(), None).unwrap());
    let options = SessionOptions {
        quiescence: Duration::from_millis(50),
        load_listing_on_start: false,
        ..SessionOptions::default()
    };
    let (handle, task) = FinderSession::spawn(service, options);

    handle
        .update(CriteriaUpdate::Country("USA".to_string()))
        .await
        .unwrap();
    handle
        .update(CriteriaUpdate::MaxFee("55000".to_string()))
        .await
        .unwrap();
    handle
        .update(CriteriaUpdate::UserIelts("7.5".to_string()))
        .await
        .unwrap();

    let view = handle.settled().await.unwrap();
    handle.shutdown().await.unwrap();
    task.await.unwrap();

    filter.assert_hits(1);
    assert_eq!(view.count, 1);
    assert_eq!(view.items[0].item.name, "Massachusetts Institute of Technology");
    assert_eq!(view.eligible_count(), 1);
}
