use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use employee_service::model::Region;
use employee_service::{app, AppError, AppState, Repositories, Repository};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn router() -> Router {
    app(AppState::in_memory("employeeApp"), 1024 * 1024)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.expect("response expected");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");
    if body.is_empty() {
        return (status, headers, Value::Null);
    }
    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, headers, json)
}

async fn send_json(app: &Router, method: Method, uri: &str, payload: Value) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request should build");
    send(app, request).await
}

async fn send_empty(app: &Router, method: Method, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

#[tokio::test]
async fn create_then_get_returns_created_record() {
    let app = router();

    let (status, headers, created) =
        send_json(&app, Method::POST, "/api/regions", json!({ "regionName": "EMEA" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["regionId"].as_i64().expect("generated id");
    assert_eq!(headers[header::LOCATION], format!("/api/regions/{}", id));
    assert_eq!(headers["x-employeeapp-alert"], "employeeApp.employeeRegion.created");
    assert_eq!(headers["x-employeeapp-params"], id.to_string());

    let (status, _, fetched) = send_empty(&app, Method::GET, &format!("/api/regions/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_with_id_is_rejected() {
    let app = router();

    let (status, headers, body) =
        send_json(&app, Method::POST, "/api/countries", json!({ "countryId": 12, "countryName": "Peru" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["x-employeeapp-error"], "error.idexists");
    assert_eq!(headers["x-employeeapp-params"], "employeeCountry");
    assert_eq!(body["error"]["code"], "idexists");
    assert_eq!(body["error"]["entity"], "employeeCountry");

    let (_, _, list) = send_empty(&app, Method::GET, "/api/countries").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn job_create_then_merge_patch() {
    let app = router();

    let (status, headers, job) = send_json(
        &app,
        Method::POST,
        "/api/jobs",
        json!({ "title": "Developer", "minSalary": 50000, "maxSalary": 90000 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = job["jobId"].as_str().expect("generated text id").to_string();
    assert_eq!(headers[header::LOCATION], format!("/api/jobs/{}", id));
    assert_eq!(job["jobTitle"], "Developer");
    assert_eq!(job["minSalary"], 50000);
    assert_eq!(job["maxSalary"], 90000);

    let request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/api/jobs/{}", id))
        .header(header::CONTENT_TYPE, "application/merge-patch+json")
        .body(Body::from(json!({ "jobId": id, "minSalary": 55000 }).to_string()))
        .expect("request should build");
    let (status, headers, patched) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-employeeapp-alert"], "employeeApp.employeeJob.updated");
    assert_eq!(patched["minSalary"], 55000);
    assert_eq!(patched["maxSalary"], 90000);
    assert_eq!(patched["jobTitle"], "Developer");
}

#[tokio::test]
async fn update_enforces_identifier_rules() {
    let app = router();
    let (_, _, created) =
        send_json(&app, Method::POST, "/api/departments", json!({ "departmentName": "Sales" })).await;
    let id = created["departmentId"].as_i64().expect("generated id");
    let uri = format!("/api/departments/{}", id);

    let (status, headers, _) = send_json(&app, Method::PUT, &uri, json!({ "departmentName": "Ops" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["x-employeeapp-error"], "error.idnull");

    let (status, headers, _) =
        send_json(&app, Method::PUT, &uri, json!({ "departmentId": id + 1, "departmentName": "Ops" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["x-employeeapp-error"], "error.idinvalid");

    let (status, headers, _) =
        send_json(&app, Method::PUT, "/api/departments/99999", json!({ "departmentId": 99999 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["x-employeeapp-error"], "error.idnotfound");

    let (status, headers, _) =
        send_json(&app, Method::PATCH, "/api/departments/abc", json!({ "departmentId": id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["x-employeeapp-error"], "error.idinvalid");

    let (status, _, fetched) = send_empty(&app, Method::GET, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["departmentName"], "Sales");
}

#[tokio::test]
async fn put_overwrites_every_field() {
    let app = router();
    let (_, _, created) = send_json(
        &app,
        Method::POST,
        "/api/locations",
        json!({ "streetAddress": "1 Main St", "city": "Lima", "postalCode": "15001" }),
    )
    .await;
    let id = created["locationId"].as_i64().expect("generated id");
    let uri = format!("/api/locations/{}", id);

    let (status, _, updated) = send_json(&app, Method::PUT, &uri, json!({ "locationId": id, "city": "Cusco" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Cusco");
    assert_eq!(updated["streetAddress"], Value::Null);
    assert_eq!(updated["postalCode"], Value::Null);
}

#[tokio::test]
async fn partial_update_keeps_untouched_fields() {
    let app = router();
    let (_, _, created) = send_json(
        &app,
        Method::POST,
        "/api/employees",
        json!({ "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com", "hireDate": "2021-03-15" }),
    )
    .await;
    let id = created["employeeId"].as_i64().expect("generated id");

    let (status, _, patched) = send_json(
        &app,
        Method::PATCH,
        &format!("/api/employees/{}", id),
        json!({ "employeeId": id, "lastName": "King", "email": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["firstName"], "Ada");
    assert_eq!(patched["lastName"], "King");
    assert_eq!(patched["email"], "ada@example.com");
    assert_eq!(patched["hireDate"], "2021-03-15");
}

#[tokio::test]
async fn delete_is_idempotent() {
    let app = router();
    let (_, _, created) = send_json(&app, Method::POST, "/api/regions", json!({ "regionName": "APAC" })).await;
    let uri = format!("/api/regions/{}", created["regionId"]);

    let (status, headers, body) = send_empty(&app, Method::DELETE, &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert_eq!(headers["x-employeeapp-alert"], "employeeApp.employeeRegion.deleted");

    let (status, _, _) = send_empty(&app, Method::DELETE, &uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, body) = send_empty(&app, Method::GET, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn list_returns_every_created_record() {
    let app = router();
    let names = ["Peru", "Chile", "Bolivia"];
    for name in names {
        let (status, _, _) = send_json(&app, Method::POST, "/api/countries", json!({ "countryName": name })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, list) = send_empty(&app, Method::GET, "/api/countries").await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<&str> = list
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|c| c["countryName"].as_str())
        .collect();
    assert_eq!(listed, names);
}

#[tokio::test]
async fn references_are_rendered_by_key() {
    let app = router();
    let (_, _, region) = send_json(&app, Method::POST, "/api/regions", json!({ "regionName": "LATAM" })).await;
    let (status, _, country) = send_json(
        &app,
        Method::POST,
        "/api/countries",
        json!({ "countryName": "Peru", "region": { "regionId": region["regionId"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(country["region"]["regionId"], region["regionId"]);
    assert_eq!(country["region"]["regionName"], "LATAM");
    assert!(country["region"].get("countries").is_none());

    let (status, _, region) =
        send_empty(&app, Method::GET, &format!("/api/regions/{}", region["regionId"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(region["countries"][0]["countryName"], "Peru");
    assert!(region["countries"][0].get("region").is_none());
}

#[tokio::test]
async fn unknown_reference_is_a_bad_request() {
    let app = router();
    let (status, _, _) = send_json(
        &app,
        Method::POST,
        "/api/countries",
        json!({ "countryName": "Atlantis", "region": { "regionId": 999999 } }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, list) = send_empty(&app, Method::GET, "/api/countries").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn deleting_owner_nulls_child_reference() {
    let app = router();
    let (_, _, region) = send_json(&app, Method::POST, "/api/regions", json!({ "regionName": "Oceania" })).await;
    let (_, _, country) = send_json(
        &app,
        Method::POST,
        "/api/countries",
        json!({ "countryName": "Fiji", "region": { "regionId": region["regionId"] } }),
    )
    .await;
    assert_eq!(country["region"]["regionId"], region["regionId"]);

    let (status, _, _) = send_empty(&app, Method::DELETE, &format!("/api/regions/{}", region["regionId"])).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, country) =
        send_empty(&app, Method::GET, &format!("/api/countries/{}", country["countryId"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(country["countryName"], "Fiji");
    assert_eq!(country["region"], Value::Null);
}

#[tokio::test]
async fn field_values_are_stored_as_sent() {
    let app = router();
    let (status, _, job) = send_json(
        &app,
        Method::POST,
        "/api/jobs",
        json!({ "jobTitle": "Clerk", "minSalary": 50000, "maxSalary": 90000 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = job["jobId"].as_str().expect("generated text id").to_string();

    let (status, _, patched) = send_json(
        &app,
        Method::PATCH,
        &format!("/api/jobs/{}", id),
        json!({ "jobId": id, "minSalary": 100000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["minSalary"], 100000);
    assert_eq!(patched["maxSalary"], 90000);

    let (status, _, employee) =
        send_json(&app, Method::POST, "/api/employees", json!({ "firstName": "Ada", "email": "ada" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(employee["email"], "ada");

    let (status, _, _) = send_json(
        &app,
        Method::POST,
        "/api/job-histories",
        json!({ "startDate": "2022-05-01", "endDate": "2021-05-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn path_id_matches_by_value() {
    let app = router();
    let (_, _, created) = send_json(&app, Method::POST, "/api/regions", json!({ "regionName": "EMEA" })).await;
    let id = created["regionId"].as_i64().expect("generated id");

    let (status, _, updated) = send_json(
        &app,
        Method::PUT,
        &format!("/api/regions/0{}", id),
        json!({ "regionId": id, "regionName": "APAC" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["regionName"], "APAC");
}

/// Reports every region as present but never finds one.
struct VanishingRegions;

#[async_trait]
impl Repository<Region> for VanishingRegions {
    async fn find_all(&self) -> Result<Vec<Region>, AppError> {
        Ok(Vec::new())
    }

    async fn find_by_id(&self, _id: &i64) -> Result<Option<Region>, AppError> {
        Ok(None)
    }

    async fn exists_by_id(&self, _id: &i64) -> Result<bool, AppError> {
        Ok(true)
    }

    async fn save(&self, entity: Region) -> Result<Region, AppError> {
        Ok(entity)
    }

    async fn delete_by_id(&self, _id: &i64) -> Result<(), AppError> {
        Ok(())
    }
}

#[tokio::test]
async fn patch_of_vanished_record_is_not_found() {
    let mut repositories = Repositories::in_memory();
    repositories.regions = Arc::new(VanishingRegions);
    let app = app(AppState::new("employeeApp", repositories, None), 1024 * 1024);

    let (status, _, body) =
        send_json(&app, Method::PATCH, "/api/regions/7", json!({ "regionId": 7, "regionName": "EMEA" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let app = router();

    let (status, _, body) = send_empty(&app, Method::GET, "/api/regions/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _, _) = send_empty(&app, Method::DELETE, "/api/employees/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send_empty(&app, Method::GET, "/api/jobs/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/regions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .expect("request should build");
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send_json(&app, Method::POST, "/api/regions", json!([1, 2])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send_json(&app, Method::POST, "/api/regions", json!({ "regionId": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn headers_use_configured_app_name() {
    let app = app(AppState::in_memory("hrApp"), 1024);
    let (status, headers, _) = send_json(&app, Method::POST, "/api/regions", json!({ "regionName": "EMEA" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers["x-hrapp-alert"], "hrApp.employeeRegion.created");

    let (status, headers, _) = send_json(&app, Method::POST, "/api/regions", json!({ "regionId": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers["x-hrapp-error"], "error.idexists");
}

#[tokio::test]
async fn common_routes_report_status() {
    let app = router();

    let (status, _, body) = send_empty(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, _, body) = send_empty(&app, Method::GET, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "store": "ok" }));

    let (status, _, body) = send_empty(&app, Method::GET, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "employee-service");
}
