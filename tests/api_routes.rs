use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use school_records::api::routes::create_router;
use school_records::seed::load_seed_data;
use school_records::service::SchoolServices;
use school_records::store::MemoryStore;

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    async fn spawn(seed: bool) -> Self {
        let services = SchoolServices::new(Arc::new(MemoryStore::school()));
        if seed {
            load_seed_data(&services).await.unwrap();
        }
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(services);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            client: Client::new(),
            base_url: format!("http://{}", addr),
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    async fn patch(&self, path: &str, json: Value) -> reqwest::Response {
        self.client
            .patch(format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
            .unwrap()
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }
}

fn student_body(first: &str) -> Value {
    json!({
        "firstName": first,
        "lastName": "Nakamura",
        "email": format!("{}@school.edu", first.to_lowercase()),
        "grade": "10th",
        "dateOfBirth": "2008-06-01",
        "enrollmentDate": "2023-08-28",
        "status": "Active"
    })
}

#[tokio::test]
async fn health_reports_healthy() {
    let client = TestClient::spawn(false).await;

    let response = client.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn student_crud_over_http() {
    let client = TestClient::spawn(false).await;

    let created = client.post("/students", student_body("Yuki")).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["firstName"], "Yuki");

    let patched = client
        .patch("/students/1", json!({"grade": "11th"}))
        .await;
    assert_eq!(patched.status(), StatusCode::OK);
    let patched: Value = patched.json().await.unwrap();
    assert_eq!(patched["grade"], "11th");
    assert_eq!(patched["email"], "yuki@school.edu");

    let list: Value = client.get("/students").await.json().await.unwrap();
    assert_eq!(list["total"], 1);

    let deleted = client.delete("/students/1").await;
    assert_eq!(deleted.status(), StatusCode::OK);
    let deleted: Value = deleted.json().await.unwrap();
    assert_eq!(deleted["deleted"], true);

    assert_eq!(client.delete("/students/1").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(client.get("/students/1").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_create_returns_field_errors() {
    let client = TestClient::spawn(false).await;

    let mut body = student_body("Yuki");
    body["email"] = json!("");
    let response = client.post("/students", body).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fieldErrors"][0]["fieldLabel"], "email_c");
}

#[tokio::test]
async fn student_search_filters_by_name() {
    let client = TestClient::spawn(false).await;
    for name in ["Yuki", "Mateo", "Yusuf"] {
        client.post("/students", student_body(name)).await;
    }

    let body: Value = client
        .get("/students?search=yu")
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["firstName"], "Yuki");
    assert_eq!(body["items"][1]["firstName"], "Yusuf");
}

#[tokio::test]
async fn seeded_views_are_served() {
    let client = TestClient::spawn(true).await;

    let dashboard: Value = client.get("/dashboard").await.json().await.unwrap();
    assert_eq!(dashboard["activeStudents"], 4);
    assert_eq!(dashboard["totalClasses"], 3);

    let summary = client.get("/students/1/summary").await;
    assert_eq!(summary.status(), StatusCode::OK);
    let summary: Value = summary.json().await.unwrap();
    assert_eq!(summary["student"]["firstName"], "Emma");
    assert_eq!(summary["grades"].as_array().unwrap().len(), 3);

    let roster = client.get("/classes/1/roster").await;
    assert_eq!(roster.status(), StatusCode::OK);
    let roster: Value = roster.json().await.unwrap();
    assert_eq!(roster["class"]["name"], "Algebra II");
    assert_eq!(roster["students"].as_array().unwrap().len(), 4);

    let grades: Value = client
        .get("/grades?classId=2&studentId=1")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(grades["total"], 1);
    assert_eq!(grades["items"][0]["assignmentName"], "Unit 1 Test");

    let blank = client.get("/grades?search=&classId=&studentId=").await;
    assert_eq!(blank.status(), StatusCode::OK);
    let blank: Value = blank.json().await.unwrap();
    assert_eq!(blank["total"], 12);

    assert_eq!(
        client.get("/students/99/summary").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn attendance_sheet_is_posted_per_class() {
    let client = TestClient::spawn(true).await;

    let response = client
        .post(
            "/classes/2/attendance",
            json!({
                "date": "2024-09-11",
                "marks": [
                    {"studentId": 1, "status": "Present"},
                    {"studentId": 2, "status": "Late", "notes": "traffic"}
                ]
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome: Value = response.json().await.unwrap();
    assert_eq!(outcome["saved"].as_array().unwrap().len(), 2);
    assert!(outcome["failed"].as_array().unwrap().is_empty());

    let all: Value = client.get("/attendance").await.json().await.unwrap();
    assert_eq!(all["total"], 10);

    let missing = client
        .post(
            "/classes/42/attendance",
            json!({"date": "2024-09-11", "marks": []}),
        )
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
