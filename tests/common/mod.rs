#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use recon_tracker::config::environment::EnvironmentConfig;
use recon_tracker::repositories::{MemoryVehicleStore, VehicleStore};
use recon_tracker::routes::create_router;
use recon_tracker::services::spawn_change_feed;
use recon_tracker::state::AppState;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn VehicleStore>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(EnvironmentConfig::default())
}

pub fn create_test_app_with(config: EnvironmentConfig) -> TestApp {
    let store: Arc<dyn VehicleStore> = Arc::new(MemoryVehicleStore::new());
    let (dashboard, _feed) = spawn_change_feed(store.clone());
    let state = AppState::new(store.clone(), config, reqwest::Client::new(), dashboard);
    TestApp {
        router: create_router(state),
        store,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// POST de texto CSV crudo
    pub async fn post_csv(&self, uri: &str, csv_text: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "text/csv")
            .body(Body::from(csv_text.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// GET que devuelve el cuerpo como texto (export CSV)
    pub async fn get_text(&self, uri: &str) -> (StatusCode, Option<String>, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Importa un vehículo mínimo y devuelve su id
    pub async fn seed_vehicle(&self, vin: &str, stock: &str) -> String {
        let csv_text = format!("VIN,Stock #,Year,Make,Model\n{},{},2022,Ford,F-150\n", vin, stock);
        let (status, body) = self.post_csv("/api/import/csv", &csv_text).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        vin.to_string()
    }
}

pub fn history_len(vehicle: &Value) -> usize {
    vehicle["statusHistory"].as_array().map(Vec::len).unwrap_or(0)
}
