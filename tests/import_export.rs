mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{create_test_app, create_test_app_with, history_len};
use recon_tracker::config::environment::EnvironmentConfig;
use recon_tracker::services::csv_service;

#[tokio::test]
async fn test_import_status_reports_enabled_features() {
    let app = create_test_app();
    let (status, body) = app.get("/api/import/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["csvImportEnabled"], true);
    assert_eq!(body["data"]["csvExportEnabled"], true);
    // Sin SHEET_CSV_URL no hay sincronización
    assert_eq!(body["data"]["sheetSyncEnabled"], false);
}

#[tokio::test]
async fn test_import_maps_sheet_row() {
    let app = create_test_app();
    let csv_text = "Stock#,VIN,Year,Make,Model,Recon Cost\n1001,VIN123,2022,Ford,F-150,50\n";

    let (status, body) = app.post_csv("/api/import/csv", csv_text).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["created"], 1);
    assert_eq!(body["data"]["source"], "CSV upload");

    let (_, body) = app.get("/api/vehicles/VIN123").await;
    let vehicle = &body["data"];
    assert_eq!(vehicle["stockNumber"], "1001");
    assert_eq!(vehicle["year"], 2022);
    assert_eq!(vehicle["totalReconCost"].as_f64(), Some(50.0));
    assert_eq!(vehicle["currentReconStatus"], "New Arrival");
    assert_eq!(history_len(vehicle), 1);
    assert!(vehicle["statusHistory"][0]["notes"]
        .as_str()
        .unwrap_or_default()
        .contains("Imported"));
}

#[tokio::test]
async fn test_reimport_keeps_workflow_and_appends_marker() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN1", "1001").await;
    let (status, _) = app
        .post(
            &format!("/api/vehicles/{}/stages/mechanical/complete", id),
            json!({ "mechanicalCost": 80 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let csv_text = "VIN,Stock #,Mileage,Recon Status\nVIN1,1001,45000,In Shop\n";
    let (status, body) = app.post_csv("/api/import/csv", csv_text).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["resynced"], 1);
    assert_eq!(body["data"]["created"], 0);

    let (_, body) = app.get(&format!("/api/vehicles/{}", id)).await;
    let vehicle = &body["data"];
    assert_eq!(vehicle["mileage"], 45000);
    assert_eq!(vehicle["currentReconStatus"], "Detailing");
    assert_eq!(vehicle["totalReconCost"].as_f64(), Some(80.0));
    assert_eq!(history_len(vehicle), 3);
    let marker = vehicle["statusHistory"][2]["notes"].as_str().unwrap_or_default();
    assert!(marker.contains("Re-synced from CSV upload"));
    assert!(marker.contains("In Shop"));
}

#[tokio::test]
async fn test_import_without_identity_writes_nothing() {
    let app = create_test_app();
    let (status, body) = app
        .post_csv("/api/import/csv", "Make,Model\nFord,Focus\n")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["processed"], 0);
    assert_eq!(body["data"]["skipped"], 1);
    assert_eq!(body["message"], "No valid vehicle data found in CSV upload.");
    assert!(app.store.list_vehicles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_export_round_trips_history_and_review() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN1", "1001").await;
    let (status, _) = app
        .post(
            &format!("/api/vehicles/{}/stages/detailing/complete", id),
            json!({ "detailer": "Ana", "interiorQuality": 5, "exteriorQuality": 3 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, content_type, text) = app.get_text("/api/export/csv").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap_or_default().starts_with("text/csv"));
    assert!(text.starts_with("id,stockNumber,vin,"));

    let rows = csv_service::parse_rows(&text).unwrap();
    assert_eq!(rows.len(), 1);
    let history = csv_service::parse_serialized_history(&rows[0]["statusHistory"]).unwrap();
    let stored = app.store.get_vehicle(&id).await.unwrap().unwrap();
    assert_eq!(history, stored.status_history);

    let review = csv_service::parse_serialized_quality_review(&rows[0]["qualityReview"]).unwrap();
    assert_eq!(review, stored.quality_review);
}

#[tokio::test]
async fn test_export_of_empty_inventory_is_rejected() {
    let app = create_test_app();
    let (status, _, text) = app.get_text("/api/export/csv").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(text.contains("No data to export"));
}

#[tokio::test]
async fn test_sheet_sync_without_url_is_unavailable() {
    let app = create_test_app();
    let (status, body) = app.post("/api/import/sheet-sync", json!({})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_disabled_csv_features_only_affect_import_export() {
    let config = EnvironmentConfig {
        csv_features_enabled: false,
        ..EnvironmentConfig::default()
    };
    let app = create_test_app_with(config);

    let (status, body) = app.get("/api/import/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["csvImportEnabled"], false);
    assert!(body["data"]["diagnostic"].is_string());

    let (status, _) = app.post_csv("/api/import/csv", "VIN\nV1\n").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _, _) = app.get_text("/api/export/csv").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = app.get("/api/vehicles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_export_reimported_into_fresh_app_keeps_cost() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN1", "1001").await;
    let (status, _) = app
        .post(
            &format!("/api/vehicles/{}/stages/mechanical/complete", id),
            json!({ "mechanicalCost": 215.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, text) = app.get_text("/api/export/csv").await;
    assert_eq!(status, StatusCode::OK);

    let fresh = create_test_app();
    let (status, body) = fresh.post_csv("/api/import/csv", &text).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["created"], 1);

    let (_, body) = fresh.get(&format!("/api/vehicles/{}", id)).await;
    let vehicle = &body["data"];
    assert_eq!(vehicle["stockNumber"], "1001");
    assert_eq!(vehicle["totalReconCost"].as_f64(), Some(215.5));
    assert_eq!(vehicle["currentReconStatus"], "New Arrival");
    assert!(vehicle["statusHistory"][0]["notes"]
        .as_str()
        .unwrap_or_default()
        .ends_with("from sheet: Detailing"));
}

#[tokio::test]
async fn test_recon_start_after_resync() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN1", "1001").await;

    let (status, body) = app
        .post_csv("/api/import/csv", "VIN,Stock #,Recon Status\nVIN1,1001,Completed\n")
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["resynced"], 1);

    let (_, body) = app.get(&format!("/api/vehicles/{}", id)).await;
    assert_eq!(body["data"]["workflow"]["essentiallyNew"], true);
    assert_eq!(body["data"]["workflow"]["canonicalStage"], "New Arrival");

    let (status, body) = app.post(&format!("/api/vehicles/{}/recon/start", id), json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["currentReconStatus"], "Mechanical");
    assert_eq!(history_len(&body["data"]), 3);
}

#[tokio::test]
async fn test_import_alongside_workflow_update_keeps_both() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN1", "1001").await;
    let complete_path = format!("/api/vehicles/{}/stages/mechanical/complete", id);

    let ((import_status, _), (update_status, _)) = tokio::join!(
        app.post_csv("/api/import/csv", "VIN,Stock #,Mileage\nVIN1,1001,52000\n"),
        app.post(&complete_path, json!({ "mechanicalCost": 120 })),
    );
    assert_eq!(import_status, StatusCode::OK);
    assert_eq!(update_status, StatusCode::OK);

    let (_, body) = app.get(&format!("/api/vehicles/{}", id)).await;
    let vehicle = &body["data"];
    assert_eq!(vehicle["mileage"], 52000);
    assert_eq!(vehicle["totalReconCost"].as_f64(), Some(120.0));
    assert_eq!(vehicle["currentReconStatus"], "Detailing");
    assert_eq!(history_len(vehicle), 3);
}
