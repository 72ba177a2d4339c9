mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

use common::{create_test_app, history_len};

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "recon_tracker");
}

#[tokio::test]
async fn test_full_workflow_from_import_to_sold() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN1", "1001").await;

    let (status, body) = app.get(&format!("/api/vehicles/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    let vehicle = &body["data"];
    assert_eq!(vehicle["currentReconStatus"], "New Arrival");
    assert_eq!(vehicle["workflow"]["canonicalStage"], "New Arrival");
    assert_eq!(vehicle["workflow"]["essentiallyNew"], true);
    assert_eq!(history_len(vehicle), 1);

    // Solicitud de servicio
    let (status, body) = app.post(&format!("/api/vehicles/{}/recon/start", id), json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["currentReconStatus"], "Mechanical");
    assert_eq!(history_len(&body["data"]), 2);

    // Mecánica completa: pasa a Detailing
    let (status, body) = app
        .post(
            &format!("/api/vehicles/{}/stages/mechanical/complete", id),
            json!({ "mechanicalCost": 120 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["currentReconStatus"], "Detailing");
    assert_eq!(body["data"]["totalReconCost"].as_f64(), Some(120.0));
    assert_eq!(history_len(&body["data"]), 3);

    let (status, body) = app
        .post(
            &format!("/api/vehicles/{}/stages/detailing/complete", id),
            json!({ "detailer": "Ana", "interiorQuality": 5, "exteriorQuality": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["currentReconStatus"], "Photos");
    assert_eq!(body["data"]["qualityReview"]["detailer"], "Ana");
    assert_eq!(history_len(&body["data"]), 4);

    // Fotos y título no agregan historial
    let (status, body) = app
        .put(
            &format!("/api/vehicles/{}/photo-status", id),
            json!({ "photoStatus": "Taken" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(history_len(&body["data"]), 4);
    assert!(body["data"]["reconCompleteDate"].is_null());

    let (status, body) = app
        .put(
            &format!("/api/vehicles/{}/title-in-house", id),
            json!({ "titleInHouse": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["currentReconStatus"], "Lot Ready");
    assert_eq!(body["data"]["workflow"]["lotReadyEligible"], true);
    assert_eq!(history_len(&body["data"]), 4);
    let completed_at = body["data"]["reconCompleteDate"].clone();
    assert!(completed_at.is_string());

    // Recalcular de nuevo no mueve la fecha de finalización
    let (_, body) = app
        .put(
            &format!("/api/vehicles/{}/title-in-house", id),
            json!({ "titleInHouse": true }),
        )
        .await;
    assert_eq!(body["data"]["reconCompleteDate"], completed_at);

    let (status, body) = app.post(&format!("/api/vehicles/{}/sold", id), json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["currentReconStatus"], "Sold");
    assert!(body["data"]["retailDate"].is_string());
    assert_eq!(history_len(&body["data"]), 5);

    let (_, body) = app.get("/api/vehicles?view=sold").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    let (_, body) = app.get("/api/vehicles").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_completing_mechanical_from_new_arrival_moves_to_detailing() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN2", "2002").await;

    let (status, body) = app
        .post(
            &format!("/api/vehicles/{}/stages/mechanical/complete", id),
            json!({ "mechanicalCost": "$1,200.50" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["currentReconStatus"], "Detailing");
    assert_eq!(body["data"]["totalReconCost"].as_f64(), Some(1200.5));
}

#[tokio::test]
async fn test_detailing_without_detailer_is_rejected_without_writing() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN3", "3003").await;

    let (status, body) = app
        .post(
            &format!("/api/vehicles/{}/stages/detailing/complete", id),
            json!({ "detailer": "", "interiorQuality": 4, "exteriorQuality": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = app.get(&format!("/api/vehicles/{}", id)).await;
    assert_eq!(history_len(&body["data"]), 1);
    assert_eq!(body["data"]["qualityReview"]["detailer"], "");
}

#[tokio::test]
async fn test_detailing_score_out_of_range_is_rejected() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN4", "4004").await;

    let (status, body) = app
        .post(
            &format!("/api/vehicles/{}/stages/detailing/complete", id),
            json!({ "detailer": "Ana", "interiorQuality": 7, "exteriorQuality": 4 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_selling_requires_lot_ready() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN5", "5005").await;

    let (status, body) = app.post(&format!("/api/vehicles/{}/sold", id), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_start_stage_records_entry_and_rejects_lot_ready() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN6", "6006").await;

    let (status, body) = app
        .post(
            &format!("/api/vehicles/{}/stages/start", id),
            json!({ "stage": "Detailing", "notes": "Bay 3" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(history_len(&body["data"]), 2);

    let (status, _) = app
        .post(
            &format!("/api/vehicles/{}/stages/start", id),
            json!({ "stage": "Lot Ready" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_recon_start_only_once() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN7", "7007").await;

    let (status, _) = app.post(&format!("/api/vehicles/{}/recon/start", id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post(&format!("/api/vehicles/{}/recon/start", id), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unknown_vehicle_is_not_found() {
    let app = create_test_app();

    let (status, body) = app.get("/api/vehicles/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app.delete("/api/vehicles/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_vehicle() {
    let app = create_test_app();
    let id = app.seed_vehicle("VIN8", "8008").await;

    let (status, body) = app.delete(&format!("/api/vehicles/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(app.store.get_vehicle(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_search_and_needs_attention() {
    let app = create_test_app();
    app.seed_vehicle("VINA", "100").await;
    app.seed_vehicle("VINB", "200").await;

    let (_, body) = app.get("/api/vehicles?view=needs_attention").await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (_, body) = app.get("/api/vehicles?view=all&search=vinb").await;
    let rows = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["vin"], "VINB");
}

#[tokio::test]
async fn test_analytics_dashboard_follows_changes() {
    let app = create_test_app();
    app.seed_vehicle("VIN9", "9009").await;

    // El change feed recalcula en segundo plano
    let mut seen = 0;
    for _ in 0..50 {
        let (status, body) = app.get("/api/analytics").await;
        assert_eq!(status, StatusCode::OK);
        seen = body["data"]["vehicles"].as_array().map(Vec::len).unwrap_or(0);
        if seen == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(seen, 1);
}

#[tokio::test]
async fn test_detailer_settings() {
    let app = create_test_app();

    let (status, body) = app.post("/api/detailers", json!({ "name": "Ana" })).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["detailers"], json!(["Ana"]));

    let (status, _) = app.post("/api/detailers", json!({ "name": "Ana" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post("/api/detailers", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.delete("/api/detailers/Ana").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete("/api/detailers/Ana").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/detailers").await;
    assert_eq!(body["data"]["detailers"], json!([]));
}
