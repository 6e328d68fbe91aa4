mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, json_body, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn only_admins_register_trucks() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new().await? else {
        return Ok(());
    };
    let (admin, clerk) = app.admin_and_clerk().await?;

    let payload = json!({ "name": "Volvo FH16", "plate": "KBX 123A", "capacity": 30 });
    let response = app.post_json("/api/trucks", &payload, Some(&clerk)).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.post_json("/api/trucks", &payload, Some(&admin)).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let truck = json_body(response).await?;
    assert_eq!(truck["name"], "Volvo FH16");
    assert_eq!(truck["status"], "available");

    let response = app
        .post_json(
            "/api/trucks",
            &json!({ "name": "  ", "plate": "X", "capacity": 1 }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/trucks",
            &json!({ "name": "Scania", "plate": "X", "capacity": -4 }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn list_reflects_new_truck_immediately() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new().await? else {
        return Ok(());
    };
    let (admin, clerk) = app.admin_and_clerk().await?;

    // warm the cache with an empty list
    let response = app.get("/api/trucks", Some(&clerk)).await?;
    assert_eq!(json_body(response).await?, json!([]));

    app.create_truck(&admin, "MAN TGX", "KCA 001B").await?;

    let response = app.get("/api/trucks", Some(&clerk)).await?;
    let trucks = json_body(response).await?;
    assert_eq!(trucks.as_array().map(Vec::len), Some(1));
    assert_eq!(trucks[0]["plate"], "KCA 001B");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn manual_status_overrides_and_clears() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new().await? else {
        return Ok(());
    };
    let (admin, clerk) = app.admin_and_clerk().await?;
    let truck_id = app.create_truck(&admin, "Isuzu FVZ", "KDD 900C").await?;
    let path = format!("/api/trucks/{truck_id}/status");

    let response = app
        .patch_json(&path, &json!({ "status": "maintenance" }), Some(&clerk))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .patch_json(&path, &json!({ "status": "in-transit" }), Some(&admin))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .patch_json(&path, &json!({ "status": "maintenance" }), Some(&admin))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await?["status"], "maintenance");

    let response = app.get(&format!("/api/trucks/{truck_id}"), Some(&clerk)).await?;
    assert_eq!(json_body(response).await?["truck"]["status"], "maintenance");

    let response = app
        .patch_json(&path, &json!({ "status": "available" }), Some(&admin))
        .await?;
    assert_eq!(json_body(response).await?["status"], "available");

    let response = app
        .patch_json(
            &format!("/api/trucks/{}/status", Uuid::new_v4()),
            &json!({ "status": "retired" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn unknown_truck_is_not_found() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new().await? else {
        return Ok(());
    };
    let (_, clerk) = app.admin_and_clerk().await?;

    let response = app
        .get(&format!("/api/trucks/{}", Uuid::new_v4()), Some(&clerk))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await?["error"], "resource not found");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn list_filters_by_derived_status() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let Some(app) = TestApp::try_new().await? else {
        return Ok(());
    };
    let (admin, clerk) = app.admin_and_clerk().await?;
    let idle = app.create_truck(&admin, "Truck Idle", "IDL-1").await?;
    let busy = app.create_truck(&admin, "Truck Busy", "BSY-1").await?;
    let parked = app.create_truck(&admin, "Truck Parked", "PRK-1").await?;

    app.create_hire_out(
        &clerk,
        &json!({
            "truck_id": busy,
            "customer_name": "Acme Freight",
            "start_date": "2025-01-01",
            "load_amount": 1000,
            "total_earnings": 500
        }),
    )
    .await?;
    let response = app
        .patch_json(
            &format!("/api/trucks/{parked}/status"),
            &json!({ "status": "retired" }),
            Some(&admin),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    for (filter, expected) in [
        ("available", Some(idle)),
        ("in-transit", Some(busy)),
        ("retired", Some(parked)),
        ("maintenance", None),
    ] {
        let response = app
            .get(&format!("/api/trucks?status={filter}"), Some(&clerk))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let trucks = json_body(response).await?;
        let ids: Vec<String> = trucks
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(ids, expected.map(|id| id.to_string()).into_iter().collect::<Vec<_>>());
    }

    let response = app.get("/api/trucks?status=all", Some(&clerk)).await?;
    assert_eq!(json_body(response).await?.as_array().map(Vec::len), Some(3));

    let response = app.get("/api/trucks?status=parked", Some(&clerk)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}
