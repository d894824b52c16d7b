use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, remote_plant, routes};
use server::entity::{photo, plant};

/// Insert a historical photo row for the plant with the given remote id.
async fn insert_historical(app: &TestApp, remote_id: &str, file: &str, order: Option<i32>) {
    let plant = plant::Entity::find()
        .filter(plant::Column::RemoteId.eq(remote_id))
        .one(&app.db)
        .await
        .unwrap()
        .expect("plant exists");
    let path = format!("historical/{remote_id}/{file}");
    photo::ActiveModel {
        id: Set(Uuid::now_v7()),
        plant_id: Set(plant.id),
        storage_path: Set(path.clone()),
        photo_url: Set(format!("http://photos.test/{path}")),
        source: Set(common::PhotoSource::Historical),
        remote_image_url: Set(None),
        remote_last_updated: Set(None),
        display_order: Set(order),
        taken_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .expect("insert historical photo");
}

#[tokio::test]
async fn list_is_empty_before_first_sync() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::PLANTS).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"data": []}));
}

#[tokio::test]
async fn list_shows_synced_plants_with_thumbnails() {
    let app = TestApp::spawn_with_token().await;
    app.planta.add_image("a.jpg", b"photo-a");
    app.planta.set_plants(vec![
        remote_plant("p2", None, &app.planta_url),
        remote_plant("p1", Some(("a.jpg", "2025-06-29T00:22:14.333Z")), &app.planta_url),
    ]);
    app.sync().await;
    insert_historical(&app, "p1", "01.jpeg", Some(1)).await;

    let res = app.get(routes::PLANTS).await;

    assert_eq!(res.status, 200);
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    // Ordered by localized name.
    assert_eq!(data[0]["remote_id"], "p1");
    assert_eq!(data[0]["display_name"], "Plant p1");
    assert_eq!(data[0]["location"], "Living room");
    assert_eq!(data[0]["photo_count"], 2);
    assert!(
        data[0]["thumbnail_url"]
            .as_str()
            .unwrap()
            .ends_with("planta/p1-2025-06-29T00-22-14.333Z.webp")
    );
    assert!(data[0]["last_updated"].is_string());
    assert_eq!(data[1]["remote_id"], "p2");
    assert_eq!(data[1]["photo_count"], 0);
    assert!(data[1]["thumbnail_url"].is_null());
}

#[tokio::test]
async fn inactive_plants_are_hidden() {
    let app = TestApp::spawn_with_token().await;
    app.planta
        .set_plants(vec![remote_plant("p1", None, &app.planta_url)]);
    app.sync().await;

    let row = plant::Entity::find().one(&app.db).await.unwrap().unwrap();
    let id = row.id;
    plant::ActiveModel {
        id: Set(id),
        is_active: Set(false),
        ..Default::default()
    }
    .update(&app.db)
    .await
    .unwrap();

    let list = app.get(routes::PLANTS).await;
    assert_eq!(list.body["data"], json!([]));

    let detail = app.get(&routes::plant(&id.to_string())).await;
    assert_eq!(detail.status, 404);
}

#[tokio::test]
async fn detail_orders_timeline() {
    let app = TestApp::spawn_with_token().await;
    app.planta.add_image("a.jpg", b"photo-a");
    app.planta.set_plants(vec![remote_plant(
        "p1",
        Some(("a.jpg", "2025-06-29T00:22:14.333Z")),
        &app.planta_url,
    )]);
    app.sync().await;
    insert_historical(&app, "p1", "noNumber.png", None).await;
    insert_historical(&app, "p1", "IMG_0042.jpg", Some(42)).await;
    insert_historical(&app, "p1", "01.jpeg", Some(1)).await;

    let id = plant::Entity::find().one(&app.db).await.unwrap().unwrap().id;
    let res = app.get(&routes::plant(&id.to_string())).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["remote_id"], "p1");
    assert_eq!(res.body["scientific_name"], "Epipremnum aureum");
    let paths: Vec<&str> = res.body["photos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["storage_path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        [
            "planta/p1-2025-06-29T00-22-14.333Z.webp",
            "historical/p1/01.jpeg",
            "historical/p1/IMG_0042.jpg",
            "historical/p1/noNumber.png",
        ]
    );
    assert_eq!(res.body["photos"][0]["source"], "remote");
    assert_eq!(res.body["photos"][1]["source"], "historical");
}

#[tokio::test]
async fn unknown_plant_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::plant(&Uuid::now_v7().to_string())).await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, json!({"status": "ok"}));
}
