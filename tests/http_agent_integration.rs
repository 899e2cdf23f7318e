#![cfg(feature = "agent")]
//! End-to-end: the axum routes on an ephemeral port, driven through the tool adapter client.

use chickpet::agent::{call_tool, PetClient};
use chickpet::config::{AgentConfig, Config};
use chickpet::pet::{PetError, PetRecord, Stage};
use chickpet::service::PetService;
use chickpet::storage::PetStore;
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
mod common;

async fn spawn_server(config: &Config) -> PetClient {
    let service = Arc::new(PetService::from_config(config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, chickpet::http::router(service))
            .await
            .unwrap();
    });
    PetClient::new(&AgentConfig {
        base_url: format!("http://{}", addr),
        timeout_seconds: 5,
        connect_retries: 0,
    })
}

fn store_for(config: &Config) -> PetStore {
    PetStore::from_config(&config.storage, &config.pet.default_name)
}

#[tokio::test]
async fn status_and_rename_through_tools() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::temp_config(&tmp);
    let client = spawn_server(&config).await;

    let reply = call_tool(&client, "get_pet_status", &json!({})).await.unwrap();
    let data = reply.data.expect("record data");
    assert_eq!(data["stage"], "egg");
    assert_eq!(data["name"], "Chick");
    assert!(reply.message.contains("【Pet Chick】"));
    // Raw record passes through untouched
    let record: PetRecord = serde_json::from_value(data).unwrap();
    assert_eq!(record.stage, Stage::Egg);

    let reply = call_tool(&client, "set_pet_name", &json!({ "name": "Nugget" }))
        .await
        .unwrap();
    assert_eq!(reply.data.unwrap()["name"], "Nugget");
    assert!(reply.message.contains("Nugget"));

    let stored = store_for(&config).load().unwrap().unwrap();
    assert_eq!(stored.name, "Nugget");
}

#[tokio::test]
async fn rejections_come_back_as_400_details() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::temp_config(&tmp);
    let client = spawn_server(&config).await;
    client.status().await.unwrap();
    let store = store_for(&config);
    let before = std::fs::read(store.path()).unwrap();

    let err = call_tool(&client, "update_pet_status", &json!({ "action": "feed" }))
        .await
        .unwrap_err();
    match err {
        PetError::Rejected(detail) => assert!(detail.contains("not hatched"), "{}", detail),
        other => panic!("expected rejection, got {:?}", other),
    }

    let long = "x".repeat(21);
    let err = call_tool(&client, "set_pet_name", &json!({ "name": long }))
        .await
        .unwrap_err();
    assert!(err.is_rejection());

    // An egg cannot dance either
    let err = call_tool(&client, "update_pet_status", &json!({ "action": "dance" }))
        .await
        .unwrap_err();
    match err {
        PetError::Rejected(detail) => assert!(detail.contains("not hatched"), "{}", detail),
        other => panic!("expected rejection, got {:?}", other),
    }

    assert_eq!(std::fs::read(store.path()).unwrap(), before);
}

#[tokio::test]
async fn unknown_action_on_a_hatched_chick_is_named() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::temp_config(&tmp);
    let store = store_for(&config);
    let mut pet = PetRecord::new("Pip", Utc::now());
    pet.stage = Stage::Baby;
    store.save(&pet).unwrap();
    let client = spawn_server(&config).await;

    let err = call_tool(&client, "update_pet_status", &json!({ "action": "dance" }))
        .await
        .unwrap_err();
    match err {
        PetError::Rejected(detail) => assert_eq!(detail, "unknown action: dance"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_update_body_is_a_400_detail() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::temp_config(&tmp);
    let client = spawn_server(&config).await;
    let http = reqwest::Client::new();
    let url = format!("{}/pet/update", client.base_url());

    for body in [r#"{"value": 5}"#, "not json"] {
        let response = http
            .post(&url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST, "{}", body);
        let payload: serde_json::Value = response.json().await.unwrap();
        assert!(payload["detail"].as_str().is_some(), "{}", payload);
    }
}

#[tokio::test]
async fn caring_for_a_hatched_chick() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::temp_config(&tmp);
    let store = store_for(&config);
    let now = Utc::now();
    let mut pet = PetRecord::new("Pip", now);
    pet.stage = Stage::Baby;
    pet.hunger = 60.0;
    store.save(&pet).unwrap();
    let client = spawn_server(&config).await;

    let reply = call_tool(
        &client,
        "update_pet_status",
        &json!({ "action": "feed", "value": 30 }),
    )
    .await
    .unwrap();
    assert!(reply.message.starts_with("【Action result】"));
    let data = reply.data.unwrap();
    let hunger = data["hunger"].as_f64().unwrap();
    // Feeding knocks 30 off, a few ms of decay may creep back on
    assert!(hunger < 31.0, "hunger {}", hunger);
    assert!(data["last_interaction"].as_str().is_some());
}

#[tokio::test]
async fn runaway_needs_a_reset() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::temp_config(&tmp);
    let store = store_for(&config);
    let now = Utc::now();
    let mut pet = PetRecord::new("Pip", now - Duration::hours(40));
    pet.stage = Stage::Teen;
    pet.age = 40.0;
    pet.runaway = true;
    pet.last_updated = now;
    store.save(&pet).unwrap();
    let client = spawn_server(&config).await;

    let reply = call_tool(&client, "get_pet_status", &json!({})).await.unwrap();
    assert!(reply.message.contains("Game over"));

    let err = call_tool(&client, "update_pet_status", &json!({ "action": "heal" }))
        .await
        .unwrap_err();
    match err {
        PetError::Rejected(detail) => assert!(detail.contains("run away"), "{}", detail),
        other => panic!("expected rejection, got {:?}", other),
    }

    let reply = call_tool(&client, "reset", &json!({})).await.unwrap();
    let data = reply.data.unwrap();
    assert_eq!(data["stage"], "egg");
    assert_eq!(data["runaway"], false);
    assert!(!store.load().unwrap().unwrap().runaway);
}

#[tokio::test]
async fn discovery_describes_the_routes() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::temp_config(&tmp);
    let client = spawn_server(&config).await;

    let info = client.discovery().await.unwrap();
    assert_eq!(info["name"], "Virtual Pet Manager");
    assert_eq!(info["endpoints"]["status"]["method"], "GET");
    assert_eq!(info["endpoints"]["update"]["path"], "/pet/update");

    let frame = chickpet::agent::stdio::handle_message(
        &client,
        json!({
            "jsonrpc": "2.0", "id": 5, "method": "resources/read",
            "params": { "uri": "discovery://info" }
        }),
    )
    .await
    .unwrap();
    let text = frame["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("/mcp/discovery"));
}
