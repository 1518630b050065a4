//! HTTP-level integration tests for training package endpoints.
//!
//! Uses tower::ServiceExt to send requests directly to the router without
//! a TCP listener; storage and payments are in-memory fakes.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, delete, get, post, post_json, put_json, FakePayments, FakeStorage};
use serde_json::json;
use sqlx::PgPool;

use gym_core::scheduling::MAX_SESSIONS_PER_PACKAGE;

const SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgo=";

async fn create(pool: &PgPool, body: serde_json::Value) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/training-packages", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_package_returns_pending_schedule(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let coach = common::seed_user(&pool, "Coach", "coach", None).await;

    let data = create(
        &pool,
        json!({
            "userId": client,
            "coachID": coach,
            "sessions": 3,
            "trainingType": "Strength",
            "total": 1500.0
        }),
    )
    .await;

    assert_eq!(data["userId"], client);
    assert_eq!(data["coachID"], coach);
    assert_eq!(data["sessions"], 3);
    assert_eq!(data["status"], "active");
    assert_eq!(data["isDeleted"], false);
    assert!(data["signature"].is_null());
    assert!(data.get("signaturePublicId").is_none());

    let schedule = data["schedule"].as_array().unwrap();
    assert_eq!(schedule.len(), 3);
    for (i, session) in schedule.iter().enumerate() {
        assert_eq!(session["index"], i as i64 + 1);
        assert_eq!(session["status"], "pending");
        assert!(session["dateAssigned"].is_null());
        assert!(session["timeAssigned"].is_null());
        assert_eq!(session["trainings"], json!([]));
        assert!(session["id"].is_number());
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_out_of_range_sessions_is_rejected(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;

    for sessions in [0, -2, MAX_SESSIONS_PER_PACKAGE + 1, i32::MAX] {
        let app = common::build_test_app(pool.clone());
        let response = post_json(
            app,
            "/api/v1/training-packages",
            json!({"userId": client, "sessions": sessions}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM training_packages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_unknown_client_or_coach_returns_404(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({"userId": 999999, "sessions": 2}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Client with id 999999 not found");

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({"userId": client, "coachID": 999999, "sessions": 2}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_uploads_signature_before_persisting(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let storage = Arc::new(FakeStorage::default());
    let app =
        common::build_test_app_with(pool, storage.clone(), Arc::new(FakePayments::default()));

    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({"userId": client, "sessions": 1, "signature": SIGNATURE}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["signature"], "https://cdn.test/signatures/img1.png");

    let stored = storage.stored.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, SIGNATURE);
    assert_eq!(stored[0].1, "signatures");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_storage_failure_aborts_creation(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let storage = Arc::new(FakeStorage {
        fail_uploads: true,
        ..Default::default()
    });
    let app = common::build_test_app_with(
        pool.clone(),
        storage,
        Arc::new(FakePayments::default()),
    );

    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({"userId": client, "sessions": 4, "signature": SIGNATURE}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_STORAGE_ERROR");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM training_packages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_insert_discards_uploaded_signature(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let storage = Arc::new(FakeStorage::default());
    let app = common::build_test_app_with(
        pool.clone(),
        storage.clone(),
        Arc::new(FakePayments::default()),
    );

    // Postgres rejects NUL bytes in TEXT, so the insert fails after upload.
    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({
            "userId": client,
            "sessions": 2,
            "trainingType": "Strength\0",
            "signature": SIGNATURE
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(storage.stored.lock().unwrap().len(), 1);
    assert_eq!(*storage.deleted.lock().unwrap(), vec!["signatures/img1".to_string()]);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM training_packages")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_signature_payload_is_rejected(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({"userId": client, "sessions": 1, "signature": "not an image"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Lookup and listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_package_and_missing_package(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let created = create(&pool, json!({"userId": client, "sessions": 2})).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/training-packages/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["id"], id);
    assert_eq!(data["schedule"].as_array().unwrap().len(), 2);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/training-packages/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_client_or_coach_branch(pool: PgPool) {
    let north = common::seed_branch(&pool, "North").await;
    let south = common::seed_branch(&pool, "South").await;
    let north_client = common::seed_user(&pool, "NorthClient", "client", Some(north)).await;
    let south_client = common::seed_user(&pool, "SouthClient", "client", Some(south)).await;
    let north_coach = common::seed_user(&pool, "NorthCoach", "coach", Some(north)).await;

    create(&pool, json!({"userId": north_client, "sessions": 1})).await;
    create(
        &pool,
        json!({"userId": south_client, "coachID": north_coach, "sessions": 1}),
    )
    .await;
    create(&pool, json!({"userId": south_client, "sessions": 1})).await;

    let app = common::build_test_app(pool.clone());
    let all = body_json(get(app, "/api/v1/training-packages").await).await;
    assert_eq!(all["data"].as_array().unwrap().len(), 3);

    let app = common::build_test_app(pool);
    let north_only = body_json(
        get(app, &format!("/api/v1/training-packages?branch_id={north}")).await,
    )
    .await;
    let rows = north_only["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // Newest first: the coach-matched package was created after the client one.
    assert_eq!(rows[0]["coachID"], north_coach);
    assert_eq!(rows[1]["userId"], north_client);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_coach_and_client(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let coach = common::seed_user(&pool, "Coach", "coach", None).await;
    create(&pool, json!({"userId": client, "coachID": coach, "sessions": 1})).await;
    create(&pool, json!({"userId": client, "sessions": 2})).await;

    let app = common::build_test_app(pool.clone());
    let by_coach = body_json(get(app, &format!("/api/v1/training-packages/coach/{coach}")).await)
        .await;
    assert_eq!(by_coach["data"].as_array().unwrap().len(), 1);

    let app = common::build_test_app(pool);
    let by_client =
        body_json(get(app, &format!("/api/v1/training-packages/client/{client}")).await).await;
    let rows = by_client["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["schedule"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_patches_fields_but_not_schedule(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let coach = common::seed_user(&pool, "Coach", "coach", None).await;
    let created = create(&pool, json!({"userId": client, "sessions": 2})).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/training-packages/{id}"),
        json!({"coachID": coach, "trainingType": "Health", "sessions": 10}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["coachID"], coach);
    assert_eq!(data["trainingType"], "Health");
    assert_eq!(data["sessions"], 2);
    assert_eq!(data["schedule"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_unknown_status_is_rejected(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let created = create(&pool, json!({"userId": client, "sessions": 1})).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = put_json(
        app,
        &format!("/api/v1/training-packages/{id}"),
        json!({"status": "paused"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_hides_package(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let created = create(&pool, json!({"userId": client, "sessions": 1})).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post(app, &format!("/api/v1/training-packages/{id}/soft-delete")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/training-packages/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = post(app, &format!("/api/v1/training-packages/{id}/soft-delete")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_removes_signature_then_package(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let storage = Arc::new(FakeStorage::default());
    let payments = Arc::new(FakePayments::default());

    let app = common::build_test_app_with(pool.clone(), storage.clone(), payments.clone());
    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({"userId": client, "sessions": 2, "signature": SIGNATURE}),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app_with(pool.clone(), storage.clone(), payments);
    let response = delete(app, &format!("/api/v1/training-packages/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(*storage.deleted.lock().unwrap(), vec!["signatures/img1".to_string()]);

    let (sessions,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM training_sessions WHERE package_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(sessions, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_tolerates_missing_signature(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let storage = Arc::new(FakeStorage {
        missing: vec!["signatures/img1".to_string()],
        ..Default::default()
    });
    let payments = Arc::new(FakePayments::default());

    let app = common::build_test_app_with(pool.clone(), storage.clone(), payments.clone());
    let response = post_json(
        app,
        "/api/v1/training-packages",
        json!({"userId": client, "sessions": 1, "signature": SIGNATURE}),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app_with(pool.clone(), storage, payments);
    let response = delete(app, &format!("/api/v1/training-packages/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_keeps_package_when_storage_fails(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    let created = create(
        &pool,
        json!({"userId": client, "sessions": 1, "signature": SIGNATURE}),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let storage = Arc::new(FakeStorage {
        fail_deletes: true,
        ..Default::default()
    });
    let app =
        common::build_test_app_with(pool.clone(), storage, Arc::new(FakePayments::default()));
    let response = delete(app, &format!("/api/v1/training-packages/{id}")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/training-packages/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Payment intent
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_payment_intent_charges_minor_units(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    sqlx::query("UPDATE users SET payment_customer_id = 'cus_abc' WHERE id = $1")
        .bind(client)
        .execute(&pool)
        .await
        .unwrap();

    let payments = Arc::new(FakePayments::default());
    let app = common::build_test_app_with(pool, Arc::new(FakeStorage::default()), payments.clone());
    let response = post_json(
        app,
        "/api/v1/training-packages/payment-intent",
        json!({"userId": client, "amount": 1500.5}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["clientSecret"], "pi_1_secret");

    let intents = payments.intents.lock().unwrap();
    assert_eq!(
        *intents,
        vec![(150050, "php".to_string(), "cus_abc".to_string())]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_payment_intent_requires_customer(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/training-packages/payment-intent",
        json!({"userId": client, "amount": 100}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/training-packages/payment-intent",
        json!({"userId": 999999, "amount": 100}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_payment_gateway_failure_returns_502(pool: PgPool) {
    let client = common::seed_user(&pool, "Client", "client", None).await;
    sqlx::query("UPDATE users SET payment_customer_id = 'cus_abc' WHERE id = $1")
        .bind(client)
        .execute(&pool)
        .await
        .unwrap();

    let payments = Arc::new(FakePayments {
        fail: true,
        ..Default::default()
    });
    let app = common::build_test_app_with(pool, Arc::new(FakeStorage::default()), payments);
    let response = post_json(
        app,
        "/api/v1/training-packages/payment-intent",
        json!({"userId": client, "amount": 100}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "UPSTREAM_PAYMENT_ERROR");
}
