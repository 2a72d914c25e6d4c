mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use anabyo_backend::model::status::RequestStatus;
use common::{seed_request, setup_app, ADMIN_PASSWORD};

fn list_request(password: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/requests");
    if let Some(password) = password {
        builder = builder.header("x-admin-password", password);
    }
    builder.body(Body::empty()).unwrap()
}

fn update_request(password: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/update-request")
        .header("content-type", "application/json");
    if let Some(password) = password {
        builder = builder.header("x-admin-password", password);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// --- Authentication ---

#[tokio::test]
async fn test_admin_routes_require_the_shared_secret() {
    let app = setup_app();

    for password in [None, Some(""), Some("wrong"), Some("test-admin-passwor")] {
        let resp = app.router.clone().oneshot(list_request(password)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "password: {:?}", password);

        let resp = app
            .router
            .clone()
            .oneshot(update_request(password, json!({"id": "x", "newStatus": "Acceptée"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "password: {:?}", password);
    }
}

// --- Listing ---

#[tokio::test]
async fn test_list_returns_all_rows_newest_first() {
    let app = setup_app();
    let first = seed_request(&app.repo, false).await;
    let second = seed_request(&app.repo, true).await;

    let resp = app
        .router
        .clone()
        .oneshot(list_request(Some(ADMIN_PASSWORD)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // Newest first.
    assert_eq!(rows[0]["tracking_id"], second.tracking_id.as_str());
    assert_eq!(rows[1]["tracking_id"], first.tracking_id.as_str());
    // Full rows, unlike the public lookup.
    assert_eq!(rows[0]["email_client"], "jane@example.com");
}

// --- Status updates ---

#[tokio::test]
async fn test_update_requires_id_and_status() {
    let app = setup_app();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(Some(ADMIN_PASSWORD), json!({"newStatus": "Acceptée"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": "65f0c0ffee0000000000aaaa"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_rejects_unknown_status_labels() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    for label in ["json", "Archivée", "accepted", ""] {
        let resp = app
            .router
            .clone()
            .oneshot(update_request(
                Some(ADMIN_PASSWORD),
                json!({"id": id, "newStatus": label}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "label: {:?}", label);
    }
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_update_unknown_row_is_not_found() {
    let app = setup_app();
    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": "65f0c0ffee0000000000aaaa", "newStatus": "Acceptée"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_acceptance_updates_row_and_emails_link() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({
                "id": id,
                "newStatus": "Acceptée",
                "bluefilesLink": "https://bluefiles.example/drop/42"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["statut"], "Acceptée");

    let stored = app.repo.find_by_tracking_id(&seeded.tracking_id).unwrap();
    assert_eq!(stored.statut, RequestStatus::Accepted);

    let emails = app.mailer.sent_to("jane@example.com");
    assert_eq!(emails.len(), 1);
    let text = emails[0].text_body.clone().unwrap();
    assert!(text.contains(&seeded.tracking_id));
    assert!(text.contains("https://bluefiles.example/drop/42"));
}

#[tokio::test]
async fn test_acceptance_without_link_uses_placeholder() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "Acceptée"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let emails = app.mailer.sent_to("jane@example.com");
    let text = emails[0].text_body.clone().unwrap();
    assert!(text.contains("Un lien de dépôt vous sera communiqué prochainement."));
}

#[tokio::test]
async fn test_refusal_emails_then_deletes_the_row() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "Refusée"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["message"], "Demande refusée et supprimée.");
    assert_eq!(json["tracking_id"], seeded.tracking_id.as_str());

    // Row no longer retrievable, exactly one refusal email attempted.
    assert!(app.repo.find_by_tracking_id(&seeded.tracking_id).is_none());
    assert_eq!(app.repo.row_count(), 0);
    assert_eq!(app.mailer.sent_to("jane@example.com").len(), 1);
}

#[tokio::test]
async fn test_failed_refusal_email_keeps_the_row() {
    let app = setup_app();
    app.mailer.fail_for("jane@example.com");
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "Refusée"}),
        ))
        .await
        .unwrap();

    // Email is load-bearing here; the row survives for a retry.
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.repo.row_count(), 1);
}

#[tokio::test]
async fn test_completion_after_acceptance_sends_final_email() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "Acceptée"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "Terminée"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = app.repo.find_by_tracking_id(&seeded.tracking_id).unwrap();
    assert_eq!(stored.statut, RequestStatus::Completed);

    let emails = app.mailer.sent_to("jane@example.com");
    assert_eq!(emails.len(), 2);
    assert!(emails[1].subject.contains("terminée"));
}

#[tokio::test]
async fn test_plain_transition_sends_no_email() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "En cours"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = app.repo.find_by_tracking_id(&seeded.tracking_id).unwrap();
    assert_eq!(stored.statut, RequestStatus::InProgress);
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_illegal_transition_is_rejected_without_side_effects() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    // Reçue -> Terminée is not in the table.
    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "Terminée"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let stored = app.repo.find_by_tracking_id(&seeded.tracking_id).unwrap();
    assert_eq!(stored.statut, RequestStatus::Received);
    assert_eq!(app.mailer.sent_count(), 0);
}

// --- Quoting export ---

#[tokio::test]
async fn test_export_prices_treatment_lines() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, true).await;
    let id = seeded.id.unwrap().to_hex();

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/requests/{}/export", id))
        .header("x-admin-password", ADMIN_PASSWORD)
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["tracking_id"], seeded.tracking_id.as_str());
    assert_eq!(json["priorite"], "haute");
    let taches = json["taches"].as_array().unwrap();
    assert_eq!(taches.len(), 2);
    assert_eq!(taches[0]["designation"], "Analyse microbiologique");
    assert_eq!(taches[0]["quantite"], 3);
    assert_eq!(taches[0]["prix_unitaire"], 45.0);
    assert_eq!(taches[0]["total"], 135.0);
    assert_eq!(taches[1]["total"], 45.0);

    // Export is read-only: no mutation, no email.
    let stored = app.repo.find_by_tracking_id(&seeded.tracking_id).unwrap();
    assert_eq!(stored.statut, RequestStatus::Received);
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_export_requires_auth_and_known_row() {
    let app = setup_app();

    let req = Request::builder()
        .method("GET")
        .uri("/api/requests/65f0c0ffee0000000000aaaa/export")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/requests/65f0c0ffee0000000000aaaa/export")
        .header("x-admin-password", ADMIN_PASSWORD)
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_without_treatment_details_yields_empty_task_list() {
    let app = setup_app();
    let seeded = seed_request(&app.repo, false).await;
    // Strip the treatment details directly in the store.
    {
        let mut rows = app.repo.rows.lock().unwrap();
        rows[0].treatment_details = None;
    }
    let id = seeded.id.unwrap().to_hex();

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/requests/{}/export", id))
        .header("x-admin-password", ADMIN_PASSWORD)
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["priorite"], "normale");
    assert_eq!(json["taches"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_failed_acceptance_email_surfaces_error_after_commit() {
    let app = setup_app();
    app.mailer.fail_for("jane@example.com");
    let seeded = seed_request(&app.repo, false).await;
    let id = seeded.id.unwrap().to_hex();

    let resp = app
        .router
        .clone()
        .oneshot(update_request(
            Some(ADMIN_PASSWORD),
            json!({"id": id, "newStatus": "Acceptée"}),
        ))
        .await
        .unwrap();

    // The mutation commits first; the email failure is surfaced.
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let stored = app.repo.find_by_tracking_id(&seeded.tracking_id).unwrap();
    assert_eq!(stored.statut, RequestStatus::Accepted);
}
