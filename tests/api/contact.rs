// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

use crate::helpers::{spawn_app, spawn_app_with, valid_body};
use contact_form_api::config::RateLimitConfig;
use std::time::Duration;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_provider_ok(app: &crate::helpers::TestApp, expected_calls: u64) {
    Mock::given(path("/v3/smtp/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "messageId": "<test@smtp-relay.example>"
        })))
        .expect(expected_calls)
        .mount(&app.email_server)
        .await;
}

#[tokio::test]
async fn contact_returns_200_and_echoes_valid_submission() {
    let app = spawn_app().await;
    mount_provider_ok(&app, 1).await;

    let response = app.post_contact(&valid_body(), "203.0.113.10").await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Your message has been sent successfully!");
    assert_eq!(
        body["data"],
        serde_json::json!({
            "name": "John Doe",
            "email": "john@example.com",
            "subject": "Inquiry"
        })
    );
}

#[tokio::test]
async fn contact_dispatches_one_email_with_reply_to_submitter() {
    let app = spawn_app().await;
    mount_provider_ok(&app, 1).await;

    app.post_contact(&valid_body(), "203.0.113.11").await;

    let requests = app.email_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers["api-key"], "xkeysib-test");

    let email: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(email["replyTo"]["email"], "john@example.com");
    assert_eq!(email["to"][0]["email"], "owner@example.org");
    assert_eq!(email["subject"], "Contact Form: Inquiry");
    assert!(email["htmlContent"].as_str().unwrap().contains("Hello"));
    assert!(email["textContent"].as_str().unwrap().contains("Hello"));
}

#[tokio::test]
async fn contact_returns_422_for_invalid_fields_without_dispatching() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let long_name = "n".repeat(101);
    let long_subject = "s".repeat(201);
    let long_message = "m".repeat(5001);
    let test_cases = vec![
        (
            serde_json::json!({"name": "", "email": "john@example.com", "subject": "Hi", "message": "Hi"}),
            "name",
            "empty name",
        ),
        (
            serde_json::json!({"name": long_name, "email": "john@example.com", "subject": "Hi", "message": "Hi"}),
            "name",
            "name too long",
        ),
        (
            serde_json::json!({"name": "John", "email": "not-an-email", "subject": "Hi", "message": "Hi"}),
            "email",
            "invalid email",
        ),
        (
            serde_json::json!({"name": "John", "email": "john@example.com", "subject": long_subject, "message": "Hi"}),
            "subject",
            "subject too long",
        ),
        (
            serde_json::json!({"name": "John", "email": "john@example.com", "subject": "Hi", "message": ""}),
            "message",
            "empty message",
        ),
        (
            serde_json::json!({"name": "John", "email": "john@example.com", "subject": "Hi", "message": long_message}),
            "message",
            "message too long",
        ),
        (
            serde_json::json!({"name": "John", "subject": "Hi", "message": "Hi"}),
            "email",
            "missing email",
        ),
    ];

    for (i, (body, field, description)) in test_cases.into_iter().enumerate() {
        // Each case from its own address so the limiter never interferes
        let response = app.post_contact(&body, &format!("198.51.100.{}", i + 1)).await;

        assert_eq!(
            response.status().as_u16(),
            422,
            "The API did not fail with 422 when the payload had {}.",
            description
        );
        let error: serde_json::Value = response.json().await.unwrap();
        assert_eq!(error["code"], "VALIDATION_FAILED");
        assert_eq!(error["fields"][0]["field"], field, "{}", description);
        assert!(error["detail"].as_str().unwrap().contains(field));
    }
}

#[tokio::test]
async fn contact_returns_422_for_malformed_body() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let not_json = app
        .post_contact_raw("{name: John", Some("application/json"), "198.51.100.50")
        .await;
    assert_eq!(not_json.status().as_u16(), 422);

    let no_content_type = app
        .post_contact_raw(r#"{"name":"John"}"#, None, "198.51.100.51")
        .await;
    assert_eq!(no_content_type.status().as_u16(), 422);
    let error: serde_json::Value = no_content_type.json().await.unwrap();
    assert_eq!(error["fields"][0]["field"], "body");
}

#[tokio::test]
async fn second_submission_within_window_returns_429() {
    let app = spawn_app().await;
    mount_provider_ok(&app, 1).await;

    let first = app.post_contact(&valid_body(), "203.0.113.20").await;
    assert_eq!(first.status().as_u16(), 200);

    let second = app.post_contact(&valid_body(), "203.0.113.20").await;
    assert_eq!(second.status().as_u16(), 429);

    let retry_after: u64 = second.headers()["retry-after"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 3500 && retry_after <= 3600);

    let error: serde_json::Value = second.json().await.unwrap();
    assert_eq!(error["code"], "RATE_LIMITED");
    assert!(error["detail"].as_str().unwrap().contains("Rate limit exceeded"));
}

#[tokio::test]
async fn rate_limit_applies_regardless_of_content_validity() {
    let app = spawn_app().await;
    mount_provider_ok(&app, 1).await;

    app.post_contact(&valid_body(), "203.0.113.21").await;

    let invalid = serde_json::json!({"name": "", "email": "nope", "subject": "", "message": ""});
    let response = app.post_contact(&invalid, "203.0.113.21").await;

    assert_eq!(response.status().as_u16(), 429);
}

#[tokio::test]
async fn rate_limit_keys_on_socket_address_without_forwarding_header() {
    let app = spawn_app().await;
    mount_provider_ok(&app, 1).await;

    assert_eq!(app.post_contact_direct(&valid_body()).await.status().as_u16(), 200);
    assert_eq!(app.post_contact_direct(&valid_body()).await.status().as_u16(), 429);
}

#[tokio::test]
async fn submission_admitted_again_after_window_elapses() {
    let app = spawn_app_with(RateLimitConfig {
        window_secs: 1,
        ..Default::default()
    })
    .await;
    mount_provider_ok(&app, 2).await;

    assert_eq!(app.post_contact(&valid_body(), "203.0.113.30").await.status().as_u16(), 200);
    assert_eq!(app.post_contact(&valid_body(), "203.0.113.30").await.status().as_u16(), 429);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(app.post_contact(&valid_body(), "203.0.113.30").await.status().as_u16(), 200);
}

#[tokio::test]
async fn distinct_addresses_are_admitted_concurrently() {
    let app = spawn_app().await;
    mount_provider_ok(&app, 2).await;

    let body = valid_body();
    let (a, b) = tokio::join!(
        app.post_contact(&body, "203.0.113.40"),
        app.post_contact(&body, "203.0.113.41"),
    );

    assert_eq!(a.status().as_u16(), 200);
    assert_eq!(b.status().as_u16(), 200);
}

#[tokio::test]
async fn concurrent_requests_from_one_address_admit_exactly_one() {
    let app = spawn_app().await;
    mount_provider_ok(&app, 1).await;

    let handles: Vec<_> = (0..10)
        .map(|_| app.spawn_post_contact(valid_body(), "203.0.113.50".to_string()))
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == 429).count(), 9);
}

#[tokio::test]
async fn contact_returns_500_when_provider_fails() {
    let app = spawn_app().await;

    Mock::given(path("/v3/smtp/email"))
        .respond_with(ResponseTemplate::new(500).set_body_string("provider unavailable"))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_contact(&valid_body(), "203.0.113.60").await;

    assert_eq!(response.status().as_u16(), 500);
    let error: serde_json::Value = response.json().await.unwrap();
    assert_eq!(error["code"], "DISPATCH_FAILED");
    assert!(error["detail"].as_str().unwrap().contains("Failed to send email"));
    assert!(error.get("status").is_none());
}
