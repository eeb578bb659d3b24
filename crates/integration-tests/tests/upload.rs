//! Image upload and static serving.

#![allow(clippy::unwrap_used)]

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use signal_living_integration_tests::TestApp;

fn image_form(file_name: &str, mime: &str, bytes: Vec<u8>) -> Form {
    Form::new().part(
        "image",
        Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(mime)
            .unwrap(),
    )
}

#[tokio::test]
async fn test_upload_and_serve_image() {
    let app = TestApp::spawn().await;
    let client = app.super_admin().await;
    let bytes = b"\x89PNG\r\n\x1a\nfake".to_vec();

    let response = client
        .post(app.url("/api/upload/image"))
        .multipart(image_form("photo.PNG", "image/png", bytes.clone()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/products/product-"));
    assert!(url.ends_with(".png"));

    let served = TestApp::client().get(app.url(url)).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().to_vec(), bytes);
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let app = TestApp::spawn().await;
    let client = app.super_admin().await;

    let response = client
        .post(app.url("/api/upload/image"))
        .multipart(image_form("notes.txt", "text/plain", b"hello".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(app.url("/api/upload/image"))
        .multipart(image_form("sneaky.png", "application/x-sh", b"#!/bin/sh".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(app.url("/api/upload/image"))
        .multipart(Form::new().text("caption", "no file"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_upload_size_limit() {
    let app = TestApp::spawn().await;
    let client = app.super_admin().await;
    let oversized = vec![0_u8; 5 * 1024 * 1024 + 1];

    let response = client
        .post(app.url("/api/upload/image"))
        .multipart(image_form("huge.jpg", "image/jpeg", oversized))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_upload_requires_session() {
    let app = TestApp::spawn().await;

    let response = TestApp::client()
        .post(app.url("/api/upload/image"))
        .multipart(image_form("photo.png", "image/png", vec![1, 2, 3]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
