mod common;

use axum::http::{StatusCode, header};
use common::Part;
use tower::ServiceExt;

#[tokio::test]
async fn test_remove_bg_requires_image_field() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = common::test_app(dir.path());

    let request = common::multipart_request(
        "/remove-bg",
        &[Part::Text {
            name: "note",
            value: "no image here",
        }],
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        common::error_message(response).await,
        "No image file provided"
    );
}

#[tokio::test]
async fn test_remove_bg_returns_png_attachment() {
    let dir = tempfile::tempdir().unwrap();
    // Development config uses the passthrough remover, so the normalized
    // PNG comes straight back.
    let (_state, app) = common::test_app(dir.path());

    let png = common::sample_png_bytes(8, 6);
    let request = common::multipart_request(
        "/remove-bg",
        &[Part::File {
            name: "image",
            filename: "photo.png",
            data: &png,
        }],
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("bg-removed.png"));

    let bytes = common::body_bytes(response).await;
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.width(), 8);
    assert_eq!(decoded.height(), 6);
}

#[tokio::test]
async fn test_remove_bg_rejects_undecodable_image() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = common::test_app(dir.path());

    let request = common::multipart_request(
        "/remove-bg",
        &[Part::File {
            name: "image",
            filename: "broken.png",
            data: b"definitely not an image",
        }],
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_images_to_pdf_requires_files() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = common::test_app(dir.path());

    let request = common::multipart_request(
        "/image/convert-to-pdf",
        &[Part::Text {
            name: "note",
            value: "empty",
        }],
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(response).await, "No images provided");
}

#[tokio::test]
async fn test_images_to_pdf_one_page_per_image() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = common::test_app(dir.path());

    let first = common::sample_png_bytes(100, 80);
    let second = common::sample_png_bytes(50, 50);
    let request = common::multipart_request(
        "/image/convert-to-pdf",
        &[
            Part::File {
                name: "files",
                filename: "one.png",
                data: &first,
            },
            Part::File {
                name: "files",
                filename: "two.png",
                data: &second,
            },
        ],
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("converted.pdf"));

    let bytes = common::body_bytes(response).await;
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}
