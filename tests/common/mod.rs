#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use lopdf::{Document, Object, Stream, dictionary};
use rust_convert_backend::config::AppConfig;
use rust_convert_backend::{AppState, create_app};

/// Build an app whose temp store lives under `tmp`, with the passthrough
/// remover and no reliance on external binaries being installed.
pub fn test_app(tmp: &Path) -> (AppState, Router) {
    let state = test_state(tmp);
    let app = create_app(state.clone());
    (state, app)
}

pub fn test_state(tmp: &Path) -> AppState {
    let mut config = AppConfig::development();
    config.tmp_dir = tmp.join("staging");
    config.office_binary = "definitely-no-such-binary".to_string();
    config.ghostscript_binary = "definitely-no-such-binary".to_string();
    AppState::from_config(config).unwrap()
}

pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

/// Assemble a multipart/form-data body by hand.
pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn error_message(response: axum::response::Response) -> String {
    let bytes = body_bytes(response).await;
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    value["error"].as_str().unwrap_or_default().to_string()
}

/// Minimal but structurally valid PDF with the given number of pages.
pub fn sample_pdf_bytes(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..page_count {
        let content_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, Vec::new())));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as u32,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Like `sample_pdf_bytes`, but each page carries its own MediaBox width so
/// tests can tell the pages apart after a merge.
pub fn sample_pdf_bytes_with_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::load_mem(&sample_pdf_bytes(widths.len())).unwrap();
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();

    for (page_id, width) in page_ids.into_iter().zip(widths) {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set(
                "MediaBox",
                vec![0.into(), 0.into(), (*width).into(), 842.into()],
            );
        }
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// MediaBox widths of a document's pages, in page order.
pub fn page_widths(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_i64().unwrap()
        })
        .collect()
}

pub fn sample_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 200, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .unwrap();
    buf
}

/// Names of all plain files currently in the staging directory (scratch
/// subdirectories are not counted).
pub fn staged_files(state: &AppState) -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(entries) = std::fs::read_dir(state.temp.root()) {
        for entry in entries.flatten() {
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
    }
    names
}
