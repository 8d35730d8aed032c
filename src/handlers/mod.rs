pub mod health;
pub mod image;
pub mod pdf;

use std::path::Path;

use axum::{
    body::Body,
    extract::Multipart,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tokio_util::io::ReaderStream;

use crate::error::AppError;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// One uploaded file: the original filename (only used to derive output
/// names) and its content. Consumed once per request.
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

/// Scan the multipart body for the first file field named `name`.
pub async fn find_file_field(
    multipart: &mut Multipart,
    name: &str,
) -> Result<Option<Upload>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(name) && field.file_name().is_some() {
            let filename = field.file_name().unwrap_or("unnamed").to_string();
            let data = field.bytes().await?;
            return Ok(Some(Upload { filename, data }));
        }
    }
    Ok(None)
}

/// A fully drained multipart body: file fields in arrival order plus
/// plain text fields.
pub struct MultipartForm {
    files: Vec<(String, Upload)>,
    texts: Vec<(String, String)>,
}

impl MultipartForm {
    /// First file uploaded under `name`.
    pub fn file(&self, name: &str) -> Option<&Upload> {
        self.files
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, upload)| upload)
    }

    /// All files uploaded under `name`, preserving upload order.
    pub fn files(&self, name: &str) -> Vec<&Upload> {
        self.files
            .iter()
            .filter(|(field, _)| field == name)
            .map(|(_, upload)| upload)
            .collect()
    }

    /// Remove and return the first file uploaded under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files
            .iter()
            .position(|(field, _)| field == name)
            .map(|idx| self.files.remove(idx).1)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

pub async fn collect_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut files = Vec::new();
    let mut texts = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(|s| s.to_string()) {
            Some(filename) => {
                let data = field.bytes().await?;
                files.push((name, Upload { filename, data }));
            }
            None => {
                let value = field.text().await?;
                texts.push((name, value));
            }
        }
    }

    Ok(MultipartForm { files, texts })
}

/// Reject uploads whose content does not sniff as PDF, before any staging
/// or external tool gets involved.
pub fn ensure_pdf(upload: &Upload) -> Result<(), AppError> {
    let looks_like_pdf = infer::get(&upload.data)
        .map(|kind| kind.mime_type() == mime::APPLICATION_PDF.as_ref())
        .unwrap_or(false);

    if !looks_like_pdf {
        return Err(AppError::BadRequest(format!(
            "{} is not a PDF file",
            upload.filename
        )));
    }
    Ok(())
}

/// Stream a file from disk as a download attachment.
pub async fn file_attachment(
    path: &Path,
    download_name: &str,
    content_type: &str,
) -> Result<Response, AppError> {
    let file = tokio::fs::File::open(path).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    Ok(attachment_headers(download_name, content_type, body))
}

/// Serve an in-memory result as a download attachment.
pub fn bytes_attachment(data: Vec<u8>, download_name: &str, content_type: &str) -> Response {
    attachment_headers(download_name, content_type, Body::from(data))
}

fn attachment_headers(download_name: &str, content_type: &str, body: Body) -> Response {
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download_name),
        ),
    ];
    (headers, body).into_response()
}
