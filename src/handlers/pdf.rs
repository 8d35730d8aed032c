use std::path::PathBuf;

use axum::{
    extract::{Multipart, State},
    response::Response,
};
use lopdf::Document;

use crate::AppState;
use crate::error::AppError;
use crate::handlers::{
    DOCX_MIME, Upload, bytes_attachment, collect_multipart, ensure_pdf, file_attachment,
    find_file_field,
};
use crate::services::encryption;
use crate::services::merge::merge_documents;
use crate::services::temp::{remove_dir_quietly, remove_quietly};
use crate::utils::base_name;

/// POST /pdf/convert-to-word: PDF in, DOCX out.
pub async fn convert_to_word(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = require_file(&mut multipart).await?;
    ensure_pdf(&upload)?;

    convert_via_office(&state, upload, "docx", DOCX_MIME).await
}

/// POST /pdf/convert-to-pdf: Word document in, PDF out.
pub async fn convert_to_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = require_file(&mut multipart).await?;

    convert_via_office(&state, upload, "pdf", mime::APPLICATION_PDF.as_ref()).await
}

/// Shared path for both office conversions: stage the upload, convert into
/// a per-request scratch directory, and move the produced file into the
/// temp store under a unique name.
///
/// The staged input is deleted on every exit path; the output is handed to
/// the janitor before the response starts streaming.
async fn convert_via_office(
    state: &AppState,
    upload: Upload,
    target: &str,
    content_type: &str,
) -> Result<Response, AppError> {
    let input = state.temp.persist(&upload.filename, &upload.data).await?;
    let scratch = state.temp.scratch_dir()?;

    let converted = state.office.convert(&input, target, &scratch).await;

    remove_quietly(&input);

    let produced = match converted {
        Ok(path) => path,
        Err(e) => {
            remove_dir_quietly(&scratch);
            return Err(e);
        }
    };

    let download_name = format!("{}.{}", base_name(&upload.filename), target);
    let output = state.temp.allocate_named(&download_name);
    let moved = tokio::fs::rename(&produced, &output).await;
    remove_dir_quietly(&scratch);
    moved?;

    state.janitor.schedule(output.clone());
    file_attachment(&output, &download_name, content_type).await
}

/// POST /pdf/merge: concatenate two or more uploaded PDFs.
pub async fn merge(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = collect_multipart(multipart).await?;
    let files = form.files("files");

    if files.len() < 2 {
        return Err(AppError::BadRequest(
            "At least 2 PDF files are required".to_string(),
        ));
    }
    for upload in &files {
        if !crate::utils::has_extension(&upload.filename, "pdf") {
            return Err(AppError::BadRequest(format!(
                "Only PDF files are allowed: {}",
                upload.filename
            )));
        }
    }

    // Stage every input; on a staging failure the ones already written
    // still get removed below.
    let mut staged: Vec<(String, PathBuf)> = Vec::new();
    let mut staging_error = None;
    for upload in &files {
        match state.temp.persist(&upload.filename, &upload.data).await {
            Ok(path) => staged.push((upload.filename.clone(), path)),
            Err(e) => {
                staging_error = Some(e);
                break;
            }
        }
    }

    let result = match staging_error {
        Some(e) => Err(e.into()),
        None => merge_staged(&state, &staged).await,
    };

    for (_, path) in &staged {
        remove_quietly(path);
    }

    let output = result?;
    state.janitor.schedule(output.clone());
    file_attachment(&output, "merged.pdf", mime::APPLICATION_PDF.as_ref()).await
}

async fn merge_staged(
    state: &AppState,
    staged: &[(String, PathBuf)],
) -> Result<PathBuf, AppError> {
    let mut documents = Vec::with_capacity(staged.len());
    for (filename, path) in staged {
        let doc = Document::load(path)
            .map_err(|_| AppError::BadRequest(format!("Invalid PDF file: {}", filename)))?;
        documents.push(doc);
    }

    let mut merged = merge_documents(documents)?;

    let output = state.temp.allocate_named("merged.pdf");
    merged.save(&output)?;
    Ok(output)
}

/// POST /pdf/compress: rewrite a PDF through Ghostscript's ebook profile.
pub async fn compress(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = require_file(&mut multipart).await?;
    ensure_pdf(&upload)?;

    let input = state.temp.persist(&upload.filename, &upload.data).await?;

    let download_name = format!("{}_compressed.pdf", base_name(&upload.filename));
    let output = state.temp.allocate_named(&download_name);

    let compressed = state.compressor.compress(&input, &output).await;

    remove_quietly(&input);
    compressed?;

    state.janitor.schedule(output.clone());
    file_attachment(&output, &download_name, mime::APPLICATION_PDF.as_ref()).await
}

/// POST /pdf/encrypt: password-protect an uploaded PDF.
pub async fn encrypt(
    State(_state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (upload, password) = require_file_and_password(multipart).await?;
    ensure_pdf(&upload)?;

    let data = upload.data.clone();
    let output =
        tokio::task::spawn_blocking(move || encryption::encrypt_pdf(&data, &password))
            .await
            .map_err(|e| AppError::Conversion(format!("Encryption panicked: {}", e)))??;

    let download_name = format!("{}_encrypted.pdf", base_name(&upload.filename));
    Ok(bytes_attachment(
        output,
        &download_name,
        mime::APPLICATION_PDF.as_ref(),
    ))
}

/// POST /pdf/decrypt: remove password protection from an uploaded PDF.
pub async fn decrypt(
    State(_state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (upload, password) = require_file_and_password(multipart).await?;
    ensure_pdf(&upload)?;

    let data = upload.data.clone();
    let output =
        tokio::task::spawn_blocking(move || encryption::decrypt_pdf(&data, &password))
            .await
            .map_err(|e| AppError::Conversion(format!("Decryption panicked: {}", e)))??;

    let download_name = format!("{}_decrypted.pdf", base_name(&upload.filename));
    Ok(bytes_attachment(
        output,
        &download_name,
        mime::APPLICATION_PDF.as_ref(),
    ))
}

async fn require_file(multipart: &mut Multipart) -> Result<Upload, AppError> {
    find_file_field(multipart, "file")
        .await?
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))
}

async fn require_file_and_password(multipart: Multipart) -> Result<(Upload, String), AppError> {
    let mut form = collect_multipart(multipart).await?;

    let password = form
        .text("password")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("No password provided".to_string()))?
        .to_string();

    let upload = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    Ok((upload, password))
}
