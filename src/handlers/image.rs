use std::io::Cursor;

use axum::{
    extract::{Multipart, State},
    response::Response,
};

use crate::AppState;
use crate::error::AppError;
use crate::handlers::{bytes_attachment, collect_multipart, find_file_field};
use crate::services::image_pdf;

/// POST /remove-bg: strip the background from one uploaded image.
///
/// The image is normalized to an RGBA PNG before it reaches the remover, so
/// the model always sees one input format. The whole exchange stays in
/// memory: no temp files, nothing for the janitor.
pub async fn remove_bg(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = find_file_field(&mut multipart, "image")
        .await?
        .ok_or_else(|| AppError::BadRequest("No image file provided".to_string()))?;

    let data = upload.data.clone();
    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let decoded = image::load_from_memory(&data)?;
        let rgba = image::DynamicImage::ImageRgba8(decoded.to_rgba8());

        let mut buf = Vec::new();
        rgba.write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)?;
        Ok(buf)
    })
    .await
    .map_err(|e| AppError::Conversion(format!("Image decoding panicked: {}", e)))??;

    let result = state
        .remover
        .remove_background(&png)
        .await
        .map_err(|e| AppError::Conversion(e.to_string()))?;

    Ok(bytes_attachment(
        result,
        "bg-removed.png",
        mime::IMAGE_PNG.as_ref(),
    ))
}

/// POST /image/convert-to-pdf: combine uploaded images into one PDF,
/// one page per image, in upload order.
pub async fn images_to_pdf(
    State(_state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = collect_multipart(multipart).await?;
    let files = form.files("files");

    if files.is_empty() {
        return Err(AppError::BadRequest("No images provided".to_string()));
    }

    let payloads: Vec<Vec<u8>> = files.iter().map(|upload| upload.data.to_vec()).collect();

    let output = tokio::task::spawn_blocking(move || image_pdf::images_to_pdf(&payloads))
        .await
        .map_err(|e| AppError::Conversion(format!("PDF assembly panicked: {}", e)))??;

    Ok(bytes_attachment(
        output,
        "converted.pdf",
        mime::APPLICATION_PDF.as_ref(),
    ))
}
