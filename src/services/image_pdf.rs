use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};

use crate::error::AppError;

/// Fixed output resolution for image pages.
const OUTPUT_DPI: f32 = 300.0;

const MM_PER_INCH: f32 = 25.4;

/// Build a multi-page PDF from a list of encoded images, one full-bleed
/// page per image, in input order.
///
/// Palette and alpha-bearing images are flattened to plain RGB before
/// embedding (PDF requirement). Everything happens in memory.
pub fn images_to_pdf(images: &[Vec<u8>]) -> Result<Vec<u8>, AppError> {
    if images.is_empty() {
        return Err(AppError::BadRequest("No images provided".to_string()));
    }

    let mut doc = PdfDocument::new("Converted Images");
    let mut pages: Vec<PdfPage> = Vec::new();

    for data in images {
        let decoded = image::load_from_memory(data)?;

        // to_rgb8 flattens palette and alpha modes alike.
        let rgb = decoded.to_rgb8();
        let width_px = rgb.width() as usize;
        let height_px = rgb.height() as usize;

        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: width_px,
            height: height_px,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };
        let xobject_id = doc.add_image(&raw);

        // Page sized so the image fills it exactly at the output DPI.
        let page_w = Mm(width_px as f32 * MM_PER_INCH / OUTPUT_DPI);
        let page_h = Mm(height_px as f32 * MM_PER_INCH / OUTPUT_DPI);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: None,
                scale_y: None,
                dpi: Some(OUTPUT_DPI),
                rotate: None,
            },
        }];

        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    doc.with_pages(pages);

    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

    tracing::debug!(
        images = images.len(),
        output_bytes = output.len(),
        "Images assembled into PDF"
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, alpha]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_page_count_matches_image_count() {
        let output = images_to_pdf(&[png_bytes(8, 8, 255), png_bytes(4, 12, 255)]).unwrap();

        let doc = lopdf::Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_alpha_images_are_flattened() {
        // A half-transparent PNG must still embed; flattening drops the alpha.
        let output = images_to_pdf(&[png_bytes(6, 6, 128)]).unwrap();

        let doc = lopdf::Document::load_mem(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_empty_input_fails_before_encoding() {
        assert!(matches!(
            images_to_pdf(&[]),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_undecodable_input_is_a_conversion_error() {
        assert!(matches!(
            images_to_pdf(&[b"not an image".to_vec()]),
            Err(AppError::Conversion(_))
        ));
    }
}
