use lopdf::encryption::{EncryptionState, EncryptionVersion, Permissions};
use lopdf::{Document, Object, StringFormat};
use uuid::Uuid;

use crate::error::AppError;

/// Password-protect a PDF with the caller-supplied user password.
///
/// The owner password is set to the same value; callers only get the single
/// password the client typed. All permission bits stay enabled, so protection
/// here means "requires the password to open", nothing finer-grained.
pub fn encrypt_pdf(data: &[u8], password: &str) -> Result<Vec<u8>, AppError> {
    let mut doc = Document::load_mem(data)?;

    // Key derivation needs the trailer /ID pair, which freshly generated
    // PDFs often lack.
    ensure_file_id(&mut doc);

    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: password,
        user_password: password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version)
        .map_err(|e| AppError::Conversion(format!("Could not prepare encryption: {}", e)))?;

    doc.encrypt(&state)
        .map_err(|e| AppError::Conversion(format!("Encryption failed: {}", e)))?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Remove password protection from a PDF.
///
/// The password has to be supplied at load time: without it the loader
/// leaves every object of an encrypted file unparsed. A rejected password
/// fails before anything is written; an unencrypted input passes through
/// unchanged apart from re-serialization.
pub fn decrypt_pdf(data: &[u8], password: &str) -> Result<Vec<u8>, AppError> {
    let mut doc = Document::load_mem_with_password(data, password).map_err(|e| match e {
        lopdf::Error::InvalidPassword => AppError::IncorrectPassword,
        other => other.into(),
    })?;

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

/// Set a trailer /ID pair if the document has none.
fn ensure_file_id(doc: &mut Document) {
    if doc.trailer.get(b"ID").is_err() {
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(Uuid::new_v4().into_bytes().to_vec(), StringFormat::Literal),
                Object::String(Uuid::new_v4().into_bytes().to_vec(), StringFormat::Literal),
            ]),
        );
    }
}
