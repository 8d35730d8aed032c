pub mod compress;
pub mod encryption;
pub mod image_pdf;
pub mod janitor;
pub mod merge;
pub mod office;
pub mod remover;
pub mod temp;
