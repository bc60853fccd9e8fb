//! Individual preprocessing steps, applied in the order listed here

pub mod contrast;
pub mod grayscale;
pub mod sharpen;
