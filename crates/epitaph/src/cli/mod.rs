pub mod common;
pub mod config;
pub mod describe;
pub mod extract;
pub mod ocr;
