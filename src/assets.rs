pub mod decode;
pub mod library;
