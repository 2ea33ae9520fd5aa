//! Storage drivers

pub mod sdcard;

pub use sdcard::SdCard;
