//! I/O expander drivers

pub mod tca9554;

pub use tca9554::Tca9554;
