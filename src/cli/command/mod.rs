pub mod describe;
pub mod download;

pub use describe::{describe, process};
pub use download::download;
