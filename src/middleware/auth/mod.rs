pub mod access;
pub mod header;

pub use access::{apply, authorize};
pub use header::AuthHeader;
