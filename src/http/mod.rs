//! HTTP protocol layer module
//!
//! Response builders shared by the request handler, kept free of report logic.

pub mod response;

// Re-export commonly used builders
pub use response::{build_400_response, build_500_response, build_text_response};
