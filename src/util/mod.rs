//! Helpers shared by the feed sources and the CLI output.
//!
//! - **URL validation**: checks the base URL feeds are downloaded from
//! - **Text processing**: terminal-width aware truncation and padding for table output

mod text;
mod url_validator;

pub use text::{display_width, pad_to_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_base_url, UrlValidationError};
