//! Unicode emoji feed retrieval and parsing.
//!
//! - [`parser`] - line-by-line interpreter for the emoji data file format
//! - [`source`] - where raw feed bytes come from (HTTP, local directory, memory)
//! - [`provider`] - fetches the known feeds in order and concatenates their records
//!
//! # Example
//!
//! ```ignore
//! use emojifeed::config::Config;
//! use emojifeed::feed::{HttpSource, Provider};
//!
//! let source = HttpSource::new(reqwest::Client::new(), &Config::default())?;
//! let emojis = Provider::new(source).all_emojis().await?;
//! ```

mod parser;
mod provider;
mod source;

pub use parser::{parse_feed, slugify, ParseResult};
pub use provider::{Provider, ProviderError, FEED_NAMES};
pub use source::{DirSource, FeedSource, FetchError, HttpSource, StaticSource};
