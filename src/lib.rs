//! Fetches the Unicode emoji data feeds (`emoji-sequences`,
//! `emoji-zwj-sequences`, `emoji-test`) and parses each data row into an
//! [`emoji::EmojiRecord`].

pub mod config;
pub mod emoji;
pub mod feed;
pub mod output;
pub mod util;
