use serde::{Deserialize, Serialize};

/// One data row of a Unicode emoji feed.
///
/// Records are produced by [`crate::feed::parse_feed`] and carry no reference
/// back to the parser. `group` and `sub_group` are captured by value from the
/// headers in effect when the row was read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiRecord {
    /// Lowercase, hyphen-joined identifier derived from the name (e.g. `grinning-face`).
    pub slug: String,
    /// Rendered glyph as written in the annotation. Empty when it could not be located.
    pub character: String,
    /// Descriptive name from the annotation, with the glyph and version tag removed.
    pub unicode_name: String,
    /// Raw code point field, either a single point or a space-separated sequence.
    pub code_point: String,
    pub group: String,
    pub sub_group: String,
}

impl EmojiRecord {
    /// Returns true if this record belongs to `group` (ASCII case-insensitive).
    pub fn in_group(&self, group: &str) -> bool {
        self.group.eq_ignore_ascii_case(group.trim())
    }
}
