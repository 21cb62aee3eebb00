use crate::emoji::EmojiRecord;

const GROUP_PREFIX: &str = "# group:";
const SUBGROUP_PREFIX: &str = "# subgroup:";
const COMMENT_PREFIX: char = '#';
const FIELD_SEPARATOR: char = ';';
/// Start of the version tag that follows the glyph, e.g. ` E1.0`.
const VERSION_MARKER: &str = " E";
/// Rows with this status are parts of composite emoji and never produce a record.
const COMPONENT_STATUS: &str = "component";

/// Records parsed from one feed plus the number of data rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub records: Vec<EmojiRecord>,
    /// Rows that looked like data but were malformed or had `component` status.
    pub skipped: usize,
}

/// Parses the text of a single emoji feed into records.
///
/// Never fails: blank lines and comments are ignored, `# group:` and
/// `# subgroup:` headers update the classification applied to the rows that
/// follow, and data rows that cannot be split into fields are counted in
/// [`ParseResult::skipped`] instead of producing a record.
///
/// `feed` only names the feed in log output. Classification state starts
/// empty for every call.
pub fn parse_feed(feed: &str, text: &str) -> ParseResult {
    let mut result = ParseResult::default();
    let mut group = String::new();
    let mut sub_group = String::new();

    for line in text.lines() {
        let row = line.trim();
        if row.is_empty() {
            continue;
        }

        if let Some(rest) = row.strip_prefix(GROUP_PREFIX) {
            group = rest.trim().to_string();
            continue;
        }
        if let Some(rest) = row.strip_prefix(SUBGROUP_PREFIX) {
            sub_group = rest.trim().to_string();
            continue;
        }
        if row.starts_with(COMMENT_PREFIX) {
            continue;
        }

        match DataRow::parse(row) {
            Some(data) => result.records.push(EmojiRecord {
                slug: slugify(&data.name),
                character: data.character.to_string(),
                unicode_name: strip_version_tag(&data.name).to_string(),
                code_point: data.code_point.to_string(),
                group: group.clone(),
                sub_group: sub_group.clone(),
            }),
            None => result.skipped += 1,
        }
    }

    tracing::debug!(
        feed = %feed,
        records = result.records.len(),
        skipped = result.skipped,
        "Parsed emoji feed"
    );

    result
}

/// Fields of a data row before slug derivation.
struct DataRow<'a> {
    code_point: &'a str,
    character: &'a str,
    /// Annotation text with the glyph removed; still carries the version tag.
    name: String,
}

impl<'a> DataRow<'a> {
    /// Splits `<code point> ; <status> # <glyph> E<version> <name>`.
    ///
    /// Returns `None` for rows without a `;`, with an empty status, or with
    /// `component` status.
    fn parse(row: &'a str) -> Option<Self> {
        let code_point = before(row, ";")?.trim();
        let tail = row.split(FIELD_SEPARATOR).nth(1)?;

        let status = before(tail, "#").unwrap_or(tail).trim();
        if status.is_empty() || status == COMPONENT_STATUS {
            return None;
        }

        let character = between(tail, "#", VERSION_MARKER)
            .map(str::trim)
            .unwrap_or_default();

        let annotation = after(tail, "#").unwrap_or_default();
        let name = if character.is_empty() {
            annotation.trim().to_string()
        } else {
            annotation.replace(character, "").trim().to_string()
        };

        Some(Self {
            code_point,
            character,
            name,
        })
    }
}

/// Derives a lowercase, hyphen-separated slug from an annotation name.
///
/// A leading version tag is removed in two steps: first any leading `E`
/// characters, then any leading digits and dots. Colons are dropped,
/// whitespace runs become a single `-`, and the result is ASCII-lowercased.
///
/// ```
/// use emojifeed::feed::slugify;
///
/// assert_eq!(slugify("E2.0 waving hand: light skin tone"), "waving-hand-light-skin-tone");
/// assert_eq!(slugify("grinning-face"), "grinning-face");
/// ```
pub fn slugify(name: &str) -> String {
    let unversioned = name
        .trim_start_matches('E')
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');

    unversioned
        .replace(':', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_ascii_lowercase()
}

/// Removes a leading `E<digits/dots>` version token followed by whitespace.
///
/// Unlike the slug prefix strip, names that merely begin with `E`
/// (`END arrow`) are returned unchanged.
fn strip_version_tag(name: &str) -> &str {
    let Some(rest) = name.strip_prefix('E') else {
        return name;
    };
    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        return name;
    }

    let version_end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    let remainder = &rest[version_end..];

    if remainder.is_empty() || remainder.starts_with(char::is_whitespace) {
        remainder.trim()
    } else {
        name
    }
}

/// Text before the first occurrence of `marker`.
fn before<'a>(value: &'a str, marker: &str) -> Option<&'a str> {
    value.find(marker).map(|pos| &value[..pos])
}

/// Text after the first occurrence of `marker`.
fn after<'a>(value: &'a str, marker: &str) -> Option<&'a str> {
    value.find(marker).map(|pos| &value[pos + marker.len()..])
}

/// Text between the first `start` and the first `end` that follows it.
fn between<'a>(value: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let rest = after(value, start)?;
    before(rest, end)
}
