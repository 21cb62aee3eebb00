use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Marker appended to cells that were cut short.
const ELLIPSIS: char = '…';

/// Display width of `s` in terminal columns.
///
/// Emoji glyphs usually occupy two columns, ZWJ and variation selectors none.
///
/// ```
/// use emojifeed::util::display_width;
///
/// assert_eq!(display_width("panda"), 5);
/// assert_eq!(display_width("🐼"), 2);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shortens `s` to at most `max_width` columns, ending in `…` when cut.
///
/// Returns the input borrowed when it already fits.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    // Reserve one column for the ellipsis
    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Truncates or right-pads `s` with spaces to exactly `width` columns.
///
/// A wide glyph that does not fit the last column is replaced by padding, so
/// the result may never exceed `width`.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let cell = truncate_to_width(s, width);
    let fill = width.saturating_sub(display_width(&cell));
    format!("{}{}", cell, " ".repeat(fill))
}

/// Removes ASCII control characters and ANSI escape sequences from feed text
/// before it is written to a terminal. Tabs are kept.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let is_control = |c: char| (c.is_ascii_control() && c != '\t') || c == '\u{7f}';
    if !s.chars().any(is_control) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // CSI: ESC [ params final-byte
            if chars.peek() == Some(&'[') {
                chars.next();
                for next in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&next) {
                        break;
                    }
                }
            }
            continue;
        }
        if !is_control(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
