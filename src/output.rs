use crate::emoji::EmojiRecord;
use crate::util::{pad_to_width, strip_control_chars};
use std::io::{self, Write};

const CODE_POINT_WIDTH: usize = 24;
const CHARACTER_WIDTH: usize = 4;
const SLUG_WIDTH: usize = 40;

/// How records are written by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Aligned columns for reading in a terminal
    #[default]
    Table,
    /// One pretty-printed JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}

/// Writes `records` to `out` in the requested format.
pub fn render<W: Write>(records: &[EmojiRecord], format: Format, out: &mut W) -> io::Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)
        }
        Format::Jsonl => {
            for record in records {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
            Ok(())
        }
        Format::Table => render_table(records, out),
    }
}

fn render_table<W: Write>(records: &[EmojiRecord], out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {} GROUP / SUBGROUP",
        pad_to_width("CODE POINT", CODE_POINT_WIDTH),
        pad_to_width("CHAR", CHARACTER_WIDTH),
        pad_to_width("SLUG", SLUG_WIDTH),
    )?;

    for record in records {
        // Feed text is untrusted; keep escape sequences away from the terminal
        let code_point = strip_control_chars(&record.code_point);
        let character = strip_control_chars(&record.character);
        let slug = strip_control_chars(&record.slug);
        let group = strip_control_chars(&record.group);
        let sub_group = strip_control_chars(&record.sub_group);

        writeln!(
            out,
            "{} {} {} {} / {}",
            pad_to_width(&code_point, CODE_POINT_WIDTH),
            pad_to_width(&character, CHARACTER_WIDTH),
            pad_to_width(&slug, SLUG_WIDTH),
            group,
            sub_group,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panda() -> EmojiRecord {
        EmojiRecord {
            slug: "panda-face".into(),
            character: "🐼".into(),
            unicode_name: "panda face".into(),
            code_point: "1F43C".into(),
            group: "Animals & Nature".into(),
            sub_group: "animal-mammal".into(),
        }
    }

    fn rendered(records: &[EmojiRecord], format: Format) -> String {
        let mut buf = Vec::new();
        render(records, format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_json_array() {
        let text = rendered(&[panda()], Format::Json);
        let parsed: Vec<EmojiRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![panda()]);
        assert!(text.contains("\"unicodeName\": \"panda face\""));
    }

    #[test]
    fn test_jsonl_one_line_per_record() {
        let text = rendered(&[panda(), panda()], Format::Jsonl);
        assert_eq!(text.lines().count(), 2);
        for line in text.lines() {
            let parsed: EmojiRecord = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.slug, "panda-face");
        }
    }

    #[test]
    fn test_table_has_header_and_row() {
        let text = rendered(&[panda()], Format::Table);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("CODE POINT"));
        assert!(lines[1].starts_with("1F43C"));
        assert!(lines[1].contains("panda-face"));
        assert!(lines[1].ends_with("Animals & Nature / animal-mammal"));
    }

    #[test]
    fn test_table_strips_escape_sequences() {
        let mut record = panda();
        record.group = "\x1b[2JAnimals".into();
        let text = rendered(&[record], Format::Table);
        assert!(!text.contains('\x1b'));
        assert!(text.contains("Animals / animal-mammal"));
    }

    #[test]
    fn test_table_strips_escape_sequences_from_code_point() {
        let mut record = panda();
        record.code_point = "1F43C\x1b[2K\x07".into();
        let text = rendered(&[record], Format::Table);
        assert!(!text.contains('\x1b'));
        assert!(!text.contains('\x07'));
        assert!(text.lines().nth(1).unwrap().starts_with("1F43C "));
    }

    #[test]
    fn test_empty_json_is_empty_array() {
        assert_eq!(rendered(&[], Format::Json).trim(), "[]");
    }
}
