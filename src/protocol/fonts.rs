//! Font records and font-list response parsing.

use rustc_hash::FxHashMap;

use crate::error::Error;

/// A font known to the renderer, with whatever key-value attributes the
/// daemon chose to attach (style, file path, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontRecord {
    pub family: String,
    pub attributes: FxHashMap<String, String>,
}

impl FontRecord {
    fn new(family: &str) -> Self {
        Self {
            family: family.to_owned(),
            attributes: FxHashMap::default(),
        }
    }
}

/// Parses a font-list response body.
///
/// A line without `=` starts a record named by the whole line; a
/// `key=value` line attaches to the record started most recently. An
/// attribute line before any record means the stream is garbled.
pub fn parse_font_list(body: &str) -> Result<Vec<FontRecord>, Error> {
    let mut records: Vec<FontRecord> = Vec::new();
    for line in body.trim().lines() {
        if line.is_empty() {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let record = records.last_mut().ok_or_else(|| {
                Error::Protocol(format!("font attribute {line:?} before any font record"))
            })?;
            record.attributes.insert(key.to_owned(), value.to_owned());
        } else {
            records.push(FontRecord::new(line));
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_attributes_parse() {
        let records =
            parse_font_list("DejaVu Sans\nstyle=Book\nfile=/usr/share/a.ttf\nArial\n\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].family, "DejaVu Sans");
        assert_eq!(records[0].attributes.get("style").map(String::as_str), Some("Book"));
        assert_eq!(
            records[0].attributes.get("file").map(String::as_str),
            Some("/usr/share/a.ttf")
        );
        assert_eq!(records[1].family, "Arial");
        assert!(records[1].attributes.is_empty());
    }

    #[test]
    fn values_may_contain_the_separator() {
        let records = parse_font_list("F\nnote=a=b\n\n").unwrap();
        assert_eq!(records[0].attributes.get("note").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn empty_list_is_fine() {
        assert!(parse_font_list("\n").unwrap().is_empty());
        assert!(parse_font_list("").unwrap().is_empty());
    }

    #[test]
    fn attribute_without_a_record_is_a_framing_error() {
        assert!(matches!(
            parse_font_list("style=Book\n"),
            Err(Error::Protocol(_))
        ));
    }
}
