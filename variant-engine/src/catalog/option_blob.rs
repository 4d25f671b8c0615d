//! Option blob parsing
//!
//! Imported variant rows describe their selections as repeated
//! `Name=<name>|Value=<value>` groups. A value is the shortest non-empty
//! run of non-`|` characters that is followed by `Type=` or by the end of
//! the text (a single trailing newline counts as the end). Groups whose
//! value is not terminated that way are skipped.

use std::sync::LazyLock;

use regex::Regex;

static NAME_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Name=([^|]+)\|Value=([^|]+)").expect("NAME_VALUE is a valid regex pattern")
});

const TYPE_MARKER: &str = "Type=";

fn terminates_value(text: &str, at: usize) -> bool {
    let rest = &text[at..];
    rest.is_empty() || rest == "\n" || rest.starts_with(TYPE_MARKER)
}

/// End of the shortest value starting at `start` within the run ending at `run_end`
fn value_end(text: &str, start: usize, run_end: usize) -> Option<usize> {
    text[start..run_end]
        .char_indices()
        .skip(1)
        .map(|(i, _)| start + i)
        .chain(std::iter::once(run_end))
        .find(|&end| terminates_value(text, end))
}

/// Raw (untrimmed) name/value pairs in blob order
pub fn raw_pairs(blob: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    let mut pos = 0;
    while pos < blob.len() {
        let Some(caps) = NAME_VALUE.captures_at(blob, pos) else {
            break;
        };
        let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        match value_end(blob, value.start(), value.end()) {
            Some(end) => {
                pairs.push((name.as_str(), &blob[value.start()..end]));
                pos = end;
            }
            None => pos = whole.start() + 1,
        }
    }
    pairs
}

/// Trimmed (name, value) selections of one variant
pub fn parse_options(blob: &str) -> Vec<(String, String)> {
    raw_pairs(blob)
        .into_iter()
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(blob: &str) -> Vec<(String, String)> {
        parse_options(blob)
    }

    fn owned(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_value_stops_at_type_marker() {
        assert_eq!(
            pairs("Name=Color|Value=Red Type=Select|Name=Size|Value=Large"),
            owned(&[("Color", "Red"), ("Size", "Large")])
        );
    }

    #[test]
    fn test_value_runs_to_end_of_text() {
        assert_eq!(pairs("Name=Finish|Value=Satin Black"), owned(&[("Finish", "Satin Black")]));
        assert_eq!(pairs("Name=Finish|Value=Gloss\n"), owned(&[("Finish", "Gloss")]));
    }

    #[test]
    fn test_unterminated_value_is_skipped() {
        assert_eq!(
            pairs("Name=A|Value=B|Name=C|Value=D"),
            owned(&[("C", "D")])
        );
    }

    #[test]
    fn test_shortest_value_wins() {
        let raw = raw_pairs("Name=Kit|Value=Lift Type=A Type=B");
        assert_eq!(raw, vec![("Kit", "Lift ")]);
    }

    #[test]
    fn test_no_groups() {
        assert!(pairs("").is_empty());
        assert!(pairs("Color=Red").is_empty());
        assert!(pairs("Name=Color|Value=").is_empty());
    }

    #[test]
    fn test_non_ascii_values() {
        assert_eq!(pairs("Name=Größe|Value=Groß"), owned(&[("Größe", "Groß")]));
    }
}
