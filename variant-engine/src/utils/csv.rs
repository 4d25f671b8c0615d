//! CSV helpers shared by the variant and cost importers

/// Drop a leading UTF-8 byte order mark (spreadsheet exports add one)
pub fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data)
}

/// Reader over in-memory CSV: headers on, ragged rows allowed
pub fn reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(strip_utf8_bom(data))
}

/// Reader for sheets without a header row
pub fn headerless_reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(strip_utf8_bom(data))
}

/// Spreadsheet column letters to a zero-based index: `A` is 0, `AA` is 26
pub fn column_from_letters(letters: &str) -> Option<usize> {
    let letters = letters.trim();
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |acc, c| {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase()
            .then(|| acc * 26 + (c as usize - 'A' as usize + 1))
    })
    .map(|n| n - 1)
}

/// Inverse of [`column_from_letters`]
pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Position of a column, matched on the trimmed header
pub fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_is_stripped() {
        assert_eq!(strip_utf8_bom(b"\xEF\xBB\xBFSKU"), b"SKU");
        assert_eq!(strip_utf8_bom(b"SKU"), b"SKU");
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_from_letters("A"), Some(0));
        assert_eq!(column_from_letters("z"), Some(25));
        assert_eq!(column_from_letters("AA"), Some(26));
        assert_eq!(column_from_letters("AB"), Some(27));
        assert_eq!(column_from_letters("A1"), None);
        assert_eq!(column_from_letters(""), None);
        for index in [0, 25, 26, 701, 702] {
            assert_eq!(column_from_letters(&column_letters(index)), Some(index));
        }
    }

    #[test]
    fn test_column_index_trims_headers() {
        let mut rdr = reader(b"\xEF\xBB\xBF Part Number ,Price\nA,1\n");
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(column_index(&headers, "Part Number"), Some(0));
        assert_eq!(column_index(&headers, "Price"), Some(1));
        assert_eq!(column_index(&headers, "Cost"), None);
    }
}
