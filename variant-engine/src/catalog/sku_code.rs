//! New SKU code generation
//!
//! `NewSKU = CleanedBase + "-" + Prefix + zero-padded 1-based index`.
//! The cleaned base drops every `(...)` group and all spaces. A prefix of
//! `-<n>` is not a prefix: it removes `n` zeros of padding instead.

use std::sync::LazyLock;

use regex::Regex;
use shared::VariantRow;

static PAREN_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("PAREN_GROUP is a valid regex pattern"));

/// Storefront limit on SKU length
pub const MAX_SKU_LEN: usize = 20;

const DEFAULT_PADDING: usize = 4;

/// Base SKU with `(...)` groups and spaces removed
pub fn clean_base(base_sku: &str) -> String {
    PAREN_GROUP
        .replace_all(base_sku, "")
        .replace(' ', "")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuCodeGenerator {
    base: String,
    prefix: String,
    padding: usize,
}

impl SkuCodeGenerator {
    /// `None` when the cleaned base is empty
    pub fn new(base_sku: &str, prefix: &str) -> Option<Self> {
        let base = clean_base(base_sku);
        if base.is_empty() {
            return None;
        }

        let prefix = prefix.trim();
        let zero_removal = prefix
            .strip_prefix('-')
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .map(|digits| digits.parse::<usize>().unwrap_or(usize::MAX));

        let (prefix, padding) = match zero_removal {
            Some(n) => (String::new(), DEFAULT_PADDING.saturating_sub(n).max(1)),
            None => (prefix.to_string(), DEFAULT_PADDING),
        };
        Some(Self { base, prefix, padding })
    }

    /// Code for the 1-based `index`
    pub fn code(&self, index: usize) -> String {
        format!("{}-{}{:0width$}", self.base, self.prefix, index, width = self.padding)
    }
}

/// First generated SKU is longer than [`MAX_SKU_LEN`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuLengthWarning {
    pub example: String,
    pub length: usize,
}

impl std::fmt::Display for SkuLengthWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Generated SKUs are {} characters long, over the {} character limit (e.g. {})",
            self.length, MAX_SKU_LEN, self.example
        )
    }
}

fn length_warning(rows: &[VariantRow]) -> Option<SkuLengthWarning> {
    let first = rows.first()?;
    let length = first.new_sku.chars().count();
    (length > MAX_SKU_LEN).then(|| SkuLengthWarning {
        example: first.new_sku.clone(),
        length,
    })
}

/// Overwrite every row's New SKU with the code for its position
pub fn assign(rows: &mut [VariantRow], generator: &SkuCodeGenerator) -> Option<SkuLengthWarning> {
    for (pos, row) in rows.iter_mut().enumerate() {
        row.new_sku = generator.code(pos + 1);
    }
    let warning = length_warning(rows);
    if let Some(w) = &warning {
        tracing::warn!(example = %w.example, length = w.length, "Generated SKUs exceed length limit");
    }
    warning
}

/// Give rows without a New SKU the code for their position
pub fn fill(rows: &mut [VariantRow], generator: &SkuCodeGenerator) -> usize {
    let mut filled = 0;
    for (pos, row) in rows.iter_mut().enumerate() {
        if row.new_sku.is_empty() {
            row.new_sku = generator.code(pos + 1);
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(base: &str, prefix: &str, index: usize) -> Option<String> {
        SkuCodeGenerator::new(base, prefix).map(|g| g.code(index))
    }

    #[test]
    fn test_parenthesised_text_and_spaces_are_dropped() {
        assert_eq!(code("Widget-100 (SSS)", "", 3).as_deref(), Some("Widget-100-0003"));
        assert_eq!(code("Lift Kit (MXT) 2", "M", 12).as_deref(), Some("LiftKit2-M0012"));
    }

    #[test]
    fn test_zero_removal_prefix() {
        assert_eq!(code("ABC", "-2", 5).as_deref(), Some("ABC-05"));
        assert_eq!(code("ABC", "-9", 5).as_deref(), Some("ABC-5"));
        assert_eq!(code("ABC", " -1 ", 5).as_deref(), Some("ABC-005"));
    }

    #[test]
    fn test_dash_without_digits_is_a_prefix() {
        assert_eq!(code("ABC", "-", 1).as_deref(), Some("ABC--0001"));
        assert_eq!(code("ABC", "-x", 1).as_deref(), Some("ABC--x0001"));
    }

    #[test]
    fn test_index_grows_past_padding() {
        assert_eq!(code("ABC", "", 12345).as_deref(), Some("ABC-12345"));
    }

    #[test]
    fn test_empty_base_gives_no_generator() {
        assert!(SkuCodeGenerator::new("(only) ( notes )", "M").is_none());
        assert!(SkuCodeGenerator::new("   ", "").is_none());
    }

    #[test]
    fn test_assign_and_fill() {
        let generator = SkuCodeGenerator::new("ABC", "M").unwrap();
        let mut rows = vec![VariantRow::default(), VariantRow::default(), VariantRow::default()];
        rows[1].new_sku = "KEEP".to_string();

        assert_eq!(fill(&mut rows, &generator), 2);
        assert_eq!(rows[1].new_sku, "KEEP");
        assert_eq!(rows[2].new_sku, "ABC-M0003");

        assert!(assign(&mut rows, &generator).is_none());
        assert_eq!(rows[1].new_sku, "ABC-M0002");
    }

    #[test]
    fn test_length_warning_on_first_sku() {
        let generator = SkuCodeGenerator::new("VERY-LONG-BASE-SKU", "M").unwrap();
        let mut rows = vec![VariantRow::default()];
        let warning = assign(&mut rows, &generator).unwrap();
        assert_eq!(warning.example, "VERY-LONG-BASE-SKU-M0001");
        assert_eq!(warning.length, 24);
    }
}
