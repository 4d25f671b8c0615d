//! Variant table aggregation
//!
//! Rebuilds `in_tree_df` from the imported rows: one variant per input row,
//! priced from the base values plus the matched option rows, with New SKUs
//! carried over from the previous table when they were already set.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use shared::{InputRow, OptionMasterTable, ProductRecord, VariantRow};

use super::sku_code::{self, SkuCodeGenerator};
use super::{CatalogError, option_blob};
use crate::pricing::{self, PriceBreakdown};

/// Sorted distinct option names over all input rows
pub fn option_names(rows: &[InputRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| option_blob::parse_options(&row.options))
        .map(|(name, _)| name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parsed base price and weight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseValues {
    pub price: Decimal,
    pub weight: Decimal,
}

impl BaseValues {
    /// Both values must parse
    pub fn strict(record: &ProductRecord) -> Result<Self, CatalogError> {
        let price = record
            .base_price
            .to_decimal()
            .ok_or_else(|| CatalogError::InvalidBasePrice(record.base_price.to_string()))?;
        let weight = record
            .base_weight
            .to_decimal()
            .ok_or_else(|| CatalogError::InvalidBaseWeight(record.base_weight.to_string()))?;
        Ok(Self { price, weight })
    }

    /// Unparsable values count as 0, with a warning
    pub fn lenient(key: &str, record: &ProductRecord) -> Self {
        let price = record.base_price.to_decimal().unwrap_or_else(|| {
            tracing::warn!(base_sku = %key, value = %record.base_price, "Base price is not a number, using 0");
            Decimal::ZERO
        });
        let weight = record.base_weight.to_decimal().unwrap_or_else(|| {
            tracing::warn!(base_sku = %key, value = %record.base_weight, "Base weight is not a number, using 0");
            Decimal::ZERO
        });
        Self { price, weight }
    }
}

/// Build the variant table for `input`
///
/// `existing` New SKUs are kept when the row at the same position has the
/// same original SKU and a non-empty New SKU; other rows are filled by
/// `generator`.
pub fn aggregate(
    input: &[InputRow],
    master: &OptionMasterTable,
    base: BaseValues,
    existing: &[VariantRow],
    generator: Option<&SkuCodeGenerator>,
) -> Vec<VariantRow> {
    let names = option_names(input);
    let kept: HashMap<(&str, usize), &str> = existing
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.new_sku.is_empty())
        .map(|(pos, row)| ((row.sku.as_str(), pos), row.new_sku.as_str()))
        .collect();

    let mut rows: Vec<VariantRow> = input
        .iter()
        .enumerate()
        .map(|(pos, input_row)| {
            let selections = option_blob::parse_options(&input_row.options);
            let totals = pricing::option_totals(
                master,
                selections.iter().map(|(n, v)| (n.as_str(), v.as_str())),
            );
            let priced = pricing::variant_totals(base.price, base.weight, totals);

            let options = names
                .iter()
                .map(|name| {
                    let value = selections
                        .iter()
                        .find(|(n, _)| n == name)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default();
                    (name.clone(), value)
                })
                .collect();

            VariantRow {
                index: pos + 1,
                sku: input_row.sku.clone(),
                new_sku: kept
                    .get(&(input_row.sku.as_str(), pos))
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                price: priced.price,
                weight: priced.weight,
                options,
            }
        })
        .collect();

    if let Some(generator) = generator {
        sku_code::fill(&mut rows, generator);
    }
    rows
}

/// Rebuild a product's variant table in place; base values must parse
pub fn regenerate(record: &mut ProductRecord, key: &str) -> Result<(), CatalogError> {
    let base = BaseValues::strict(record)?;
    rebuild(record, key, base);
    Ok(())
}

/// Rebuild a product's variant table with already-resolved base values
pub fn rebuild(record: &mut ProductRecord, key: &str, base: BaseValues) {
    let generator = SkuCodeGenerator::new(record.effective_base_sku(key), &record.prefix);
    let rows = aggregate(
        &record.input_df,
        &record.master_df,
        base,
        &record.in_tree_df,
        generator.as_ref(),
    );
    record.in_tree_df = rows;
}

/// Overwrite every New SKU of the product
pub fn generate_skus(
    record: &mut ProductRecord,
    key: &str,
) -> Result<Option<sku_code::SkuLengthWarning>, CatalogError> {
    let generator = SkuCodeGenerator::new(record.effective_base_sku(key), &record.prefix)
        .ok_or(CatalogError::EmptyBaseSku)?;
    Ok(sku_code::assign(&mut record.in_tree_df, &generator))
}

/// First variant matching a full selection
///
/// Every option name needs a non-empty value; selections for names the
/// table has no column for are ignored.
pub fn spot_check<'a>(
    record: &'a ProductRecord,
    selections: &[(String, String)],
) -> Result<&'a VariantRow, CatalogError> {
    let names = option_names(&record.input_df);
    let chosen = |name: &str| {
        selections
            .iter()
            .find(|(n, _)| n.trim() == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    };
    let missing: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| chosen(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(CatalogError::IncompleteSelection(missing.join(", ")));
    }

    record
        .in_tree_df
        .iter()
        .find(|row| {
            selections.iter().all(|(name, value)| match row.option(name.trim()) {
                Some(selected) => selected == value.trim(),
                None => true,
            })
        })
        .ok_or(CatalogError::VariantNotFound)
}

/// Price breakdown of one variant (unparsable base values count as 0)
pub fn price_breakdown(key: &str, record: &ProductRecord, row: &VariantRow) -> PriceBreakdown {
    let base = BaseValues::lenient(key, record);
    pricing::breakdown(
        &record.master_df,
        base.price,
        base.weight,
        row.options.iter().map(|(n, v)| (n.as_str(), v.as_str())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::master;
    use shared::Amount;

    fn product() -> ProductRecord {
        let input_df = vec![
            InputRow::new("OLD-1", "Name=Size|Value=L|Name=Color|Value=Red"),
            InputRow::new("OLD-2", "Name=Color|Value=Blue"),
            InputRow::new("OLD-3", "Name=Color|Value=Green|Name=Size|Value=S"),
        ];
        let mut master_df = master::from_input(&input_df);
        if let Some(row) = master_df.find_mut("Color", "Red") {
            row.cost = Amount::new("5");
            row.weight = Amount::new("0.5");
        }
        if let Some(row) = master_df.find_mut("Size", "L") {
            row.cost = Amount::new("2.255");
        }
        ProductRecord {
            input_df,
            master_df,
            base_price: Amount::new("100"),
            base_weight: Amount::new("10"),
            base_sku: "Widget (SSS)".to_string(),
            prefix: "M".to_string(),
            ..ProductRecord::default()
        }
    }

    #[test]
    fn test_option_names_sorted() {
        assert_eq!(option_names(&product().input_df), vec!["Color", "Size"]);
    }

    #[test]
    fn test_regenerate_prices_and_columns() {
        let mut record = product();
        regenerate(&mut record, "KEY").unwrap();
        let rows = &record.in_tree_df;
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].price, 107.26);
        assert_eq!(rows[0].weight, 10.5);
        assert_eq!(
            rows[0].options,
            vec![
                ("Color".to_string(), "Red".to_string()),
                ("Size".to_string(), "L".to_string())
            ]
        );

        assert_eq!(rows[1].price, 100.0);
        assert_eq!(rows[1].option("Size"), Some(""));
        assert_eq!(rows[2].price, 100.0);
        assert_eq!(rows[2].new_sku, "Widget-M0003");
    }

    #[test]
    fn test_regenerate_keeps_existing_new_skus() {
        let mut record = product();
        regenerate(&mut record, "KEY").unwrap();
        record.in_tree_df[1].new_sku = "CUSTOM".to_string();
        record.in_tree_df[2].new_sku = String::new();

        regenerate(&mut record, "KEY").unwrap();
        assert_eq!(record.in_tree_df[0].new_sku, "Widget-M0001");
        assert_eq!(record.in_tree_df[1].new_sku, "CUSTOM");
        assert_eq!(record.in_tree_df[2].new_sku, "Widget-M0003");
    }

    #[test]
    fn test_kept_new_sku_needs_same_original_sku() {
        let mut record = product();
        regenerate(&mut record, "KEY").unwrap();
        record.in_tree_df[0].new_sku = "CUSTOM".to_string();
        record.input_df[0].sku = "REPLACED".to_string();

        regenerate(&mut record, "KEY").unwrap();
        assert_eq!(record.in_tree_df[0].new_sku, "Widget-M0001");
    }

    #[test]
    fn test_bad_base_price_refuses() {
        let mut record = product();
        record.base_price = Amount::new("ten");
        let err = regenerate(&mut record, "KEY").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidBasePrice(_)));
        assert!(record.in_tree_df.is_empty());
    }

    #[test]
    fn test_blank_base_sku_uses_key() {
        let mut record = product();
        record.base_sku = String::new();
        regenerate(&mut record, "K 9").unwrap();
        assert_eq!(record.in_tree_df[0].new_sku, "K9-M0001");
    }

    #[test]
    fn test_generate_skus_overwrites() {
        let mut record = product();
        regenerate(&mut record, "KEY").unwrap();
        record.in_tree_df[1].new_sku = "CUSTOM".to_string();
        record.prefix = "-3".to_string();
        assert!(generate_skus(&mut record, "KEY").unwrap().is_none());
        assert_eq!(record.in_tree_df[1].new_sku, "Widget-2");

        record.base_sku = "(x)".to_string();
        assert!(matches!(generate_skus(&mut record, ""), Err(CatalogError::EmptyBaseSku)));
    }

    #[test]
    fn test_spot_check() {
        let mut record = product();
        regenerate(&mut record, "KEY").unwrap();

        let pick = |c: &str, s: &str| vec![("Color".to_string(), c.to_string()), ("Size".to_string(), s.to_string())];
        let row = spot_check(&record, &pick("Green", "S")).unwrap();
        assert_eq!(row.sku, "OLD-3");

        assert!(matches!(
            spot_check(&record, &pick("Green", "")),
            Err(CatalogError::IncompleteSelection(name)) if name == "Size"
        ));
        assert!(matches!(
            spot_check(&record, &pick("Blue", "L")),
            Err(CatalogError::VariantNotFound)
        ));
    }

    #[test]
    fn test_price_breakdown() {
        let mut record = product();
        regenerate(&mut record, "KEY").unwrap();
        let b = price_breakdown("KEY", &record, &record.in_tree_df[0]);
        let labels: Vec<&str> = b.lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["BASE", "Color", "Size", "TOTAL"]);
        assert_eq!(b.total().unwrap().cost.to_string(), "107.26");
    }
}
