//! Variant CSV import
//!
//! The first data row describes the base product (SKU, price, weight); the
//! rows with an `Options` blob are the variants. The storefront the export
//! came from decides the base SKU suffix and the default New SKU prefix.

use std::path::Path;

use serde_json::{Map, Value};
use shared::{Amount, InputRow, ProductRecord};

use super::sku_code::SkuLengthWarning;
use super::{CatalogError, master, variants};
use crate::utils::csv::{column_index, reader};

pub const COL_SKU: &str = "SKU";
pub const COL_OPTIONS: &str = "Options";
pub const COL_PRICE: &str = "Price";
pub const COL_WEIGHT: &str = "Weight";

const SUSPENSION_SUPERSTORE_MARKER: &str = "suspensionsuperstore";

/// Storefront an export came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storefront {
    SuspensionSuperstore,
    MaxTrac,
}

impl Storefront {
    /// The marker anywhere in the file (any case) means SuspensionSuperstore
    pub fn detect(content: &str) -> Self {
        if content.to_lowercase().contains(SUSPENSION_SUPERSTORE_MARKER) {
            Self::SuspensionSuperstore
        } else {
            Self::MaxTrac
        }
    }

    /// Appended to the base SKU to form the store key
    pub fn suffix(self) -> &'static str {
        match self {
            Self::SuspensionSuperstore => "",
            Self::MaxTrac => " (MXT)",
        }
    }

    /// Default New SKU prefix
    pub fn prefix(self) -> &'static str {
        match self {
            Self::SuspensionSuperstore => "",
            Self::MaxTrac => "M",
        }
    }
}

/// What to do when the imported base SKU is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportChoice {
    Overwrite,
    LoadExisting,
    Cancel,
}

/// A product built from a variant CSV, not yet stored
#[derive(Debug, Clone)]
pub struct ImportedProduct {
    /// Store key: base SKU plus storefront suffix
    pub key: String,
    pub storefront: Storefront,
    pub record: ProductRecord,
    pub sku_warning: Option<SkuLengthWarning>,
}

fn cell_or_zero(record: &csv::StringRecord, col: Option<usize>) -> Amount {
    let text = col
        .and_then(|c| record.get(c))
        .map(str::trim)
        .unwrap_or_default();
    if text.is_empty() {
        Amount::zero()
    } else {
        Amount::new(text)
    }
}

pub fn read_variant_csv(data: &[u8]) -> Result<ImportedProduct, CatalogError> {
    let storefront = Storefront::detect(&String::from_utf8_lossy(data));

    let mut rdr = reader(data);
    let headers = rdr.headers()?.clone();
    let sku_col = column_index(&headers, COL_SKU).ok_or(CatalogError::MissingColumn(COL_SKU))?;
    let options_col = column_index(&headers, COL_OPTIONS).ok_or(CatalogError::MissingColumn(COL_OPTIONS))?;
    let price_col = column_index(&headers, COL_PRICE);
    let weight_col = column_index(&headers, COL_WEIGHT);

    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    let base_row = records.first().ok_or(CatalogError::EmptyImport)?;

    let base_sku = base_row.get(sku_col).unwrap_or_default().trim();
    if base_sku.is_empty() || base_sku.eq_ignore_ascii_case("nan") {
        return Err(CatalogError::EmptyBaseSku);
    }
    let key = format!("{}{}", base_sku, storefront.suffix());

    let input_df: Vec<InputRow> = records
        .iter()
        .filter(|r| !r.get(options_col).unwrap_or_default().trim().is_empty())
        .map(|r| {
            let mut row = InputRow::new(r.get(sku_col).unwrap_or_default().trim(), r.get(options_col).unwrap_or_default());
            row.extra = headers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != sku_col && *i != options_col)
                .map(|(i, h)| (h.trim().to_string(), Value::String(r.get(i).unwrap_or_default().to_string())))
                .collect::<Map<_, _>>();
            row
        })
        .collect();

    let mut record = ProductRecord {
        master_df: master::from_input(&input_df),
        input_df,
        base_price: cell_or_zero(base_row, price_col),
        base_weight: cell_or_zero(base_row, weight_col),
        base_sku: key.clone(),
        prefix: storefront.prefix().to_string(),
        ..ProductRecord::default()
    };
    variants::regenerate(&mut record, &key)?;
    let sku_warning = variants::generate_skus(&mut record, &key)?;

    tracing::info!(
        base_sku = %key,
        storefront = ?storefront,
        variants = record.in_tree_df.len(),
        options = record.master_df.len(),
        "Variant file parsed"
    );
    Ok(ImportedProduct {
        key,
        storefront,
        record,
        sku_warning,
    })
}

pub fn read_variant_csv_file(path: &Path) -> Result<ImportedProduct, CatalogError> {
    let data = std::fs::read(path)?;
    read_variant_csv(&data)
}
