//! Cost database persistence, spreadsheet import and export

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use shared::{CostDatabase, PriceValue};

use super::product_store::StoreOptions;
use super::{CostDbError, StoreError, atomic, repair};
use crate::utils::csv::{column_index, column_letters, headerless_reader, reader};

pub const COL_PART_NUMBER: &str = "Part Number";
pub const COL_PRICE: &str = "Price";

/// `cost_db.json` on disk
#[derive(Debug, Clone)]
pub struct CostStore {
    path: PathBuf,
    options: StoreOptions,
    save_lock: Arc<Mutex<()>>,
}

impl CostStore {
    pub fn new(path: impl Into<PathBuf>, options: StoreOptions, save_lock: Arc<Mutex<()>>) -> Self {
        Self {
            path: path.into(),
            options,
            save_lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the database; a missing file is an empty database
    pub fn load(&self) -> Result<CostDatabase, CostDbError> {
        if !self.path.exists() {
            return Ok(CostDatabase::new());
        }
        let text = std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if text.trim().is_empty() {
            return Ok(CostDatabase::new());
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => from_json(value),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cost database is corrupted, attempting repair");
                match repair::try_repair(&self.path, self.options.write_backup)? {
                    Some(repaired) => from_json(repaired.value),
                    None => Err(CostDbError::Corrupted(e)),
                }
            }
        }
    }

    pub fn save(&self, db: &CostDatabase) -> Result<(), CostDbError> {
        let _guard = self.save_lock.lock();
        atomic::write_json(&self.path, db, self.options.write_backup)?;
        tracing::debug!(path = %self.path.display(), parts = db.len(), "Cost database saved");
        Ok(())
    }
}

fn from_json(value: Value) -> Result<CostDatabase, CostDbError> {
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(part, price)| (part, price_from_json(price)))
            .collect()),
        _ => Err(StoreError::NotAnObject.into()),
    }
}

fn price_from_json(value: Value) -> PriceValue {
    match value {
        Value::Number(n) => PriceValue::Number(n),
        Value::String(s) => PriceValue::Text(s),
        Value::Null => PriceValue::Text(String::new()),
        other => PriceValue::Text(other.to_string()),
    }
}

// ========== Spreadsheet import / export ==========

/// A part whose price an import replaced
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub part_number: String,
    pub old: PriceValue,
    pub new: PriceValue,
}

/// Read `Part Number` / `Price` rows. Blank part numbers are skipped; later
/// rows win over earlier ones.
pub fn read_cost_csv(data: &[u8]) -> Result<CostDatabase, CostDbError> {
    let mut rdr = reader(data);
    let headers = rdr.headers()?.clone();
    let part_col = column_index(&headers, COL_PART_NUMBER).ok_or(CostDbError::MissingColumn(COL_PART_NUMBER))?;
    let price_col = column_index(&headers, COL_PRICE).ok_or(CostDbError::MissingColumn(COL_PRICE))?;

    let mut db = CostDatabase::new();
    for record in rdr.records() {
        let record = record?;
        let part = record.get(part_col).unwrap_or_default().trim();
        if part.is_empty() {
            continue;
        }
        let price = record.get(price_col).unwrap_or_default();
        db.insert(part, PriceValue::parse(price));
    }
    Ok(db)
}

pub fn read_cost_csv_file(path: &Path) -> Result<CostDatabase, CostDbError> {
    let data = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    read_cost_csv(&data)
}

/// Column choice for a sheet without `Part Number` / `Price` headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub part_column: usize,
    pub price_column: usize,
    /// Leading rows to ignore (titles, vendor headers)
    pub skip_rows: usize,
    /// Prepended to every part number
    pub prefix: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            part_column: 0,
            price_column: 1,
            skip_rows: 0,
            prefix: String::new(),
        }
    }
}

/// Spreadsheets hand integer part numbers over as `1234.0`
fn part_number_text(raw: &str) -> &str {
    match raw.split_once('.') {
        Some((int, frac))
            if !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit()) && frac.bytes().all(|b| b == b'0') =>
        {
            int
        }
        _ => raw,
    }
}

/// Read part and price from chosen columns of a header-less sheet
///
/// Prices are rounded to cents; non-numeric prices are kept as text. Rows
/// with a blank part number, or too short to reach the part column, are
/// skipped.
pub fn read_cost_columns(data: &[u8], layout: &ColumnLayout) -> Result<CostDatabase, CostDbError> {
    let mut db = CostDatabase::new();
    let mut widest = 0;
    for record in headerless_reader(data).records().skip(layout.skip_rows) {
        let record = record?;
        widest = widest.max(record.len());
        let Some(raw_part) = record.get(layout.part_column).map(str::trim) else {
            continue;
        };
        if raw_part.is_empty() {
            continue;
        }
        let part = format!("{}{}", layout.prefix, part_number_text(raw_part));
        let price = record.get(layout.price_column).unwrap_or_default();
        db.insert(part, PriceValue::parse_rounded(price, 2));
    }

    let needed = layout.part_column.max(layout.price_column);
    if widest > 0 && widest <= needed {
        return Err(CostDbError::ColumnOutOfRange {
            column: column_letters(needed),
            width: widest,
        });
    }
    Ok(db)
}

pub fn read_cost_columns_file(path: &Path, layout: &ColumnLayout) -> Result<CostDatabase, CostDbError> {
    let data = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
    read_cost_columns(&data, layout)
}

/// Merge `incoming` over `current`; returns the prices it replaced
pub fn merge_costs(current: &mut CostDatabase, incoming: CostDatabase) -> Vec<PriceChange> {
    let overridden = overridden_prices(current, &incoming);
    for (part, price) in incoming.iter() {
        current.insert(part.clone(), price.clone());
    }
    overridden
}

fn same_price(a: &PriceValue, b: &PriceValue) -> bool {
    match (a, b) {
        (PriceValue::Number(_), PriceValue::Number(_)) => a.to_decimal() == b.to_decimal(),
        _ => a == b,
    }
}

/// Parts present in both databases whose price differs
pub fn overridden_prices(old: &CostDatabase, new: &CostDatabase) -> Vec<PriceChange> {
    new.iter()
        .filter_map(|(part, price)| {
            let previous = old.get(part)?;
            (!same_price(previous, price)).then(|| PriceChange {
                part_number: part.clone(),
                old: previous.clone(),
                new: price.clone(),
            })
        })
        .collect()
}

/// Write `Part Number,Price` rows in part-number order
pub fn write_cost_csv<W: std::io::Write>(db: &CostDatabase, writer: W) -> Result<(), CostDbError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([COL_PART_NUMBER, COL_PRICE])?;
    for (part, price) in db.iter() {
        wtr.write_record([part.as_str(), price.cost_text().as_str()])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Export to a CSV file; the file is replaced atomically
pub fn export_cost_csv(db: &CostDatabase, path: &Path) -> Result<(), CostDbError> {
    let mut buf = Vec::new();
    write_cost_csv(db, &mut buf)?;
    atomic::write_atomic(path, &buf, false)?;
    Ok(())
}
