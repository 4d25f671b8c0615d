//! Variant table spreadsheet export

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use shared::util::{export_dir_stamp, last_export_stamp};
use shared::{ProductRecord, VariantRow};

use super::ReconcileError;
use crate::core::DataPaths;
use crate::store::{ProductStore, atomic};

/// File name for a product export; path separators become `_`
pub fn export_file_name(base_sku: &str) -> String {
    format!("{}.csv", base_sku.replace(['/', '\\'], "_"))
}

/// Write the variant table as CSV (`#`, `SKU`, `New SKU`, `Price`, `Weight`, options)
pub fn write_variants_csv<W: std::io::Write>(
    base_sku: &str,
    rows: &[VariantRow],
    writer: W,
) -> Result<(), ReconcileError> {
    let wrap = |source: csv::Error| ReconcileError::Export {
        base_sku: base_sku.to_string(),
        source,
    };
    let option_names: Vec<String> = rows
        .first()
        .map(|row| row.options.iter().map(|(n, _)| n.clone()).collect())
        .unwrap_or_default();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(VariantRow::header(&option_names)).map_err(wrap)?;
    for row in rows {
        wtr.write_record(row.cells()).map_err(wrap)?;
    }
    wtr.flush().map_err(|e| wrap(e.into()))?;
    Ok(())
}

fn export_record(base_sku: &str, record: &ProductRecord, target: &Path) -> Result<(), ReconcileError> {
    let mut buf = Vec::new();
    write_variants_csv(base_sku, &record.in_tree_df, &mut buf)?;
    atomic::write_atomic(target, &buf, false)?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub dir: PathBuf,
    pub written: Vec<PathBuf>,
    /// Products with no variants, or not in the store
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Export each product's variant table into `Excel Exports/<mm-dd-yy_HH-MM>/`
pub fn export_products(
    paths: &DataPaths,
    store: &ProductStore,
    keys: &[String],
    at: DateTime<Local>,
) -> Result<ExportReport, ReconcileError> {
    let dir = paths.export_run_dir(&export_dir_stamp(at));
    std::fs::create_dir_all(&dir).map_err(|source| ReconcileError::ExportDir {
        path: dir.clone(),
        source,
    })?;

    let mut report = ExportReport {
        dir: dir.clone(),
        ..ExportReport::default()
    };
    for key in keys {
        let record = match store.get(key) {
            Ok(Some(record)) if !record.in_tree_df.is_empty() => record,
            Ok(_) => {
                report.skipped.push(key.clone());
                continue;
            }
            Err(e) => {
                report.failed.push((key.clone(), e.to_string()));
                continue;
            }
        };
        let target = dir.join(export_file_name(key));
        match export_record(key, &record, &target) {
            Ok(()) => report.written.push(target),
            Err(e) => {
                tracing::warn!(base_sku = %key, error = %e, "Failed to export product");
                report.failed.push((key.clone(), e.to_string()));
            }
        }
    }

    tracing::info!(dir = %dir.display(), written = report.written.len(), "Exported variant tables");
    Ok(report)
}

/// Export one product to `target` and stamp its `last_export`
pub fn export_product(
    store: &mut ProductStore,
    key: &str,
    target: &Path,
    at: DateTime<Local>,
) -> Result<(), ReconcileError> {
    let record = store.require(key)?;
    export_record(key, &record, target)?;
    store.touch_last_export(key, &last_export_stamp(at));
    store.save()?;
    tracing::info!(base_sku = %key, target = %target.display(), "Exported product");
    Ok(())
}
