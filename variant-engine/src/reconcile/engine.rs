//! ReconciliationEngine - cost changes into every product
//!
//! For each product, in store order: sync the option table with the cost
//! database, then rebuild the variant table from the stored input rows. A
//! product that fails is logged and left as stored; the rest carry on. The
//! store is written once at the end.

use std::path::PathBuf;

use shared::{CostDatabase, ProductRecord};

use super::ReconcileError;
use crate::catalog::variants::{self, BaseValues};
use crate::catalog::master;
use crate::store::{ProductStore, StoreError};

/// A product the run skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFailure {
    pub base_sku: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Seed products first, then products whose option costs changed
    pub affected: Vec<String>,
    pub failed: Vec<ProductFailure>,
    /// Products whose variant table was rebuilt
    pub rebuilt: usize,
    /// File the store was written to
    pub saved_to: Option<PathBuf>,
}

impl ReconcileReport {
    fn mark_affected(&mut self, key: &str) {
        if !self.affected.iter().any(|k| k == key) {
            self.affected.push(key.to_string());
        }
    }
}

/// Outcome for one product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductOutcome {
    /// Option costs changed
    pub changed: bool,
    /// Variant table rebuilt
    pub rebuilt: bool,
}

/// Sync and rebuild one decoded product
///
/// Products without imported rows keep their variant table.
pub fn reconcile_record(key: &str, record: &mut ProductRecord, cost_db: &CostDatabase) -> ProductOutcome {
    let changed = !master::apply_cost_database(&mut record.master_df, cost_db).is_empty();
    if record.input_df.is_empty() {
        return ProductOutcome {
            changed,
            rebuilt: false,
        };
    }
    let base = BaseValues::lenient(key, record);
    variants::rebuild(record, key, base);
    ProductOutcome {
        changed,
        rebuilt: true,
    }
}

fn reconcile_product(
    store: &mut ProductStore,
    key: &str,
    cost_db: &CostDatabase,
) -> Result<ProductOutcome, StoreError> {
    let mut record = store.require(key)?;
    let outcome = reconcile_record(key, &mut record, cost_db);
    store.put(key, &record)?;
    Ok(outcome)
}

/// Run over every product and save the store once
pub fn reconcile_all(
    store: &mut ProductStore,
    cost_db: &CostDatabase,
    seed: &[String],
) -> Result<ReconcileReport, ReconcileError> {
    let mut report = ReconcileReport::default();
    for key in seed {
        report.mark_affected(key);
    }

    for key in store.keys() {
        match reconcile_product(store, &key, cost_db) {
            Ok(outcome) => {
                if outcome.changed {
                    report.mark_affected(&key);
                }
                if outcome.rebuilt {
                    report.rebuilt += 1;
                }
            }
            Err(e) => {
                tracing::error!(base_sku = %key, error = %e, "Reconciliation failed for product, skipping");
                report.failed.push(ProductFailure {
                    base_sku: key.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    store.save()?;
    report.saved_to = Some(store.path().to_path_buf());
    tracing::info!(
        affected = report.affected.len(),
        failed = report.failed.len(),
        rebuilt = report.rebuilt,
        "Reconciliation complete"
    );
    Ok(report)
}
