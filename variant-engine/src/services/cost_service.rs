//! Cost Service - cost database workflows
//!
//! Edits, renames and missing-part fixes end by reconciling the product
//! store, so option costs and variant prices follow the cost database.
//! Spreadsheet imports leave that to the caller, which runs it as a job.

use std::collections::HashSet;
use std::path::Path;

use shared::{CostDatabase, PriceValue};

use crate::core::AppContext;
use crate::reconcile::{MissingLink, ReconcileReport, maintenance, reconcile_all};
use crate::store::{ColumnLayout, CostDbError, CostStore, PriceChange, ProductStore, cost_db};
use crate::{AppError, AppResult};

/// Result of a cost spreadsheet import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostImportReport {
    /// Parts in the imported file
    pub parts: usize,
    /// Parts whose price the import replaced
    pub overridden: Vec<PriceChange>,
    /// References in the product store the new database cannot price
    pub missing: Vec<MissingLink>,
}

/// Result of a single price edit
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEdit {
    pub previous: Option<PriceValue>,
    pub reconcile: ReconcileReport,
}

#[derive(Debug, Clone)]
pub struct CostService {
    costs: CostStore,
}

impl CostService {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            costs: CostStore::new(ctx.paths().cost_file(), ctx.store_options(), ctx.save_lock()),
        }
    }

    pub fn load(&self) -> AppResult<CostDatabase> {
        Ok(self.costs.load()?)
    }

    /// Replace the cost database with a `Part Number` / `Price` spreadsheet
    pub fn import_costs(&self, file: &Path, store: &ProductStore) -> AppResult<CostImportReport> {
        let incoming = cost_db::read_cost_csv_file(file)?;
        let current = self.costs.load()?;

        let overridden = cost_db::overridden_prices(&current, &incoming);
        self.costs.save(&incoming)?;
        let missing = maintenance::missing_links(store, &incoming);

        tracing::info!(
            file = %file.display(),
            parts = incoming.len(),
            overridden = overridden.len(),
            missing = missing.len(),
            "Imported cost database"
        );
        Ok(CostImportReport {
            parts: incoming.len(),
            overridden,
            missing,
        })
    }

    /// Merge chosen columns of a vendor sheet into the cost database
    ///
    /// Parts the sheet does not mention keep their price.
    pub fn import_costs_merge(
        &self,
        file: &Path,
        layout: &ColumnLayout,
        store: &ProductStore,
    ) -> AppResult<CostImportReport> {
        let incoming = cost_db::read_cost_columns_file(file, layout)?;
        let parts = incoming.len();
        let mut db = self.costs.load()?;

        let overridden = cost_db::merge_costs(&mut db, incoming);
        self.costs.save(&db)?;
        let missing = maintenance::missing_links(store, &db);

        tracing::info!(
            file = %file.display(),
            prefix = %layout.prefix,
            parts,
            overridden = overridden.len(),
            total = db.len(),
            "Merged cost sheet"
        );
        Ok(CostImportReport {
            parts,
            overridden,
            missing,
        })
    }

    pub fn export_costs(&self, file: &Path) -> AppResult<usize> {
        let db = self.costs.load()?;
        cost_db::export_cost_csv(&db, file)?;
        tracing::info!(file = %file.display(), parts = db.len(), "Exported cost database");
        Ok(db.len())
    }

    /// Part numbers containing `needle` (case-insensitive)
    pub fn search(&self, needle: &str) -> AppResult<Vec<(String, PriceValue)>> {
        let db = self.costs.load()?;
        Ok(db
            .search(needle)
            .into_iter()
            .map(|(part, price)| (part.clone(), price.clone()))
            .collect())
    }

    /// Set one price, then reconcile
    ///
    /// Numeric input is stored as a number, anything else as text.
    pub fn set_price(&self, store: &mut ProductStore, part: &str, raw: &str) -> AppResult<PriceEdit> {
        let part = part.trim();
        if part.is_empty() {
            return Err(CostDbError::EmptyPartNumber.into());
        }
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CostDbError::EmptyPrice(part.to_string()).into());
        }
        let mut db = self.costs.load()?;
        let price = PriceValue::parse(raw);
        if !price.is_numeric() {
            tracing::warn!(part, price = %price, "Storing non-numeric price as text");
        }
        let previous = db.insert(part, price);
        self.costs.save(&db)?;
        let reconcile = reconcile_all(store, &db, &[])?;
        Ok(PriceEdit { previous, reconcile })
    }

    pub fn missing_links(&self, store: &ProductStore) -> AppResult<Vec<MissingLink>> {
        Ok(maintenance::missing_links(store, &self.costs.load()?))
    }

    /// Add every missing part back at the cost its references carry, then
    /// reconcile
    pub fn reimport_missing(&self, store: &mut ProductStore) -> AppResult<(usize, ReconcileReport)> {
        let mut db = self.costs.load()?;
        let links = maintenance::missing_links(store, &db);
        let added = maintenance::reimport_missing(&mut db, &links);
        if added > 0 {
            self.costs.save(&db)?;
        }
        tracing::info!(added, "Reimported missing parts");
        let mut seed: Vec<String> = Vec::new();
        for link in links {
            if !seed.contains(&link.base_sku) {
                seed.push(link.base_sku);
            }
        }
        Ok((added, reconcile_all(store, &db, &seed)?))
    }

    /// Strip missing parts from every product, then reconcile
    ///
    /// An empty `parts` set means every part the scan reports.
    pub fn remove_missing(&self, store: &mut ProductStore, parts: &[String]) -> AppResult<ReconcileReport> {
        let db = self.costs.load()?;
        let parts: HashSet<String> = if parts.is_empty() {
            maintenance::missing_links(store, &db)
                .into_iter()
                .map(|link| link.part)
                .collect()
        } else {
            parts.iter().map(|p| p.trim().to_string()).collect()
        };
        if parts.is_empty() {
            return Err(AppError::validation("No missing parts to remove"));
        }
        let affected = maintenance::remove_missing(store, &parts)?;
        Ok(reconcile_all(store, &db, &affected)?)
    }

    /// Rename a part everywhere, then reconcile
    pub fn rename_part(&self, store: &mut ProductStore, old: &str, new: &str) -> AppResult<ReconcileReport> {
        let mut db = self.costs.load()?;
        let affected = maintenance::rename_part(store, &mut db, old.trim(), new)?;
        self.costs.save(&db)?;
        Ok(reconcile_all(store, &db, &affected)?)
    }

    /// Recalculate all pricing from the current cost database
    pub fn recalc(&self, store: &mut ProductStore) -> AppResult<ReconcileReport> {
        let db = self.costs.load()?;
        Ok(reconcile_all(store, &db, &[])?)
    }
}
