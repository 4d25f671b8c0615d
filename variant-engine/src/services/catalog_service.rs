//! Catalog Service - product-level workflows over the product store
//!
//! One open store per service. Every mutating workflow saves the store
//! before returning, so a failed step never leaves half an edit on disk.

use std::path::{Path, PathBuf};

use chrono::Local;
use shared::util::snapshot_stamp;
use shared::{ProductRecord, VariantRow};

use crate::catalog::{
    AssignmentReport, BaseValues, ImportChoice, ImportedProduct, OptionEdit, SkuLengthWarning,
    import, master, variants,
};
use crate::core::AppContext;
use crate::pricing::PriceBreakdown;
use crate::reconcile::export;
use crate::store::{
    CostStore, LoadOutcome, ProductStore, RecoveryPrompt, StoreError, revert_to_backup,
};
use crate::{AppError, AppResult};

// =============================================================================
// Types
// =============================================================================

/// What a variant import ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The imported product was written to the store
    Stored {
        key: String,
        replaced: bool,
        sku_warning: Option<SkuLengthWarning>,
    },
    /// The product already existed and the stored version was kept
    LoadedExisting { key: String },
    Cancelled { key: String },
}

/// A variant found by a spot check, with its price breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct SpotCheck {
    pub variant: VariantRow,
    pub breakdown: PriceBreakdown,
}

// =============================================================================
// CatalogService
// =============================================================================

pub struct CatalogService {
    ctx: AppContext,
    store: ProductStore,
    outcome: LoadOutcome,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("path", &self.store.path())
            .field("products", &self.store.len())
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl CatalogService {
    /// Open the latest product database
    pub fn open(ctx: &AppContext, prompt: &mut dyn RecoveryPrompt) -> AppResult<Self> {
        let (store, outcome) = ProductStore::open(
            ctx.paths(),
            ctx.store_options(),
            ctx.save_lock(),
            prompt,
        )?;
        if outcome.needs_attention() {
            tracing::warn!(path = %store.path().display(), ?outcome, "Product database was recovered");
        }
        Ok(Self {
            ctx: ctx.clone(),
            store,
            outcome,
        })
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProductStore {
        &mut self.store
    }

    pub fn into_store(self) -> ProductStore {
        self.store
    }

    pub fn products(&self) -> Vec<String> {
        self.store.keys()
    }

    pub fn product(&self, key: &str) -> AppResult<ProductRecord> {
        Ok(self.store.require(key)?)
    }

    fn update<T>(
        &mut self,
        key: &str,
        f: impl FnOnce(&mut ProductRecord) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut record = self.store.require(key)?;
        let out = f(&mut record)?;
        self.store.put(key, &record)?;
        self.store.save()?;
        Ok(out)
    }

    // ========== Import ==========

    /// Import a variant CSV
    ///
    /// When the product already exists `decide` is asked what to do; it is
    /// not called for new products.
    pub fn import_variants(
        &mut self,
        file: &Path,
        decide: impl FnOnce(&str) -> ImportChoice,
    ) -> AppResult<ImportOutcome> {
        let ImportedProduct {
            key,
            storefront,
            record,
            sku_warning,
        } = import::read_variant_csv_file(file)?;

        let replaced = self.store.contains(&key);
        if replaced {
            match decide(&key) {
                ImportChoice::Overwrite => {}
                ImportChoice::LoadExisting => {
                    tracing::info!(base_sku = %key, "Keeping stored product");
                    return Ok(ImportOutcome::LoadedExisting { key });
                }
                ImportChoice::Cancel => return Ok(ImportOutcome::Cancelled { key }),
            }
        }

        self.store.put(&key, &record)?;
        self.store.save()?;
        tracing::info!(base_sku = %key, ?storefront, replaced, file = %file.display(), "Imported variants");
        Ok(ImportOutcome::Stored {
            key,
            replaced,
            sku_warning,
        })
    }

    // ========== Variant table ==========

    /// Rebuild the variant table from the stored rows; returns the row count
    pub fn regenerate(&mut self, key: &str) -> AppResult<usize> {
        self.update(key, |record| {
            variants::regenerate(record, key)?;
            Ok(record.in_tree_df.len())
        })
    }

    /// Overwrite every New SKU
    pub fn generate_skus(&mut self, key: &str) -> AppResult<Option<SkuLengthWarning>> {
        self.update(key, |record| Ok(variants::generate_skus(record, key)?))
    }

    // ========== Option edits ==========

    /// Edit one option row, then refresh the variant prices
    pub fn edit_option(&mut self, key: &str, name: &str, value: &str, edit: &OptionEdit) -> AppResult<()> {
        self.update(key, |record| {
            master::edit_option(&mut record.master_df, name, value, edit)?;
            refresh_prices(record, key);
            Ok(())
        })
    }

    /// Replace an option's associated SKUs, pricing them from the cost database
    pub fn set_associated(
        &mut self,
        key: &str,
        name: &str,
        value: &str,
        skus: &[String],
    ) -> AppResult<AssignmentReport> {
        let costs = CostStore::new(
            self.ctx.paths().cost_file(),
            self.ctx.store_options(),
            self.ctx.save_lock(),
        )
        .load()?;
        self.update(key, |record| {
            let report = master::assign_associated(&mut record.master_df, name, value, skus, &costs)?;
            refresh_prices(record, key);
            Ok(report)
        })
    }

    // ========== Product management ==========

    /// Delete a product; refused unless the caller confirmed
    pub fn delete(&mut self, key: &str, confirmed: bool) -> AppResult<()> {
        if !confirmed {
            return Err(AppError::Cancelled);
        }
        self.store.remove(key)?;
        self.store.save()?;
        tracing::info!(base_sku = %key, "Deleted product");
        Ok(())
    }

    pub fn rename_base(&mut self, old: &str, new: &str) -> AppResult<()> {
        let new = new.trim();
        if new.is_empty() {
            return Err(AppError::validation("New base SKU is empty"));
        }
        self.store.rename(old, new)?;
        self.store.save()?;
        tracing::info!(old, new, "Renamed product");
        Ok(())
    }

    /// Export one product's variant table and stamp its last export
    ///
    /// Without `target` the file goes to `Excel Exports/<base sku>.csv`.
    pub fn export(&mut self, key: &str, target: Option<&Path>) -> AppResult<PathBuf> {
        let target = match target {
            Some(path) => path.to_path_buf(),
            None => {
                let dir = self.ctx.paths().exports_dir();
                std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
                dir.join(export::export_file_name(key))
            }
        };
        export::export_product(&mut self.store, key, &target, Local::now())?;
        Ok(target)
    }

    /// Find the variant for a full option selection
    pub fn spot_check(&self, key: &str, selections: &[(String, String)]) -> AppResult<SpotCheck> {
        let record = self.store.require(key)?;
        let variant = variants::spot_check(&record, selections)?.clone();
        let breakdown = variants::price_breakdown(key, &record, &variant);
        Ok(SpotCheck { variant, breakdown })
    }

    // ========== Snapshots ==========

    /// Save to a new timestamped snapshot (the working file is removed)
    pub fn save_snapshot(&mut self) -> AppResult<PathBuf> {
        Ok(self
            .store
            .save_snapshot(self.ctx.paths(), &snapshot_stamp(Local::now()))?)
    }

    /// Save to the working file
    pub fn save_working(&mut self) -> AppResult<PathBuf> {
        Ok(self.store.save_working(self.ctx.paths())?)
    }
}

/// Copy a chosen backup into the working file
pub fn restore_backup(ctx: &AppContext, backup: &Path) -> AppResult<PathBuf> {
    Ok(revert_to_backup(ctx.paths(), backup)?)
}

fn refresh_prices(record: &mut ProductRecord, key: &str) {
    if !record.input_df.is_empty() {
        let base = BaseValues::lenient(key, record);
        variants::rebuild(record, key, base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::store::{FixedChoice, RecoveryChoice};
    use tempfile::TempDir;

    const VARIANTS: &str = "\
SKU,Price,Weight,Options
K100,100,10,
K100-1,,,Name=Color|Value=Black
K100-2,,,Name=Color|Value=Red
";

    fn setup() -> (TempDir, AppContext, PathBuf) {
        let dir = TempDir::new().unwrap();
        let ctx = AppContext::local(Config::with_home(dir.path()), dir.path().join("data")).unwrap();
        let csv = dir.path().join("k100.csv");
        std::fs::write(&csv, VARIANTS).unwrap();
        (dir, ctx, csv)
    }

    fn open(ctx: &AppContext) -> CatalogService {
        CatalogService::open(ctx, &mut FixedChoice(RecoveryChoice::Abort)).unwrap()
    }

    #[test]
    fn test_import_then_conflict_choices() {
        let (_dir, ctx, csv) = setup();
        let mut catalog = open(&ctx);
        assert_eq!(catalog.load_outcome(), &LoadOutcome::Created);

        let first = catalog
            .import_variants(&csv, |_| panic!("no conflict expected"))
            .unwrap();
        assert!(matches!(first, ImportOutcome::Stored { replaced: false, .. }));
        assert_eq!(catalog.products(), vec!["K100 (MXT)"]);

        let kept = catalog.import_variants(&csv, |_| ImportChoice::LoadExisting).unwrap();
        assert_eq!(kept, ImportOutcome::LoadedExisting { key: "K100 (MXT)".into() });

        let replaced = catalog.import_variants(&csv, |_| ImportChoice::Overwrite).unwrap();
        assert!(matches!(replaced, ImportOutcome::Stored { replaced: true, .. }));

        let reopened = open(&ctx);
        assert_eq!(reopened.load_outcome(), &LoadOutcome::Loaded);
        assert_eq!(reopened.product("K100 (MXT)").unwrap().in_tree_df.len(), 2);
    }

    #[test]
    fn test_edit_option_reprices_variants() {
        let (_dir, ctx, csv) = setup();
        let mut catalog = open(&ctx);
        catalog.import_variants(&csv, |_| ImportChoice::Cancel).unwrap();

        let edit = OptionEdit {
            cost: Some("12.5".into()),
            ..OptionEdit::default()
        };
        catalog.edit_option("K100 (MXT)", "Color", "Red", &edit).unwrap();

        let record = catalog.product("K100 (MXT)").unwrap();
        assert_eq!(record.in_tree_df[0].price, 100.0);
        assert_eq!(record.in_tree_df[1].price, 112.5);

        let bad = OptionEdit {
            weight: Some("heavy".into()),
            ..OptionEdit::default()
        };
        assert!(catalog.edit_option("K100 (MXT)", "Color", "Red", &bad).is_err());
    }

    #[test]
    fn test_spot_check_and_delete() {
        let (_dir, ctx, csv) = setup();
        let mut catalog = open(&ctx);
        catalog.import_variants(&csv, |_| ImportChoice::Cancel).unwrap();

        let found = catalog
            .spot_check("K100 (MXT)", &[("Color".into(), "Red".into())])
            .unwrap();
        assert_eq!(found.variant.sku, "K100-2");
        assert_eq!(found.variant.new_sku, "K100-M0002");

        assert!(matches!(catalog.delete("K100 (MXT)", false), Err(AppError::Cancelled)));
        catalog.delete("K100 (MXT)", true).unwrap();
        assert!(catalog.products().is_empty());
    }

    #[test]
    fn test_export_stamps_last_export() {
        let (_dir, ctx, csv) = setup();
        let mut catalog = open(&ctx);
        catalog.import_variants(&csv, |_| ImportChoice::Cancel).unwrap();

        let written = catalog.export("K100 (MXT)", None).unwrap();
        assert!(written.ends_with("Excel Exports/K100 (MXT).csv"));
        assert!(written.exists());
        assert!(catalog.store().last_export("K100 (MXT)").is_some());
    }
}
