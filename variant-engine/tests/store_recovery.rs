// variant-engine/tests/store_recovery.rs
// Loading damaged databases: repair, explicit recovery, snapshots

use std::path::{Path, PathBuf};

use variant_engine::services::{CatalogService, restore_backup};
use variant_engine::store::{LoadOutcome, RecoveryChoice, RecoveryPrompt, StoreError};
use variant_engine::{AppContext, AppError, Config};
use tempfile::TempDir;

/// Records what it was asked and answers with a preset choice
struct Recorder {
    answer: RecoveryChoice,
    asked: Vec<(PathBuf, Option<PathBuf>)>,
}

impl Recorder {
    fn new(answer: RecoveryChoice) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl RecoveryPrompt for Recorder {
    fn choose(&mut self, corrupted: &Path, snapshot: Option<&Path>) -> RecoveryChoice {
        self.asked
            .push((corrupted.to_path_buf(), snapshot.map(Path::to_path_buf)));
        self.answer
    }
}

fn context(dir: &TempDir) -> AppContext {
    AppContext::local(Config::with_home(dir.path()), dir.path().join("data")).unwrap()
}

const SNAPSHOT: &str = r#"{"A-1": {"base_sku": "A-1", "base_price": "10"}}"#;

#[test]
fn test_truncated_file_is_repaired_without_asking() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    std::fs::write(ctx.paths().working_file(), format!("{SNAPSHOT}\n\u{0}\u{0}\u{0}")).unwrap();

    let mut prompt = Recorder::new(RecoveryChoice::Abort);
    let catalog = CatalogService::open(&ctx, &mut prompt).unwrap();

    assert!(prompt.asked.is_empty());
    assert_eq!(catalog.load_outcome(), &LoadOutcome::Repaired { dropped: 4 });
    assert_eq!(catalog.products(), vec!["A-1"]);
    assert_eq!(std::fs::read_to_string(ctx.paths().working_file()).unwrap(), SNAPSHOT);
}

#[test]
fn test_unrepairable_file_offers_newest_snapshot() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    let older = ctx.paths().snapshot_file("2024-01-01_08-00-00");
    let newer = ctx.paths().snapshot_file("2024-02-01_08-00-00");
    std::fs::write(&older, r#"{"OLD": {}}"#).unwrap();
    std::fs::write(&newer, SNAPSHOT).unwrap();
    std::fs::write(ctx.paths().working_file(), "{\"A-1\": {\"base_sku\": ").unwrap();

    let mut prompt = Recorder::new(RecoveryChoice::RestoreSnapshot);
    let catalog = CatalogService::open(&ctx, &mut prompt).unwrap();

    assert_eq!(prompt.asked, vec![(ctx.paths().working_file(), Some(newer.clone()))]);
    assert_eq!(catalog.load_outcome(), &LoadOutcome::Restored { from: newer });
    assert_eq!(catalog.product("A-1").unwrap().base_price.as_str(), "10");
}

#[test]
fn test_abort_leaves_files_alone() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    std::fs::write(ctx.paths().working_file(), "garbage").unwrap();

    let mut prompt = Recorder::new(RecoveryChoice::Abort);
    let err = CatalogService::open(&ctx, &mut prompt).unwrap_err();

    assert!(matches!(err, AppError::Store(StoreError::RecoveryAborted)));
    assert_eq!(prompt.asked, vec![(ctx.paths().working_file(), None)]);
    assert_eq!(std::fs::read_to_string(ctx.paths().working_file()).unwrap(), "garbage");
}

#[test]
fn test_start_empty_replaces_file_on_next_save() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    std::fs::write(ctx.paths().working_file(), "garbage").unwrap();

    let mut catalog = CatalogService::open(&ctx, &mut Recorder::new(RecoveryChoice::StartEmpty)).unwrap();
    assert_eq!(catalog.load_outcome(), &LoadOutcome::StartedEmpty);
    assert!(catalog.products().is_empty());

    catalog.save_working().unwrap();
    assert_eq!(std::fs::read_to_string(ctx.paths().working_file()).unwrap(), "{}");
}

#[test]
fn test_snapshot_then_restore() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir);
    std::fs::write(ctx.paths().working_file(), SNAPSHOT).unwrap();

    let mut catalog = CatalogService::open(&ctx, &mut Recorder::new(RecoveryChoice::Abort)).unwrap();
    let snapshot = catalog.save_snapshot().unwrap();
    assert!(snapshot.exists());
    assert!(!ctx.paths().working_file().exists());

    catalog.delete("A-1", true).unwrap();
    assert_eq!(std::fs::read_to_string(&snapshot).unwrap(), "{}");

    let backup = dir.path().join("backup.json");
    std::fs::write(&backup, SNAPSHOT).unwrap();
    let working = restore_backup(&ctx, &backup).unwrap();
    assert_eq!(working, ctx.paths().working_file());

    let reopened = CatalogService::open(&ctx, &mut Recorder::new(RecoveryChoice::Abort)).unwrap();
    assert_eq!(reopened.products(), vec!["A-1"]);

    let missing = restore_backup(&ctx, &dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, AppError::Store(StoreError::SnapshotNotFound(_))));
}
