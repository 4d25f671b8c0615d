//! Persistence: product store, cost database, snapshots and repair
//!
//! ```text
//! store/
//! ├── atomic.rs         # temp file + fsync + rename, optional .backup
//! ├── repair.rs         # truncate after the last closing bracket
//! ├── snapshot.rs       # timestamped snapshots, latest-file selection
//! ├── recovery.rs       # caller decision for unrecoverable files
//! ├── product_store.rs  # multi-product JSON database
//! └── cost_db.rs        # part number -> price
//! ```

pub mod atomic;
pub mod cost_db;
mod error;
pub mod product_store;
pub mod recovery;
pub mod repair;
pub mod snapshot;

pub use cost_db::{ColumnLayout, CostStore, PriceChange};
pub use error::{CostDbError, StoreError};
pub use product_store::{ProductStore, StoreOptions, revert_to_backup};
pub use recovery::{FixedChoice, LoadOutcome, RecoveryChoice, RecoveryPrompt};
pub use snapshot::{SnapshotEntry, SnapshotSelection};
