//! Service layer - workflows over the stores
//!
//! # Services
//!
//! - [`CatalogService`] - product import, edits, exports and snapshots
//! - [`CostService`] - cost database import, edits and reference maintenance
//! - [`CloudSync`] - push, pull, list and purge through the helper service
//! - [`JobQueue`] - background jobs with completion events

pub mod catalog_service;
pub mod cloud_sync;
pub mod cost_service;
pub mod jobs;

pub use catalog_service::{CatalogService, ImportOutcome, SpotCheck, restore_backup};
pub use cloud_sync::{CloudSync, PullReport, PurgeReport, PushReport};
pub use cost_service::{CostImportReport, CostService, PriceEdit};
pub use jobs::{JobEvent, JobQueue};
