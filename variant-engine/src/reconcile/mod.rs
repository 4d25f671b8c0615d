//! Reconciliation: bulk cost propagation, exports and reference maintenance

pub mod engine;
mod error;
pub mod export;
pub mod maintenance;

pub use engine::{ProductFailure, ReconcileReport, reconcile_all};
pub use error::ReconcileError;
pub use export::ExportReport;
pub use maintenance::MissingLink;
