//! Cloud Client - HTTP client for the cloud helper service
//!
//! The helper service runs next to the desktop tool and relays snapshot
//! files to remote storage. This crate speaks its JSON contract:
//! `/upload`, `/download`, `/pull_latest_db`, `/latest_db_file_id`, `/list`,
//! `/delete` and `/shutdown`.

pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HelperClient;
pub use types::{CloudFile, DeleteTarget, PulledFile, RemoteFileId};
