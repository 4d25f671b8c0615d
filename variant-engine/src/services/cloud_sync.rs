//! Cloud sync through the helper service
//!
//! The product database and the cost database travel as two independent
//! files: a push or pull of one never waits on, or rolls back, the other.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, Local};
use cloud_client::{ClientError, CloudFile, DeleteTarget, HelperClient, RemoteFileId};
use shared::util::snapshot_stamp;

use crate::core::AppContext;
use crate::core::paths::{COST_PREFIX, JSON_SUFFIX, PRODUCT_PREFIX};
use crate::store::{StoreError, atomic, snapshot};
use crate::{AppError, AppResult};

/// Remote snapshots older than the newest by more than this are purged
pub const PURGE_WINDOW_HOURS: i64 = 36;

/// One upload attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub local: PathBuf,
    pub remote_name: String,
    pub result: Result<RemoteFileId, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    /// `None` when there was no local product database
    pub products: Option<Upload>,
    /// `None` when there was no local cost database
    pub costs: Option<Upload>,
}

impl PushReport {
    pub fn all_succeeded(&self) -> bool {
        [&self.products, &self.costs]
            .into_iter()
            .flatten()
            .all(|upload| upload.result.is_ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    /// Remote name of the pulled product database
    pub products: String,
    pub working_file: PathBuf,
    /// Remote name of the pulled cost database, if one existed
    pub costs: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

pub struct CloudSync<'a> {
    ctx: &'a AppContext,
    client: &'a HelperClient,
}

impl<'a> CloudSync<'a> {
    pub fn new(ctx: &'a AppContext) -> AppResult<Self> {
        Ok(Self {
            client: ctx.cloud()?,
            ctx,
        })
    }

    async fn upload(&self, local: PathBuf, remote_name: String) -> Upload {
        let local = std::path::absolute(&local).unwrap_or(local);
        let result = self
            .client
            .upload(&local.to_string_lossy(), &remote_name)
            .await
            .map_err(|e| {
                tracing::warn!(file = %local.display(), error = %e, "Upload failed");
                e.to_string()
            });
        Upload {
            local,
            remote_name,
            result,
        }
    }

    /// Upload the latest product database and the cost database under
    /// timestamped names
    pub async fn push(&self) -> AppResult<PushReport> {
        let paths = self.ctx.paths();
        let stamp = snapshot_stamp(Local::now());

        let latest = snapshot::latest_database_path(paths, self.ctx.config().snapshot_selection)?;
        let products = if latest.exists() {
            let name = format!("{PRODUCT_PREFIX}{stamp}{JSON_SUFFIX}");
            Some(self.upload(latest, name).await)
        } else {
            tracing::warn!("No local product database to push");
            None
        };

        let cost_file = paths.cost_file();
        let costs = if cost_file.exists() {
            let name = format!("{COST_PREFIX}{stamp}{JSON_SUFFIX}");
            Some(self.upload(cost_file, name).await)
        } else {
            tracing::warn!("No local cost database to push");
            None
        };

        let report = PushReport { products, costs };
        tracing::info!(ok = report.all_succeeded(), "Cloud push finished");
        Ok(report)
    }

    /// Pull the newest product database into the working file and the
    /// newest cost database into `cost_db.json`
    ///
    /// A missing remote cost database is only a warning.
    pub async fn pull(&self) -> AppResult<PullReport> {
        let paths = self.ctx.paths();
        let keep_backup = self.ctx.config().write_backup;

        let pulled = self.client.pull_latest_db(PRODUCT_PREFIX, JSON_SUFFIX).await?;
        let working_file = paths.working_file();
        install(Path::new(&pulled.local_path), &working_file, keep_backup)?;

        let costs = match self.client.pull_latest_db(COST_PREFIX, JSON_SUFFIX).await {
            Ok(cost) => {
                install(Path::new(&cost.local_path), &paths.cost_file(), keep_backup)?;
                Some(cost.name)
            }
            Err(ClientError::NotFound(message)) => {
                tracing::warn!(message, "No cost database in the cloud, keeping the local one");
                None
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(products = %pulled.name, costs = ?costs, "Cloud pull finished");
        Ok(PullReport {
            products: pulled.name,
            working_file,
            costs,
        })
    }

    /// Remote product and cost snapshots, newest first
    pub async fn list(&self) -> AppResult<Vec<CloudFile>> {
        let mut files = self.client.list(PRODUCT_PREFIX, JSON_SUFFIX).await?;
        files.extend(self.client.list(COST_PREFIX, JSON_SUFFIX).await?);
        files.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Ok(files)
    }

    /// Delete remote snapshots older than the newest of their kind by more
    /// than [`PURGE_WINDOW_HOURS`]
    pub async fn purge(&self) -> AppResult<PurgeReport> {
        let mut report = PurgeReport::default();
        for prefix in [PRODUCT_PREFIX, COST_PREFIX] {
            let files = self.client.list(prefix, JSON_SUFFIX).await?;
            for file in purge_candidates(&files, Duration::hours(PURGE_WINDOW_HOURS)) {
                let target = DeleteTarget::Id {
                    file_id: file.id.clone(),
                };
                match self.client.delete(&target).await {
                    Ok(()) => report.deleted.push(file.name.clone()),
                    Err(e) => {
                        tracing::warn!(name = %file.name, error = %e, "Failed to delete remote file");
                        report.failed.push((file.name.clone(), e.to_string()));
                    }
                }
            }
        }
        tracing::info!(deleted = report.deleted.len(), failed = report.failed.len(), "Cloud purge finished");
        Ok(report)
    }
}

/// Files older than `newest - window`; undated files are never purged
pub fn purge_candidates(files: &[CloudFile], window: Duration) -> Vec<&CloudFile> {
    let dated: Vec<(&CloudFile, DateTime<FixedOffset>)> = files
        .iter()
        .filter_map(|f| f.timestamp().map(|ts| (f, ts)))
        .collect();
    let Some(newest) = dated.iter().map(|(_, ts)| *ts).max() else {
        return Vec::new();
    };
    let cutoff = newest - window;
    dated
        .into_iter()
        .filter(|(_, ts)| *ts < cutoff)
        .map(|(f, _)| f)
        .collect()
}

/// Validate a pulled JSON file and copy it over `target`
fn install(source: &Path, target: &Path, keep_backup: bool) -> AppResult<()> {
    let bytes = std::fs::read(source).map_err(|e| StoreError::io(source, e))?;
    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(serde_json::Value::Object(_)) => {}
        Ok(_) => return Err(StoreError::NotAnObject.into()),
        Err(e) => {
            return Err(AppError::Store(StoreError::Corrupted {
                path: source.to_path_buf(),
                reason: e.to_string(),
            }));
        }
    }
    atomic::write_atomic(target, &bytes, keep_backup)?;
    tracing::debug!(source = %source.display(), target = %target.display(), "Installed pulled file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, created: Option<&str>) -> CloudFile {
        CloudFile {
            id: id.to_string(),
            name: format!("sku_database_{id}.json"),
            created_time: created.map(str::to_string),
            modified_time: None,
        }
    }

    #[test]
    fn test_purge_candidates_window() {
        let files = vec![
            file("new", Some("2024-05-03T12:00:00Z")),
            file("edge", Some("2024-05-02T00:00:00Z")),
            file("old", Some("2024-05-01T23:59:59Z")),
            file("undated", None),
        ];
        let ids: Vec<&str> = purge_candidates(&files, Duration::hours(36))
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(ids, vec!["old"]);
    }

    #[test]
    fn test_purge_candidates_empty() {
        assert!(purge_candidates(&[file("x", None)], Duration::hours(36)).is_empty());
    }

    #[test]
    fn test_push_report_success() {
        let report = PushReport {
            products: Some(Upload {
                local: PathBuf::from("a.json"),
                remote_name: "sku_database_x.json".into(),
                result: Ok("id".into()),
            }),
            costs: None,
        };
        assert!(report.all_succeeded());
    }
}
