//! Request and response bodies of the helper service

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Common response envelope: `{"status": "success" | "error", "message": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Remote file handle
pub type RemoteFileId = String;

#[derive(Debug, Serialize)]
pub(crate) struct UploadRequest<'a> {
    pub file_path: &'a str,
    pub drive_filename: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadBody {
    pub file_id: RemoteFileId,
}

#[derive(Debug, Serialize)]
pub(crate) struct DownloadRequest<'a> {
    pub file_id: &'a str,
    pub dest_path: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PatternRequest<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
}

/// Empty success body
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Empty {}

/// Latest remote file matching a prefix/suffix
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatestFile {
    pub file_id: RemoteFileId,
    pub name: String,
}

/// Result of `/pull_latest_db`: the file now sits at `local_path` on the
/// helper's machine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PulledFile {
    pub file_id: RemoteFileId,
    pub name: String,
    pub local_path: String,
}

/// Remote file listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudFile {
    pub id: RemoteFileId,
    pub name: String,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
    #[serde(rename = "modifiedTime", default)]
    pub modified_time: Option<String>,
}

impl CloudFile {
    /// Creation time, falling back to modification time (RFC 3339)
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.created_time
            .as_deref()
            .or(self.modified_time.as_deref())
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListBody {
    #[serde(default)]
    pub files: Vec<CloudFile>,
}

/// What `/delete` should remove
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DeleteTarget {
    Id { file_id: RemoteFileId },
    Name { filename: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_file_timestamp_fallback() {
        let file: CloudFile = serde_json::from_str(
            r#"{"id":"1","name":"sku_database_x.json","modifiedTime":"2024-05-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert!(file.created_time.is_none());
        let ts = file.timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_delete_target_shapes() {
        let by_id = serde_json::to_string(&DeleteTarget::Id { file_id: "abc".into() }).unwrap();
        assert_eq!(by_id, r#"{"file_id":"abc"}"#);
        let by_name = serde_json::to_string(&DeleteTarget::Name { filename: "a.json".into() }).unwrap();
        assert_eq!(by_name, r#"{"filename":"a.json"}"#);
    }

    #[test]
    fn test_envelope_flattens_body() {
        let env: Envelope<PulledFile> = serde_json::from_str(
            r#"{"status":"success","file_id":"f1","name":"cost_db_1.json","local_path":"/tmp/cost_db_1.json"}"#,
        )
        .unwrap();
        assert!(env.is_success());
        assert_eq!(env.body.name, "cost_db_1.json");
    }
}
