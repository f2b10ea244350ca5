//! Timestamped JSON snapshots of generated content.

use std::path::PathBuf;

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::fs;

use super::error::InfraError;

/// Writes generation results to disk as pretty-printed JSON, one file per
/// run, named `<prefix>_<YYYYMMDD_HHMMSS>.json`.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Serialize `payload` into a timestamped file and return its path.
    pub async fn write<T: Serialize>(
        &self,
        prefix: &str,
        payload: &T,
    ) -> Result<PathBuf, InfraError> {
        let stamp_format = format_description!("[year][month][day]_[hour][minute][second]");
        let stamp = OffsetDateTime::now_utc()
            .format(stamp_format)
            .map_err(|err| InfraError::configuration(format!("timestamp format: {err}")))?;

        let path = self.root.join(format!("{prefix}_{stamp}.json"));
        let body = serde_json::to_vec_pretty(payload)
            .map_err(|err| InfraError::configuration(format!("output serialization: {err}")))?;
        fs::write(&path, body).await?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn writes_prefixed_timestamped_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = OutputWriter::new(dir.path().to_path_buf()).expect("writer");

        let path = writer
            .write("generated_content", &json!({"week": 1}))
            .await
            .expect("written");

        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("generated_content_"));
        assert!(name.ends_with(".json"));

        let body = std::fs::read_to_string(&path).expect("read back");
        assert!(body.contains("\"week\": 1"));
    }
}
