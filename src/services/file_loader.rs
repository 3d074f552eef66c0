use std::path::Path;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::core::error::FormError;
use crate::core::form::LoadTicket;
use crate::core::header::{ingest, IngestedFile};
use crate::core::upload::UploadedFile;

/// Result of one background read, tagged with the ticket it was started for
#[derive(Debug)]
pub struct LoadEvent {
    pub ticket: LoadTicket,
    pub result: Result<IngestedFile, FormError>,
}

/// FileLoader reads selected files off the UI task
///
/// Each selection gets its own tokio task. Completions are delivered over the
/// channel in whatever order they finish; the form decides which one still
/// matters by comparing ticket generations.
#[derive(Debug, Clone)]
pub struct FileLoader {
    tx: UnboundedSender<LoadEvent>,
}

impl FileLoader {
    pub fn new(tx: UnboundedSender<LoadEvent>) -> Self {
        Self { tx }
    }

    /// Start reading `file` for `ticket`
    pub fn spawn_load(&self, ticket: LoadTicket, file: UploadedFile) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = read(&file.path).await;
            debug!(
                "Finished reading {} for {} (generation {}, ok: {})",
                file.name,
                ticket.side,
                ticket.generation,
                result.is_ok()
            );
            if tx.send(LoadEvent { ticket, result }).is_err() {
                warn!("Load result for {} dropped; receiver closed", file.name);
            }
        })
    }
}

/// Read and decode a file as UTF-8, stripping a BOM and replacing bad bytes
pub async fn read(path: &Path) -> Result<IngestedFile, FormError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| FormError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        warn!("{} contains invalid UTF-8; bad bytes replaced", path.display());
    }
    Ok(ingest(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_strips_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\xEF\xBB\xBFid,lat\r\n1,2\r\n").unwrap();
        let ingested = read(file.path()).await.unwrap();
        assert_eq!(ingested.header.columns(), &["id", "lat"]);
        assert_eq!(ingested.body[0], "1,2");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let err = read(Path::new("/definitely/not/here.csv")).await.unwrap_err();
        assert!(matches!(err, FormError::Read { .. }));
    }
}
