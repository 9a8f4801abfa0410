use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use embedscope_io::api::{endpoint, DETAILS_PATH, EMBEDDINGS_PATH};
use embedscope_io::{DetailsRequest, EmbeddingData, Transport, TransportError};

/// Serves the explorer API from recorded response files.
pub struct FileTransport {
    base_url: String,
    embeddings: String,
    details: Option<Vec<EmbeddingData>>,
}

impl FileTransport {
    /// `embeddings` holds a `get_embeddings` response; `details`, if given, a
    /// `get_embedding_details` response covering every point.
    pub fn open(base_url: &str, embeddings: &Path, details: Option<&Path>) -> Result<Self> {
        let body = std::fs::read_to_string(embeddings)
            .with_context(|| format!("reading embeddings from {}", embeddings.display()))?;
        let details = match details {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading details from {}", path.display()))?;
                let rows: Vec<EmbeddingData> = embedscope_io::api::unwrap_envelope(&text)
                    .with_context(|| format!("parsing details in {}", path.display()))?;
                log::info!("Loaded {} recorded details", rows.len());
                Some(rows)
            }
            None => None,
        };
        Ok(Self {
            base_url: base_url.to_string(),
            embeddings: body,
            details,
        })
    }

    fn is(&self, url: &str, path: &str) -> bool {
        url == endpoint(&self.base_url, path)
    }
}

impl Transport for FileTransport {
    fn get(&mut self, url: &str) -> Result<String, TransportError> {
        if self.is(url, EMBEDDINGS_PATH) {
            Ok(self.embeddings.clone())
        } else {
            Err(TransportError::Status(404))
        }
    }

    fn post(&mut self, url: &str, body: &str) -> Result<String, TransportError> {
        if !self.is(url, DETAILS_PATH) {
            return Err(TransportError::Status(404));
        }
        let Some(details) = &self.details else {
            return Err(TransportError::NoResponse("no details recording".into()));
        };
        let request: DetailsRequest =
            serde_json::from_str(body).map_err(|e| TransportError::Other(e.to_string()))?;
        let rows: Vec<&EmbeddingData> = details
            .iter()
            .filter(|d| request.points.contains(&d.index))
            .collect();
        Ok(json!({ "data": rows }).to_string())
    }
}
