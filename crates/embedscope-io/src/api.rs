//! Wire formats of the explorer's HTTP API and a client over a pluggable transport.
//!
//! Every response is wrapped in an envelope `{"data": ...}`. A missing or null
//! `data` is an empty result, not an error.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use embedscope_core::{EmbeddingPoint, PointIndex};

pub const EMBEDDINGS_PATH: &str = "embedding/get_embeddings";
pub const DETAILS_PATH: &str = "embedding/get_embedding_details";
pub const SEARCH_PATH: &str = "search/search_data";

// ── Errors ────────────────────────────────────────────────────────────

/// Failures below the HTTP layer. Display strings are shown to the user as is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Server responded with error: {0}")]
    Status(u16),

    #[error("No response received: {0}")]
    NoResponse(String),

    #[error("Error occurred: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Error occurred: malformed response ({0})")]
    Decode(#[from] serde_json::Error),
}

/// Moves request bodies to the server and response bodies back.
pub trait Transport {
    fn get(&mut self, url: &str) -> Result<String, TransportError>;
    fn post(&mut self, url: &str, body: &str) -> Result<String, TransportError>;
}

// ── Envelope ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// Payload of an enveloped response; absent data yields `T::default()`.
pub fn unwrap_envelope<T: DeserializeOwned + Default>(body: &str) -> Result<T, serde_json::Error> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.data.unwrap_or_default())
}

// ── Payloads ──────────────────────────────────────────────────────────

/// One row of the embeddings response: either `[x, y, cluster]` or a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingRow {
    Array(Vec<f64>),
    Record(EmbeddingRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub cluster: Option<f64>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub id: Option<PointIndex>,
}

fn cluster_id(raw: Option<f64>) -> Option<u32> {
    raw.filter(|c| c.is_finite() && *c >= 0.0)
        .map(|c| c.round() as u32)
}

impl EmbeddingRow {
    /// The point this row describes, or `None` if it has no usable coordinates.
    pub fn to_point(&self) -> Option<EmbeddingPoint> {
        let (x, y, cluster) = match self {
            EmbeddingRow::Array(values) if values.len() >= 2 => {
                (values[0], values[1], cluster_id(values.get(2).copied()))
            }
            EmbeddingRow::Array(_) => return None,
            EmbeddingRow::Record(r) => (r.x, r.y, cluster_id(r.cluster)),
        };
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let point = EmbeddingPoint::new(x, y);
        Some(match cluster {
            Some(c) => point.with_cluster(c),
            None => point,
        })
    }

    /// Inline label text, when the server sends full records.
    pub fn text(&self) -> Option<&str> {
        match self {
            EmbeddingRow::Record(r) => r.data.as_deref(),
            EmbeddingRow::Array(_) => None,
        }
    }
}

/// Metadata for one point, as returned by the details and search endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    #[serde(deserialize_with = "deserialize_index")]
    pub index: PointIndex,
    pub data: String,
    #[serde(default)]
    pub media_type: String,
}

impl EmbeddingData {
    pub fn text(index: PointIndex, data: impl Into<String>) -> Self {
        Self {
            index,
            data: data.into(),
            media_type: "text".to_string(),
        }
    }
}

/// Point indices arrive as numbers from some endpoints and strings from others.
fn deserialize_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PointIndex, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(PointIndex),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| <D::Error as de::Error>::custom(format!("invalid point index '{s}'"))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsRequest {
    pub points: Vec<PointIndex>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search_data: String,
    pub search_type: String,
    #[serde(default = "default_src_lang")]
    pub search_src_lang: String,
}

fn default_src_lang() -> String {
    "eng_Latn".to_string()
}

impl SearchRequest {
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            search_data: query.into(),
            search_type: "text".to_string(),
            search_src_lang: default_src_lang(),
        }
    }
}

// ── Client ────────────────────────────────────────────────────────────

/// Join a base URL and an endpoint path with exactly one slash.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Typed access to the explorer API.
pub struct ApiClient<T: Transport> {
    base_url: String,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Raw rows of the embedding, in index order.
    pub fn fetch_rows(&mut self) -> Result<Vec<EmbeddingRow>, ApiError> {
        let body = self.transport.get(&endpoint(&self.base_url, EMBEDDINGS_PATH))?;
        Ok(unwrap_envelope(&body)?)
    }

    /// The embedding as points. Rows without usable coordinates are kept as
    /// points at the origin so indices stay aligned with the server's.
    pub fn fetch_embeddings(&mut self) -> Result<Vec<EmbeddingPoint>, ApiError> {
        let rows = self.fetch_rows()?;
        let mut skipped = 0usize;
        let points: Vec<EmbeddingPoint> = rows
            .iter()
            .map(|row| {
                row.to_point().unwrap_or_else(|| {
                    skipped += 1;
                    EmbeddingPoint::new(0.0, 0.0)
                })
            })
            .collect();
        if skipped > 0 {
            log::warn!("{skipped} embedding rows had no usable coordinates");
        }
        log::info!("Fetched {} embedding points", points.len());
        Ok(points)
    }

    /// Label/detail metadata for `points`.
    pub fn fetch_details(&mut self, points: &[PointIndex]) -> Result<Vec<EmbeddingData>, ApiError> {
        let request = serde_json::to_string(&DetailsRequest {
            points: points.to_vec(),
        })?;
        let body = self
            .transport
            .post(&endpoint(&self.base_url, DETAILS_PATH), &request)?;
        let details: Vec<EmbeddingData> = unwrap_envelope(&body)?;
        log::debug!("Fetched details for {} of {} points", details.len(), points.len());
        Ok(details)
    }

    /// Text search over the embedded items.
    pub fn search(&mut self, query: &str) -> Result<Vec<EmbeddingData>, ApiError> {
        let request = serde_json::to_string(&SearchRequest::text(query))?;
        let body = self
            .transport
            .post(&endpoint(&self.base_url, SEARCH_PATH), &request)?;
        Ok(unwrap_envelope(&body)?)
    }
}
