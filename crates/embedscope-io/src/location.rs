//! The shareable location: the camera travels in the `at` query parameter as
//! `"targetX,targetY,distance"` and is written with history-replace semantics.

use thiserror::Error;

use embedscope_core::CameraState;

/// Query parameter holding the serialized camera.
pub const CAMERA_PARAM: &str = "at";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("location is unavailable: {0}")]
    Unavailable(String),

    #[error("location update rejected: {0}")]
    Rejected(String),
}

/// Where the current location lives (browser history, a window title, a file).
pub trait LocationSink {
    /// Replace the current entry's query string; never adds a history entry.
    fn replace_query(&mut self, query: &str) -> Result<(), LocationError>;
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'*')
}

/// Form-urlencode a query component (space becomes `+`, `,` becomes `%2C`).
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for &b in value.as_bytes() {
        match b {
            b' ' => out.push('+'),
            b if is_unreserved(b) => out.push(b as char),
            b => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Inverse of [`encode_component`]; malformed escapes are kept literally.
pub fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(decoded) => {
                        out.push(decoded);
                        i += 3;
                        continue;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Decoded `(name, value)` pairs of a query string, with or without a leading `?`.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (decode_component(name), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// First value of `name` in `query`.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    parse_query(query)
        .into_iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v)
}

/// Query string carrying `camera`.
pub fn camera_query(camera: &CameraState) -> String {
    format!("{}={}", CAMERA_PARAM, encode_component(&camera.to_location()))
}

/// In-memory location with a history stack, for hosts without a browser.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    entries: Vec<String>,
    replacements: usize,
}

impl MemoryLocation {
    pub fn new(initial_query: impl Into<String>) -> Self {
        Self {
            entries: vec![initial_query.into()],
            replacements: 0,
        }
    }

    pub fn query(&self) -> &str {
        self.entries.last().map(String::as_str).unwrap_or("")
    }

    /// Number of history entries.
    pub fn history_len(&self) -> usize {
        self.entries.len()
    }

    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl LocationSink for MemoryLocation {
    fn replace_query(&mut self, query: &str) -> Result<(), LocationError> {
        match self.entries.last_mut() {
            Some(current) => *current = query.to_string(),
            None => self.entries.push(query.to_string()),
        }
        self.replacements += 1;
        Ok(())
    }
}
