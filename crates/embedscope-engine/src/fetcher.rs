//! Label metadata for the visible points.
//!
//! Requests are debounced on the whole index set. When the timer fires a
//! [`LabelRequest`] is queued for the host, which does the I/O and hands the
//! result back with its ticket. Only the response to the most recently issued
//! ticket is applied, and only if nothing invalidated the fetcher since.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use embedscope_core::{Millis, PointIndex};
use embedscope_io::{ApiError, EmbeddingData};

use crate::debounce::Debouncer;

pub type Ticket = u64;

/// A details fetch the host should perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRequest {
    pub ticket: Ticket,
    pub indices: Vec<PointIndex>,
}

/// Label data for one point. `fresh` is false while the entry is only being
/// reused to reposition labels until the next response lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub index: PointIndex,
    pub text: String,
    pub media_type: String,
    pub fresh: bool,
}

impl From<EmbeddingData> for LabelEntry {
    fn from(data: EmbeddingData) -> Self {
        Self {
            index: data.index,
            text: data.data,
            media_type: data.media_type,
            fresh: true,
        }
    }
}

/// Outcome of handing a response to the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The working set was replaced with this many entries.
    Applied(usize),
    /// Superseded or invalidated; ignored.
    Stale,
    /// The fetch failed; the working set was cleared.
    Failed(String),
}

pub struct LabelFetcher {
    debounce: Debouncer<Vec<PointIndex>>,
    next_ticket: Ticket,
    awaiting: Option<Ticket>,
    outbox: Vec<LabelRequest>,
    working: BTreeMap<PointIndex, LabelEntry>,
}

impl LabelFetcher {
    pub fn new(delay: Millis) -> Self {
        Self {
            debounce: Debouncer::new(delay),
            next_ticket: 0,
            awaiting: None,
            outbox: Vec::new(),
            working: BTreeMap::new(),
        }
    }

    /// Ask for labels of `indices`, superseding any request still debouncing.
    /// Entries already held are kept for repositioning but marked stale.
    /// An empty set only cancels the pending request.
    pub fn request_labels(&mut self, indices: &[PointIndex], now: Millis) {
        for entry in self.working.values_mut() {
            entry.fresh = false;
        }
        if indices.is_empty() {
            if self.debounce.cancel().is_some() {
                log::trace!("Label request dropped; nothing in view");
            }
            return;
        }
        if self.debounce.schedule(indices.to_vec(), now) {
            log::trace!("Label request superseded");
        }
    }

    /// Issue the debounced request once its quiet period is over.
    pub fn tick(&mut self, now: Millis) -> Option<Ticket> {
        let indices = self.debounce.poll(now)?;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        log::debug!("Issuing label fetch #{ticket} for {} points", indices.len());
        self.awaiting = Some(ticket);
        self.outbox.push(LabelRequest { ticket, indices });
        Some(ticket)
    }

    /// Requests issued since the last call.
    pub fn take_requests(&mut self) -> Vec<LabelRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<EmbeddingData>, ApiError>,
    ) -> Resolution {
        if self.awaiting != Some(ticket) {
            log::debug!("Dropping stale label response #{ticket}");
            return Resolution::Stale;
        }
        self.awaiting = None;
        match result {
            Ok(details) => {
                self.working = details
                    .into_iter()
                    .map(|d| (d.index, LabelEntry::from(d)))
                    .collect();
                Resolution::Applied(self.working.len())
            }
            Err(err) => {
                self.working.clear();
                Resolution::Failed(err.to_string())
            }
        }
    }

    /// Cancel the pending request, orphan the in-flight one and forget all labels.
    pub fn invalidate(&mut self) {
        self.debounce.cancel();
        self.awaiting = None;
        self.outbox.clear();
        self.working.clear();
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Ticket whose response would currently be applied.
    pub fn awaiting(&self) -> Option<Ticket> {
        self.awaiting
    }

    pub fn entries(&self) -> impl Iterator<Item = &LabelEntry> {
        self.working.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedscope_io::TransportError;

    fn details(indices: &[PointIndex], tag: &str) -> Vec<EmbeddingData> {
        indices
            .iter()
            .map(|&i| EmbeddingData::text(i, format!("{tag}-{i}")))
            .collect()
    }

    #[test]
    fn test_debounced_burst_issues_once() {
        let mut f = LabelFetcher::new(200);
        f.request_labels(&[1, 2, 3], 0);
        f.request_labels(&[2, 3], 50);
        f.request_labels(&[3, 4], 120);
        assert_eq!(f.tick(319), None);
        assert_eq!(f.tick(320), Some(1));
        assert_eq!(
            f.take_requests(),
            vec![LabelRequest {
                ticket: 1,
                indices: vec![3, 4],
            }]
        );
        assert!(f.take_requests().is_empty());
    }

    #[test]
    fn test_empty_set_cancels_pending() {
        let mut f = LabelFetcher::new(200);
        f.request_labels(&[1, 2], 0);
        f.request_labels(&[], 100);
        assert!(!f.is_pending());
        assert_eq!(f.tick(400), None);
        assert!(f.take_requests().is_empty());
    }

    #[test]
    fn test_late_response_is_dropped() {
        let mut f = LabelFetcher::new(0);
        f.request_labels(&[1], 0);
        let a = f.tick(0).unwrap();
        f.request_labels(&[2], 10);
        let b = f.tick(10).unwrap();

        assert_eq!(f.resolve(b, Ok(details(&[2], "b"))), Resolution::Applied(1));
        assert_eq!(f.resolve(a, Ok(details(&[1], "a"))), Resolution::Stale);
        assert_eq!(f.entries().find(|e| e.index == 2).map(|e| e.text.as_str()), Some("b-2"));
        assert!(!f.entries().any(|e| e.index == 1));
    }

    #[test]
    fn test_invalidate_orphans_in_flight() {
        let mut f = LabelFetcher::new(0);
        f.request_labels(&[5], 0);
        let t = f.tick(0).unwrap();
        f.invalidate();
        assert_eq!(f.resolve(t, Ok(details(&[5], "x"))), Resolution::Stale);
        assert_eq!(f.entries().count(), 0);
    }

    #[test]
    fn test_failure_clears_working_set() {
        let mut f = LabelFetcher::new(0);
        f.request_labels(&[1], 0);
        let t = f.tick(0).unwrap();
        f.resolve(t, Ok(details(&[1], "ok")));

        f.request_labels(&[1], 5);
        assert_eq!(f.entries().find(|e| e.index == 1).map(|e| e.fresh), Some(false));
        let t = f.tick(5).unwrap();
        let res = f.resolve(t, Err(TransportError::Status(503).into()));
        assert_eq!(res, Resolution::Failed("Server responded with error: 503".into()));
        assert_eq!(f.entries().count(), 0);
    }
}
