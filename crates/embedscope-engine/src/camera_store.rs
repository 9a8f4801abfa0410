use embedscope_core::{CameraState, Millis, RawCamera};
use embedscope_io::location::{camera_query, query_param, LocationSink, CAMERA_PARAM};

use crate::debounce::Debouncer;

/// Current camera plus its debounced mirror in the shareable location.
pub struct CameraStore<L: LocationSink> {
    current: CameraState,
    persist: Debouncer<CameraState>,
    sink: L,
    writes: usize,
    failures: usize,
}

/// Camera for a serialized `"x,y,distance"` value; the origin camera otherwise.
pub fn init_from_location(serialized: Option<&str>) -> CameraState {
    CameraState::from_location(serialized)
}

impl<L: LocationSink> CameraStore<L> {
    /// Store restored from the `at` parameter of `query`.
    pub fn from_query(sink: L, query: &str, persist_delay: Millis) -> Self {
        let current = init_from_location(query_param(query, CAMERA_PARAM).as_deref());
        log::debug!("Initial camera {current}");
        Self {
            current,
            persist: Debouncer::new(persist_delay),
            sink,
            writes: 0,
            failures: 0,
        }
    }

    pub fn current(&self) -> CameraState {
        self.current
    }

    /// Take the camera the renderer reported, normalized.
    pub fn on_view_change(&mut self, raw: RawCamera) -> CameraState {
        self.current = raw.normalize();
        self.current
    }

    /// Schedule a location update; replaces any update still waiting.
    pub fn persist(&mut self, state: CameraState, now: Millis) {
        self.persist.schedule(state, now);
    }

    /// Write the pending camera if its quiet period is over. Returns whether
    /// the location was written.
    pub fn tick(&mut self, now: Millis) -> bool {
        match self.persist.poll(now) {
            Some(state) => self.write(&state),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.persist.is_pending()
    }

    pub fn cancel(&mut self) {
        self.persist.cancel();
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    /// Successful location writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    fn write(&mut self, state: &CameraState) -> bool {
        match self.sink.replace_query(&camera_query(state)) {
            Ok(()) => {
                self.writes += 1;
                true
            }
            Err(err) => {
                self.failures += 1;
                log::warn!("Could not persist camera {state}: {err}");
                false
            }
        }
    }
}
