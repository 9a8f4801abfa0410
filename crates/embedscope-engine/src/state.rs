//! Application state shared between the engine and sibling UI.
//!
//! Capabilities are split: [`ErrorReporter`] can raise errors, [`ErrorView`]
//! can read and dismiss them, [`ZoomHandlerSlot`] hands out the zoom handlers
//! of the current renderer instance.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use embedscope_core::{Millis, SharedClock};

use crate::debounce::Debouncer;
use crate::handlers::ZoomHandlers;

/// What the error banner shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    pub is_error: bool,
    pub error_msg: Option<String>,
}

struct ErrorChannel {
    state: ErrorState,
    dismiss: Debouncer<()>,
}

/// Handle to the shared state. Clones refer to the same state.
#[derive(Clone)]
pub struct AppState {
    clock: SharedClock,
    errors: Rc<RefCell<ErrorChannel>>,
    zoom: Rc<RefCell<Option<ZoomHandlers>>>,
}

impl AppState {
    /// Errors dismiss themselves `dismiss_after` ms after they were raised.
    pub fn new(clock: SharedClock, dismiss_after: Millis) -> Self {
        Self {
            clock,
            errors: Rc::new(RefCell::new(ErrorChannel {
                state: ErrorState::default(),
                dismiss: Debouncer::new(dismiss_after),
            })),
            zoom: Rc::new(RefCell::new(None)),
        }
    }

    pub fn reporter(&self) -> ErrorReporter {
        ErrorReporter {
            clock: self.clock.clone(),
            errors: self.errors.clone(),
        }
    }

    pub fn error_view(&self) -> ErrorView {
        ErrorView {
            errors: self.errors.clone(),
        }
    }

    pub fn zoom_slot(&self) -> ZoomHandlerSlot {
        ZoomHandlerSlot {
            zoom: self.zoom.clone(),
        }
    }

    /// Run the auto-dismiss timer.
    pub fn tick(&self) {
        let mut errors = self.errors.borrow_mut();
        if errors.dismiss.poll(self.clock.now_ms()).is_some() {
            log::debug!("Error banner dismissed after timeout");
            errors.state = ErrorState::default();
        }
    }

    pub(crate) fn install_zoom_handlers(&self, handlers: ZoomHandlers) {
        *self.zoom.borrow_mut() = Some(handlers);
    }

    pub(crate) fn clear_zoom_handlers(&self) {
        self.zoom.borrow_mut().take();
    }

    pub(crate) fn cancel_timers(&self) {
        self.errors.borrow_mut().dismiss.cancel();
    }
}

/// Write side of the error channel.
#[derive(Clone)]
pub struct ErrorReporter {
    clock: SharedClock,
    errors: Rc<RefCell<ErrorChannel>>,
}

impl ErrorReporter {
    /// Show `message`; a newer error replaces the current one and restarts the timer.
    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{message}");
        let mut errors = self.errors.borrow_mut();
        errors.state = ErrorState {
            is_error: true,
            error_msg: Some(message),
        };
        let now = self.clock.now_ms();
        errors.dismiss.schedule((), now);
    }
}

/// Read side of the error channel.
#[derive(Clone)]
pub struct ErrorView {
    errors: Rc<RefCell<ErrorChannel>>,
}

impl ErrorView {
    pub fn state(&self) -> ErrorState {
        self.errors.borrow().state.clone()
    }

    pub fn is_error(&self) -> bool {
        self.errors.borrow().state.is_error
    }

    /// Dismiss by hand, before the timer does.
    pub fn dismiss(&self) {
        let mut errors = self.errors.borrow_mut();
        errors.dismiss.cancel();
        errors.state = ErrorState::default();
    }
}

/// Read side of the zoom handlers. Empty until a renderer is mounted.
#[derive(Clone)]
pub struct ZoomHandlerSlot {
    zoom: Rc<RefCell<Option<ZoomHandlers>>>,
}

impl ZoomHandlerSlot {
    pub fn get(&self) -> Option<ZoomHandlers> {
        self.zoom.borrow().clone()
    }

    pub fn is_installed(&self) -> bool {
        self.zoom.borrow().is_some()
    }
}
