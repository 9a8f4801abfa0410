use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Events queued on the UI thread until their owner drains them.
///
/// Producers hold an [`EventSender`]. Once the bus is dropped, sends fail and
/// hand the event back.
#[derive(Debug)]
pub struct EventBus<T> {
    events: Rc<RefCell<Vec<T>>>,
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self {
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn sender(&self) -> EventSender<T> {
        EventSender {
            events: Rc::downgrade(&self.events),
        }
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of an [`EventBus`].
#[derive(Debug)]
pub struct EventSender<T> {
    events: Weak<RefCell<Vec<T>>>,
}

impl<T> EventSender<T> {
    pub fn send(&self, event: T) -> Result<(), T> {
        match self.events.upgrade() {
            Some(events) => {
                events.borrow_mut().push(event);
                Ok(())
            }
            None => Err(event),
        }
    }
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_returns_events_in_order() {
        let bus = EventBus::new();
        let sender = bus.sender();
        sender.send(1).unwrap();
        sender.clone().send(2).unwrap();
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.drain(), vec![1, 2]);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_send_after_drop_fails() {
        let bus = EventBus::new();
        let sender = bus.sender();
        drop(bus);
        assert_eq!(sender.send("late"), Err("late"));
    }
}
