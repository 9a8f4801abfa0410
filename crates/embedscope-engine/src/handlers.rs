use embedscope_core::commands::DEFAULT_FRAMING;
use embedscope_core::{DataRect, EventSender, PointIndex, ZoomCommand};

/// Zoom capabilities of one renderer instance, handed to sibling UI.
///
/// Calls are fire-and-forget: they queue a command that the engine forwards to
/// the renderer on its next pump. Handlers of a destroyed instance go quiet.
#[derive(Debug, Clone)]
pub struct ZoomHandlers {
    instance: u64,
    commands: EventSender<ZoomCommand>,
}

impl ZoomHandlers {
    pub fn new(instance: u64, commands: EventSender<ZoomCommand>) -> Self {
        Self { instance, commands }
    }

    /// Renderer instance these handlers drive.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn zoom_to_point(&self, index: PointIndex) {
        self.send(ZoomCommand::to_point(index));
    }

    pub fn zoom_to_origin(&self) {
        self.send(ZoomCommand::ToOrigin);
    }

    pub fn zoom_to_area(&self, rect: DataRect) {
        self.send(ZoomCommand::ToArea(rect));
    }

    /// Back to the fixed default framing.
    pub fn reset_framing(&self) {
        self.zoom_to_area(DEFAULT_FRAMING);
    }

    fn send(&self, command: ZoomCommand) {
        if self.commands.send(command).is_err() {
            log::debug!("Renderer instance {} is gone; zoom ignored", self.instance);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedscope_core::EventBus;

    #[test]
    fn test_handlers_queue_commands() {
        let bus = EventBus::new();
        let handlers = ZoomHandlers::new(3, bus.sender());
        handlers.zoom_to_point(42);
        handlers.zoom_to_origin();
        handlers.reset_framing();
        assert_eq!(
            bus.drain(),
            vec![
                ZoomCommand::ToPoints(vec![42]),
                ZoomCommand::ToOrigin,
                ZoomCommand::ToArea(DataRect::new(0.0, 0.0, 0.03, 0.03)),
            ]
        );
    }

    #[test]
    fn test_handlers_outlive_engine_queue() {
        let bus = EventBus::new();
        let handlers = ZoomHandlers::new(1, bus.sender());
        drop(bus);
        handlers.zoom_to_origin();
        assert_eq!(handlers.instance(), 1);
    }
}
