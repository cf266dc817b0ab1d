//! Touch input from winit window events

use std::collections::HashMap;

use winit::dpi::PhysicalPosition;
use winit::event::{Force, WindowEvent};

use super::dispatcher::TouchDispatcher;
use super::touch::{Touch, TouchEvent, TouchId, TouchPhase, TouchSet};

impl From<winit::event::TouchPhase> for TouchPhase {
    fn from(phase: winit::event::TouchPhase) -> Self {
        use winit::event::TouchPhase as WP;
        match phase {
            WP::Started => Self::Began,
            WP::Moved => Self::Moved,
            WP::Ended => Self::Ended,
            WP::Cancelled => Self::Cancelled,
        }
    }
}

/// Converts winit touches and forwards them to a dispatcher
///
/// Each platform touch is dispatched on its own as a one-touch batch.
/// The collector only remembers the last position of every live touch so
/// delegates get a `previous_location`.
pub struct TouchCollector {
    scale_factor: f64,
    last_locations: HashMap<TouchId, [f32; 2]>,
}

impl TouchCollector {
    /// Creates a new touch collector
    pub fn new() -> Self {
        Self {
            scale_factor: 1.0,
            last_locations: HashMap::new(),
        }
    }

    /// Update scale factor (DPI scaling)
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    /// Converts a winit touch event, ignoring every other window event
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<(TouchPhase, Touch)> {
        match event {
            WindowEvent::Touch(touch) => Some(self.convert(
                touch.phase,
                touch.id,
                touch.location,
                touch.force.as_ref().map(Force::normalized),
            )),
            _ => None,
        }
    }

    /// Converts a winit touch event and dispatches it
    ///
    /// Returns whether the event was a touch.
    pub fn dispatch_window_event(
        &mut self,
        dispatcher: &TouchDispatcher,
        event: &WindowEvent,
        context: &TouchEvent,
    ) -> bool {
        let Some((phase, touch)) = self.handle_window_event(event) else {
            return false;
        };

        dispatcher.dispatch(phase, &TouchSet::from(touch), context);
        true
    }

    /// Number of touches currently down
    pub fn active_touches(&self) -> usize {
        self.last_locations.len()
    }

    fn convert(
        &mut self,
        phase: winit::event::TouchPhase,
        id: u64,
        location: PhysicalPosition<f64>,
        force: Option<f64>,
    ) -> (TouchPhase, Touch) {
        let phase = TouchPhase::from(phase);
        let id = TouchId(id);
        let location = [
            (location.x / self.scale_factor) as f32,
            (location.y / self.scale_factor) as f32,
        ];

        let previous_location = if phase.is_terminal() {
            self.last_locations.remove(&id)
        } else {
            self.last_locations.insert(id, location)
        }
        .unwrap_or(location);

        let touch = Touch {
            id,
            location,
            previous_location,
            force: force.map(|f| f as f32),
        };
        (phase, touch)
    }
}

impl Default for TouchCollector {
    fn default() -> Self {
        Self::new()
    }
}
