// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping host pointer events into canvas-local gestures.

use std::sync::mpsc::Sender;

use kurbo::{Point, Vec2};

/// What the host's pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Pressed,
    Dragged,
    Released,
    /// Moved with no button held.
    Moved,
}

/// A pointer event in the coordinate space of the view enclosing the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Start,
    Update,
    End,
    Hover,
}

impl GesturePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            GesturePhase::Start => "start",
            GesturePhase::Update => "update",
            GesturePhase::End => "end",
            GesturePhase::Hover => "hover",
        }
    }
}

/// A pointer interaction in canvas points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub phase: GesturePhase,
    pub position: Point,
}

/// Receives gesture events.
pub trait GestureSink {
    fn deliver(&mut self, event: GestureEvent);
}

impl GestureSink for Sender<GestureEvent> {
    fn deliver(&mut self, event: GestureEvent) {
        if self.send(event).is_err() {
            log::debug!("gesture receiver hung up, dropping {:?}", event.phase);
        }
    }
}

impl GestureSink for Vec<GestureEvent> {
    fn deliver(&mut self, event: GestureEvent) {
        self.push(event);
    }
}

/// Turns pointer events into gesture phases.
///
/// Positions are translated by the canvas's origin within its view. No
/// higher-level recognition (taps, pinches) happens here.
#[derive(Debug, Clone, Default)]
pub struct GestureMapper {
    origin: Point,
    enabled: bool,
    pressed: bool,
}

impl GestureMapper {
    pub fn new(enabled: bool) -> GestureMapper {
        GestureMapper {
            origin: Point::ORIGIN,
            enabled,
            pressed: false,
        }
    }

    /// Where the canvas's top-left corner sits in view coordinates.
    pub fn set_origin(&mut self, origin: impl Into<Point>) {
        self.origin = origin.into();
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Turning gestures off also forgets a press in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pressed = false;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn to_local(&self, view_point: Point) -> Point {
        view_point - self.origin.to_vec2()
    }

    /// Map one pointer event. Returns `None` when disabled, or for events
    /// that don't make sense in the current state (a release without a press).
    pub fn map(&mut self, event: PointerEvent) -> Option<GestureEvent> {
        if !self.enabled {
            return None;
        }
        let phase = match (event.action, self.pressed) {
            (PointerAction::Pressed, _) => {
                self.pressed = true;
                GesturePhase::Start
            }
            (PointerAction::Dragged | PointerAction::Moved, true) => GesturePhase::Update,
            (PointerAction::Moved, false) => GesturePhase::Hover,
            (PointerAction::Released, true) => {
                self.pressed = false;
                GesturePhase::End
            }
            (PointerAction::Dragged | PointerAction::Released, false) => return None,
        };
        Some(GestureEvent {
            phase,
            position: self.to_local(event.position),
        })
    }

    /// Map an event and hand the result to `sink`. Returns whether anything
    /// was delivered.
    pub fn dispatch(&mut self, event: PointerEvent, sink: &mut dyn GestureSink) -> bool {
        match self.map(event) {
            Some(gesture) => {
                sink.deliver(gesture);
                true
            }
            None => false,
        }
    }

    /// Shift the origin, e.g. when the view scrolls.
    pub fn offset_origin(&mut self, delta: Vec2) {
        self.origin += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn ev(action: PointerAction, x: f64, y: f64) -> PointerEvent {
        PointerEvent {
            action,
            position: Point::new(x, y),
        }
    }

    #[test]
    fn phases_and_local_coordinates() {
        let mut mapper = GestureMapper::new(true);
        mapper.set_origin((100.0, 50.0));
        let mut events = Vec::new();
        for e in [
            ev(PointerAction::Moved, 110.0, 60.0),
            ev(PointerAction::Pressed, 120.0, 70.0),
            ev(PointerAction::Dragged, 130.0, 80.0),
            ev(PointerAction::Released, 140.0, 90.0),
        ] {
            mapper.dispatch(e, &mut events);
        }
        let phases: Vec<_> = events.iter().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            [
                GesturePhase::Hover,
                GesturePhase::Start,
                GesturePhase::Update,
                GesturePhase::End
            ]
        );
        assert_eq!(events[1].position, Point::new(20.0, 20.0));
        assert_eq!(events[3].position, Point::new(40.0, 40.0));
    }

    #[test]
    fn disabled_mapper_is_silent() {
        let mut mapper = GestureMapper::new(false);
        assert_eq!(mapper.map(ev(PointerAction::Pressed, 1.0, 1.0)), None);
        mapper.set_enabled(true);
        assert_eq!(mapper.map(ev(PointerAction::Released, 1.0, 1.0)), None);
        assert_eq!(mapper.map(ev(PointerAction::Dragged, 1.0, 1.0)), None);
    }

    #[test]
    fn channel_sink() {
        let (tx, rx) = channel();
        let mut sink = tx;
        let mut mapper = GestureMapper::new(true);
        assert!(mapper.dispatch(ev(PointerAction::Pressed, 5.0, 6.0), &mut sink));
        let got = rx.try_recv().unwrap();
        assert_eq!(got.phase, GesturePhase::Start);
        assert_eq!(got.phase.as_str(), "start");
        assert_eq!(got.position, Point::new(5.0, 6.0));
    }
}
