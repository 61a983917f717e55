//! Drag and resize gestures as an explicit state machine.
//!
//! [`GestureState::step`] is a pure transition: it reads the timeline, never
//! mutates it, and reports what should change as a [`GestureEffect`].

use serde::{Deserialize, Serialize};

use crate::{ElementId, Result, Timeline, TimelineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeEdge {
    Left,
    Right,
}

/// Which part of an element the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitTarget {
    Body,
    Edge(ResizeEdge),
}

/// Pointer input, in pixels along the timeline's horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GestureInput {
    PointerDown {
        element: ElementId,
        target: HitTarget,
        x: f64,
    },
    PointerMove {
        x: f64,
    },
    PointerUp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub element: ElementId,
    pub origin_x: f64,
    pub origin_start: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    pub element: ElementId,
    pub edge: ResizeEdge,
    pub origin_x: f64,
    pub origin_start: f64,
    pub origin_duration: f64,
}

/// The single active-gesture slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragGesture),
    Resizing(ResizeGesture),
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// A gesture began on this element; it becomes the selection.
    Started { id: ElementId },
    Moved { id: ElementId, start_time: f64 },
    Resized {
        id: ElementId,
        start_time: f64,
        duration: f64,
    },
    /// The gesture ended and its result should be checkpointed.
    Committed { id: ElementId },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Element currently under a gesture, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Idle => None,
            Self::Dragging(drag) => Some(drag.element),
            Self::Resizing(resize) => Some(resize.element),
        }
    }

    /// Computes the next state and the effect to apply.
    ///
    /// Starting a gesture while another is open is refused, as is moving or
    /// releasing with nothing open. There is no cancel transition: releasing
    /// always commits.
    pub fn step(
        self,
        input: GestureInput,
        timeline: &Timeline,
    ) -> Result<(GestureState, Option<GestureEffect>)> {
        match (self, input) {
            (Self::Idle, GestureInput::PointerDown { element, target, x }) => {
                let current = timeline
                    .element(element)
                    .ok_or(TimelineError::ElementNotFound(element))?;
                let next = match target {
                    HitTarget::Body => Self::Dragging(DragGesture {
                        element,
                        origin_x: x,
                        origin_start: current.start_time,
                    }),
                    HitTarget::Edge(edge) => {
                        if !current.kind.is_resizable() {
                            return Err(TimelineError::NotResizable(element));
                        }
                        Self::Resizing(ResizeGesture {
                            element,
                            edge,
                            origin_x: x,
                            origin_start: current.start_time,
                            origin_duration: current.duration,
                        })
                    }
                };
                Ok((next, Some(GestureEffect::Started { id: element })))
            }
            (_, GestureInput::PointerDown { .. }) => Err(TimelineError::GestureInProgress),
            (Self::Idle, _) => Err(TimelineError::NoActiveGesture),
            (Self::Dragging(drag), GestureInput::PointerMove { x }) => {
                let current = timeline
                    .element(drag.element)
                    .ok_or(TimelineError::ElementNotFound(drag.element))?;
                let delta = timeline.seconds_for_pixels(x - drag.origin_x);
                let start_time = timeline
                    .placement()
                    .resolve_drag(current, drag.origin_start + delta);
                Ok((
                    self,
                    Some(GestureEffect::Moved {
                        id: drag.element,
                        start_time,
                    }),
                ))
            }
            (Self::Resizing(resize), GestureInput::PointerMove { x }) => {
                let current = timeline
                    .element(resize.element)
                    .ok_or(TimelineError::ElementNotFound(resize.element))?;
                let delta = timeline.seconds_for_pixels(x - resize.origin_x);
                let engine = timeline.placement();
                let (start_time, duration) = match resize.edge {
                    ResizeEdge::Left => engine.resolve_resize_left(
                        current,
                        resize.origin_start,
                        resize.origin_duration,
                        delta,
                    ),
                    ResizeEdge::Right => engine.resolve_resize_right(
                        current,
                        resize.origin_start,
                        resize.origin_duration,
                        delta,
                    ),
                };
                Ok((
                    self,
                    Some(GestureEffect::Resized {
                        id: resize.element,
                        start_time,
                        duration,
                    }),
                ))
            }
            (Self::Dragging(_) | Self::Resizing(_), GestureInput::PointerUp) => {
                let id = self.element().ok_or(TimelineError::NoActiveGesture)?;
                Ok((Self::Idle, Some(GestureEffect::Committed { id })))
            }
        }
    }
}
