//! Auto-concatenation placement and collision resolution.
//!
//! Everything here is a pure query over a borrowed element slice; callers
//! decide whether to apply the answer.

use crate::{
    timeline::{Placement, MIN_ELEMENT_DURATION, TIME_EPSILON},
    ElementKind, LayerRejection, TimelineElement,
};

const VIDEO_LAYER: u32 = 0;
const SHADER_LAYER: u32 = 1;
const FIRST_SHARED_LAYER: u32 = 2;

/// Whether `layer` accepts elements of `kind`.
pub fn layer_accepts(kind: ElementKind, layer: u32) -> bool {
    check_layer(kind, layer).is_ok()
}

/// Layer 0 takes only videos, layer 1 only shaders and transitions, every
/// other layer takes anything.
pub fn check_layer(kind: ElementKind, layer: u32) -> Result<(), LayerRejection> {
    match (layer, kind) {
        (VIDEO_LAYER, ElementKind::Video) => Ok(()),
        (VIDEO_LAYER, _) => Err(LayerRejection::ReservedForVideo),
        (SHADER_LAYER, ElementKind::Shader | ElementKind::Transition) => Ok(()),
        (SHADER_LAYER, ElementKind::Video) => Err(LayerRejection::ReservedForShaderOrTransition),
        _ => Ok(()),
    }
}

fn home_layer(kind: ElementKind) -> u32 {
    match kind {
        ElementKind::Video => VIDEO_LAYER,
        ElementKind::Shader | ElementKind::Transition => SHADER_LAYER,
    }
}

/// Placement and collision queries over one timeline's elements.
#[derive(Debug, Clone, Copy)]
pub struct PlacementEngine<'a> {
    elements: &'a [TimelineElement],
    timeline_duration: f64,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(elements: &'a [TimelineElement], timeline_duration: f64) -> Self {
        Self {
            elements,
            timeline_duration,
        }
    }

    fn layers(&self) -> Vec<u32> {
        let mut layers: Vec<u32> = self.elements.iter().map(|element| element.layer).collect();
        layers.sort_unstable();
        layers.dedup();
        layers
    }

    fn on_layer(&self, layer: u32) -> impl Iterator<Item = &'a TimelineElement> {
        let elements = self.elements;
        elements
            .iter()
            .filter(move |element| element.layer == layer)
    }

    /// Neighbours of `element` on its own layer.
    fn others(&self, element: &TimelineElement) -> impl Iterator<Item = &'a TimelineElement> {
        let id = element.id;
        self.on_layer(element.layer)
            .filter(move |other| other.id != id)
    }

    /// Fits `requested` seconds from `start_time` to the end of the
    /// timeline. `None` when less than the minimum duration remains.
    fn fit(&self, layer: u32, start_time: f64, requested: f64) -> Option<Placement> {
        let available = self.timeline_duration - start_time;
        if available < MIN_ELEMENT_DURATION - TIME_EPSILON {
            return None;
        }
        let duration = requested.max(MIN_ELEMENT_DURATION).min(available);
        Some(Placement {
            layer,
            start_time,
            duration,
        })
    }

    /// Slot directly after the rightmost element on `layer`, with the
    /// duration truncated to the space left. `None` when the layer is full.
    pub fn find_end_of_layer(&self, layer: u32, requested: f64) -> Option<Placement> {
        let max_end = self
            .on_layer(layer)
            .map(TimelineElement::end_time)
            .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |m| m.max(end))));

        match max_end {
            None => self.fit(layer, 0.0, requested),
            Some(end) if end >= self.timeline_duration => None,
            Some(end) => self.fit(layer, end, requested),
        }
    }

    /// Decides where a new element of `kind` goes.
    ///
    /// The hint is tried first when it names an existing, compatible layer.
    /// Then existing layers are filled in ascending order, skipping reserved
    /// layers that refuse the kind. When nothing fits, a new layer is opened
    /// at time zero: the kind's home layer if it is still unused, otherwise
    /// one past the highest layer.
    pub fn place(
        &self,
        kind: ElementKind,
        requested: f64,
        hint: Option<u32>,
    ) -> Option<Placement> {
        let layers = self.layers();

        if layers.is_empty() {
            return self.fit(home_layer(kind), 0.0, requested);
        }

        if let Some(hint) = hint {
            if layers.contains(&hint) && layer_accepts(kind, hint) {
                if let Some(placement) = self.find_end_of_layer(hint, requested) {
                    return Some(placement);
                }
            }
        }

        for &layer in layers.iter().filter(|&&layer| layer_accepts(kind, layer)) {
            if let Some(placement) = self.find_end_of_layer(layer, requested) {
                return Some(placement);
            }
        }

        let home = home_layer(kind);
        let new_layer = if !layers.contains(&home) {
            home
        } else {
            layers
                .last()
                .map_or(FIRST_SHARED_LAYER, |max| (max + 1).max(FIRST_SHARED_LAYER))
        };
        tracing::debug!(?kind, layer = new_layer, "opening new layer");
        self.fit(new_layer, 0.0, requested)
    }

    /// True when `[start_time, start_time + duration)` lies inside the
    /// timeline and clear of `element`'s neighbours.
    pub fn span_is_free(&self, element: &TimelineElement, start_time: f64, duration: f64) -> bool {
        start_time >= 0.0
            && duration >= MIN_ELEMENT_DURATION - TIME_EPSILON
            && start_time + duration <= self.timeline_duration + TIME_EPSILON
            && !self
                .on_layer(element.layer)
                .filter(|other| other.id != element.id)
                .any(|other| other.overlaps_span(start_time, duration))
    }

    /// Resolves a proposed drag position for `element`.
    ///
    /// The start is clamped to the timeline, then snapped out of the first
    /// neighbour it overlaps: to the neighbour's end when the proposal starts
    /// at or after the neighbour's start, otherwise to just before the
    /// neighbour. If that spot is taken too, the opposite side is tried, and
    /// failing both the element stays where it is.
    pub fn resolve_drag(&self, element: &TimelineElement, proposed_start: f64) -> f64 {
        if !proposed_start.is_finite() {
            return element.start_time;
        }
        let duration = element.duration;
        let max_start = (self.timeline_duration - duration).max(0.0);
        let proposed = proposed_start.clamp(0.0, max_start);

        let blocker = self
            .others(element)
            .filter(|other| other.overlaps_span(proposed, duration))
            .min_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let Some(blocker) = blocker else {
            return proposed;
        };

        let after = blocker.end_time();
        let before = blocker.start_time - duration;
        let candidates = if proposed < blocker.start_time {
            [before, after]
        } else {
            [after, before]
        };

        candidates
            .into_iter()
            .find(|&start| self.span_is_free(element, start, duration))
            .unwrap_or(element.start_time)
    }

    /// Resolves a left-edge resize. The right edge (as it was when the
    /// gesture began) stays put; the left edge is clamped to the timeline, the
    /// minimum duration and the end of the nearest neighbour to the left.
    /// Returns `(start_time, duration)`.
    pub fn resolve_resize_left(
        &self,
        element: &TimelineElement,
        origin_start: f64,
        origin_duration: f64,
        delta: f64,
    ) -> (f64, f64) {
        if !delta.is_finite() {
            return (origin_start, origin_duration);
        }
        let right = (origin_start + origin_duration).min(self.timeline_duration);
        let latest_start = (right - MIN_ELEMENT_DURATION).max(0.0);
        let mut start = (origin_start + delta).clamp(0.0, latest_start);

        let left_limit = self
            .others(element)
            .filter(|other| other.overlaps_span(start, right - start))
            .map(TimelineElement::end_time)
            .fold(None, |acc: Option<f64>, end| Some(acc.map_or(end, |m| m.max(end))));
        if let Some(limit) = left_limit {
            start = start.max(limit);
        }

        let duration = right - start;
        if self.span_is_free(element, start, duration) {
            (start, duration)
        } else {
            (origin_start, origin_duration)
        }
    }

    /// Resolves a right-edge resize. The start stays put; the right edge is
    /// clamped to the minimum duration, the end of the timeline and the start
    /// of the nearest neighbour to the right. Returns `(start_time, duration)`.
    pub fn resolve_resize_right(
        &self,
        element: &TimelineElement,
        origin_start: f64,
        origin_duration: f64,
        delta: f64,
    ) -> (f64, f64) {
        if !delta.is_finite() {
            return (origin_start, origin_duration);
        }
        let start = origin_start;
        let mut end = (start + origin_duration + delta)
            .max(start + MIN_ELEMENT_DURATION)
            .min(self.timeline_duration);

        let right_limit = self
            .others(element)
            .filter(|other| other.start_time >= start - TIME_EPSILON)
            .filter(|other| other.overlaps_span(start, end - start))
            .map(|other| other.start_time)
            .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.min(s))));
        if let Some(limit) = right_limit {
            end = end.min(limit);
        }

        let duration = end - start;
        if self.span_is_free(element, start, duration) {
            (start, duration)
        } else {
            (origin_start, origin_duration)
        }
    }
}
