//! Canonical timeline state: duration, zoom, playhead, elements and selection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    config::ZoomConfig, placement::PlacementEngine, AssetDescriptor, Result, TimelineError,
};

/// Shortest span an element may occupy, in seconds.
pub const MIN_ELEMENT_DURATION: f64 = 0.1;

/// Tolerance used when comparing element edges.
pub(crate) const TIME_EPSILON: f64 = 1e-9;

/// Upper bound on undrained notifications.
const MAX_PENDING_EVENTS: usize = 1024;

const TRANSITION_DURATION: f64 = 1.6;
const VIDEO_DURATION_CAP: f64 = 10.0;
const SHADER_DURATION: f64 = 10.0;

/// Closed set of element types the timeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Video,
    Shader,
    Transition,
}

impl ElementKind {
    /// Transitions keep the duration they were created with.
    pub fn is_resizable(&self) -> bool {
        !matches!(self, Self::Transition)
    }

    /// Duration a freshly dropped element asks for before it is fitted.
    pub fn default_duration(&self, source: &AssetDescriptor) -> f64 {
        match self {
            Self::Transition => TRANSITION_DURATION,
            Self::Video => source
                .duration
                .filter(|d| *d > 0.0)
                .unwrap_or(VIDEO_DURATION_CAP)
                .min(VIDEO_DURATION_CAP),
            Self::Shader => SHADER_DURATION,
        }
    }
}

/// Opaque element identifier, stable for the element's lifetime.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(uuid::Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// Where an element sits: its layer and time span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub layer: u32,
    pub start_time: f64,
    pub duration: f64,
}

/// A typed, timed element placed on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineElement {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: String,
    pub source: AssetDescriptor,
    pub start_time: f64,
    pub duration: f64,
    pub layer: u32,
    /// Whether the editor previews this element as a green-screen overlay.
    #[serde(default = "default_preview")]
    pub preview_enabled: bool,
}

fn default_preview() -> bool {
    true
}

impl TimelineElement {
    pub fn new(kind: ElementKind, source: AssetDescriptor, placement: Placement) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            name: source.name.clone(),
            source,
            start_time: placement.start_time,
            duration: placement.duration,
            layer: placement.layer,
            preview_enabled: true,
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// True when `[start, start + duration)` intersects this element's span.
    pub fn overlaps_span(&self, start: f64, duration: f64) -> bool {
        start < self.end_time() - TIME_EPSILON && start + duration > self.start_time + TIME_EPSILON
    }

    pub fn overlaps(&self, other: &TimelineElement) -> bool {
        self.layer == other.layer && self.overlaps_span(other.start_time, other.duration)
    }

    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }
}

/// State-changed notification for whatever presents the timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    Initialized { duration: f64 },
    ElementAdded(ElementId),
    ElementRemoved(ElementId),
    ElementChanged(ElementId),
    ElementsRestored,
    SelectionChanged(Option<ElementId>),
    ZoomChanged(f64),
    PlayheadMoved(f64),
}

/// The timeline model for one editing session.
#[derive(Debug, Clone)]
pub struct Timeline {
    zoom_config: ZoomConfig,
    duration: f64,
    zoom: f64,
    playhead: f64,
    elements: Vec<TimelineElement>,
    selected: Option<ElementId>,
    audio_name: String,
    events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new(zoom_config: ZoomConfig) -> Self {
        let zoom = zoom_config.default;
        Self {
            zoom_config,
            duration: 0.0,
            zoom,
            playhead: 0.0,
            elements: Vec::new(),
            selected: None,
            audio_name: String::new(),
            events: Vec::new(),
        }
    }

    /// Locks the timeline to a new audio track, dropping all elements, the
    /// selection and the playhead position.
    pub fn initialize(&mut self, duration: f64, audio_name: impl Into<String>) -> Result<()> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(TimelineError::InvalidInput(
                "timeline duration must be a finite, non-negative number of seconds",
            ));
        }

        self.duration = duration;
        self.audio_name = audio_name.into();
        self.elements.clear();
        self.selected = None;
        self.playhead = 0.0;
        self.emit(TimelineEvent::Initialized { duration });
        tracing::info!(duration, audio = %self.audio_name, "timeline initialized");
        Ok(())
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn audio_name(&self) -> &str {
        &self.audio_name
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn elements(&self) -> &[TimelineElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&TimelineElement> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn elements_on_layer(&self, layer: u32) -> impl Iterator<Item = &TimelineElement> {
        self.elements
            .iter()
            .filter(move |element| element.layer == layer)
    }

    /// Distinct layers in use, ascending.
    pub fn layers(&self) -> Vec<u32> {
        let mut layers: Vec<u32> = self.elements.iter().map(|element| element.layer).collect();
        layers.sort_unstable();
        layers.dedup();
        layers
    }

    /// Placement and collision queries against the current elements.
    pub fn placement(&self) -> PlacementEngine<'_> {
        PlacementEngine::new(&self.elements, self.duration)
    }

    pub fn zoom_config(&self) -> &ZoomConfig {
        &self.zoom_config
    }

    /// Sets the zoom factor, clamped to the configured bounds. Returns the
    /// value actually applied.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        let clamped = if zoom.is_finite() {
            zoom.clamp(self.zoom_config.min, self.zoom_config.max)
        } else {
            self.zoom
        };
        if (clamped - self.zoom).abs() > f64::EPSILON {
            tracing::debug!(from = self.zoom, to = clamped, "zoom changed");
            self.zoom = clamped;
            self.emit(TimelineEvent::ZoomChanged(clamped));
        }
        self.zoom
    }

    /// Steps are finer when zoomed out and coarser when zoomed in.
    pub fn zoom_in(&mut self) -> f64 {
        let step = if self.zoom < 1.0 {
            0.1
        } else if self.zoom < 5.0 {
            0.25
        } else {
            0.5
        };
        self.set_zoom(self.zoom + step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        let step = if self.zoom <= 1.0 {
            0.1
        } else if self.zoom <= 5.0 {
            0.25
        } else {
            0.5
        };
        self.set_zoom(self.zoom - step)
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.set_zoom(self.zoom_config.default)
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.zoom * self.zoom_config.pixels_per_second
    }

    /// Full width of the timeline at the current zoom.
    pub fn width_px(&self) -> f64 {
        self.duration * self.pixels_per_second()
    }

    pub fn seconds_for_pixels(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_second()
    }

    /// Moves the playhead, clamped to `[0, duration]`.
    pub fn set_playhead(&mut self, time: f64) -> f64 {
        let time = if time.is_finite() { time } else { 0.0 };
        self.playhead = time.clamp(0.0, self.duration);
        self.emit(TimelineEvent::PlayheadMoved(self.playhead));
        self.playhead
    }

    /// Seeks to the time under a horizontal pixel offset from the timeline start.
    pub fn seek_to_pixel(&mut self, x: f64) -> f64 {
        let time = self.seconds_for_pixels(x);
        self.set_playhead(time)
    }

    /// Selects an element. Unknown ids are ignored and return `false`.
    pub fn select(&mut self, id: ElementId) -> bool {
        if self.element(id).is_none() {
            return false;
        }
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.emit(TimelineEvent::SelectionChanged(Some(id)));
        }
        true
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.emit(TimelineEvent::SelectionChanged(None));
        }
    }

    /// Adds an element after checking bounds and same-layer overlap.
    pub fn insert_element(&mut self, element: TimelineElement) -> Result<()> {
        self.check_span(&element, element.layer, element.start_time, element.duration)?;
        tracing::debug!(
            element = %element.id,
            kind = ?element.kind,
            layer = element.layer,
            start = element.start_time,
            duration = element.duration,
            "element inserted"
        );
        self.emit(TimelineEvent::ElementAdded(element.id));
        self.elements.push(element);
        Ok(())
    }

    pub fn remove_element(&mut self, id: ElementId) -> Result<TimelineElement> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);
        if self.selected == Some(id) {
            self.deselect();
        }
        tracing::debug!(element = %id, "element removed");
        self.emit(TimelineEvent::ElementRemoved(id));
        Ok(removed)
    }

    /// Swaps in a whole element collection, as undo/redo does.
    pub fn replace_elements(&mut self, elements: Vec<TimelineElement>) {
        self.elements = elements;
        if let Some(id) = self.selected {
            if self.element(id).is_none() {
                self.deselect();
            }
        }
        self.emit(TimelineEvent::ElementsRestored);
    }

    /// Writes a span that has already been resolved against collisions.
    pub fn update_span(&mut self, id: ElementId, start_time: f64, duration: f64) -> Result<()> {
        let index = self.index_of(id)?;
        let layer = self.elements[index].layer;
        self.check_span(&self.elements[index], layer, start_time, duration)?;

        let element = &mut self.elements[index];
        if element.start_time != start_time || element.duration != duration {
            element.start_time = start_time;
            element.duration = duration;
            self.emit(TimelineEvent::ElementChanged(id));
        }
        Ok(())
    }

    /// Moves an element to a new start time, clamped and snapped away from
    /// neighbours. Returns the start time actually applied.
    pub fn set_element_start(&mut self, id: ElementId, start_time: f64) -> Result<f64> {
        let element = self.element(id).ok_or(TimelineError::ElementNotFound(id))?;
        let resolved = self.placement().resolve_drag(element, start_time);
        let duration = element.duration;
        self.update_span(id, resolved, duration)?;
        Ok(resolved)
    }

    /// Changes an element's duration from its right edge. Videos never grow
    /// past their source length. Returns the duration actually applied.
    pub fn set_element_duration(&mut self, id: ElementId, duration: f64) -> Result<f64> {
        let element = self.element(id).ok_or(TimelineError::ElementNotFound(id))?;
        if !element.kind.is_resizable() {
            return Err(TimelineError::NotResizable(id));
        }

        let mut target = duration;
        if element.kind == ElementKind::Video {
            if let Some(source) = element.source.duration.filter(|d| *d > 0.0) {
                target = target.min(source.max(MIN_ELEMENT_DURATION));
            }
        }

        let (start, resolved) = self.placement().resolve_resize_right(
            element,
            element.start_time,
            element.duration,
            target - element.duration,
        );
        self.update_span(id, start, resolved)?;
        Ok(resolved)
    }

    /// Manual repositioning onto another layer. Kind reservations are not
    /// enforced here; overlapping the destination's elements is.
    pub fn move_element_to_layer(&mut self, id: ElementId, layer: u32) -> Result<()> {
        let index = self.index_of(id)?;
        let element = &self.elements[index];
        if element.layer == layer {
            return Ok(());
        }
        self.check_span(element, layer, element.start_time, element.duration)?;

        self.elements[index].layer = layer;
        tracing::debug!(element = %id, layer, "element moved to layer");
        self.emit(TimelineEvent::ElementChanged(id));
        Ok(())
    }

    /// Returns `true` when the flag actually changed.
    pub fn set_preview_enabled(&mut self, id: ElementId, enabled: bool) -> Result<bool> {
        let index = self.index_of(id)?;
        if self.elements[index].preview_enabled == enabled {
            return Ok(false);
        }
        self.elements[index].preview_enabled = enabled;
        self.emit(TimelineEvent::ElementChanged(id));
        Ok(true)
    }

    /// Turns every preview back on. Returns `true` if any element changed.
    pub fn enable_all_previews(&mut self) -> bool {
        let mut changed = Vec::new();
        for element in &mut self.elements {
            if !element.preview_enabled {
                element.preview_enabled = true;
                changed.push(element.id);
            }
        }
        for &id in &changed {
            self.emit(TimelineEvent::ElementChanged(id));
        }
        !changed.is_empty()
    }

    /// The green-screen video (a video on layer 0) playing at `time`, if any.
    pub fn green_screen_at(&self, time: f64) -> Option<&TimelineElement> {
        self.elements_on_layer(0)
            .filter(|element| element.kind == ElementKind::Video)
            .find(|element| element.contains_time(time))
    }

    /// Queues a notification. State-style events replace their pending
    /// predecessor and repeated `ElementChanged` ids collapse, so the queue
    /// stays small when nobody drains it. Past `MAX_PENDING_EVENTS` the
    /// element notifications fold into a single `ElementsRestored`.
    fn emit(&mut self, event: TimelineEvent) {
        match event {
            TimelineEvent::Initialized { .. } => self.events.clear(),
            TimelineEvent::ElementChanged(id) => {
                if self.events.contains(&TimelineEvent::ElementChanged(id)) {
                    return;
                }
            }
            TimelineEvent::ElementsRestored => self
                .events
                .retain(|pending| !matches!(pending, TimelineEvent::ElementsRestored)),
            TimelineEvent::SelectionChanged(_) => self
                .events
                .retain(|pending| !matches!(pending, TimelineEvent::SelectionChanged(_))),
            TimelineEvent::ZoomChanged(_) => self
                .events
                .retain(|pending| !matches!(pending, TimelineEvent::ZoomChanged(_))),
            TimelineEvent::PlayheadMoved(_) => self
                .events
                .retain(|pending| !matches!(pending, TimelineEvent::PlayheadMoved(_))),
            TimelineEvent::ElementAdded(_) | TimelineEvent::ElementRemoved(_) => {}
        }

        if self.events.len() >= MAX_PENDING_EVENTS {
            tracing::debug!(pending = self.events.len(), "event queue folded");
            self.events.retain(|pending| {
                !matches!(
                    pending,
                    TimelineEvent::ElementAdded(_)
                        | TimelineEvent::ElementRemoved(_)
                        | TimelineEvent::ElementChanged(_)
                        | TimelineEvent::ElementsRestored
                )
            });
            self.events.push(TimelineEvent::ElementsRestored);
        }
        self.events.push(event);
    }

    /// Hands pending notifications to the caller.
    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Verifies bounds, minimum duration and same-layer exclusivity for every
    /// element.
    pub fn check_invariants(&self) -> Result<()> {
        for (index, element) in self.elements.iter().enumerate() {
            self.check_bounds(element.start_time, element.duration)?;
            if let Some(other) = self.elements[index + 1..]
                .iter()
                .find(|other| other.overlaps(element))
            {
                return Err(TimelineError::Overlap {
                    id: other.id,
                    layer: element.layer,
                });
            }
        }
        Ok(())
    }

    fn index_of(&self, id: ElementId) -> Result<usize> {
        self.elements
            .iter()
            .position(|element| element.id == id)
            .ok_or(TimelineError::ElementNotFound(id))
    }

    fn check_bounds(&self, start_time: f64, duration: f64) -> Result<()> {
        if !start_time.is_finite() || !duration.is_finite() {
            return Err(TimelineError::InvalidInput("element span must be finite"));
        }
        if start_time < 0.0 {
            return Err(TimelineError::InvalidInput(
                "element cannot start before the timeline",
            ));
        }
        if duration < MIN_ELEMENT_DURATION - TIME_EPSILON {
            return Err(TimelineError::InvalidInput(
                "element is shorter than the minimum duration",
            ));
        }
        if start_time + duration > self.duration + TIME_EPSILON {
            return Err(TimelineError::InvalidInput(
                "element extends past the end of the timeline",
            ));
        }
        Ok(())
    }

    fn check_span(
        &self,
        element: &TimelineElement,
        layer: u32,
        start_time: f64,
        duration: f64,
    ) -> Result<()> {
        self.check_bounds(start_time, duration)?;
        let collides = self
            .elements_on_layer(layer)
            .filter(|other| other.id != element.id)
            .any(|other| other.overlaps_span(start_time, duration));
        if collides {
            return Err(TimelineError::Overlap {
                id: element.id,
                layer,
            });
        }
        Ok(())
    }
}
