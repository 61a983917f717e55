use crate::{
    gesture::{GestureEffect, GestureInput, GestureState},
    history::HistoryManager,
    manifest::{RenderManifest, TimelineData},
    placement,
    ruler::{Ruler, RulerGenerator, Viewport},
    AssetDescriptor, EditorConfig, ElementId, ElementKind, Result, Timeline, TimelineElement,
    TimelineError, TimelineEvent,
};

/// One editing session: the timeline, its history and the gesture slot.
///
/// Every committed mutation is checkpointed in history, in the order the
/// calls arrive. Committing mutations are refused while a drag or resize is
/// open so that the gesture's own commit stays a single history step.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    timeline: Timeline,
    history: HistoryManager,
    gesture: GestureState,
    ruler: RulerGenerator,
}

impl EditorSession {
    /// Validates `config` and starts an empty session.
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;
        let timeline = Timeline::new(config.zoom.clone());
        let history = HistoryManager::new(config.history.max_snapshots);
        let ruler = RulerGenerator::new(config.ruler.clone(), config.zoom.pixels_per_second);
        Ok(Self {
            config,
            timeline,
            history,
            gesture: GestureState::Idle,
            ruler,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// Locks the session to an audio track. Any previous elements, history,
    /// playhead and open gesture are dropped.
    pub fn select_audio(&mut self, audio: &AssetDescriptor) -> Result<()> {
        let duration = audio.duration.ok_or(TimelineError::InvalidInput(
            "audio asset has no known duration",
        ))?;
        self.timeline.initialize(duration, audio.name.clone())?;
        self.history.reset(self.timeline.elements());
        self.gesture = GestureState::Idle;
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.gesture.is_idle() {
            Ok(())
        } else {
            Err(TimelineError::GestureInProgress)
        }
    }

    fn commit(&mut self) {
        self.history.commit(self.timeline.elements());
    }

    /// Auto-places a new element. `Ok(None)` when no layer has room.
    pub fn add_element(
        &mut self,
        kind: ElementKind,
        asset: AssetDescriptor,
        layer_hint: Option<u32>,
    ) -> Result<Option<ElementId>> {
        self.ensure_idle()?;
        let requested = kind.default_duration(&asset);
        let Some(placement) = self.timeline.placement().place(kind, requested, layer_hint) else {
            tracing::debug!(?kind, name = %asset.name, "no room for element");
            return Ok(None);
        };

        let element = TimelineElement::new(kind, asset, placement);
        let id = element.id;
        self.timeline.insert_element(element)?;
        self.commit();
        Ok(Some(id))
    }

    /// Drop onto a specific layer. Reserved layers refuse the wrong kind
    /// before anything changes; otherwise the layer is a placement hint.
    pub fn drop_element(
        &mut self,
        kind: ElementKind,
        asset: AssetDescriptor,
        target_layer: u32,
    ) -> Result<Option<ElementId>> {
        if let Err(rejection) = placement::check_layer(kind, target_layer) {
            tracing::warn!(?kind, layer = target_layer, code = rejection.code(), "drop rejected");
            return Err(rejection.into());
        }
        self.add_element(kind, asset, Some(target_layer))
    }

    pub fn remove_element(&mut self, id: ElementId) -> Result<TimelineElement> {
        self.ensure_idle()?;
        let removed = self.timeline.remove_element(id)?;
        self.commit();
        Ok(removed)
    }

    pub fn move_element_to_layer(&mut self, id: ElementId, layer: u32) -> Result<()> {
        self.ensure_idle()?;
        self.timeline.move_element_to_layer(id, layer)?;
        self.commit();
        Ok(())
    }

    pub fn set_element_start(&mut self, id: ElementId, start_time: f64) -> Result<f64> {
        self.ensure_idle()?;
        let applied = self.timeline.set_element_start(id, start_time)?;
        self.commit();
        Ok(applied)
    }

    pub fn set_element_duration(&mut self, id: ElementId, duration: f64) -> Result<f64> {
        self.ensure_idle()?;
        let applied = self.timeline.set_element_duration(id, duration)?;
        self.commit();
        Ok(applied)
    }

    /// Feeds pointer input through the gesture state machine and applies
    /// what it decides. Releasing the pointer commits history.
    pub fn pointer(&mut self, input: GestureInput) -> Result<Option<GestureEffect>> {
        let (next, effect) = self.gesture.step(input, &self.timeline)?;

        match effect {
            Some(GestureEffect::Started { id }) => {
                self.timeline.select(id);
            }
            Some(GestureEffect::Moved { id, start_time }) => {
                let duration = self
                    .timeline
                    .element(id)
                    .map(|element| element.duration)
                    .ok_or(TimelineError::ElementNotFound(id))?;
                self.timeline.update_span(id, start_time, duration)?;
            }
            Some(GestureEffect::Resized {
                id,
                start_time,
                duration,
            }) => {
                self.timeline.update_span(id, start_time, duration)?;
            }
            Some(GestureEffect::Committed { id }) => {
                tracing::debug!(element = %id, "gesture committed");
                self.gesture = next;
                self.commit();
                return Ok(effect);
            }
            None => {}
        }

        self.gesture = next;
        Ok(effect)
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_idle()?;
        match self.history.undo() {
            Some(elements) => {
                self.timeline.replace_elements(elements);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_idle()?;
        match self.history.redo() {
            Some(elements) => {
                self.timeline.replace_elements(elements);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn select(&mut self, id: ElementId) -> bool {
        self.timeline.select(id)
    }

    pub fn deselect(&mut self) {
        self.timeline.deselect();
    }

    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.timeline.set_zoom(zoom)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.timeline.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.timeline.zoom_out()
    }

    pub fn reset_zoom(&mut self) -> f64 {
        self.timeline.reset_zoom()
    }

    pub fn seek(&mut self, time: f64) -> f64 {
        self.timeline.set_playhead(time)
    }

    /// Preview flags are part of the snapshot, so a toggle is its own
    /// history step.
    pub fn set_preview_enabled(&mut self, id: ElementId, enabled: bool) -> Result<()> {
        self.ensure_idle()?;
        if self.timeline.set_preview_enabled(id, enabled)? {
            self.commit();
        }
        Ok(())
    }

    /// Tick marks for the current duration and zoom.
    pub fn ruler(&self, viewport: Option<Viewport>) -> Ruler {
        self.ruler
            .generate(self.timeline.duration(), self.timeline.zoom(), viewport)
    }

    pub fn timeline_data(&self) -> TimelineData {
        TimelineData::from(&self.timeline)
    }

    /// Builds the render job. All green-screen previews are switched back on
    /// first so every video takes part in the render.
    pub fn render_manifest(&mut self) -> Result<RenderManifest> {
        self.ensure_idle()?;
        if self.timeline.enable_all_previews() {
            self.commit();
        }
        let manifest = RenderManifest::build(&self.timeline, &self.config.render)?;
        tracing::info!(
            project = %manifest.project_name,
            elements = manifest.timeline.elements.len(),
            "render manifest built"
        );
        Ok(manifest)
    }

    pub fn drain_events(&mut self) -> Vec<TimelineEvent> {
        self.timeline.drain_events()
    }
}
