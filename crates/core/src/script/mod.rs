//! Replayable edit scripts.
//!
//! A script names its audio track and a list of commands. Element ids are
//! generated at run time, so commands refer to elements by the order in which
//! the script created them (`0` is the first `add`/`drop`).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    gesture::{GestureInput, HitTarget},
    session::EditorSession,
    AssetDescriptor, ElementId, ElementKind, Result, TimelineError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    /// Auto-place an asset.
    Add {
        kind: ElementKind,
        asset: AssetDescriptor,
        #[serde(default)]
        layer: Option<u32>,
    },
    /// Drop an asset on a specific layer.
    Drop {
        kind: ElementKind,
        asset: AssetDescriptor,
        layer: u32,
    },
    Remove {
        element: usize,
    },
    SetStart {
        element: usize,
        start_time: f64,
    },
    SetDuration {
        element: usize,
        duration: f64,
    },
    MoveToLayer {
        element: usize,
        layer: u32,
    },
    /// A complete pointer gesture: down at `from_x`, one move per entry in
    /// `path`, then release.
    Gesture {
        element: usize,
        target: HitTarget,
        from_x: f64,
        path: Vec<f64>,
    },
    Select {
        element: usize,
    },
    Deselect,
    Undo,
    Redo,
    Zoom {
        zoom: f64,
    },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Seek {
        time: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    pub audio: AssetDescriptor,
    #[serde(default)]
    pub commands: Vec<EditCommand>,
}

impl EditScript {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Drives an [`EditorSession`] from [`EditCommand`]s and tracks the ids of
/// elements the script created.
#[derive(Debug)]
pub struct ScriptRunner {
    session: EditorSession,
    created: Vec<Option<ElementId>>,
}

impl ScriptRunner {
    pub fn new(session: EditorSession) -> Self {
        Self {
            session,
            created: Vec::new(),
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut EditorSession {
        &mut self.session
    }

    pub fn into_session(self) -> EditorSession {
        self.session
    }

    /// Ids in creation order. `None` marks an add that found no room.
    pub fn created(&self) -> &[Option<ElementId>] {
        &self.created
    }

    /// Selects the script's audio and applies every command in order,
    /// stopping at the first failure.
    pub fn run(&mut self, script: &EditScript) -> Result<()> {
        self.session.select_audio(&script.audio)?;
        self.created.clear();
        for (index, command) in script.commands.iter().enumerate() {
            if let Err(err) = self.apply(command) {
                tracing::error!(step = index, ?command, %err, "edit script failed");
                return Err(err);
            }
        }
        tracing::info!(
            commands = script.commands.len(),
            elements = self.session.timeline().elements().len(),
            "edit script replayed"
        );
        Ok(())
    }

    fn element(&self, index: usize) -> Result<ElementId> {
        match self.created.get(index) {
            Some(Some(id)) => Ok(*id),
            Some(None) => Err(TimelineError::msg(format!(
                "element #{index} was never placed"
            ))),
            None => Err(TimelineError::msg(format!(
                "script has not created element #{index}"
            ))),
        }
    }

    pub fn apply(&mut self, command: &EditCommand) -> Result<()> {
        match command {
            EditCommand::Add { kind, asset, layer } => {
                let id = self.session.add_element(*kind, asset.clone(), *layer)?;
                self.created.push(id);
            }
            EditCommand::Drop { kind, asset, layer } => {
                let id = self.session.drop_element(*kind, asset.clone(), *layer)?;
                self.created.push(id);
            }
            EditCommand::Remove { element } => {
                let id = self.element(*element)?;
                self.session.remove_element(id)?;
            }
            EditCommand::SetStart {
                element,
                start_time,
            } => {
                let id = self.element(*element)?;
                self.session.set_element_start(id, *start_time)?;
            }
            EditCommand::SetDuration { element, duration } => {
                let id = self.element(*element)?;
                self.session.set_element_duration(id, *duration)?;
            }
            EditCommand::MoveToLayer { element, layer } => {
                let id = self.element(*element)?;
                self.session.move_element_to_layer(id, *layer)?;
            }
            EditCommand::Gesture {
                element,
                target,
                from_x,
                path,
            } => {
                let id = self.element(*element)?;
                self.session.pointer(GestureInput::PointerDown {
                    element: id,
                    target: *target,
                    x: *from_x,
                })?;
                for &x in path {
                    self.session.pointer(GestureInput::PointerMove { x })?;
                }
                self.session.pointer(GestureInput::PointerUp)?;
            }
            EditCommand::Select { element } => {
                let id = self.element(*element)?;
                self.session.select(id);
            }
            EditCommand::Deselect => self.session.deselect(),
            EditCommand::Undo => {
                self.session.undo()?;
            }
            EditCommand::Redo => {
                self.session.redo()?;
            }
            EditCommand::Zoom { zoom } => {
                self.session.set_zoom(*zoom);
            }
            EditCommand::ZoomIn => {
                self.session.zoom_in();
            }
            EditCommand::ZoomOut => {
                self.session.zoom_out();
            }
            EditCommand::ResetZoom => {
                self.session.reset_zoom();
            }
            EditCommand::Seek { time } => {
                self.session.seek(*time);
            }
        }
        Ok(())
    }
}
