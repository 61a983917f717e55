//! Core library for the shader timeline editor.
//!
//! The crate holds the editing engine behind the timeline UI: the element
//! model, automatic placement, drag and resize gestures, the zoom-adaptive
//! ruler, snapshot undo/redo and the render-manifest export. Nothing here
//! paints, decodes media or talks to the renderer; callers feed in commands
//! and pointer input and read back state.

pub mod assets;
pub mod config;
pub mod error;
pub mod gesture;
pub mod history;
pub mod manifest;
pub mod placement;
pub mod ruler;
pub mod script;
pub mod session;
pub mod timeline;

pub use assets::{AssetCatalog, AssetDescriptor, AssetKind};
pub use config::{EditorConfig, HistoryConfig, RenderConfig, RulerConfig, ZoomConfig};
pub use error::{LayerRejection, Result, TimelineError};
pub use gesture::{GestureEffect, GestureInput, GestureState, HitTarget, ResizeEdge};
pub use history::HistoryManager;
pub use manifest::{RenderManifest, TimelineData};
pub use placement::PlacementEngine;
pub use ruler::{Ruler, RulerGenerator, TickTier, Viewport};
pub use script::{EditCommand, EditScript, ScriptRunner};
pub use session::EditorSession;
pub use timeline::{
    ElementId, ElementKind, Placement, Timeline, TimelineElement, TimelineEvent,
    MIN_ELEMENT_DURATION,
};
