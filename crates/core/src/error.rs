use std::fmt;

use crate::timeline::ElementId;

/// Result alias that carries the custom [`TimelineError`] type.
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    /// Free-form message, mostly used by the asset catalog and the CLI.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Config, manifest or edit script (de)serialisation failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// The target layer does not accept the element kind.
    #[error("{0}")]
    LayerRejected(LayerRejection),
    #[error("no element with id `{0}` on the timeline")]
    ElementNotFound(ElementId),
    /// Transitions keep their fixed duration.
    #[error("element `{0}` cannot be resized")]
    NotResizable(ElementId),
    /// Only one drag or resize may be open at a time.
    #[error("a gesture is already in progress")]
    GestureInProgress,
    #[error("no gesture is in progress")]
    NoActiveGesture,
    #[error("element `{id}` would overlap another element on layer {layer}")]
    Overlap { id: ElementId, layer: u32 },
    #[error("no audio track has been selected")]
    NoAudio,
    #[error("timeline is empty")]
    EmptyTimeline,
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

impl TimelineError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<LayerRejection> for TimelineError {
    fn from(value: LayerRejection) -> Self {
        Self::LayerRejected(value)
    }
}

/// Reason a drop target refused an element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerRejection {
    /// Layer 0 only takes videos.
    ReservedForVideo,
    /// Layer 1 only takes shaders and transitions.
    ReservedForShaderOrTransition,
}

impl LayerRejection {
    /// Stable machine-readable code handed to the caller.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReservedForVideo => "layer-reserved-for-video",
            Self::ReservedForShaderOrTransition => "layer-reserved-for-shader-or-transition",
        }
    }
}

impl fmt::Display for LayerRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
