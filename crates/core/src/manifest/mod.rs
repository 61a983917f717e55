//! Render-manifest export: the only payload handed to the render service.
//!
//! Field names and path conventions are shared with the renderer and must
//! not change.

use serde::{Deserialize, Serialize};

use crate::{ElementKind, RenderConfig, Result, Timeline, TimelineElement, TimelineError};

pub const MANIFEST_VERSION: &str = "1.0";

const SHADER_DIR: &str = "Shaders";
const TRANSITION_DIR: &str = "Transitions";
const VIDEO_DIR: &str = "Input_Video";
const AUDIO_DIR: &str = "Input_Audio";
const TRANSITION_EXTENSION: &str = ".glsl";

/// Chroma-key settings attached to videos composited over the shader layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenScreen {
    pub enabled: bool,
    pub color: [u8; 3],
    pub threshold: f64,
    pub smoothness: f64,
}

impl Default for GreenScreen {
    fn default() -> Self {
        Self {
            enabled: true,
            color: [0, 255, 0],
            threshold: 0.4,
            smoothness: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub layer: u32,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greenscreen: Option<GreenScreen>,
}

impl From<&TimelineElement> for ExportedElement {
    fn from(element: &TimelineElement) -> Self {
        let greenscreen = (element.kind == ElementKind::Video && element.layer == 1)
            .then(GreenScreen::default);
        Self {
            id: element.id.to_string(),
            kind: element.kind,
            name: element.name.clone(),
            start_time: element.start_time,
            end_time: element.end_time(),
            duration: element.duration,
            layer: element.layer,
            path: element_path(element.kind, &element.name),
            greenscreen,
        }
    }
}

/// Location of an element's source relative to the render working directory.
pub fn element_path(kind: ElementKind, name: &str) -> String {
    match kind {
        ElementKind::Shader => format!("{SHADER_DIR}/{name}"),
        ElementKind::Transition => {
            if name.ends_with(TRANSITION_EXTENSION) {
                format!("{TRANSITION_DIR}/{name}")
            } else {
                format!("{TRANSITION_DIR}/{name}{TRANSITION_EXTENSION}")
            }
        }
        ElementKind::Video => format!("{VIDEO_DIR}/{name}"),
    }
}

/// `{ duration, elements }` view of a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    pub duration: f64,
    pub elements: Vec<ExportedElement>,
}

impl From<&Timeline> for TimelineData {
    fn from(timeline: &Timeline) -> Self {
        Self {
            duration: timeline.duration(),
            elements: timeline.elements().iter().map(ExportedElement::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub path: String,
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Full job description submitted for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderManifest {
    pub version: String,
    pub project_name: String,
    pub audio: AudioTrack,
    pub resolution: Resolution,
    pub frame_rate: u32,
    pub timeline: TimelineData,
}

impl RenderManifest {
    /// Builds the manifest for `timeline`. Needs a selected audio track and
    /// at least one element.
    pub fn build(timeline: &Timeline, render: &RenderConfig) -> Result<Self> {
        let audio_name = timeline.audio_name();
        if audio_name.is_empty() {
            return Err(TimelineError::NoAudio);
        }
        if timeline.is_empty() {
            return Err(TimelineError::EmptyTimeline);
        }

        Ok(Self {
            version: MANIFEST_VERSION.to_string(),
            project_name: project_name(audio_name),
            audio: AudioTrack {
                path: format!("{AUDIO_DIR}/{audio_name}"),
                duration: timeline.duration(),
            },
            resolution: Resolution {
                width: render.width,
                height: render.height,
            },
            frame_rate: render.frame_rate,
            timeline: TimelineData::from(timeline),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Audio file name without its extension.
fn project_name(audio_name: &str) -> String {
    match audio_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => audio_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ZoomConfig, AssetDescriptor, Placement};

    fn element(kind: ElementKind, name: &str, layer: u32, start_time: f64) -> TimelineElement {
        TimelineElement::new(
            kind,
            AssetDescriptor::named(name),
            Placement {
                layer,
                start_time,
                duration: 2.0,
            },
        )
    }

    #[test]
    fn paths_follow_kind_conventions() {
        assert_eq!(element_path(ElementKind::Shader, "plasma.glsl"), "Shaders/plasma.glsl");
        assert_eq!(element_path(ElementKind::Transition, "fade"), "Transitions/fade.glsl");
        assert_eq!(
            element_path(ElementKind::Transition, "wipe.glsl"),
            "Transitions/wipe.glsl"
        );
        assert_eq!(element_path(ElementKind::Video, "dance.mp4"), "Input_Video/dance.mp4");
    }

    #[test]
    fn exported_keys_match_renderer_contract() {
        let exported = ExportedElement::from(&element(ElementKind::Shader, "plasma.glsl", 1, 3.0));
        let value = serde_json::to_value(&exported).unwrap();

        assert_eq!(value["type"], "shader");
        assert_eq!(value["startTime"], 3.0);
        assert_eq!(value["endTime"], 5.0);
        assert_eq!(value["duration"], 2.0);
        assert_eq!(value["layer"], 1);
        assert_eq!(value["path"], "Shaders/plasma.glsl");
        assert!(value.get("greenscreen").is_none());
    }

    #[test]
    fn only_videos_on_layer_one_get_greenscreen() {
        let keyed = ExportedElement::from(&element(ElementKind::Video, "dance.mp4", 1, 0.0));
        let plain = ExportedElement::from(&element(ElementKind::Video, "dance.mp4", 0, 0.0));

        let value = serde_json::to_value(&keyed).unwrap();
        assert_eq!(value["greenscreen"]["enabled"], true);
        assert_eq!(value["greenscreen"]["color"], serde_json::json!([0, 255, 0]));
        assert_eq!(value["greenscreen"]["threshold"], 0.4);
        assert_eq!(value["greenscreen"]["smoothness"], 0.1);
        assert!(plain.greenscreen.is_none());
    }

    #[test]
    fn manifest_requires_audio_and_elements() {
        let mut timeline = Timeline::new(ZoomConfig::default());
        assert!(matches!(
            RenderManifest::build(&timeline, &RenderConfig::default()),
            Err(TimelineError::NoAudio)
        ));

        timeline.initialize(60.0, "Healing Pt. 3.mp3").unwrap();
        assert!(matches!(
            RenderManifest::build(&timeline, &RenderConfig::default()),
            Err(TimelineError::EmptyTimeline)
        ));

        timeline
            .insert_element(element(ElementKind::Shader, "plasma.glsl", 1, 0.0))
            .unwrap();
        let manifest = RenderManifest::build(&timeline, &RenderConfig::default()).unwrap();

        assert_eq!(manifest.version, "1.0");
        assert_eq!(manifest.project_name, "Healing Pt. 3");
        assert_eq!(manifest.audio.path, "Input_Audio/Healing Pt. 3.mp3");
        assert_eq!(manifest.frame_rate, 30);
        assert_eq!(manifest.timeline.elements.len(), 1);
        assert!(manifest.to_json().unwrap().contains("\"project_name\""));
    }
}
