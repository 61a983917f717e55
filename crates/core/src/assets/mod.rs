use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ElementKind, Result, TimelineError};

/// Category of an asset offered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Audio,
    Video,
    Shader,
    Transition,
}

impl From<ElementKind> for AssetKind {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Video => Self::Video,
            ElementKind::Shader => Self::Shader,
            ElementKind::Transition => Self::Transition,
        }
    }
}

/// Descriptor for an external media asset. The timeline only carries it
/// around; it never opens the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub name: String,
    /// Source length in seconds, when known.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub source_size: Option<u64>,
    #[serde(default)]
    pub path: String,
}

impl AssetDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration: None,
            source_size: None,
            path: String::new(),
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}

/// Registry for the assets an editing session can reference.
#[derive(Debug, Default)]
pub struct AssetCatalog {
    assets: HashMap<(AssetKind, String), AssetDescriptor>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: AssetKind, asset: AssetDescriptor) {
        self.assets.insert((kind, asset.name.clone()), asset);
    }

    pub fn lookup(&self, kind: AssetKind, name: &str) -> Option<&AssetDescriptor> {
        self.assets.get(&(kind, name.to_string()))
    }

    pub fn resolve(&self, kind: AssetKind, name: &str) -> Result<&AssetDescriptor> {
        self.lookup(kind, name).ok_or_else(|| {
            TimelineError::msg(format!("unknown {kind:?} asset `{name}` referenced"))
        })
    }

    /// All assets of one kind, sorted by name.
    pub fn list(&self, kind: AssetKind) -> Vec<&AssetDescriptor> {
        let mut assets: Vec<_> = self
            .assets
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, asset)| asset)
            .collect();
        assets.sort_by(|a, b| a.name.cmp(&b.name));
        assets
    }
}
