//! Linear, snapshot-based undo/redo.
//!
//! Every committed mutation stores a full copy of the element collection.
//! Snapshots are shared read-only (`Arc<[_]>`) and restoring clones them
//! back out, so editing the live timeline can never reach a stored entry.

use std::sync::Arc;

use crate::TimelineElement;

/// Immutable copy of the element collection at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Arc<[TimelineElement]>);

impl Snapshot {
    pub fn capture(elements: &[TimelineElement]) -> Self {
        Self(elements.iter().cloned().collect())
    }

    pub fn elements(&self) -> &[TimelineElement] {
        &self.0
    }

    /// Fresh, independently owned copy for the live model.
    pub fn restore(&self) -> Vec<TimelineElement> {
        self.0.to_vec()
    }
}

#[derive(Debug)]
pub struct HistoryManager {
    snapshots: Vec<Snapshot>,
    index: usize,
    max_snapshots: usize,
}

impl HistoryManager {
    /// Starts with a single empty snapshot.
    pub fn new(max_snapshots: usize) -> Self {
        Self {
            snapshots: vec![Snapshot::capture(&[])],
            index: 0,
            max_snapshots: max_snapshots.max(1),
        }
    }

    /// Drops all history and records `initial` as the base state.
    pub fn reset(&mut self, initial: &[TimelineElement]) {
        self.snapshots.clear();
        self.snapshots.push(Snapshot::capture(initial));
        self.index = 0;
        tracing::debug!("history cleared");
    }

    /// Records the current collection, discarding any redo branch.
    pub fn commit(&mut self, elements: &[TimelineElement]) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(Snapshot::capture(elements));
        self.index = self.snapshots.len() - 1;

        if self.snapshots.len() > self.max_snapshots {
            let overflow = self.snapshots.len() - self.max_snapshots;
            self.snapshots.drain(0..overflow);
            self.index -= overflow;
        }

        tracing::debug!(
            index = self.index,
            depth = self.snapshots.len(),
            elements = elements.len(),
            "history committed"
        );
    }

    /// Steps back one snapshot and returns it for restoring. `None` at the
    /// oldest snapshot.
    pub fn undo(&mut self) -> Option<Vec<TimelineElement>> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        tracing::debug!(index = self.index, "undo");
        Some(self.snapshots[self.index].restore())
    }

    /// Steps forward one snapshot. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<Vec<TimelineElement>> {
        if self.index + 1 >= self.snapshots.len() {
            return None;
        }
        self.index += 1;
        tracing::debug!(index = self.index, "redo");
        Some(self.snapshots[self.index].restore())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetDescriptor, ElementKind, Placement};

    fn element(start_time: f64) -> TimelineElement {
        TimelineElement::new(
            ElementKind::Shader,
            AssetDescriptor::named("plasma.glsl"),
            Placement {
                layer: 1,
                start_time,
                duration: 5.0,
            },
        )
    }

    #[test]
    fn undo_restores_previous_collection() {
        let mut history = HistoryManager::new(10);
        let first = vec![element(0.0)];
        let mut second = first.clone();
        second.push(element(5.0));

        history.commit(&first);
        history.commit(&second);

        assert_eq!(history.undo(), Some(first.clone()));
        assert_eq!(history.undo(), Some(Vec::new()));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(first));
    }

    #[test]
    fn redo_is_noop_at_end() {
        let mut history = HistoryManager::new(10);
        history.commit(&[element(0.0)]);

        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn commit_discards_redo_branch() {
        let mut history = HistoryManager::new(10);
        history.commit(&[element(0.0)]);
        history.commit(&[element(1.0)]);
        history.undo();

        history.commit(&[element(2.0)]);

        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.current().unwrap().elements()[0].start_time, 2.0);
    }

    #[test]
    fn snapshots_are_independent_of_live_state() {
        let mut history = HistoryManager::new(10);
        let mut live = vec![element(0.0)];
        history.commit(&live);

        live[0].start_time = 42.0;
        let mut restored = history.current().unwrap().restore();
        assert_eq!(restored[0].start_time, 0.0);

        restored[0].start_time = 7.0;
        assert_eq!(history.current().unwrap().elements()[0].start_time, 0.0);
    }

    #[test]
    fn window_drops_oldest_snapshots() {
        let mut history = HistoryManager::new(3);
        for i in 0..5 {
            history.commit(&[element(i as f64)]);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        history.undo();
        history.undo();
        assert!(!history.can_undo());
        assert_eq!(history.current().unwrap().elements()[0].start_time, 2.0);
    }

    #[test]
    fn reset_keeps_only_base_state() {
        let mut history = HistoryManager::new(10);
        history.commit(&[element(0.0)]);
        history.reset(&[]);

        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
