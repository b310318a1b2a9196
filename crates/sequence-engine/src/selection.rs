//! Segment selection state.

use std::collections::HashSet;

use shotlist_sequence_model::{Segment, SegmentId};

/// How a click combines with the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickModifier {
    /// Select only the clicked segment and make it the anchor.
    Plain,
    /// Shift: select the contiguous range from the anchor (or the first
    /// segment when there is no anchor) to the clicked segment, which
    /// becomes the new anchor.
    Range,
    /// Ctrl/Cmd: toggle the clicked segment.
    Toggle,
}

/// Arrow-key navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Selected segment ids plus the anchor used for range selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: HashSet<SegmentId>,
    anchor: Option<SegmentId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click at `index` within `segments`. Out-of-range indices are
    /// ignored.
    pub fn click(&mut self, segments: &[Segment], index: usize, modifier: ClickModifier) {
        let Some(clicked) = segments.get(index) else {
            return;
        };
        match modifier {
            ClickModifier::Plain => {
                self.selected.clear();
                self.selected.insert(clicked.id.clone());
                self.anchor = Some(clicked.id.clone());
            }
            ClickModifier::Range => {
                let from = self
                    .anchor
                    .as_deref()
                    .and_then(|a| segments.iter().position(|s| s.id == a))
                    .unwrap_or(0);
                let (lo, hi) = if from <= index { (from, index) } else { (index, from) };
                self.selected = segments[lo..=hi].iter().map(|s| s.id.clone()).collect();
                self.anchor = Some(clicked.id.clone());
            }
            ClickModifier::Toggle => {
                self.toggle(&clicked.id);
                self.anchor = Some(clicked.id.clone());
            }
        }
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Ctrl+A.
    pub fn select_all(&mut self, segments: &[Segment]) {
        self.selected = segments.iter().map(|s| s.id.clone()).collect();
        if self.anchor.is_none() {
            self.anchor = segments.first().map(|s| s.id.clone());
        }
    }

    /// Escape.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Move a single selection one step from the anchor. Without an anchor
    /// the step is taken from the first segment.
    pub fn navigate(&mut self, segments: &[Segment], direction: Direction) {
        if segments.is_empty() {
            return;
        }
        let last = segments.len() - 1;
        let current = self
            .anchor
            .as_deref()
            .and_then(|a| segments.iter().position(|s| s.id == a))
            .unwrap_or(0);
        let next = match direction {
            Direction::Next => (current + 1).min(last),
            Direction::Previous => current.saturating_sub(1),
        };
        self.click(segments, next, ClickModifier::Plain);
    }

    /// Drop ids that are no longer in `segments`.
    pub fn retain_existing(&mut self, segments: &[Segment]) {
        let live: HashSet<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        self.selected.retain(|id| live.contains(id.as_str()));
        if let Some(anchor) = &self.anchor {
            if !live.contains(anchor.as_str()) {
                self.anchor = None;
            }
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in sequence order.
    pub fn ordered_ids(&self, segments: &[Segment]) -> Vec<SegmentId> {
        segments
            .iter()
            .filter(|s| self.selected.contains(&s.id))
            .map(|s| s.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(n: usize) -> Vec<Segment> {
        (0..n).map(|i| Segment::new(format!("s{i}"), 1.0)).collect()
    }

    #[test]
    fn plain_click_replaces_selection() {
        let segs = segments(3);
        let mut sel = SelectionState::new();
        sel.click(&segs, 0, ClickModifier::Plain);
        sel.click(&segs, 2, ClickModifier::Plain);
        assert_eq!(sel.ordered_ids(&segs), vec!["s2"]);
        assert_eq!(sel.anchor(), Some("s2"));
    }

    #[test]
    fn range_click_from_anchor() {
        let segs = segments(5);
        let mut sel = SelectionState::new();
        sel.click(&segs, 3, ClickModifier::Plain);
        sel.click(&segs, 1, ClickModifier::Range);
        assert_eq!(sel.ordered_ids(&segs), vec!["s1", "s2", "s3"]);
        assert_eq!(sel.anchor(), Some("s1"));
    }

    #[test]
    fn chained_range_clicks_extend_from_last_click() {
        let segs = segments(6);
        let mut sel = SelectionState::new();
        sel.click(&segs, 1, ClickModifier::Plain);
        sel.click(&segs, 3, ClickModifier::Range);
        assert_eq!(sel.anchor(), Some("s3"));
        sel.click(&segs, 5, ClickModifier::Range);
        assert_eq!(sel.ordered_ids(&segs), vec!["s3", "s4", "s5"]);
        assert_eq!(sel.anchor(), Some("s5"));
    }

    #[test]
    fn range_click_without_anchor_starts_at_zero() {
        let segs = segments(4);
        let mut sel = SelectionState::new();
        sel.click(&segs, 2, ClickModifier::Range);
        assert_eq!(sel.ordered_ids(&segs), vec!["s0", "s1", "s2"]);
        assert_eq!(sel.anchor(), Some("s2"));
    }

    #[test]
    fn toggle_click_adds_and_removes() {
        let segs = segments(3);
        let mut sel = SelectionState::new();
        sel.click(&segs, 0, ClickModifier::Plain);
        sel.click(&segs, 2, ClickModifier::Toggle);
        assert_eq!(sel.len(), 2);
        sel.click(&segs, 0, ClickModifier::Toggle);
        assert_eq!(sel.ordered_ids(&segs), vec!["s2"]);
    }

    #[test]
    fn out_of_range_click_is_ignored() {
        let segs = segments(2);
        let mut sel = SelectionState::new();
        sel.click(&segs, 7, ClickModifier::Plain);
        assert!(sel.is_empty());
    }

    #[test]
    fn select_all_and_clear() {
        let segs = segments(3);
        let mut sel = SelectionState::new();
        sel.select_all(&segs);
        assert_eq!(sel.len(), 3);
        sel.clear();
        assert!(sel.is_empty());
        assert!(sel.anchor().is_none());
    }

    #[test]
    fn arrow_navigation_moves_single_selection() {
        let segs = segments(3);
        let mut sel = SelectionState::new();
        sel.click(&segs, 0, ClickModifier::Plain);
        sel.navigate(&segs, Direction::Next);
        assert_eq!(sel.ordered_ids(&segs), vec!["s1"]);
        sel.navigate(&segs, Direction::Next);
        sel.navigate(&segs, Direction::Next);
        assert_eq!(sel.ordered_ids(&segs), vec!["s2"]);
        assert_eq!(sel.anchor(), Some("s2"));
        sel.navigate(&segs, Direction::Previous);
        assert_eq!(sel.ordered_ids(&segs), vec!["s1"]);
    }

    #[test]
    fn navigation_without_anchor_steps_from_first() {
        let segs = segments(3);
        let mut sel = SelectionState::new();
        sel.navigate(&segs, Direction::Next);
        assert_eq!(sel.ordered_ids(&segs), vec!["s1"]);

        sel.clear();
        sel.navigate(&segs, Direction::Previous);
        assert_eq!(sel.ordered_ids(&segs), vec!["s0"]);
    }

    #[test]
    fn retain_existing_prunes_removed_ids() {
        let segs = segments(3);
        let mut sel = SelectionState::new();
        sel.select_all(&segs);
        let remaining = &segs[1..];
        sel.retain_existing(remaining);
        assert_eq!(sel.ordered_ids(&segs), vec!["s1", "s2"]);
        assert!(sel.anchor().is_none());
    }
}
