//! Ordered segment collection.
//!
//! Every mutation builds a new snapshot, renumbers `order` and swaps it in
//! only when the whole operation succeeded. Failed operations leave the
//! current snapshot untouched. Removed segments go to a bounded undo buffer
//! and come back one at a time at the tail.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use shotlist_common::error::ShotlistError;
use shotlist_sequence_model::{normalize_orders, Segment, SegmentId};

use crate::patch::SegmentPatch;

/// Default number of removed segments kept for restore.
pub const DEFAULT_UNDO_CAPACITY: usize = 50;

/// Store operation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Index {index} out of range for {len} segments")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown segment id: {id}")]
    UnknownSegment { id: SegmentId },

    #[error("Duplicate segment id: {id}")]
    DuplicateSegment { id: SegmentId },
}

impl From<StoreError> for ShotlistError {
    fn from(err: StoreError) -> Self {
        ShotlistError::store(err.to_string())
    }
}

/// Where to place an inserted segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAt {
    /// Before the element currently at this index. `len` appends.
    Index(usize),
    End,
}

/// Ordered segments plus the undo buffer for removals.
#[derive(Debug, Clone)]
pub struct SegmentStore {
    snapshot: Arc<Vec<Segment>>,
    removed: VecDeque<Segment>,
    undo_capacity: usize,
    revision: u64,
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SegmentStore {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self::with_undo_capacity(segments, DEFAULT_UNDO_CAPACITY)
    }

    pub fn with_undo_capacity(mut segments: Vec<Segment>, undo_capacity: usize) -> Self {
        normalize_orders(&mut segments);
        Self {
            snapshot: Arc::new(segments),
            removed: VecDeque::new(),
            undo_capacity: undo_capacity.max(1),
            revision: 0,
        }
    }

    /// Current immutable snapshot. Cheap to clone and safe to hand to a
    /// render job.
    pub fn snapshot(&self) -> Arc<Vec<Segment>> {
        Arc::clone(&self.snapshot)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Segment> {
        self.snapshot.iter().find(|s| s.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.snapshot.iter().position(|s| s.id == id)
    }

    /// Increments on every committed mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of removed segments that can still be restored.
    pub fn undo_len(&self) -> usize {
        self.removed.len()
    }

    /// Move the segment at `from` so it ends up at index `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), StoreError> {
        let len = self.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        self.commit(|list| {
            let item = list.remove(from);
            list.insert(to, item);
            Ok(())
        })
    }

    /// Swap with a neighbour. Returns `false` when already at the edge.
    pub fn move_by(&mut self, index: usize, delta: isize) -> Result<bool, StoreError> {
        let len = self.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        let target = index as isize + delta;
        if delta == 0 || target < 0 || target as usize >= len {
            return Ok(false);
        }
        self.reorder(index, target as usize)?;
        Ok(true)
    }

    pub fn patch(&mut self, id: &str, patch: &SegmentPatch) -> Result<(), StoreError> {
        let index = self.require(id)?;
        self.commit(|list| {
            patch.apply(&mut list[index]);
            Ok(())
        })
    }

    /// Apply the same patch to every listed segment. Any unknown id aborts
    /// the whole operation.
    pub fn bulk_patch(&mut self, ids: &[SegmentId], patch: &SegmentPatch) -> Result<usize, StoreError> {
        let indices = ids
            .iter()
            .map(|id| self.require(id))
            .collect::<Result<Vec<_>, _>>()?;
        if indices.is_empty() {
            return Ok(0);
        }
        self.commit(|list| {
            for &index in &indices {
                patch.apply(&mut list[index]);
            }
            Ok(())
        })?;
        Ok(indices.len())
    }

    /// Remove the listed segments, pushing them onto the undo buffer in
    /// sequence order.
    pub fn remove(&mut self, ids: &[SegmentId]) -> Result<usize, StoreError> {
        for id in ids {
            self.require(id)?;
        }
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        if doomed.is_empty() {
            return Ok(0);
        }

        let mut taken = Vec::new();
        self.commit(|list| {
            let (gone, kept): (Vec<_>, Vec<_>) = list
                .drain(..)
                .partition(|s| doomed.contains(s.id.as_str()));
            *list = kept;
            taken = gone;
            Ok(())
        })?;

        let count = taken.len();
        for segment in taken {
            if self.removed.len() == self.undo_capacity {
                self.removed.pop_front();
            }
            self.removed.push_back(segment);
        }
        tracing::debug!(count, undo = self.removed.len(), "Removed segments");
        Ok(count)
    }

    /// Restore the most recently removed segment at the tail. Returns its id,
    /// or `None` when there is nothing to restore.
    pub fn restore_last(&mut self) -> Option<SegmentId> {
        let segment = self.removed.pop_back()?;
        let id = segment.id.clone();
        let result = self.commit(|list| {
            list.push(segment);
            Ok(())
        });
        match result {
            Ok(()) => Some(id),
            Err(_) => None,
        }
    }

    pub fn insert(&mut self, segment: Segment, at: InsertAt) -> Result<(), StoreError> {
        if self.get(&segment.id).is_some() {
            return Err(StoreError::DuplicateSegment { id: segment.id });
        }
        let len = self.len();
        let index = match at {
            InsertAt::End => len,
            InsertAt::Index(index) if index <= len => index,
            InsertAt::Index(index) => return Err(StoreError::IndexOutOfRange { index, len }),
        };
        self.commit(|list| {
            list.insert(index, segment);
            Ok(())
        })
    }

    /// Replace the whole sequence, e.g. after a fresh fetch. Clears the undo
    /// buffer.
    pub fn replace_all(&mut self, segments: Vec<Segment>) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for segment in &segments {
            if !seen.insert(segment.id.as_str()) {
                return Err(StoreError::DuplicateSegment {
                    id: segment.id.clone(),
                });
            }
        }
        self.removed.clear();
        self.commit(|list| {
            *list = segments;
            Ok(())
        })
    }

    fn require(&self, id: &str) -> Result<usize, StoreError> {
        self.index_of(id).ok_or_else(|| StoreError::UnknownSegment { id: id.to_string() })
    }

    fn commit(
        &mut self,
        change: impl FnOnce(&mut Vec<Segment>) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut next = self.snapshot.as_ref().clone();
        change(&mut next)?;
        normalize_orders(&mut next);
        self.snapshot = Arc::new(next);
        self.revision += 1;
        Ok(())
    }
}
