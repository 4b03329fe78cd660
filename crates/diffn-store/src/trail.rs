// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::{
    domain::IntervalDomain,
    index::{SnapshotIndex, VarIndex},
};
use std::rc::Rc;

/// A compact record of a single store mutation, holding what is needed to
/// undo it during backtracking.
///
/// Each entry stores the value *and* the stamp the slot had before its first
/// write at the current level. Later writes at the same level are not
/// recorded again: restoring the first one is enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailEntry<T> {
    /// A variable's domain was narrowed.
    Domain {
        var: VarIndex,
        old_domain: IntervalDomain<T>,
        old_stamp: usize,
    },
    /// A versioned snapshot slot was overwritten.
    Snapshot {
        slot: SnapshotIndex,
        old_value: Rc<[usize]>,
        old_stamp: usize,
    },
}

impl<T> std::fmt::Display for TrailEntry<T>
where
    T: num_traits::PrimInt + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Domain {
                var,
                old_domain,
                old_stamp,
            } => write!(
                f,
                "TrailEntry(var: {}, old_domain: {}, old_stamp: {})",
                var.get(),
                old_domain,
                old_stamp
            ),
            Self::Snapshot {
                slot,
                old_value,
                old_stamp,
            } => write!(
                f,
                "TrailEntry(slot: {}, old_len: {}, old_stamp: {})",
                slot.get(),
                old_value.len(),
                old_stamp
            ),
        }
    }
}

/// A frame marker describing where a decision level begins on the trail.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameEntry {
    entry_start_index: usize,
}

impl FrameEntry {
    #[inline(always)]
    pub fn new(entry_start_index: usize) -> Self {
        Self { entry_start_index }
    }

    /// Returns the entry start index for this frame.
    #[inline]
    pub fn entry_start_index(&self) -> usize {
        self.entry_start_index
    }
}

/// A linear undo log with frame markers, one frame per decision level.
///
/// Typical usage:
/// 1. `push_frame()` when a new decision level is opened,
/// 2. `record(...)` before the first write to a slot at that level,
/// 3. `backtrack(undo)` to replay the frame's entries in reverse.
///
/// Writes made while no frame is open belong to the root level; they can
/// never be undone and are therefore not recorded.
#[derive(Debug, Clone)]
pub struct Trail<T> {
    /// The linear history of all recorded changes.
    entries: Vec<TrailEntry<T>>,
    /// `frames[i]` marks where level `i + 1` began in `entries`.
    frames: Vec<FrameEntry>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Trail<T> {
    /// Creates a new, empty `Trail`.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Returns the number of recorded entries.
    #[inline]
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    /// Returns the current decision level (number of open frames).
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Opens a new decision level.
    #[inline]
    pub fn push_frame(&mut self) {
        self.frames.push(FrameEntry::new(self.entries.len()));
    }

    /// Records an undo entry for the current level.
    #[inline]
    pub fn record(&mut self, entry: TrailEntry<T>) {
        if !self.frames.is_empty() {
            self.entries.push(entry);
        }
    }

    /// Pops the current frame, handing each of its entries to `undo` in
    /// reverse order of recording.
    ///
    /// Returns `false` if no frame was open.
    pub fn backtrack<F>(&mut self, mut undo: F) -> bool
    where
        F: FnMut(TrailEntry<T>),
    {
        let frame = match self.frames.pop() {
            Some(f) => f,
            None => return false,
        };

        while self.entries.len() > frame.entry_start_index {
            match self.entries.pop() {
                Some(entry) => undo(entry),
                None => break,
            }
        }
        true
    }
}

impl<T> std::fmt::Display for Trail<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Trail(entries: {}, frames: {})",
            self.entries.len(),
            self.frames.len()
        )
    }
}
