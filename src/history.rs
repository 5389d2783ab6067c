//! A bounded undo/redo history of raster snapshots.

use crate::RasterBuffer;
use std::collections::VecDeque;

/// A linear undo/redo stack with a fixed capacity.
///
/// Pushing a snapshot after undoing discards the undone snapshots.
/// Once the capacity is reached, pushing evicts the oldest snapshot.
///
/// # Examples
/// ```
/// # use pixelette::{History, RasterBuffer, RasterError};
/// # fn main() -> Result<(), RasterError> {
/// let mut history = History::new();
/// history.push(RasterBuffer::filled(1, 1, [0, 0, 0, 255])?);
/// history.push(RasterBuffer::filled(1, 1, [9, 9, 9, 255])?);
///
/// let previous = history.undo().map(|raster| raster.rgba(0, 0));
/// assert_eq!(previous, Some([0, 0, 0, 255]));
/// assert_eq!(history.position(), (1, 2));
/// assert!(history.can_redo());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots from oldest to newest.
    snapshots: VecDeque<RasterBuffer>,
    /// The number of snapshots up to and including the current one.
    cursor: usize,
    /// The maximum number of snapshots kept.
    capacity: usize,
}

impl History {
    /// The number of snapshots kept by [`History::new`].
    pub const DEFAULT_CAPACITY: usize = 10;

    /// Creates an empty history that keeps up to [`History::DEFAULT_CAPACITY`] snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            snapshots: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            cursor: 0,
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    /// Creates an empty history that keeps up to `capacity` snapshots.
    ///
    /// Returns `None` if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Option<Self> {
        (capacity > 0).then(|| Self {
            snapshots: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        })
    }

    /// The maximum number of snapshots kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of snapshots currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Records `snapshot` as the new current state.
    pub fn push(&mut self, snapshot: RasterBuffer) {
        self.snapshots.truncate(self.cursor);
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len();
    }

    /// The current snapshot, if any.
    #[must_use]
    pub fn current(&self) -> Option<&RasterBuffer> {
        self.cursor.checked_sub(1).and_then(|i| self.snapshots.get(i))
    }

    /// Whether there is an earlier snapshot to go back to.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 1
    }

    /// Whether there is an undone snapshot to go forward to.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.snapshots.len()
    }

    /// Steps back one snapshot, returning the snapshot that is now current.
    ///
    /// Returns `None` and does nothing if there is no earlier snapshot.
    pub fn undo(&mut self) -> Option<&RasterBuffer> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Steps forward one snapshot, returning the snapshot that is now current.
    ///
    /// Returns `None` and does nothing if nothing has been undone.
    pub fn redo(&mut self) -> Option<&RasterBuffer> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// The one-based position of the current snapshot and the number of snapshots,
    /// e.g. `(3, 5)` after pushing five snapshots and undoing twice.
    ///
    /// An empty history is at `(0, 0)`.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.cursor, self.snapshots.len())
    }

    /// Removes every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
