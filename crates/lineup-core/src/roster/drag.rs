// Drag-and-drop reconciliation between the starting XI and the bench.
//
// The reconciler only tracks the gesture in progress. The caller owns both
// collections and passes them in on drop; the reconciler hands back new
// vectors and never touches the caller's copies.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::player::{Player, PlayerId};

/// Which of the two roster collections a gesture starts or ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Pitch,
    Bench,
}

/// A drag in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragGesture {
    pub player_id: PlayerId,
    pub source: Collection,
    /// Index reported by the UI at drag start. Informational only; the player
    /// is located by id when the drop resolves.
    pub source_index: Option<usize>,
}

/// Where the dragged player would land if released now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub collection: Collection,
    /// `None` means "end of the collection".
    pub index: Option<usize>,
}

/// The new collections produced by a successful drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterChange {
    pub starting_xi: Vec<Player>,
    pub bench: Vec<Player>,
}

/// Reasons a drop resolves to nothing. None of these are surfaced to the
/// caller of [`DragReconciler::drop`]; they are logged and absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropError {
    #[error("no drag in progress")]
    InvalidGesture,

    #[error("drag has no drop target")]
    NoTarget,

    #[error("player {player_id} not found in {collection:?}")]
    PlayerNotFound {
        player_id: PlayerId,
        collection: Collection,
    },

    #[error("dropped onto its own position")]
    SamePosition,
}

/// Tracks one drag gesture at a time: idle until `drag_start`, dragging until
/// `drop` or `drag_end`.
#[derive(Debug, Default)]
pub struct DragReconciler {
    gesture: Option<DragGesture>,
    target: Option<DropTarget>,
}

impl DragReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        self.gesture.as_ref()
    }

    pub fn target(&self) -> Option<&DropTarget> {
        self.target.as_ref()
    }

    /// Begin a gesture. A gesture already in progress is replaced.
    pub fn drag_start(
        &mut self,
        player_id: PlayerId,
        source: Collection,
        source_index: Option<usize>,
    ) {
        if let Some(prev) = &self.gesture {
            debug!("drag start for {} replaces gesture for {}", player_id, prev.player_id);
        }
        self.gesture = Some(DragGesture {
            player_id,
            source,
            source_index,
        });
        self.target = None;
    }

    /// Update the drop candidate. Last call wins. Ignored when idle.
    pub fn drag_over(&mut self, collection: Collection, index: Option<usize>) {
        if self.gesture.is_none() {
            debug!("drag over {:?} ignored: {}", collection, DropError::InvalidGesture);
            return;
        }
        self.target = Some(DropTarget { collection, index });
    }

    /// Cancel the gesture. Safe to call when idle.
    pub fn drag_end(&mut self) {
        self.gesture = None;
        self.target = None;
    }

    /// Release the dragged player onto the current drop target.
    ///
    /// Always returns the reconciler to idle. Returns the new collections on
    /// success and `None` when the drop resolves to nothing.
    pub fn drop(&mut self, starting_xi: &[Player], bench: &[Player]) -> Option<RosterChange> {
        let gesture = self.gesture.take();
        let target = self.target.take();

        let result = match (gesture, target) {
            (None, _) => Err(DropError::InvalidGesture),
            (Some(_), None) => Err(DropError::NoTarget),
            (Some(g), Some(t)) => reconcile(&g, &t, starting_xi, bench),
        };

        match result {
            Ok(change) => Some(change),
            Err(e) => {
                debug!("drop absorbed: {}", e);
                None
            }
        }
    }

    /// Set the target and release in one step.
    pub fn drop_at(
        &mut self,
        collection: Collection,
        index: Option<usize>,
        starting_xi: &[Player],
        bench: &[Player],
    ) -> Option<RosterChange> {
        self.drag_over(collection, index);
        self.drop(starting_xi, bench)
    }

    /// Like [`drop`](Self::drop), but hands the new collections to
    /// `on_change`. The callback runs exactly once on success and not at all
    /// otherwise. Returns whether it ran.
    pub fn drop_with<F>(&mut self, starting_xi: &[Player], bench: &[Player], on_change: F) -> bool
    where
        F: FnOnce(Vec<Player>, Vec<Player>),
    {
        match self.drop(starting_xi, bench) {
            Some(change) => {
                on_change(change.starting_xi, change.bench);
                true
            }
            None => false,
        }
    }
}

/// Compute the collections that result from dropping `gesture` on `target`.
///
/// - Onto the bench: the player is removed from its source and inserted at
///   the target index (appended when the index is absent or past the end).
/// - Onto an occupied pitch slot from the bench: the player takes the slot
///   and the occupant is appended to the bench.
/// - Onto an occupied pitch slot from the pitch: the two players trade
///   places, the occupant landing on the dragged player's old index.
/// - Onto an empty pitch slot: the player is moved there, which for a
///   `Vec` means the end of the starting XI.
pub fn reconcile(
    gesture: &DragGesture,
    target: &DropTarget,
    starting_xi: &[Player],
    bench: &[Player],
) -> Result<RosterChange, DropError> {
    let source = match gesture.source {
        Collection::Pitch => starting_xi,
        Collection::Bench => bench,
    };
    let from = source
        .iter()
        .position(|p| p.id == gesture.player_id)
        .ok_or_else(|| DropError::PlayerNotFound {
            player_id: gesture.player_id.clone(),
            collection: gesture.source,
        })?;

    if target.collection == gesture.source && target.index == Some(from) {
        return Err(DropError::SamePosition);
    }

    let mut xi = starting_xi.to_vec();
    let mut bench = bench.to_vec();

    match (gesture.source, target.collection) {
        (Collection::Pitch, Collection::Pitch) => {
            match target.index.filter(|&to| to < xi.len()) {
                Some(to) => xi.swap(from, to),
                None => {
                    let player = xi.remove(from);
                    xi.push(player);
                }
            }
        }
        (Collection::Bench, Collection::Pitch) => {
            let player = bench.remove(from);
            match target.index.filter(|&to| to < xi.len()) {
                Some(to) => {
                    let displaced = std::mem::replace(&mut xi[to], player);
                    bench.push(displaced);
                }
                None => xi.push(player),
            }
        }
        (source, Collection::Bench) => {
            let player = match source {
                Collection::Pitch => xi.remove(from),
                Collection::Bench => bench.remove(from),
            };
            let at = target.index.map_or(bench.len(), |i| i.min(bench.len()));
            bench.insert(at, player);
        }
    }

    debug!(
        "dropped {} from {:?}[{}] onto {:?}[{:?}]",
        gesture.player_id, gesture.source, from, target.collection, target.index
    );

    Ok(RosterChange {
        starting_xi: xi,
        bench,
    })
}
