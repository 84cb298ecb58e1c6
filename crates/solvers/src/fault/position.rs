//! The position module holds the [Position] type, a generalized index within the game tree.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The deepest level a [Position] may occupy. Trace indices are `u64`s, so any level below this
/// one could not be addressed by a trace index.
pub const MAX_POSITION_DEPTH: u8 = 64;

/// Errors produced when a [Position] would leave the representable tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    /// The depth is deeper than [MAX_POSITION_DEPTH].
    #[error("depth {depth} exceeds the maximum position depth")]
    DepthOutOfRange { depth: u8 },
    /// The index does not fit within `2^depth` nodes.
    #[error("index {index_at_depth} is out of range at depth {depth}")]
    IndexOutOfRange { depth: u8, index_at_depth: u128 },
    /// The generalized index does not encode a valid node.
    #[error("invalid generalized index {0}")]
    InvalidGindex(u128),
    /// The root position has no parent.
    #[error("the root position has no parent")]
    RootHasNoParent,
    /// The position sits below the maximum depth it was measured against.
    #[error("position at depth {depth} is below the maximum depth {max_depth}")]
    BelowMaxDepth { depth: u8, max_depth: u8 },
}

/// A node within the bisection tree, encoded as a generalized index: `2^{depth} | index_at_depth`.
///
/// Every [Position] holds `depth <= MAX_POSITION_DEPTH` and `index_at_depth < 2^depth`; all
/// navigation is checked and returns a [PositionError] rather than wrapping or truncating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position(u128);

impl Position {
    /// The root of the game tree.
    pub const ROOT: Position = Position(1);

    /// Creates a [Position] from a depth and an index at that depth.
    ///
    /// ### Takes
    /// - `depth`: The depth of the node.
    /// - `index_at_depth`: The index of the node within its level.
    ///
    /// ### Returns
    /// - `Ok(Position)`: The position, if it fits within the tree.
    /// - `Err(PositionError)`: The depth or index is out of range.
    pub fn new(depth: u8, index_at_depth: u64) -> Result<Self, PositionError> {
        if depth > MAX_POSITION_DEPTH {
            return Err(PositionError::DepthOutOfRange { depth });
        }
        if (index_at_depth as u128) >> depth != 0 {
            return Err(PositionError::IndexOutOfRange {
                depth,
                index_at_depth: index_at_depth as u128,
            });
        }
        Ok(Self((1u128 << depth) | index_at_depth as u128))
    }

    /// Creates a [Position] from a raw generalized index, as stored on-chain.
    pub fn from_gindex(gindex: u128) -> Result<Self, PositionError> {
        if gindex == 0 || 127 - gindex.leading_zeros() > MAX_POSITION_DEPTH as u32 {
            return Err(PositionError::InvalidGindex(gindex));
        }
        Ok(Self(gindex))
    }

    /// Returns the raw generalized index.
    pub const fn gindex(&self) -> u128 {
        self.0
    }

    /// Returns the depth of the [Position] within the tree.
    pub fn depth(&self) -> u8 {
        (127 - self.0.leading_zeros()) as u8
    }

    /// Returns the index at depth of the [Position] within the tree.
    pub fn index_at_depth(&self) -> u64 {
        (self.0 ^ (1u128 << self.depth())) as u64
    }

    /// Returns `true` if this is the root [Position].
    pub fn is_root(&self) -> bool {
        self.0 == 1
    }

    /// Returns the parent [Position].
    pub fn parent(&self) -> Result<Self, PositionError> {
        if self.is_root() {
            return Err(PositionError::RootHasNoParent);
        }
        Ok(Self(self.0 >> 1))
    }

    /// Returns the left child [Position].
    pub fn left(&self) -> Result<Self, PositionError> {
        self.child(false)
    }

    /// Returns the right child [Position].
    pub fn right(&self) -> Result<Self, PositionError> {
        self.child(true)
    }

    /// Returns the relative [Position] for an attack or defense move against the current
    /// [Position]. Mirrors the dispute game contract: `(position | !is_attack) << 1`.
    pub fn make_move(&self, is_attack: bool) -> Result<Self, PositionError> {
        Self((!is_attack as u128) | self.0).child(false)
    }

    /// Returns the [Position] that disputes the trace index preceding this one.
    pub fn attack(&self) -> Result<Self, PositionError> {
        self.make_move(true)
    }

    /// Returns the [Position] that disputes the trace index following this one.
    pub fn defend(&self) -> Result<Self, PositionError> {
        self.make_move(false)
    }

    /// Returns the [Position] immediately to the right at the same depth.
    pub fn move_right(&self) -> Result<Self, PositionError> {
        let depth = self.depth();
        let next = self.index_at_depth() as u128 + 1;
        if next >> depth != 0 {
            return Err(PositionError::IndexOutOfRange {
                depth,
                index_at_depth: next,
            });
        }
        Ok(Self(self.0 + 1))
    }

    /// Returns the rightmost [Position] at `max_depth` that commits to the same trace index as
    /// the current [Position].
    pub fn right_index(&self, max_depth: u8) -> Result<Self, PositionError> {
        if max_depth > MAX_POSITION_DEPTH {
            return Err(PositionError::DepthOutOfRange { depth: max_depth });
        }
        let depth = self.depth();
        if depth > max_depth {
            return Err(PositionError::BelowMaxDepth { depth, max_depth });
        }
        let remaining = max_depth - depth;
        Ok(Self((self.0 << remaining) | ((1u128 << remaining) - 1)))
    }

    /// Returns the trace index that the current [Position] commits to.
    pub fn trace_index(&self, max_depth: u8) -> Result<u64, PositionError> {
        Ok(self.right_index(max_depth)?.index_at_depth())
    }

    fn child(&self, right: bool) -> Result<Self, PositionError> {
        let depth = self.depth();
        if depth >= MAX_POSITION_DEPTH {
            return Err(PositionError::DepthOutOfRange { depth: depth + 1 });
        }
        Ok(Self((self.0 << 1) | right as u128))
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ROOT
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.depth(), self.index_at_depth())
    }
}

impl TryFrom<u128> for Position {
    type Error = PositionError;

    fn try_from(gindex: u128) -> Result<Self, Self::Error> {
        Self::from_gindex(gindex)
    }
}

/// Wire form of a [Position]. Validated on the way in.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPosition {
    depth: u8,
    index_at_depth: u64,
}

impl TryFrom<RawPosition> for Position {
    type Error = PositionError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::new(raw.depth, raw.index_at_depth)
    }
}

impl From<Position> for RawPosition {
    fn from(position: Position) -> Self {
        Self {
            depth: position.depth(),
            index_at_depth: position.index_at_depth(),
        }
    }
}
