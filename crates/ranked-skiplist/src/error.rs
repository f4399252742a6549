use std::collections::TryReserveError;

use thiserror::Error;

use crate::node_heights::MAX_HEIGHT_LIMIT;


/// An invalid configuration was provided when creating a [`RankedSkiplist`].
///
/// [`RankedSkiplist`]: crate::RankedSkiplist
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Every skiplist needs a comparator, which was not provided to a [`SkiplistBuilder`].
    ///
    /// [`SkiplistBuilder`]: crate::SkiplistBuilder
    #[error("a skiplist cannot be created without a comparator")]
    MissingComparator,
    #[error(
        "maximum height {max_height} is outside the permitted range 1..={}",
        MAX_HEIGHT_LIMIT
    )]
    MaxHeightOutOfRange {
        max_height: usize,
    },
    #[error("promotion probability {probability} is not a finite value in [0, 1]")]
    InvalidPromotionProbability {
        probability: f64,
    },
}

/// Memory for a new node (or for the head of a new skiplist) could not be allocated.
///
/// Whenever this error is returned, the skiplist has not been modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("could not reserve memory for a skiplist node: {0}")]
    Reserve(#[from] TryReserveError),
    /// A skiplist can hold at most `u32::MAX` nodes at once.
    #[error("a skiplist cannot hold more than u32::MAX nodes")]
    TooManyNodes,
}

/// A [`RankedSkiplist`] could not be created.
///
/// [`RankedSkiplist`]: crate::RankedSkiplist
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CreateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// A [`NodeHandle`] did not refer to a node currently in the skiplist, most likely because that
/// node was already deleted (or the skiplist was cleared).
///
/// [`NodeHandle`]: crate::NodeHandle
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("the node handle does not refer to a live node of this skiplist")]
pub struct InvalidHandle;
