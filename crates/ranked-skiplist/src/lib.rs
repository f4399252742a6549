//! A single-threaded skiplist set which reports the 1-based rank of every value it inserts or
//! finds, in the same expected-logarithmic search that locates the value.
//!
//! ```
//! use ranked_skiplist::{DefaultComparator, InsertOutcome, RankedSkiplist};
//!
//! let mut list: RankedSkiplist<String, _> = RankedSkiplist::new(DefaultComparator);
//!
//! for word in ["pear", "apple", "fig"] {
//!     assert!(list.insert_copy(word).unwrap().is_inserted());
//! }
//! let outcome = list.insert_copy("fig").unwrap();
//! assert!(matches!(outcome, InsertOutcome::Rejected { rank: 2, .. }));
//!
//! let pear = list.find("pear").unwrap();
//! assert_eq!(pear.rank, 3);
//! assert_eq!(list.tail(), Some(pear.handle));
//!
//! let removed: String = list.delete(pear.handle).unwrap();
//! assert_eq!(removed, "pear");
//! assert!(list.iter().eq(["apple", "fig"]));
//! ```

#![cfg_attr(
    test,
    allow(unused_crate_dependencies, reason = "`proptest` is only used by integration tests"),
)]

mod interface;
mod default_comparator;

mod node_heights;
mod node;
mod list;
mod iter;

mod config;
mod error;


pub use self::{
    config::{SkiplistBuilder, SkiplistConfig},
    default_comparator::DefaultComparator,
    error::{AllocError, ConfigError, CreateError, InvalidHandle},
    interface::Comparator,
    iter::{Cursor, Iter},
    list::{Found, InsertOutcome, RankedSkiplist},
    node::NodeHandle,
};
pub use self::node_heights::{
    DEFAULT_MAX_HEIGHT, DEFAULT_PROMOTION_PROBABILITY, DEFAULT_SEED, MAX_HEIGHT_LIMIT,
};
