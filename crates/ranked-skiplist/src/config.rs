use tracing::Level as LogLevel;

use crate::{error::{ConfigError, CreateError}, list::RankedSkiplist};
use crate::node_heights::{
    DEFAULT_MAX_HEIGHT, DEFAULT_PROMOTION_PROBABILITY, DEFAULT_SEED, MAX_HEIGHT_LIMIT,
};


/// Settings which are fixed for the lifetime of a [`RankedSkiplist`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkiplistConfig {
    /// The greatest height any node (and thus the skiplist) may have.
    ///
    /// Must be in `1..=MAX_HEIGHT_LIMIT`. Defaults to [`DEFAULT_MAX_HEIGHT`].
    ///
    /// [`MAX_HEIGHT_LIMIT`]: crate::MAX_HEIGHT_LIMIT
    pub max_height:            usize,
    /// The probability that a new node's height is increased by one more level.
    ///
    /// Must be a finite value in `[0, 1]`. Defaults to [`DEFAULT_PROMOTION_PROBABILITY`].
    pub promotion_probability: f64,
    /// The seed of the PRNG that generates node heights.
    ///
    /// Defaults to [`DEFAULT_SEED`], so that unseeded skiplists behave reproducibly.
    pub seed:                  u64,
}

impl SkiplistConfig {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_height:            DEFAULT_MAX_HEIGHT,
            promotion_probability: DEFAULT_PROMOTION_PROBABILITY,
            seed:                  DEFAULT_SEED,
        }
    }

    /// Confirm that the `max_height` and `promotion_probability` settings are in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_HEIGHT_LIMIT).contains(&self.max_height) {
            return Err(ConfigError::MaxHeightOutOfRange { max_height: self.max_height });
        }

        let probability = self.promotion_probability;
        if !probability.is_finite() || probability < 0.0_f64 || probability > 1.0_f64 {
            return Err(ConfigError::InvalidPromotionProbability { probability });
        }

        Ok(())
    }
}

impl Default for SkiplistConfig {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a [`RankedSkiplist`], checking its settings (including whether a comparator was
/// provided at all) when [`build`] is called.
///
/// ```
/// use ranked_skiplist::{DefaultComparator, RankedSkiplist, SkiplistBuilder};
///
/// let list: RankedSkiplist<u32, _> = SkiplistBuilder::new()
///     .comparator(DefaultComparator)
///     .max_height(8)
///     .promotion_probability(0.5)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// assert_eq!(list.max_height(), 8);
/// ```
///
/// [`build`]: SkiplistBuilder::build
#[derive(Debug, Clone)]
pub struct SkiplistBuilder<Cmp> {
    comparator: Option<Cmp>,
    config:     SkiplistConfig,
}

impl<Cmp> SkiplistBuilder<Cmp> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            comparator: None,
            config:     SkiplistConfig::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn comparator(mut self, cmp: Cmp) -> Self {
        self.comparator = Some(cmp);
        self
    }

    /// Replace every setting other than the comparator.
    #[inline]
    #[must_use]
    pub const fn config(mut self, config: SkiplistConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    #[must_use]
    pub const fn max_height(mut self, max_height: usize) -> Self {
        self.config.max_height = max_height;
        self
    }

    #[inline]
    #[must_use]
    pub const fn promotion_probability(mut self, probability: f64) -> Self {
        self.config.promotion_probability = probability;
        self
    }

    #[inline]
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Create an empty skiplist.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingComparator`] if no comparator was provided, any other
    /// [`ConfigError`] if the settings are invalid, or an [`AllocError`] if the head of the
    /// skiplist could not be allocated.
    ///
    /// [`AllocError`]: crate::AllocError
    pub fn build<T>(self) -> Result<RankedSkiplist<T, Cmp>, CreateError> {
        let Some(cmp) = self.comparator else {
            let err = ConfigError::MissingComparator;
            tracing::event!(LogLevel::DEBUG, "rejected skiplist configuration: {err}");
            return Err(err.into());
        };

        RankedSkiplist::with_config(cmp, self.config)
    }
}

impl<Cmp> Default for SkiplistBuilder<Cmp> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
