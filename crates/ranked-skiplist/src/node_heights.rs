use oorandom::Rand32;


/// The greatest maximum height which a skiplist in this crate may be configured with.
pub const MAX_HEIGHT_LIMIT: usize = 32;

/// The maximum height used when none is configured.
///
/// With the default promotion probability of `1/4`, one node is generated with this height per
/// approximately a billion entries inserted into the skiplist (on average).
pub const DEFAULT_MAX_HEIGHT: usize = 16;

/// The probability with which a new node's height is increased by one more level, used when none
/// is configured.
pub const DEFAULT_PROMOTION_PROBABILITY: f64 = 0.25;

/// The PRNG seed used when none is configured.
pub const DEFAULT_SEED: u64 = 0x5eed_5eed_5eed_5eed;


/// The source of randomness for node heights. Tests substitute a scripted sequence of draws.
pub(crate) trait Prng32 {
    /// A uniformly random `u32`, as from [`oorandom::Rand32::rand_u32`].
    #[must_use]
    fn rand_u32(&mut self) -> u32;
}

impl Prng32 for Rand32 {
    #[inline]
    fn rand_u32(&mut self) -> u32 {
        // Calls the inherent method, not this one.
        Self::rand_u32(self)
    }
}

/// Generates random heights for new nodes, in a geometric distribution capped at
/// a maximum height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeightGenerator {
    max_height: usize,
    /// A draw of `rand_u32()` strictly below this value promotes a node by one level.
    ///
    /// Ranges over `0..=2^32`, so both "never promote" and "always promote" are expressible.
    promotion_threshold: u64,
}

#[expect(unreachable_pub, reason = "control visibility at type definition")]
impl HeightGenerator {
    /// The provided `max_height` and `promotion_probability` should have been validated by
    /// [`SkiplistConfig::validate`]; out-of-range values are clamped.
    ///
    /// [`SkiplistConfig::validate`]: crate::SkiplistConfig::validate
    #[must_use]
    pub fn new(max_height: usize, promotion_probability: f64) -> Self {
        let max_height = max_height.clamp(1, MAX_HEIGHT_LIMIT);
        let probability = if promotion_probability.is_nan() {
            0.0_f64
        } else {
            promotion_probability.clamp(0.0_f64, 1.0_f64)
        };

        // `2^32` scaled by a value in `[0, 1]`, which is exactly representable as an `f64`.
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::as_conversions,
            clippy::float_arithmetic,
            reason = "the product is finite and within `0.0..=2^32`",
        )]
        let promotion_threshold = (probability * 4_294_967_296.0_f64) as u64;

        Self {
            max_height,
            promotion_threshold,
        }
    }

    #[inline]
    #[must_use]
    pub const fn max_height(&self) -> usize {
        self.max_height
    }

    /// Return a random value in `1..=self.max_height()`, in a geometric distribution (higher
    /// values are exponentially less likely): the chance of a height of at least `k` is
    /// `p^(k-1)`, where `p` is the promotion probability.
    ///
    /// Technically, the maximum height is somewhat more likely than it would be in an exact and
    /// unbounded geometric distribution, since what would be higher values are capped to it.
    pub fn next_height<P: Prng32>(&self, prng: &mut P) -> usize {
        let mut height = 1;
        while height < self.max_height && u64::from(prng.rand_u32()) < self.promotion_threshold {
            height += 1;
        }
        height
    }
}
