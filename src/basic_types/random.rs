use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;
use rand::SeedableRng;

use crate::kabocha_assert_moderate;

/// A trait for generating random values.
///
/// The randomness in the solver is owned by the solver itself (seeded through
/// its options) so that runs are reproducible; components that need
/// randomness receive an implementation of this trait rather than creating
/// their own generator.
pub trait Random: Debug {
    /// Generates a bool which is true with probability `probability`. It must
    /// hold that `probability ∈ [0, 1]`.
    fn generate_bool(&mut self, probability: f64) -> bool;

    /// Generates a usize sampled uniformly from `[range.start, range.end)`.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;
}

// Blanket implementation so that any seedable rand generator can be used
// where the solver expects an implementation of Random.
impl<T> Random for T
where
    T: SeedableRng + Rng + Debug,
{
    fn generate_bool(&mut self, probability: f64) -> bool {
        kabocha_assert_moderate!(
            (0.0..=1.0).contains(&probability),
            "It should hold that 0.0 <= {probability} <= 1.0"
        );
        self.gen_bool(probability)
    }

    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::Random;

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut first = SmallRng::seed_from_u64(42);
        let mut second = SmallRng::seed_from_u64(42);

        for _ in 0..100 {
            assert_eq!(
                first.generate_usize_in_range(0..1000),
                second.generate_usize_in_range(0..1000)
            );
        }
    }
}
