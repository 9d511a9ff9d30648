use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

/// Shuffles an array of consecutive integers with a seeded generator, so every
/// run over the same seed visits the examples in the same orders.
#[derive(Debug, Clone)]
pub struct IndexShuffler {
    idxs: Box<[usize]>,
    rng: SmallRng,
}

impl IndexShuffler {
    pub fn new(size: usize, seed: u64) -> Self {
        IndexShuffler {
            idxs: (0..size).collect(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Reshuffle and return the new order.
    pub fn shuffle(&mut self) -> &[usize] {
        self.idxs.shuffle(&mut self.rng);
        &self.idxs
    }

    pub fn len(&self) -> usize {
        self.idxs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }
}

/// Overwrites the contents of a slice to zeros
pub fn zero(slice: &mut [f64]) {
    slice.iter_mut().for_each(|f| *f = 0.);
}

/// Compares two numbers with a tolerance that becomes relative for large magnitudes.
pub fn close_enough(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * f64::max(1., f64::max(a.abs(), b.abs()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Compares two arrays with the given error tolerance. Returns None if either of the arrays contains NaN.
    pub(crate) fn is_equal_ish(left: &[f64], right: &[f64], tolerance: f64) -> Option<bool> {
        assert_eq!(left.len(), right.len());
        let mut equal = true;
        for (l, r) in left.iter().zip(right) {
            if l.is_nan() || r.is_nan() {
                return None;
            }
            equal &= close_enough(*l, *r, tolerance);
        }
        Some(equal)
    }

    pub(crate) fn check(expected: &[f64], output: &[f64], tolerance: f64, id: &str) {
        let diag = || format!("expected: {:?}\nreceived: {:?}", expected, output);

        if let Some(eq) = is_equal_ish(expected, output, tolerance) {
            if !eq {
                panic!("Evaluation produced incorrect {}.\n{}", id, diag())
            }
        } else {
            panic!("Evaluation produced a NaN\n{}", diag())
        }
    }

    #[test]
    fn shuffler_is_a_permutation() {
        let mut shuffler = IndexShuffler::new(10, 3);
        let mut order = shuffler.shuffle().to_vec();
        order.sort_unstable();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn shuffler_is_reproducible() {
        let mut a = IndexShuffler::new(20, 42);
        let mut b = IndexShuffler::new(20, 42);
        for _ in 0..3 {
            assert_eq!(a.shuffle(), b.shuffle());
        }
    }
}
