use crate::{data::LabeledDataSet, error::CostError, helpers::zero};

/// A parameter object the optimizers can work on. Whatever its structure, it has to expose
/// its numbers as one flat slice, which is what the update rules operate on.
pub trait OptParam: Clone {
    /// Get the flattened parameter values.
    fn values(&self) -> &[f64];

    /// Get mutable flattened parameter values.
    fn values_mut(&mut self) -> &mut [f64];

    /// Feature dimensionality of the parameters.
    fn dimensions(&self) -> usize;

    /// Total number of values.
    fn len(&self) -> usize {
        self.values().len()
    }

    fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// An instance of the same shape with all values set to zero.
    fn zero(&self) -> Self {
        let mut out = self.clone();
        out.clear();
        out
    }

    /// Set all values to zero in place.
    fn clear(&mut self) {
        zero(self.values_mut());
    }

    fn add_s(&mut self, other: &Self) {
        assert_eq!(self.len(), other.len());
        for (a, b) in self.values_mut().iter_mut().zip(other.values()) {
            *a += *b;
        }
    }

    fn sub_s(&mut self, other: &Self) {
        assert_eq!(self.len(), other.len());
        for (a, b) in self.values_mut().iter_mut().zip(other.values()) {
            *a -= *b;
        }
    }

    fn multiply_s(&mut self, k: f64) {
        self.values_mut().iter_mut().for_each(|v| *v *= k);
    }

    fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.add_s(other);
        out
    }

    fn sub(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.sub_s(other);
        out
    }

    fn multiply(&self, k: f64) -> Self {
        let mut out = self.clone();
        out.multiply_s(k);
        out
    }

    /// Sum of squares across all values.
    fn squared_norm(&self) -> f64 {
        self.values().iter().map(|v| v * v).sum()
    }
}

/// Labeled prototypes and a relevance weight per feature.
///
/// The values are laid out as the prototypes, one after another, followed by the weights.
/// Labels aren't optimized, so they live outside of the value slice.
#[derive(Debug, Clone, PartialEq)]
pub struct GrlvqParams {
    dims: usize,
    labels: Vec<i32>,
    values: Vec<f64>,
}

impl GrlvqParams {
    /// Returns Err if any prototype or the weights don't have the same length as the first
    /// prototype, or if the number of labels doesn't match the number of prototypes.
    pub fn new<U: AsRef<[f64]>>(
        prototypes: &[U],
        labels: Vec<i32>,
        weights: &[f64],
    ) -> Result<Self, CostError> {
        let dims = weights.len();
        if prototypes.len() != labels.len() {
            return Err(CostError::ShapeMismatch {
                expected: prototypes.len(),
                found: labels.len(),
                example: None,
            });
        }

        let mut values = Vec::with_capacity((prototypes.len() + 1) * dims);
        for p in prototypes {
            let p = p.as_ref();
            if p.len() != dims {
                return Err(CostError::ShapeMismatch {
                    expected: dims,
                    found: p.len(),
                    example: None,
                });
            }
            values.extend_from_slice(p);
        }
        values.extend_from_slice(weights);

        Ok(Self {
            dims,
            labels,
            values,
        })
    }

    /// Same as `new` with every weight set to one.
    pub fn with_uniform_weights<U: AsRef<[f64]>>(
        prototypes: &[U],
        labels: Vec<i32>,
    ) -> Result<Self, CostError> {
        let dims = prototypes.first().map(|p| p.as_ref().len()).unwrap_or(0);
        Self::new(prototypes, labels, &vec![1.; dims])
    }

    pub fn prototype_count(&self) -> usize {
        self.labels.len()
    }

    pub fn prototype(&self, idx: usize) -> &[f64] {
        &self.values[idx * self.dims..(idx + 1) * self.dims]
    }

    pub fn prototype_mut(&mut self, idx: usize) -> &mut [f64] {
        &mut self.values[idx * self.dims..(idx + 1) * self.dims]
    }

    pub fn weights(&self) -> &[f64] {
        &self.values[self.labels.len() * self.dims..]
    }

    pub fn weights_mut(&mut self) -> &mut [f64] {
        let offset = self.labels.len() * self.dims;
        &mut self.values[offset..]
    }

    pub fn label(&self, idx: usize) -> i32 {
        self.labels[idx]
    }

    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Weighted squared euclidean distance between prototype `idx` and `x`.
    /// Negative weights count as zero.
    pub fn dist(&self, idx: usize, x: &[f64]) -> f64 {
        assert_eq!(
            x.len(),
            self.dims,
            "Input size mismatch. Parameters have {} dimensions, input has {}",
            self.dims,
            x.len()
        );
        self.prototype(idx)
            .iter()
            .zip(x)
            .zip(self.weights())
            .map(|((p, x), w)| {
                let diff = p - x;
                w.max(0.) * diff * diff
            })
            .sum()
    }

    /// Index of the nearest prototype with the given label.
    pub fn closest_correct(&self, x: &[f64], label: i32) -> Option<usize> {
        self.closest_where(x, |l| l == label)
    }

    /// Index of the nearest prototype with a different label.
    pub fn closest_incorrect(&self, x: &[f64], label: i32) -> Option<usize> {
        self.closest_where(x, |l| l != label)
    }

    fn closest_where(&self, x: &[f64], pred: impl Fn(i32) -> bool) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, label) in self.labels.iter().enumerate() {
            if !pred(*label) {
                continue;
            }
            let d = self.dist(idx, x);
            // strict comparison keeps the lowest index on ties
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((idx, d));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Label of the nearest prototype, or None if there are no prototypes.
    pub fn classify(&self, x: &[f64]) -> Option<i32> {
        self.closest_where(x, |_| true).map(|idx| self.labels[idx])
    }

    /// Fraction of correctly classified examples.
    pub fn accuracy<D: LabeledDataSet + ?Sized>(&self, ds: &D) -> f64 {
        if ds.size() == 0 {
            return 0.;
        }
        let correct = (0..ds.size())
            .filter(|&i| self.classify(ds.data(i)) == Some(ds.label(i)))
            .count();
        correct as f64 / ds.size() as f64
    }
}

impl OptParam for GrlvqParams {
    fn values(&self) -> &[f64] {
        &self.values
    }

    fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::tests::check;

    fn params() -> GrlvqParams {
        GrlvqParams::new(&[[0., 0.], [2., 1.]], vec![0, 1], &[1., 0.5]).unwrap()
    }

    #[test]
    fn layout() {
        let p = params();
        assert_eq!(p.values(), &[0., 0., 2., 1., 1., 0.5]);
        assert_eq!(p.prototype(1), &[2., 1.]);
        assert_eq!(p.weights(), &[1., 0.5]);
        assert_eq!(p.dimensions(), 2);
    }

    #[test]
    fn arithmetic() {
        let p = params();
        let sum = p.add(&p.multiply(2.));
        check(&[0., 0., 6., 3., 3., 1.5], sum.values(), 1e-12, "sum");
        let diff = sum.sub(&p);
        check(&[0., 0., 4., 2., 2., 1.], diff.values(), 1e-12, "difference");
        assert_eq!(p.squared_norm(), 4. + 1. + 1. + 0.25);
        assert_eq!(p.zero().squared_norm(), 0.);
        assert_eq!(p.zero().labels(), p.labels());
    }

    #[test]
    fn weighted_distance() {
        let p = params();
        // 1 * (2 - 1)^2 + 0.5 * (1 - 3)^2
        assert_eq!(p.dist(1, &[1., 3.]), 3.);
    }

    #[test]
    fn negative_weights_are_ignored() {
        let mut p = params();
        p.weights_mut()[1] = -4.;
        assert_eq!(p.dist(1, &[1., 3.]), 1.);
    }

    #[test]
    fn nearest_prototypes() {
        let p = GrlvqParams::with_uniform_weights(&[[0., 0.], [3., 0.], [1., 0.]], vec![0, 1, 0])
            .unwrap();
        let x = [2.2, 0.];
        assert_eq!(p.closest_correct(&x, 0), Some(2));
        assert_eq!(p.closest_incorrect(&x, 0), Some(1));
        assert_eq!(p.closest_incorrect(&x, 1), Some(2));
        assert_eq!(p.closest_correct(&x, 7), None);
        assert_eq!(p.classify(&x), Some(1));
    }

    #[test]
    fn shape_is_checked() {
        assert!(GrlvqParams::new(&[vec![0., 0.], vec![1.]], vec![0, 1], &[1., 1.]).is_err());
        assert!(GrlvqParams::new(&[[0., 0.]], vec![0, 1], &[1., 1.]).is_err());
    }
}
