use crate::error::CostError;

/// Read-only access to labeled training examples.
pub trait LabeledDataSet {
    /// Get the number of examples.
    fn size(&self) -> usize;
    /// Get the feature vector of the example at `idx`.
    fn data(&self, idx: usize) -> &[f64];
    /// Get the class label of the example at `idx`.
    fn label(&self, idx: usize) -> i32;
    /// Get the length of every feature vector.
    fn dimensions(&self) -> usize;

    /// Distinct labels in ascending order.
    fn classes(&self) -> Vec<i32> {
        let mut classes: Vec<i32> = (0..self.size()).map(|i| self.label(i)).collect();
        classes.sort_unstable();
        classes.dedup();
        classes
    }
}

impl<T: LabeledDataSet + ?Sized> LabeledDataSet for &T {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn data(&self, idx: usize) -> &[f64] {
        (**self).data(idx)
    }

    fn label(&self, idx: usize) -> i32 {
        (**self).label(idx)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }
}

/// This struct stores features as one packed slice of floats next to a slice of labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedDataSet {
    data: Box<[f64]>,
    labels: Box<[i32]>,
    dims: usize,
}

impl PackedDataSet {
    /// Constructs the data set from packed features. Fails if the number of features
    /// isn't exactly `labels.len() * dims`.
    pub fn new(data: Box<[f64]>, labels: Box<[i32]>, dims: usize) -> Result<Self, CostError> {
        if data.len() != labels.len() * dims {
            return Err(CostError::ShapeMismatch {
                expected: labels.len() * dims,
                found: data.len(),
                example: None,
            });
        }
        Ok(Self { data, labels, dims })
    }

    /// Constructs the data set from (features, label) pairs. The first example determines the
    /// dimensionality, every other one has to match it.
    pub fn from_tuples<D, U>(data: D) -> Result<Self, CostError>
    where
        D: IntoIterator<Item = (U, i32)>,
        U: AsRef<[f64]>,
    {
        let data = data.into_iter();
        let mut data_vec = Vec::new();
        let mut label_vec = Vec::with_capacity(data.size_hint().0);
        let mut dims = None;

        for (idx, (d, l)) in data.enumerate() {
            let d = d.as_ref();
            let expected = *dims.get_or_insert(d.len());
            if d.len() != expected {
                return Err(CostError::ShapeMismatch {
                    expected,
                    found: d.len(),
                    example: Some(idx),
                });
            }
            data_vec.extend_from_slice(d);
            label_vec.push(l);
        }

        Ok(Self {
            data: data_vec.into_boxed_slice(),
            labels: label_vec.into_boxed_slice(),
            dims: dims.unwrap_or(0),
        })
    }
}

impl LabeledDataSet for PackedDataSet {
    fn size(&self) -> usize {
        self.labels.len()
    }

    fn data(&self, idx: usize) -> &[f64] {
        let offset = idx * self.dims;
        &self.data[offset..offset + self.dims]
    }

    fn label(&self, idx: usize) -> i32 {
        self.labels[idx]
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_access() {
        let ds = PackedDataSet::from_tuples(vec![([1., 2.], 0), ([3., 4.], 1), ([5., 6.], 0)])
            .unwrap();
        assert_eq!(ds.size(), 3);
        assert_eq!(ds.dimensions(), 2);
        assert_eq!(ds.data(1), &[3., 4.]);
        assert_eq!(ds.label(2), 0);
        assert_eq!(ds.classes(), vec![0, 1]);
    }

    #[test]
    fn ragged_tuples_are_rejected() {
        let err = PackedDataSet::from_tuples(vec![(vec![1., 2.], 0), (vec![3.], 1)]).unwrap_err();
        assert_eq!(
            err,
            CostError::ShapeMismatch {
                expected: 2,
                found: 1,
                example: Some(1)
            }
        );
    }

    #[test]
    fn packed_length_is_checked() {
        let res = PackedDataSet::new(vec![1., 2., 3.].into(), vec![0, 1].into(), 2);
        assert!(res.is_err());
    }
}
