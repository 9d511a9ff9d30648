use super::*;

/// Gradient descent simply steps the weights based on their derivatives.
#[derive(Clone, Debug)]
pub struct GradientDescent {
    l_rate: f64,
}

impl UpdateRule for GradientDescent {
    fn update_weights(&mut self, weights: &mut [f64], gradients: &[f64]) {
        assert_eq!(weights.len(), gradients.len());
        let k = -self.l_rate;
        for (w, d) in weights.iter_mut().zip(gradients) {
            *w += k * *d;
        }
    }

    fn learning_rate(&self) -> Option<f64> {
        Some(self.l_rate)
    }

    fn set_learning_rate(&mut self, rate: f64) {
        self.l_rate = rate;
    }
}

impl GradientDescent {
    pub fn builder() -> GradDescBuilder {
        Default::default()
    }

    pub fn new(l_rate: f64) -> Self {
        Self { l_rate }
    }
}

/// Constructor for [GradientDescent](self::GradientDescent)
#[derive(Clone, Debug)]
pub struct GradDescBuilder {
    l_rate: f64,
}

impl Default for GradDescBuilder {
    fn default() -> Self {
        Self { l_rate: 0.01 }
    }
}

impl GradDescBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn l_rate(mut self, l_rate: f64) -> Self {
        self.l_rate = l_rate;
        self
    }
}

impl AlgBuilder for GradDescBuilder {
    type Output = GradientDescent;

    fn build(self, _len: usize) -> Self::Output {
        GradientDescent::new(self.l_rate)
    }
}
