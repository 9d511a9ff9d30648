use super::*;

/// Gradient descent with every coordinate scaled by the running RMS of its gradient.
#[derive(Clone, Debug)]
pub struct RmsProp {
    cache: Vec<f64>,
    rho: f64,
    epsilon: f64,
    l_rate: f64,
}

impl UpdateRule for RmsProp {
    fn update_weights(&mut self, weights: &mut [f64], gradients: &[f64]) {
        assert_eq!(gradients.len(), weights.len());
        assert_eq!(gradients.len(), self.cache.len());

        for ((w, g), c) in weights.iter_mut().zip(gradients).zip(&mut self.cache) {
            *c = self.rho * *c + (1. - self.rho) * g * g;
            *w -= self.l_rate * g / (c.sqrt() + self.epsilon);
        }
    }

    fn learning_rate(&self) -> Option<f64> {
        Some(self.l_rate)
    }

    fn set_learning_rate(&mut self, rate: f64) {
        self.l_rate = rate;
    }
}

impl RmsProp {
    pub fn new(rho: f64, epsilon: f64, l_rate: f64, len: usize) -> Self {
        Self {
            cache: vec![0.; len],
            rho,
            epsilon,
            l_rate,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RmsPropBuilder {
    rho: f64,
    epsilon: f64,
    l_rate: f64,
}

impl Default for RmsPropBuilder {
    fn default() -> Self {
        Self {
            rho: 0.9,
            epsilon: 1e-8,
            l_rate: 0.001,
        }
    }
}

impl RmsPropBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn l_rate(mut self, l_rate: f64) -> Self {
        self.l_rate = l_rate;
        self
    }
}

impl AlgBuilder for RmsPropBuilder {
    type Output = RmsProp;

    fn build(self, len: usize) -> Self::Output {
        RmsProp::new(self.rho, self.epsilon, self.l_rate, len)
    }
}
