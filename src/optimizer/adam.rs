use super::*;

/// The adam optimizer algorithm as shown in the research paper <https://arxiv.org/abs/1412.6980>
#[derive(Clone, Debug)]
pub struct Adam {
    momentum: Vec<f64>,
    velocity: Vec<f64>,

    beta1: f64,
    beta2: f64,
    epsilon: f64,

    beta1_pow: f64,
    beta2_pow: f64,

    l_rate: f64,
}

impl UpdateRule for Adam {
    fn update_weights(&mut self, weights: &mut [f64], gradients: &[f64]) {
        assert_eq!(gradients.len(), weights.len());
        assert_eq!(gradients.len(), self.momentum.len());
        assert_eq!(gradients.len(), self.velocity.len());

        for (m, g) in self.momentum.iter_mut().zip(gradients.iter()) {
            *m = self.beta1 * *m + (1. - self.beta1) * *g;
        }

        for (v, g) in self.velocity.iter_mut().zip(gradients.iter()) {
            *v = self.beta2 * *v + (1. - self.beta2) * *g * *g;
        }

        let alpha = -self.l_rate * f64::sqrt(1. - self.beta2_pow) / (1. - self.beta1_pow);

        for ((w, m), v) in weights.iter_mut().zip(&self.momentum).zip(&self.velocity) {
            *w += alpha * *m / (v.sqrt() + self.epsilon);
        }

        self.beta1_pow *= self.beta1;
        self.beta2_pow *= self.beta2;
    }

    fn learning_rate(&self) -> Option<f64> {
        Some(self.l_rate)
    }

    fn set_learning_rate(&mut self, rate: f64) {
        self.l_rate = rate;
    }
}

impl Adam {
    pub fn builder() -> AdamBuilder {
        Default::default()
    }

    pub fn new(beta1: f64, beta2: f64, epsilon: f64, l_rate: f64, len: usize) -> Self {
        Self {
            momentum: vec![0.; len],
            velocity: vec![0.; len],
            beta1,
            beta2,
            epsilon,
            beta1_pow: beta1,
            beta2_pow: beta2,
            l_rate,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdamBuilder {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    l_rate: f64,
}

impl Default for AdamBuilder {
    fn default() -> Self {
        Self {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            l_rate: 0.001,
        }
    }
}

impl AdamBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn beta1(mut self, beta1: f64) -> Self {
        self.beta1 = beta1;
        self
    }

    pub fn beta2(mut self, beta2: f64) -> Self {
        self.beta2 = beta2;
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

impl AlgBuilder for AdamBuilder {
    type Output = Adam;

    fn build(self, len: usize) -> Self::Output {
        Adam::new(self.beta1, self.beta2, self.epsilon, self.l_rate, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_has_rate_magnitude() {
        // with bias correction the first step is l_rate * g / |g|
        let mut adam = AdamBuilder::new().l_rate(0.1).build(2);
        let mut weights = [1., 1.];
        adam.update_weights(&mut weights, &[4., -0.5]);
        assert!((weights[0] - 0.9).abs() < 1e-6);
        assert!((weights[1] - 1.1).abs() < 1e-6);
    }
}
