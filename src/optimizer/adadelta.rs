use super::*;

/// Adadelta as described in <https://arxiv.org/abs/1212.5701>. The step size is the ratio of
/// the running RMS of past updates to the running RMS of the gradients, so there is no
/// learning rate to tune.
#[derive(Clone, Debug)]
pub struct Adadelta {
    grad_sq: Vec<f64>,
    delta_sq: Vec<f64>,
    rho: f64,
    epsilon: f64,
}

impl UpdateRule for Adadelta {
    fn update_weights(&mut self, weights: &mut [f64], gradients: &[f64]) {
        assert_eq!(gradients.len(), weights.len());
        assert_eq!(gradients.len(), self.grad_sq.len());

        let (rho, eps) = (self.rho, self.epsilon);
        for (((w, g), eg), ed) in weights
            .iter_mut()
            .zip(gradients)
            .zip(&mut self.grad_sq)
            .zip(&mut self.delta_sq)
        {
            *eg = rho * *eg + (1. - rho) * g * g;
            let delta = -(*ed + eps).sqrt() / (*eg + eps).sqrt() * g;
            *ed = rho * *ed + (1. - rho) * delta * delta;
            *w += delta;
        }
    }
}

impl Adadelta {
    pub fn new(rho: f64, epsilon: f64, len: usize) -> Self {
        Self {
            grad_sq: vec![0.; len],
            delta_sq: vec![0.; len],
            rho,
            epsilon,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdadeltaBuilder {
    rho: f64,
    epsilon: f64,
}

impl Default for AdadeltaBuilder {
    fn default() -> Self {
        Self {
            rho: 0.95,
            epsilon: 1e-6,
        }
    }
}

impl AdadeltaBuilder {
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
}

impl AlgBuilder for AdadeltaBuilder {
    type Output = Adadelta;

    fn build(self, len: usize) -> Self::Output {
        Adadelta::new(self.rho, self.epsilon, len)
    }
}
