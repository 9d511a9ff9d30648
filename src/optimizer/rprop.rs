use super::*;

/// Resilient backpropagation. Only the sign of the gradient is used: every coordinate moves by
/// its own step size, which grows while the gradient keeps its sign and shrinks when it flips.
#[derive(Clone, Debug)]
pub struct Rprop {
    steps: Vec<f64>,
    previous: Vec<f64>,

    min_delta: f64,
    max_delta: f64,
    loss: f64,
    gain: f64,
}

impl UpdateRule for Rprop {
    fn update_weights(&mut self, weights: &mut [f64], gradients: &[f64]) {
        assert_eq!(gradients.len(), weights.len());
        assert_eq!(gradients.len(), self.steps.len());

        for (((w, g), step), prev) in weights
            .iter_mut()
            .zip(gradients)
            .zip(&mut self.steps)
            .zip(&mut self.previous)
        {
            let agreement = *g * *prev;
            if agreement > 0. {
                *step = f64::min(*step * self.gain, self.max_delta);
            } else if agreement < 0. {
                *step = f64::max(*step * self.loss, self.min_delta);
            }

            if *g > 0. {
                *w -= *step;
            } else if *g < 0. {
                *w += *step;
            }
            *prev = *g;
        }
    }
}

impl Rprop {
    pub fn builder() -> RpropBuilder {
        Default::default()
    }

    pub fn new(
        init_delta: f64,
        min_delta: f64,
        max_delta: f64,
        loss: f64,
        gain: f64,
        len: usize,
    ) -> Self {
        Self {
            steps: vec![init_delta.max(min_delta).min(max_delta); len],
            previous: vec![0.; len],
            min_delta,
            max_delta,
            loss,
            gain,
        }
    }

    /// Current step size of every coordinate.
    pub fn steps(&self) -> &[f64] {
        &self.steps
    }
}

#[derive(Clone, Debug)]
pub struct RpropBuilder {
    init_delta: f64,
    min_delta: f64,
    max_delta: f64,
    loss: f64,
    gain: f64,
}

impl Default for RpropBuilder {
    fn default() -> Self {
        Self {
            init_delta: 0.1,
            min_delta: 1e-6,
            max_delta: 50.,
            loss: 0.5,
            gain: 1.2,
        }
    }
}

impl RpropBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn init_delta(mut self, init_delta: f64) -> Self {
        self.init_delta = init_delta;
        self
    }

    pub fn min_delta(mut self, min_delta: f64) -> Self {
        self.min_delta = min_delta;
        self
    }

    pub fn max_delta(mut self, max_delta: f64) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Factor applied to a step after a sign flip.
    pub fn loss(mut self, loss: f64) -> Self {
        self.loss = loss;
        self
    }

    /// Factor applied to a step while the sign holds.
    pub fn gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }
}

impl AlgBuilder for RpropBuilder {
    type Output = Rprop;

    fn build(self, len: usize) -> Self::Output {
        Rprop::new(
            self.init_delta,
            self.min_delta,
            self.max_delta,
            self.loss,
            self.gain,
            len,
        )
    }
}
