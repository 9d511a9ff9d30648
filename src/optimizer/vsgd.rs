use super::*;

const VARIANCE_FLOOR: f64 = 1e-12;

/// Variance-based SGD with adaptive memory ("no more pesky learning rates").
///
/// Every coordinate keeps running averages of its gradient, squared gradient and curvature.
/// The rate `g² / (h v)` is the optimal step of a noisy quadratic model, and the memory size
/// `tau` grows while the gradients are noisy and shrinks towards one when they agree. The
/// first observation is overestimated by a constant factor so the initial steps are cautious.
#[derive(Clone, Debug)]
pub struct Vsgd {
    g_avg: Vec<f64>,
    v_avg: Vec<f64>,
    h_avg: Vec<f64>,
    tau: Vec<f64>,
    curvature_floor: f64,
    overestimate: f64,
    started: bool,
}

impl Vsgd {
    pub fn new(curvature_floor: f64, overestimate: f64, len: usize) -> Self {
        Self {
            g_avg: vec![0.; len],
            v_avg: vec![0.; len],
            h_avg: vec![0.; len],
            tau: vec![2.; len],
            curvature_floor,
            overestimate,
            started: false,
        }
    }
}

impl UpdateRule for Vsgd {
    /// Without curvature information every coordinate is treated as having unit curvature.
    fn update_weights(&mut self, weights: &mut [f64], gradients: &[f64]) {
        let curvature = vec![1.; gradients.len()];
        self.update_with_curvature(weights, gradients, &curvature)
    }

    fn uses_curvature(&self) -> bool {
        true
    }

    fn update_with_curvature(&mut self, weights: &mut [f64], gradients: &[f64], curvature: &[f64]) {
        assert_eq!(gradients.len(), weights.len());
        assert_eq!(gradients.len(), curvature.len());
        assert_eq!(gradients.len(), self.tau.len());

        let (floor, c) = (self.curvature_floor, self.overestimate);
        for i in 0..weights.len() {
            let g = gradients[i];
            let h = curvature[i].abs().max(floor);

            if self.started {
                let r = 1. / self.tau[i];
                self.g_avg[i] = (1. - r) * self.g_avg[i] + r * g;
                self.v_avg[i] = (1. - r) * self.v_avg[i] + r * g * g;
                self.h_avg[i] = (1. - r) * self.h_avg[i] + r * h;
            } else {
                self.g_avg[i] = g;
                self.v_avg[i] = c * g * g + VARIANCE_FLOOR;
                self.h_avg[i] = c * h;
            }

            let g_sq = self.g_avg[i] * self.g_avg[i];
            let v = self.v_avg[i].max(VARIANCE_FLOOR);
            let rate = g_sq / (self.h_avg[i] * v);
            weights[i] -= rate * g;
            self.tau[i] = (1. - g_sq / v) * self.tau[i] + 1.;
        }
        self.started = true;
    }
}

#[derive(Clone, Debug)]
pub struct VsgdBuilder {
    curvature_floor: f64,
    overestimate: f64,
}

impl Default for VsgdBuilder {
    fn default() -> Self {
        Self {
            curvature_floor: 1e-3,
            overestimate: 10.,
        }
    }
}

impl VsgdBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Smallest curvature magnitude used when computing the rate.
    pub fn curvature_floor(mut self, floor: f64) -> Self {
        self.curvature_floor = floor;
        self
    }

    /// Factor the first variance and curvature observations are scaled by.
    pub fn overestimate(mut self, factor: f64) -> Self {
        self.overestimate = factor;
        self
    }
}

impl AlgBuilder for VsgdBuilder {
    type Output = Vsgd;

    fn build(self, len: usize) -> Self::Output {
        Vsgd::new(self.curvature_floor, self.overestimate, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_is_newton_step() {
        // f(x) = a x^2 / 2 per coordinate
        let a = [1., 3.];
        let mut x = [2., -1.];
        let g: Vec<f64> = x.iter().zip(&a).map(|(x, a)| a * x).collect();
        let mut vsgd = VsgdBuilder::new().overestimate(1.).build(2);
        vsgd.update_with_curvature(&mut x, &g, &a);
        assert!(x[0].abs() < 1e-9, "{:?}", x);
        assert!(x[1].abs() < 1e-9, "{:?}", x);
    }

    #[test]
    fn noisy_gradients_lengthen_memory() {
        let run = |gradients: &[f64]| {
            let mut vsgd = VsgdBuilder::new().build(1);
            let mut x = [0.];
            for g in gradients {
                vsgd.update_with_curvature(&mut x, &[*g], &[1.]);
            }
            vsgd.tau[0]
        };
        let consistent = run(&[1.; 30]);
        let alternating: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 1. } else { -1. }).collect();
        let noisy = run(&alternating);
        assert!(consistent < 1.5, "{}", consistent);
        assert!(noisy > 20., "{}", noisy);
    }
}
