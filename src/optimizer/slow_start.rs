use super::*;

/// Schedule used when none is configured.
pub const DEFAULT_RATES: [f64; 11] = [100., 10., 5., 1., 0.1, 0.05, 0.01, 0.005, 0.001, 5e-4, 1e-4];

/// Stochastic gradient descent over a descending schedule of learning rates. An epoch that
/// fails to lower the error moves on to the next rate, and is undone if it raised the error.
/// Once the schedule is exhausted the last rate is kept.
#[derive(Debug)]
pub struct SlowStart<P> {
    base: OptimizerBase<P>,
    inner: Sgd<P>,
    rates: Vec<f64>,
    current: usize,
}

impl<P: OptParam> SlowStart<P> {
    pub fn new(
        rates: Vec<f64>,
        batch_size: usize,
        seed: u64,
        criteria: StopCriteria,
    ) -> Result<Self, ConfigError> {
        let first = *rates
            .first()
            .ok_or_else(|| ConfigError::invalid("rates", "[]", "a non-empty list of rates"))?;
        let inner = Stochastic::new(
            GradDescBuilder::new().l_rate(first),
            batch_size,
            seed,
            StopCriteria::default(),
        );
        Ok(Self {
            base: OptimizerBase::new(criteria),
            inner,
            rates,
            current: 0,
        })
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn inner(&self) -> &Sgd<P> {
        &self.inner
    }
}

impl<P: OptParam> Optimizer<P> for SlowStart<P> {
    fn base(&self) -> &OptimizerBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OptimizerBase<P> {
        &mut self.base
    }

    fn begin(&mut self, len: usize) {
        self.inner.begin(len);
        self.current = 0;
        self.inner.set_learning_rate(self.rates[0]);
    }

    fn epoch(
        &mut self,
        cf: &dyn SeparableCostFunction<P>,
        params: &mut P,
        error: f64,
    ) -> Result<Epoch, CostError> {
        let backup = params.clone();
        let outcome = self.inner.epoch(cf, params, error)?;

        if outcome.error >= error && self.current + 1 < self.rates.len() {
            self.current += 1;
            self.inner.set_learning_rate(self.rates[self.current]);
            if outcome.error > error {
                *params = backup;
                return Ok(Epoch { error, ..outcome });
            }
        }
        Ok(outcome)
    }

    fn learning_rate(&self) -> Option<f64> {
        Some(self.rates[self.current])
    }
}
