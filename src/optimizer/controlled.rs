use super::*;

/// Bold driver step size control around another optimizer. After an epoch that lowered the
/// error the rate is multiplied by `gain`. An epoch that raised it is undone and the rate is
/// divided by `loss`, so the reported error never increases. An unchanged error keeps the rate.
///
/// Only the stop criteria of the wrapper apply, those of the inner optimizer are ignored.
#[derive(Debug)]
pub struct Controlled<P, D> {
    base: OptimizerBase<P>,
    inner: D,
    initial_rate: f64,
    rate: f64,
    loss: f64,
    gain: f64,
}

impl<P: OptParam, D: Optimizer<P>> Controlled<P, D> {
    pub fn new(inner: D, rate: f64, loss: f64, gain: f64, criteria: StopCriteria) -> Self {
        Self {
            base: OptimizerBase::new(criteria),
            inner,
            initial_rate: rate,
            rate,
            loss,
            gain,
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<P: OptParam, D: Optimizer<P>> Optimizer<P> for Controlled<P, D> {
    fn base(&self) -> &OptimizerBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OptimizerBase<P> {
        &mut self.base
    }

    fn begin(&mut self, len: usize) {
        self.inner.begin(len);
        self.rate = self.initial_rate;
        self.inner.set_learning_rate(self.rate);
    }

    fn epoch(
        &mut self,
        cf: &dyn SeparableCostFunction<P>,
        params: &mut P,
        error: f64,
    ) -> Result<Epoch, CostError> {
        let backup = params.clone();
        let outcome = self.inner.epoch(cf, params, error)?;

        if outcome.error > error {
            *params = backup;
            self.rate /= self.loss;
            self.inner.set_learning_rate(self.rate);
            Ok(Epoch { error, ..outcome })
        } else {
            if outcome.error < error {
                self.rate *= self.gain;
                self.inner.set_learning_rate(self.rate);
            }
            Ok(outcome)
        }
    }

    fn learning_rate(&self) -> Option<f64> {
        Some(self.rate)
    }

    fn set_learning_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.inner.set_learning_rate(rate);
    }
}
