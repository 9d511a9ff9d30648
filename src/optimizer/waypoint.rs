use super::*;
use std::collections::VecDeque;

/// Keeps the last `hist` parameter snapshots of another optimizer. Once the window is full,
/// whenever the average of the window has a lower error than the newest snapshot the average
/// takes its place and the inner learning rate is divided by `loss`. Otherwise the rate is
/// multiplied by `gain`. Optimizers without a learning rate are left untouched.
#[derive(Debug)]
pub struct WaypointAverage<P: OptParam> {
    base: OptimizerBase<P>,
    inner: Box<AnyOptimizer<P>>,
    hist: usize,
    loss: f64,
    gain: f64,
    history: VecDeque<P>,
}

impl<P: OptParam> WaypointAverage<P> {
    pub fn new(
        inner: AnyOptimizer<P>,
        hist: usize,
        loss: f64,
        gain: f64,
        criteria: StopCriteria,
    ) -> Result<Self, ConfigError> {
        if hist == 0 {
            return Err(ConfigError::invalid("hist", hist, "a window of at least one"));
        }
        Ok(Self {
            base: OptimizerBase::new(criteria),
            inner: Box::new(inner),
            hist,
            loss,
            gain,
            history: VecDeque::with_capacity(hist),
        })
    }

    pub fn inner(&self) -> &AnyOptimizer<P> {
        &self.inner
    }

    fn average(&self) -> Option<P> {
        let mut iter = self.history.iter();
        let mut avg = iter.next()?.clone();
        iter.for_each(|p| avg.add_s(p));
        avg.multiply_s(1. / self.history.len() as f64);
        Some(avg)
    }
}

impl<P: OptParam> Optimizer<P> for WaypointAverage<P> {
    fn base(&self) -> &OptimizerBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OptimizerBase<P> {
        &mut self.base
    }

    fn begin(&mut self, len: usize) {
        self.inner.begin(len);
        self.history.clear();
    }

    fn epoch(
        &mut self,
        cf: &dyn SeparableCostFunction<P>,
        params: &mut P,
        error: f64,
    ) -> Result<Epoch, CostError> {
        let mut outcome = self.inner.epoch(cf, params, error)?;

        if self.history.len() == self.hist {
            self.history.pop_front();
        }
        self.history.push_back(params.clone());
        if self.history.len() < self.hist {
            return Ok(outcome);
        }

        if let Some(avg) = self.average() {
            let avg_error = cf.error(&avg)?;
            let rate = self.inner.learning_rate();
            if avg_error < outcome.error {
                params.clone_from(&avg);
                if let Some(newest) = self.history.back_mut() {
                    *newest = avg;
                }
                outcome.error = avg_error;
                if let Some(rate) = rate {
                    self.inner.set_learning_rate(rate / self.loss);
                }
            } else if let Some(rate) = rate {
                self.inner.set_learning_rate(rate * self.gain);
            }
        }
        Ok(outcome)
    }

    fn learning_rate(&self) -> Option<f64> {
        self.inner.learning_rate()
    }

    fn set_learning_rate(&mut self, rate: f64) {
        self.inner.set_learning_rate(rate);
    }
}
