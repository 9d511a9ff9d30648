use super::*;
use crate::helpers::IndexShuffler;

/// Visits the examples in a freshly shuffled order every epoch and steps along the mean
/// gradient of every minibatch. The last minibatch of an epoch may be smaller than the rest.
/// Degenerate examples don't count towards the mean.
///
/// The shuffling generator is reseeded at the start of every run, so optimizing the same
/// problem twice yields identical results.
#[derive(Debug)]
pub struct Stochastic<P, B: AlgBuilder> {
    base: OptimizerBase<P>,
    builder: B,
    rule: Option<B::Output>,
    batch_size: usize,
    seed: u64,
    shuffler: Option<IndexShuffler>,
}

impl<P, B> Stochastic<P, B>
where
    P: OptParam,
    B: AlgBuilder + Clone,
{
    /// A `batch_size` of `usize::MAX` (or anything larger than the data set) processes all
    /// examples in a single minibatch.
    pub fn new(builder: B, batch_size: usize, seed: u64, criteria: StopCriteria) -> Self {
        Self {
            base: OptimizerBase::new(criteria),
            builder,
            rule: None,
            batch_size,
            seed,
            shuffler: None,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl<P, B> Optimizer<P> for Stochastic<P, B>
where
    P: OptParam,
    B: AlgBuilder + Clone,
{
    fn base(&self) -> &OptimizerBase<P> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OptimizerBase<P> {
        &mut self.base
    }

    fn begin(&mut self, len: usize) {
        self.rule = Some(self.builder.clone().build(len));
        self.shuffler = None;
    }

    fn epoch(
        &mut self,
        cf: &dyn SeparableCostFunction<P>,
        params: &mut P,
        _error: f64,
    ) -> Result<Epoch, CostError> {
        let len = params.len();
        let size = cf.size();
        let batch = self.batch_size.clamp(1, size.max(1));

        let Self {
            builder,
            rule,
            shuffler,
            seed,
            ..
        } = self;
        let rule = rule.get_or_insert_with(|| builder.clone().build(len));
        if shuffler.as_ref().map_or(false, |s| s.len() != size) {
            *shuffler = None;
        }
        let order = shuffler
            .get_or_insert_with(|| IndexShuffler::new(size, *seed))
            .shuffle();

        let mut total = params.zero();
        let mut grad = params.zero();
        let mut hesse = if rule.uses_curvature() {
            Some(params.zero())
        } else {
            None
        };

        let mut skipped = 0;
        for chunk in order.chunks(batch) {
            grad.clear();
            let left_out = cf.deriv_sum_into(params, &mut chunk.iter().copied(), &mut grad)?;
            skipped += left_out;
            if left_out == chunk.len() {
                continue;
            }
            let scale = 1. / (chunk.len() - left_out) as f64;
            total.add_s(&grad);
            grad.multiply_s(scale);

            match hesse.as_mut() {
                Some(hesse) => {
                    hesse.clear();
                    cf.hesse_diag_sum_into(params, &mut chunk.iter().copied(), hesse)?;
                    hesse.multiply_s(scale);
                    rule.update_with_curvature(params.values_mut(), grad.values(), hesse.values());
                }
                None => rule.update_weights(params.values_mut(), grad.values()),
            }
        }

        Ok(Epoch {
            error: cf.error(params)?,
            signal: total.squared_norm(),
            examples: size,
            skipped,
        })
    }

    fn learning_rate(&self) -> Option<f64> {
        self.rule.as_ref().and_then(|r| r.learning_rate())
    }

    fn set_learning_rate(&mut self, rate: f64) {
        if let Some(rule) = self.rule.as_mut() {
            rule.set_learning_rate(rate);
        }
    }
}
