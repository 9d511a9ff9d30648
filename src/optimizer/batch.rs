use super::*;

/// Takes one step along the gradient of the whole data set every epoch.
#[derive(Debug)]
pub struct Batch<P, B: AlgBuilder> {
    base: OptimizerBase<P>,
    builder: B,
    rule: Option<B::Output>,
}

impl<P, B> Batch<P, B>
where
    P: OptParam,
    B: AlgBuilder + Clone,
{
    pub fn new(builder: B, criteria: StopCriteria) -> Self {
        Self {
            base: OptimizerBase::new(criteria),
            builder,
            rule: None,
        }
    }

    /// The update rule of the current run.
    pub fn rule(&self) -> Option<&B::Output> {
        self.rule.as_ref()
    }
}

impl<P, B> Optimizer<P> for Batch<P, B>
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
    }

    fn epoch(
        &mut self,
        cf: &dyn SeparableCostFunction<P>,
        params: &mut P,
        _error: f64,
    ) -> Result<Epoch, CostError> {
        let len = params.len();
        let Self { builder, rule, .. } = self;
        let rule = rule.get_or_insert_with(|| builder.clone().build(len));

        let mut grad = params.zero();
        let skipped = cf.deriv_sum_into(params, &mut (0..cf.size()), &mut grad)?;
        if rule.uses_curvature() {
            let hesse = cf.hesse_diag(params)?;
            rule.update_with_curvature(params.values_mut(), grad.values(), hesse.values());
        } else {
            rule.update_weights(params.values_mut(), grad.values());
        }

        Ok(Epoch {
            error: cf.error(params)?,
            signal: grad.squared_norm(),
            examples: cf.size(),
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
