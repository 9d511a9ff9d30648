pub use adadelta::{Adadelta, AdadeltaBuilder};
pub mod adadelta;

pub use adam::{Adam, AdamBuilder};
pub mod adam;

pub use gradient_descent::{GradDescBuilder, GradientDescent};
pub mod gradient_descent;

pub use rmsprop::{RmsProp, RmsPropBuilder};
pub mod rmsprop;

pub use rprop::{Rprop, RpropBuilder};
pub mod rprop;

pub use vsgd::{Vsgd, VsgdBuilder};
pub mod vsgd;

pub use batch::Batch;
pub mod batch;

pub use stochastic::Stochastic;
pub mod stochastic;

pub use controlled::Controlled;
pub mod controlled;

pub use slow_start::{SlowStart, DEFAULT_RATES};
pub mod slow_start;

pub use waypoint::WaypointAverage;
pub mod waypoint;

use crate::{
    config::Arguments,
    cost::SeparableCostFunction,
    error::{ConfigError, CostError},
    logger::{Logger, MockLogger},
    param::OptParam,
};
use enum_dispatch::enum_dispatch;
use std::fmt::Debug;

/// This trait provides interface which must be implemented by update rules
/// so that they can be driven by the optimizers.
pub trait UpdateRule: Debug {
    /// Modifies the weights based on the gradients such that a minimum can be reached.
    fn update_weights(&mut self, weights: &mut [f64], gradients: &[f64]);

    /// Whether the rule needs the diagonal of the Hessian. If so the optimizers call
    /// [update_with_curvature](UpdateRule::update_with_curvature) instead of `update_weights`.
    fn uses_curvature(&self) -> bool {
        false
    }

    fn update_with_curvature(&mut self, weights: &mut [f64], gradients: &[f64], _curvature: &[f64]) {
        self.update_weights(weights, gradients)
    }

    /// The global learning rate, if the rule has one.
    fn learning_rate(&self) -> Option<f64> {
        None
    }

    fn set_learning_rate(&mut self, _rate: f64) {}
}

/// Structs implementing this trait can be constructed into an instance of UpdateRule
/// by being provided the length of the data they work on.
pub trait AlgBuilder {
    type Output: UpdateRule;
    /// Receives data length and constructs Self::Output
    fn build(self, len: usize) -> Self::Output;
}

/// When to stop iterating. Negative `epsilon` and `ns_max` disable their criterion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StopCriteria {
    /// Minimum squared gradient norm needed to continue.
    pub epsilon: f64,
    /// Maximum number of epochs.
    pub t_max: i64,
    /// Maximum number of processed examples.
    pub ns_max: i64,
}

impl Default for StopCriteria {
    fn default() -> Self {
        Self {
            epsilon: -1.,
            t_max: 200,
            ns_max: -1,
        }
    }
}

impl StopCriteria {
    pub fn new(epsilon: f64, t_max: i64, ns_max: i64) -> Self {
        Self {
            epsilon,
            t_max,
            ns_max,
        }
    }

    /// Reads `epsilon`, `tmax` and `nsmax`.
    pub fn from_args(args: &Arguments) -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self::new(
            args.f64_or("epsilon", default.epsilon)?,
            args.i64_or("tmax", default.t_max)?,
            args.i64_or("nsmax", default.ns_max)?,
        ))
    }

    /// Returns true if another epoch should run after `epoch` finished epochs, with `signal`
    /// being the last squared gradient norm and `processed` the examples seen so far.
    pub fn proceed(&self, epoch: usize, signal: f64, processed: u64) -> bool {
        (epoch as i64) < self.t_max
            && signal >= self.epsilon
            && (self.ns_max < 0 || (processed as i64) < self.ns_max)
    }
}

/// What a single epoch produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Epoch {
    /// Cost at the parameters the epoch left behind.
    pub error: f64,
    /// Squared norm of the gradient the epoch stepped along.
    pub signal: f64,
    /// Number of examples processed.
    pub examples: usize,
    /// Examples left out of the updates because their margin was degenerate.
    pub skipped: usize,
}

/// State shared by all optimizers: the stop criteria and the logger notified after every epoch.
pub struct OptimizerBase<P> {
    pub criteria: StopCriteria,
    logger: Box<dyn Logger<P>>,
}

impl<P> OptimizerBase<P> {
    pub fn new(criteria: StopCriteria) -> Self {
        Self {
            criteria,
            logger: Box::new(MockLogger),
        }
    }

    pub fn notify(&mut self, epoch: usize, params: &P, error: f64) {
        self.logger.epoch_error(epoch, params, error);
    }

    pub fn notify_skipped(&mut self, epoch: usize, count: usize) {
        self.logger.skipped_examples(epoch, count);
    }
}

impl<P> Debug for OptimizerBase<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizerBase")
            .field("criteria", &self.criteria)
            .finish()
    }
}

/// An iterative minimizer of separable cost functions.
///
/// Implementors only provide a single epoch of their update rule, the iteration itself and
/// the stop criteria are shared through [optimize](Optimizer::optimize).
#[enum_dispatch]
pub trait Optimizer<P: OptParam> {
    /// get immutable reference to the OptimizerBase object
    fn base(&self) -> &OptimizerBase<P>;
    /// get mutable reference to the OptimizerBase object
    fn base_mut(&mut self) -> &mut OptimizerBase<P>;

    /// Reset all internal state before a run over parameters with `len` values.
    fn begin(&mut self, len: usize);

    /// Run one epoch starting from `params` whose cost is `error`. On success `params`
    /// holds the result of the whole epoch.
    fn epoch(
        &mut self,
        cf: &dyn SeparableCostFunction<P>,
        params: &mut P,
        error: f64,
    ) -> Result<Epoch, CostError>;

    fn learning_rate(&self) -> Option<f64> {
        None
    }

    fn set_learning_rate(&mut self, _rate: f64) {}

    fn criteria(&self) -> StopCriteria {
        self.base().criteria
    }

    fn set_logger(&mut self, logger: Box<dyn Logger<P>>) {
        self.base_mut().logger = logger;
    }

    /// Minimize `cf` starting from a copy of `init`. Runs epochs until one of the stop criteria
    /// fires, notifying the logger after each of them.
    fn optimize(&mut self, cf: &dyn SeparableCostFunction<P>, init: &P) -> Result<P, CostError> {
        let mut params = init.clone();
        let criteria = self.criteria();
        if !criteria.proceed(0, f64::INFINITY, 0) {
            return Ok(params);
        }

        self.begin(params.len());
        let mut error = cf.error(&params)?;
        let mut signal = f64::INFINITY;
        let mut processed = 0u64;
        let mut epoch = 0;

        while criteria.proceed(epoch, signal, processed) {
            let outcome = self.epoch(cf, &mut params, error)?;
            error = outcome.error;
            signal = outcome.signal;
            processed += outcome.examples as u64;
            if outcome.skipped > 0 {
                self.base_mut().notify_skipped(epoch, outcome.skipped);
            }
            self.base_mut().notify(epoch, &params, error);
            epoch += 1;
        }
        Ok(params)
    }
}

pub type Bgd<P> = Batch<P, GradDescBuilder>;
pub type RpropOptimizer<P> = Batch<P, RpropBuilder>;
pub type Sgd<P> = Stochastic<P, GradDescBuilder>;
pub type AdamOptimizer<P> = Stochastic<P, AdamBuilder>;
pub type AdadeltaOptimizer<P> = Stochastic<P, AdadeltaBuilder>;
pub type RmsPropOptimizer<P> = Stochastic<P, RmsPropBuilder>;
pub type VsgdOptimizer<P> = Stochastic<P, VsgdBuilder>;
pub type ControlledBgd<P> = Controlled<P, Bgd<P>>;
pub type ControlledSgd<P> = Controlled<P, Sgd<P>>;

/// Every optimizer the factory can construct.
#[enum_dispatch(Optimizer<P>)]
#[derive(Debug)]
pub enum AnyOptimizer<P: OptParam> {
    Bgd(Bgd<P>),
    Rprop(RpropOptimizer<P>),
    Sgd(Sgd<P>),
    Adam(AdamOptimizer<P>),
    Adadelta(AdadeltaOptimizer<P>),
    RmsProp(RmsPropOptimizer<P>),
    Vsgd(VsgdOptimizer<P>),
    ControlledBgd(ControlledBgd<P>),
    ControlledSgd(ControlledSgd<P>),
    SlowStart(SlowStart<P>),
    WaypointAverage(WaypointAverage<P>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_criteria() {
        let criteria = StopCriteria::new(0.5, 3, -1);
        assert!(criteria.proceed(0, f64::INFINITY, 1000));
        assert!(criteria.proceed(2, 0.5, 0));
        assert!(!criteria.proceed(3, 1., 0));
        assert!(!criteria.proceed(1, 0.4, 0));

        let criteria = StopCriteria::new(-1., 200, 10);
        assert!(criteria.proceed(5, 0., 9));
        assert!(!criteria.proceed(5, 0., 10));
    }

    #[test]
    fn non_positive_t_max_never_starts() {
        assert!(!StopCriteria::new(-1., 0, -1).proceed(0, f64::INFINITY, 0));
        assert!(!StopCriteria::new(-1., -5, -1).proceed(0, f64::INFINITY, 0));
    }

    #[test]
    fn criteria_from_args() {
        let args = Arguments::new().set("tmax", 10).set("epsilon", "1e-3");
        let criteria = StopCriteria::from_args(&args).unwrap();
        assert_eq!(criteria, StopCriteria::new(1e-3, 10, -1));
    }
}
