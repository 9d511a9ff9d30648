pub use grlvq::GrlvqCostFunction;
pub mod grlvq;

use crate::{error::CostError, param::OptParam};

/// Turns a degenerate example into `None` so it can be left out of an aggregate.
/// Every other error is passed on.
pub fn skip_degenerate<T>(result: Result<T, CostError>) -> Result<Option<T>, CostError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(CostError::Degenerate { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// A cost that is a sum of independent per-example terms.
///
/// Implementors provide the per-example error and accumulate per-example derivatives
/// into a caller supplied buffer. The aggregate and allocating variants are derived from those.
///
/// Per-example methods fail on a degenerate example. The aggregates leave such examples out,
/// and fail only on errors that affect the whole problem.
pub trait SeparableCostFunction<P: OptParam> {
    /// Number of examples the cost is summed over.
    fn size(&self) -> usize;

    /// Cost contribution of the example at `idx`.
    fn error_at(&self, params: &P, idx: usize) -> Result<f64, CostError>;

    /// Adds the gradient of the example's cost to `out`.
    fn deriv_into(&self, params: &P, idx: usize, out: &mut P) -> Result<(), CostError>;

    /// Adds the diagonal of the example's Hessian to `out`.
    fn hesse_diag_into(&self, params: &P, idx: usize, out: &mut P) -> Result<(), CostError>;

    /// Total cost over all examples.
    fn error(&self, params: &P) -> Result<f64, CostError> {
        let mut sum = 0.;
        for i in 0..self.size() {
            if let Some(e) = skip_degenerate(self.error_at(params, i))? {
                sum += e;
            }
        }
        Ok(sum)
    }

    /// Gradient of the total cost.
    fn deriv(&self, params: &P) -> Result<P, CostError> {
        let mut out = params.zero();
        self.deriv_sum_into(params, &mut (0..self.size()), &mut out)?;
        Ok(out)
    }

    /// Adds the gradients of the examples in `indices` to `out`, leaving out degenerate ones.
    /// Returns how many were left out.
    fn deriv_sum_into(
        &self,
        params: &P,
        indices: &mut dyn Iterator<Item = usize>,
        out: &mut P,
    ) -> Result<usize, CostError> {
        let mut skipped = 0;
        for i in indices {
            if skip_degenerate(self.deriv_into(params, i, out))?.is_none() {
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    /// Same as [deriv_sum_into](SeparableCostFunction::deriv_sum_into) for the Hessian diagonal.
    fn hesse_diag_sum_into(
        &self,
        params: &P,
        indices: &mut dyn Iterator<Item = usize>,
        out: &mut P,
    ) -> Result<usize, CostError> {
        let mut skipped = 0;
        for i in indices {
            if skip_degenerate(self.hesse_diag_into(params, i, out))?.is_none() {
                skipped += 1;
            }
        }
        Ok(skipped)
    }

    /// Gradient of a single example's cost.
    fn deriv_at(&self, params: &P, idx: usize) -> Result<P, CostError> {
        let mut out = params.zero();
        self.deriv_into(params, idx, &mut out)?;
        Ok(out)
    }

    /// Diagonal of the total cost's Hessian.
    fn hesse_diag(&self, params: &P) -> Result<P, CostError> {
        let mut out = params.zero();
        self.hesse_diag_sum_into(params, &mut (0..self.size()), &mut out)?;
        Ok(out)
    }

    fn hesse_diag_at(&self, params: &P, idx: usize) -> Result<P, CostError> {
        let mut out = params.zero();
        self.hesse_diag_into(params, idx, &mut out)?;
        Ok(out)
    }
}
