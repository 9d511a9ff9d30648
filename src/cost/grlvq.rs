use super::SeparableCostFunction;
use crate::{
    data::LabeledDataSet,
    error::CostError,
    helpers::close_enough,
    param::{GrlvqParams, OptParam},
};

/// Whether every closed-form derivative is verified against the generic quotient rule.
const CHECK_DERIVATIVES: bool = cfg!(any(debug_assertions, feature = "derivative-check"));
const CHECK_TOLERANCE: f64 = 1e-4;

/// The relative margin cost `(dj - dk) / (dj + dk)` of generalized relevance LVQ, where `dj` is the
/// distance to the nearest prototype of the example's class and `dk` the distance to the nearest
/// prototype of any other class.
#[derive(Debug, Clone)]
pub struct GrlvqCostFunction<D> {
    ds: D,
}

/// Nearest prototypes of one example and their distances.
struct Margin<'a> {
    data: &'a [f64],
    j: usize,
    k: usize,
    dj: f64,
    dk: f64,
}

impl<D: LabeledDataSet> GrlvqCostFunction<D> {
    pub fn new(ds: D) -> Self {
        Self { ds }
    }

    pub fn data_set(&self) -> &D {
        &self.ds
    }

    fn margin(&self, params: &GrlvqParams, idx: usize) -> Result<Margin<'_>, CostError> {
        let data = self.ds.data(idx);
        if data.len() != params.dimensions() {
            return Err(CostError::ShapeMismatch {
                expected: params.dimensions(),
                found: data.len(),
                example: Some(idx),
            });
        }

        let label = self.ds.label(idx);
        let missing = CostError::MissingClass {
            label,
            example: idx,
        };
        // J = same, K = different
        let j = params
            .closest_correct(data, label)
            .ok_or_else(|| missing.clone())?;
        let k = params.closest_incorrect(data, label).ok_or(missing)?;

        let (dj, dk) = (params.dist(j, data), params.dist(k, data));
        if dj + dk == 0. {
            return Err(CostError::Degenerate { example: idx });
        }

        Ok(Margin { data, j, k, dj, dk })
    }
}

impl<D: LabeledDataSet> SeparableCostFunction<GrlvqParams> for GrlvqCostFunction<D> {
    fn size(&self) -> usize {
        self.ds.size()
    }

    fn error_at(&self, params: &GrlvqParams, idx: usize) -> Result<f64, CostError> {
        let Margin { dj, dk, .. } = self.margin(params, idx)?;
        Ok((dj - dk) / (dj + dk))
    }

    fn deriv_into(
        &self,
        params: &GrlvqParams,
        idx: usize,
        out: &mut GrlvqParams,
    ) -> Result<(), CostError> {
        assert_eq!(params.len(), out.len());
        let Margin { data, j, k, dj, dk } = self.margin(params, idx)?;

        // d/dp (dj - dk) / (dj + dk) = 2 (dk dj' - dj dk') / (dj + dk)^2
        let sum = dj + dk;
        let scale = 2. / (sum * sum);
        let (tmp_j, tmp_k) = (scale * dk, -scale * dj);

        let (pj, pk, weights) = (params.prototype(j), params.prototype(k), params.weights());
        for d in 0..params.dimensions() {
            let w = weights[d].max(0.);
            let diff_j = pj[d] - data[d];
            let diff_k = pk[d] - data[d];

            let proto_j = 2. * tmp_j * w * diff_j;
            let proto_k = 2. * tmp_k * w * diff_k;
            // right-hand derivative at zero, negative relevances stay frozen
            let relevance = if weights[d] >= 0. {
                tmp_j * diff_j * diff_j + tmp_k * diff_k * diff_k
            } else {
                0.
            };

            if CHECK_DERIVATIVES {
                let first = |dj_p, dk_p| first_deriv_lvq(dj, dk, dj_p, dk_p);
                verify("gradient", "prototype J", d, proto_j, first(2. * w * diff_j, 0.));
                verify("gradient", "prototype K", d, proto_k, first(0., 2. * w * diff_k));
                if weights[d] >= 0. {
                    let expected = first(diff_j * diff_j, diff_k * diff_k);
                    verify("gradient", "relevance", d, relevance, expected);
                }
            }

            out.prototype_mut(j)[d] += proto_j;
            out.prototype_mut(k)[d] += proto_k;
            out.weights_mut()[d] += relevance;
        }
        Ok(())
    }

    fn hesse_diag_into(
        &self,
        params: &GrlvqParams,
        idx: usize,
        out: &mut GrlvqParams,
    ) -> Result<(), CostError> {
        assert_eq!(params.len(), out.len());
        let Margin { data, j, k, dj, dk } = self.margin(params, idx)?;

        let sum = dj + dk;
        let tmp = 4. / (sum * sum * sum);

        let (pj, pk, weights) = (params.prototype(j), params.prototype(k), params.weights());
        for d in 0..params.dimensions() {
            let w = weights[d].max(0.);
            let diff_j = pj[d] - data[d];
            let diff_k = pk[d] - data[d];
            let (sq_j, sq_k) = (diff_j * diff_j, diff_k * diff_k);

            let proto_j = tmp * dk * w * (sum - 4. * w * sq_j);
            let proto_k = tmp * dj * w * (4. * w * sq_k - sum);
            let relevance = if weights[d] >= 0. {
                tmp * (sq_j + sq_k) * (dj * sq_k - dk * sq_j)
            } else {
                0.
            };

            if CHECK_DERIVATIVES {
                let second = |dj_p, dk_p, dj_pp, dk_pp| {
                    second_deriv_lvq(dj, dk, dj_p, dk_p, dj_pp, dk_pp)
                };
                let expected = second(2. * w * diff_j, 0., 2. * w, 0.);
                verify("curvature", "prototype J", d, proto_j, expected);
                let expected = second(0., 2. * w * diff_k, 0., 2. * w);
                verify("curvature", "prototype K", d, proto_k, expected);
                if weights[d] >= 0. {
                    let expected = second(sq_j, sq_k, 0., 0.);
                    verify("curvature", "relevance", d, relevance, expected);
                }
            }

            out.prototype_mut(j)[d] += proto_j;
            out.prototype_mut(k)[d] += proto_k;
            out.weights_mut()[d] += relevance;
        }
        Ok(())
    }
}

/// First derivative of `(dj - dk) / (dj + dk)` given the derivatives of both distances.
fn first_deriv_lvq(dj: f64, dk: f64, dj_p: f64, dk_p: f64) -> f64 {
    let sum = dj + dk;
    2. * (dk * dj_p - dj * dk_p) / (sum * sum)
}

/// Second derivative of `(dj - dk) / (dj + dk)` by the quotient rule.
fn second_deriv_lvq(dj: f64, dk: f64, dj_p: f64, dk_p: f64, dj_pp: f64, dk_pp: f64) -> f64 {
    let sum = dj + dk;
    let sum2 = sum * sum;
    let sum_p = dj_p + dk_p;
    (dj_pp - dk_pp) / sum - 2. * (dj_p * dj_p - dk_p * dk_p) / sum2
        + (dj - dk) * (2. * sum_p * sum_p / (sum2 * sum) - (dj_pp + dk_pp) / sum2)
}

fn verify(what: &str, target: &str, dim: usize, closed_form: f64, expected: f64) {
    assert!(
        close_enough(closed_form, expected, CHECK_TOLERANCE),
        "Closed-form {} of {} at dimension {} is {}, the quotient rule gives {}",
        what,
        target,
        dim,
        closed_form,
        expected
    );
}
