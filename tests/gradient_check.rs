use rusty_grlvq::{
    cost::{GrlvqCostFunction, SeparableCostFunction},
    data::LabeledDataSet,
    param::{GrlvqParams, OptParam},
};

mod common;
use common::*;

fn nudged(params: &GrlvqParams, idx: usize, delta: f64) -> GrlvqParams {
    let mut out = params.clone();
    out.values_mut()[idx] += delta;
    out
}

fn assert_close(expected: f64, found: f64, tolerance: f64, what: &str, idx: usize) {
    let scale = f64::max(1., expected.abs().max(found.abs()));
    assert!(
        (expected - found).abs() <= tolerance * scale,
        "{} of value {} differs: finite difference {}, closed form {}",
        what,
        idx,
        expected,
        found
    );
}

#[test]
fn gradient_matches_finite_differences() {
    let ds = blobs();
    let cf = GrlvqCostFunction::new(&ds);
    let params = rich_params();
    let grad = cf.deriv(&params).unwrap();

    let h = 1e-6;
    for i in 0..params.len() {
        let up = cf.error(&nudged(&params, i, h)).unwrap();
        let down = cf.error(&nudged(&params, i, -h)).unwrap();
        assert_close((up - down) / (2. * h), grad.values()[i], 1e-5, "gradient", i);
    }
}

#[test]
fn curvature_matches_finite_differences() {
    let ds = blobs();
    let cf = GrlvqCostFunction::new(&ds);
    let params = rich_params();
    let hesse = cf.hesse_diag(&params).unwrap();

    let h = 1e-5;
    for i in 0..params.len() {
        let up = cf.deriv(&nudged(&params, i, h)).unwrap().values()[i];
        let down = cf.deriv(&nudged(&params, i, -h)).unwrap().values()[i];
        assert_close((up - down) / (2. * h), hesse.values()[i], 1e-4, "curvature", i);
    }
}

#[test]
fn aggregates_are_sums_of_examples() {
    let ds = blobs();
    let cf = GrlvqCostFunction::new(&ds);
    let params = rich_params();

    let mut error = 0.;
    let mut grad = params.zero();
    let mut hesse = params.zero();
    for i in 0..ds.size() {
        error += cf.error_at(&params, i).unwrap();
        grad.add_s(&cf.deriv_at(&params, i).unwrap());
        hesse.add_s(&cf.hesse_diag_at(&params, i).unwrap());
    }

    assert_close(cf.error(&params).unwrap(), error, 1e-12, "error", 0);
    let total_grad = cf.deriv(&params).unwrap();
    let total_hesse = cf.hesse_diag(&params).unwrap();
    for i in 0..params.len() {
        assert_close(total_grad.values()[i], grad.values()[i], 1e-12, "gradient", i);
        assert_close(total_hesse.values()[i], hesse.values()[i], 1e-12, "curvature", i);
    }
}

#[test]
fn swapping_prototype_labels_negates_the_error() {
    let ds = toy_data();
    let cf = GrlvqCostFunction::new(&ds);
    let params = GrlvqParams::new(&[[-1., 0.3], [0.7, -0.2]], vec![0, 1], &[1., 0.5]).unwrap();
    let swapped = GrlvqParams::new(&[[-1., 0.3], [0.7, -0.2]], vec![1, 0], &[1., 0.5]).unwrap();

    for i in 0..ds.size() {
        let a = cf.error_at(&params, i).unwrap();
        let b = cf.error_at(&swapped, i).unwrap();
        assert!((a + b).abs() < 1e-12, "example {}: {} vs {}", i, a, b);
        assert!(a.abs() <= 1.);
    }
}

#[test]
fn negative_relevances_are_frozen() {
    let ds = blobs();
    let cf = GrlvqCostFunction::new(&ds);
    let mut params = rich_params();
    params.weights_mut()[2] = -0.5;

    let grad = cf.deriv(&params).unwrap();
    let hesse = cf.hesse_diag(&params).unwrap();
    assert_eq!(grad.weights()[2], 0.);
    assert_eq!(hesse.weights()[2], 0.);
    for p in 0..params.prototype_count() {
        assert_eq!(grad.prototype(p)[2], 0.);
    }
}
