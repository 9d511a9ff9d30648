#![allow(dead_code)]

use rusty_grlvq::{data::PackedDataSet, param::GrlvqParams};
use std::f64::consts::PI;

fn center(class: usize) -> (f64, f64) {
    let angle = 2. * PI * class as f64 / 3.;
    (2. * angle.cos(), 2. * angle.sin())
}

/// Two points left of the origin with label 0, two right of it with label 1.
pub fn toy_data() -> PackedDataSet {
    PackedDataSet::from_tuples(vec![
        ([-2., 0.5], 0),
        ([-2., -0.5], 0),
        ([2., 0.5], 1),
        ([2., -0.5], 1),
    ])
    .unwrap()
}

pub fn toy_params() -> GrlvqParams {
    GrlvqParams::with_uniform_weights(&[[-0.5, 0.], [0.5, 0.]], vec![0, 1]).unwrap()
}

/// Three classes of ten points arranged around a circle. The third feature carries no class
/// information.
pub fn blobs() -> PackedDataSet {
    let mut data = Vec::new();
    for class in 0..3 {
        let (cx, cy) = center(class);
        for i in 0..10 {
            let a = (((i * 7) % 11) as f64 / 11. - 0.5) * 1.2;
            let b = (((i * 5) % 13) as f64 / 13. - 0.5) * 1.2;
            let c = (((i * 3 + class) % 7) as f64 / 7. - 0.5) * 2.;
            data.push(([cx + a, cy + b, c], class as i32));
        }
    }
    PackedDataSet::from_tuples(data).unwrap()
}

/// One prototype per class, pulled towards the origin.
pub fn blob_params() -> GrlvqParams {
    let (protos, labels): (Vec<_>, Vec<_>) = (0..3)
        .map(|class| {
            let (cx, cy) = center(class);
            ([0.3 * cx + 0.2, 0.3 * cy - 0.1, 0.5], class as i32)
        })
        .unzip();
    GrlvqParams::with_uniform_weights(&protos, labels).unwrap()
}

/// Two prototypes per class and uneven relevances.
pub fn rich_params() -> GrlvqParams {
    let mut protos = Vec::new();
    let mut labels = Vec::new();
    for class in 0..3 {
        let (cx, cy) = center(class);
        protos.push([0.3 * cx + 0.2, 0.3 * cy - 0.1, 0.5]);
        protos.push([0.3 * cx - 0.3, 0.3 * cy + 0.2, -0.4]);
        labels.extend_from_slice(&[class as i32, class as i32]);
    }
    GrlvqParams::new(&protos, labels, &[0.8, 1.3, 0.6]).unwrap()
}
