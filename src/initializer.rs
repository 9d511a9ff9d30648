use crate::{
    data::LabeledDataSet,
    error::{ConfigError, CostError},
    param::GrlvqParams,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::Normal;

/// Produces starting parameters for a data set. Every class gets the same number of
/// prototypes, listed class by class in ascending label order, and all relevances start at one.
pub trait Initializer {
    fn init<D: LabeledDataSet + ?Sized>(&mut self, ds: &D) -> Result<GrlvqParams, CostError>;
}

fn check_per_class(per_class: usize) -> Result<(), ConfigError> {
    if per_class == 0 {
        return Err(ConfigError::invalid(
            "per_class",
            per_class,
            "at least one prototype per class",
        ));
    }
    Ok(())
}

fn members<D: LabeledDataSet + ?Sized>(ds: &D, class: i32) -> Vec<usize> {
    (0..ds.size()).filter(|&i| ds.label(i) == class).collect()
}

/// Places prototypes around the class means, perturbed with gaussian noise.
#[derive(Debug, Clone)]
pub struct ClassMeans {
    per_class: usize,
    noise: Normal<f64>,
    rng: SmallRng,
}

impl ClassMeans {
    pub fn new(per_class: usize, noise: f64, seed: u64) -> Result<Self, ConfigError> {
        check_per_class(per_class)?;
        let noise = Normal::new(0., noise)
            .map_err(|_| ConfigError::invalid("noise", noise, "a non-negative deviation"))?;
        Ok(Self {
            per_class,
            noise,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl Initializer for ClassMeans {
    fn init<D: LabeledDataSet + ?Sized>(&mut self, ds: &D) -> Result<GrlvqParams, CostError> {
        if ds.size() == 0 {
            return Err(CostError::EmptyDataSet);
        }
        let dims = ds.dimensions();
        let mut prototypes = Vec::new();
        let mut labels = Vec::new();

        for class in ds.classes() {
            let idxs = members(ds, class);
            let mut mean = vec![0.; dims];
            for &i in &idxs {
                mean.iter_mut().zip(ds.data(i)).for_each(|(m, x)| *m += x);
            }
            mean.iter_mut().for_each(|m| *m /= idxs.len() as f64);

            for _ in 0..self.per_class {
                let rng = &mut self.rng;
                let noise = &self.noise;
                prototypes.push(mean.iter().map(|m| m + rng.sample(noise)).collect::<Vec<_>>());
                labels.push(class);
            }
        }
        GrlvqParams::new(&prototypes, labels, &vec![1.; dims])
    }
}

/// Uses randomly drawn members of every class as prototypes.
#[derive(Debug, Clone)]
pub struct RandomSamples {
    per_class: usize,
    rng: SmallRng,
}

impl RandomSamples {
    pub fn new(per_class: usize, seed: u64) -> Result<Self, ConfigError> {
        check_per_class(per_class)?;
        Ok(Self {
            per_class,
            rng: SmallRng::seed_from_u64(seed),
        })
    }
}

impl Initializer for RandomSamples {
    fn init<D: LabeledDataSet + ?Sized>(&mut self, ds: &D) -> Result<GrlvqParams, CostError> {
        if ds.size() == 0 {
            return Err(CostError::EmptyDataSet);
        }
        let mut prototypes = Vec::new();
        let mut labels = Vec::new();

        for class in ds.classes() {
            let idxs = members(ds, class);
            for _ in 0..self.per_class {
                let pick = idxs[self.rng.gen_range(0, idxs.len())];
                prototypes.push(ds.data(pick).to_vec());
                labels.push(class);
            }
        }
        GrlvqParams::new(&prototypes, labels, &vec![1.; ds.dimensions()])
    }
}
