//! Construction of optimizers by name from [Arguments](crate::config::Arguments).
//!
//! Names are matched after canonicalization, so `"wa-bgd"`, `"WA_BGD"` and `"wabgd"` all
//! select the same optimizer.

use crate::{
    config::Arguments,
    error::ConfigError,
    optimizer::{
        AdadeltaBuilder, AdamBuilder, AnyOptimizer, Batch, Controlled, GradDescBuilder,
        RmsPropBuilder, RpropBuilder, SlowStart, Stochastic, StopCriteria, VsgdBuilder,
        WaypointAverage, DEFAULT_RATES,
    },
    param::OptParam,
};

/// Builds an optimizer from its arguments.
pub type Constructor<P> = fn(&Arguments) -> Result<AnyOptimizer<P>, ConfigError>;

const MINIBATCH: usize = 32;
/// Plain SGD and the optimizers built on it step after every example unless told otherwise.
const SINGLE: usize = 1;
const FULL_BATCH: usize = usize::MAX;

/// Uppercases the name and strips punctuation and whitespace.
pub fn canonicalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Looks up the constructor registered under `name`.
pub fn constructor<P: OptParam>(name: &str) -> Option<Constructor<P>> {
    let ctor: Constructor<P> = match canonicalize(name).as_str() {
        "BGD" => bgd,
        "SGD" => sgd,
        "WABGD" => wa_bgd,
        "WASGD" => wa_sgd,
        "WA" => wa,
        "CONTROLLEDBGD" => controlled_bgd,
        "CONTROLLEDSGD" => controlled_sgd,
        "SLOWSTARTSGD" => slow_start_sgd,
        "VSGD" => |a| vsgd(a, MINIBATCH),
        "VSGDBATCH" => |a| vsgd(a, FULL_BATCH),
        "ADADELTA" => |a| adadelta(a, MINIBATCH),
        "ADADELTABATCH" => |a| adadelta(a, FULL_BATCH),
        "ADAM" => |a| adam(a, MINIBATCH),
        "ADAMBATCH" => |a| adam(a, FULL_BATCH),
        "RPROP" => rprop,
        "RMSPROP" => |a| rmsprop(a, MINIBATCH),
        "RMSPROPBATCH" => |a| rmsprop(a, FULL_BATCH),
        _ => return None,
    };
    Some(ctor)
}

/// Creates the optimizer named by the `opt` argument.
pub fn create_optimizer<P: OptParam>(args: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    create_from_name(args.str("opt")?, args)
}

pub fn create_from_name<P: OptParam>(
    name: &str,
    args: &Arguments,
) -> Result<AnyOptimizer<P>, ConfigError> {
    let ctor = constructor(name).ok_or_else(|| ConfigError::UnknownOptimizer(canonicalize(name)))?;
    ctor(args)
}

fn criteria(a: &Arguments) -> Result<StopCriteria, ConfigError> {
    StopCriteria::from_args(a)
}

fn hist(a: &Arguments, default: Option<u64>) -> Result<usize, ConfigError> {
    let hist = match default {
        Some(default) => a.u64_or("hist", default)?,
        None => a.u64("hist")?,
    };
    Ok(usize::try_from(hist).unwrap_or(usize::MAX))
}

fn bgd<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = GradDescBuilder::new().l_rate(a.f64("rate")?);
    Ok(AnyOptimizer::Bgd(Batch::new(rule, criteria(a)?)))
}

fn sgd<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = GradDescBuilder::new().l_rate(a.f64("rate")?);
    Ok(AnyOptimizer::Sgd(Stochastic::new(
        rule,
        a.batch_size_or("batchSize", SINGLE)?,
        a.u64_or("seed", 1)?,
        criteria(a)?,
    )))
}

fn wa_bgd<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = GradDescBuilder::new().l_rate(a.f64_or("rate", 1.)?);
    let inner = AnyOptimizer::Bgd(Batch::new(rule, StopCriteria::default()));
    let (loss, gain) = (a.f64_or("loss", 1.5)?, a.f64_or("gain", 1.1)?);
    let opt = WaypointAverage::new(inner, hist(a, Some(5))?, loss, gain, criteria(a)?)?;
    Ok(AnyOptimizer::WaypointAverage(opt))
}

fn wa_sgd<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = GradDescBuilder::new().l_rate(a.f64("rate")?);
    let (batch, seed) = (a.batch_size_or("batchSize", SINGLE)?, a.u64_or("seed", 1)?);
    let inner = AnyOptimizer::Sgd(Stochastic::new(rule, batch, seed, StopCriteria::default()));
    let (loss, gain) = (a.f64_or("loss", 1.)?, a.f64_or("gain", 1.)?);
    let opt = WaypointAverage::new(inner, hist(a, None)?, loss, gain, criteria(a)?)?;
    Ok(AnyOptimizer::WaypointAverage(opt))
}

/// Waypoint averaging around the optimizer named by `base`, without rate control.
fn wa<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let base = a.str("base")?;
    if canonicalize(base) == "WA" {
        return Err(ConfigError::invalid("base", base, "an optimizer other than WA"));
    }
    let inner = create_from_name(base, a)?;
    let opt = WaypointAverage::new(inner, hist(a, None)?, 1., 1., criteria(a)?)?;
    Ok(AnyOptimizer::WaypointAverage(opt))
}

fn controlled_bgd<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rate = a.f64("rate")?;
    let inner = Batch::new(GradDescBuilder::new().l_rate(rate), StopCriteria::default());
    let (loss, gain) = (a.f64("loss")?, a.f64("gain")?);
    let opt = Controlled::new(inner, rate, loss, gain, criteria(a)?);
    Ok(AnyOptimizer::ControlledBgd(opt))
}

fn controlled_sgd<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rate = a.f64("rate")?;
    let rule = GradDescBuilder::new().l_rate(rate);
    let (batch, seed) = (a.batch_size_or("batchSize", SINGLE)?, a.u64_or("seed", 1)?);
    let inner = Stochastic::new(rule, batch, seed, StopCriteria::default());
    let (loss, gain) = (a.f64("loss")?, a.f64("gain")?);
    let opt = Controlled::new(inner, rate, loss, gain, criteria(a)?);
    Ok(AnyOptimizer::ControlledSgd(opt))
}

fn slow_start_sgd<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rates = a.f64_list_or("rates", &DEFAULT_RATES)?;
    Ok(AnyOptimizer::SlowStart(SlowStart::new(
        rates,
        a.batch_size_or("batchSize", SINGLE)?,
        a.u64("seed")?,
        criteria(a)?,
    )?))
}

fn vsgd<P: OptParam>(a: &Arguments, batch: usize) -> Result<AnyOptimizer<P>, ConfigError> {
    let batch = a.batch_size_or("batchSize", batch)?;
    let seed = a.u64_or("seed", 1)?;
    let opt = Stochastic::new(VsgdBuilder::new(), batch, seed, criteria(a)?);
    Ok(AnyOptimizer::Vsgd(opt))
}

fn adadelta<P: OptParam>(a: &Arguments, batch: usize) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = AdadeltaBuilder::new().rho(a.f64_or("rho", 0.95)?);
    let batch = a.batch_size_or("batchSize", batch)?;
    let opt = Stochastic::new(rule, batch, a.u64("seed")?, criteria(a)?);
    Ok(AnyOptimizer::Adadelta(opt))
}

fn adam<P: OptParam>(a: &Arguments, batch: usize) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = AdamBuilder::new()
        .l_rate(a.f64_or("alpha", 0.001)?)
        .beta1(a.f64_or("beta1", 0.9)?)
        .beta2(a.f64_or("beta2", 0.999)?);
    let batch = a.batch_size_or("batchSize", batch)?;
    let opt = Stochastic::new(rule, batch, a.u64("seed")?, criteria(a)?);
    Ok(AnyOptimizer::Adam(opt))
}

fn rprop<P: OptParam>(a: &Arguments) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = RpropBuilder::new()
        .init_delta(a.f64_or("initDelta", 0.1)?)
        .max_delta(a.f64_or("maxDelta", 50.)?)
        .min_delta(a.f64_or("minDelta", 1e-6)?)
        .loss(a.f64_or("loss", 0.5)?)
        .gain(a.f64_or("gain", 1.2)?);
    Ok(AnyOptimizer::Rprop(Batch::new(rule, criteria(a)?)))
}

fn rmsprop<P: OptParam>(a: &Arguments, batch: usize) -> Result<AnyOptimizer<P>, ConfigError> {
    let rule = RmsPropBuilder::new()
        .l_rate(a.f64_or("rate", 0.001)?)
        .rho(a.f64_or("rho", 0.9)?);
    let batch = a.batch_size_or("batchSize", batch)?;
    let opt = Stochastic::new(rule, batch, a.u64("seed")?, criteria(a)?);
    Ok(AnyOptimizer::RmsProp(opt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::GrlvqParams;

    #[test]
    fn canonical_names() {
        assert_eq!(canonicalize("wa-bgd"), "WABGD");
        assert_eq!(canonicalize("Slow Start SGD"), "SLOWSTARTSGD");
        assert_eq!(canonicalize("rms_prop.batch"), "RMSPROPBATCH");
    }

    #[test]
    fn every_name_is_registered() {
        let names = [
            "BGD", "SGD", "WABGD", "WASGD", "WA", "CONTROLLEDBGD", "CONTROLLEDSGD",
            "SLOWSTARTSGD", "VSGD", "VSGDBATCH", "ADADELTA", "ADADELTABATCH", "ADAM",
            "ADAMBATCH", "RPROP", "RMSPROP", "RMSPROPBATCH",
        ];
        for name in names.iter() {
            assert!(constructor::<GrlvqParams>(name).is_some(), "{}", name);
        }
        assert!(constructor::<GrlvqParams>("LBFGS").is_none());
    }

    #[test]
    fn batch_variants() {
        let args = Arguments::new().set("seed", 1);
        match create_from_name::<GrlvqParams>("adam", &args).unwrap() {
            AnyOptimizer::Adam(opt) => assert_eq!(opt.batch_size(), MINIBATCH),
            other => panic!("unexpected optimizer {:?}", other),
        }
        match create_from_name::<GrlvqParams>("adam_batch", &args).unwrap() {
            AnyOptimizer::Adam(opt) => assert_eq!(opt.batch_size(), FULL_BATCH),
            other => panic!("unexpected optimizer {:?}", other),
        }
    }

    #[test]
    fn sgd_family_reads_batch_size() {
        let args = Arguments::new()
            .set("rate", 0.1)
            .set("loss", 2.)
            .set("gain", 1.1)
            .set("seed", 3)
            .set("batchSize", 8);
        match create_from_name::<GrlvqParams>("sgd", &args).unwrap() {
            AnyOptimizer::Sgd(opt) => assert_eq!(opt.batch_size(), 8),
            other => panic!("unexpected optimizer {:?}", other),
        }
        match create_from_name::<GrlvqParams>("controlled_sgd", &args).unwrap() {
            AnyOptimizer::ControlledSgd(opt) => assert_eq!(opt.inner().batch_size(), 8),
            other => panic!("unexpected optimizer {:?}", other),
        }
        match create_from_name::<GrlvqParams>("slow_start_sgd", &args).unwrap() {
            AnyOptimizer::SlowStart(opt) => assert_eq!(opt.inner().batch_size(), 8),
            other => panic!("unexpected optimizer {:?}", other),
        }
        let args = args.set("hist", 2).set("batchSize", "max");
        match create_from_name::<GrlvqParams>("wa_sgd", &args).unwrap() {
            AnyOptimizer::WaypointAverage(opt) => match opt.inner() {
                AnyOptimizer::Sgd(sgd) => assert_eq!(sgd.batch_size(), FULL_BATCH),
                other => panic!("unexpected inner optimizer {:?}", other),
            },
            other => panic!("unexpected optimizer {:?}", other),
        }
    }

    #[test]
    fn sgd_steps_per_example_by_default() {
        let args = Arguments::new().set("rate", 0.1);
        match create_from_name::<GrlvqParams>("sgd", &args).unwrap() {
            AnyOptimizer::Sgd(opt) => assert_eq!(opt.batch_size(), 1),
            other => panic!("unexpected optimizer {:?}", other),
        }
    }

    #[test]
    fn waypoint_cannot_wrap_itself() {
        let args = Arguments::new().set("base", "wa").set("hist", 3);
        assert!(matches!(
            create_from_name::<GrlvqParams>("WA", &args),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn empty_window_is_rejected() {
        let args = Arguments::new().set("rate", 0.1).set("hist", 0);
        assert!(create_from_name::<GrlvqParams>("wa_sgd", &args).is_err());
    }
}
