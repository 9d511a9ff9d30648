use crate::error::ConfigError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs, path::Path, str::FromStr};

/// String keyed optimizer configuration.
///
/// Values may be JSON numbers or strings holding numbers, so the same configuration can come
/// from a JSON document or from `key=value` command line arguments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments {
    map: Map<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.map.insert(key.to_owned(), value.into());
    }

    /// Parses a JSON object.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file<Q: AsRef<Path>>(path: Q) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read arguments from {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse arguments in {}", path.display()))
    }

    /// Collects `key=value` pairs. Every value is kept as a string.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = Self::new();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| ConfigError::Parse(format!("expected key=value, got '{}'", arg)))?;
            out.insert(key.trim(), value.trim());
        }
        Ok(out)
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    fn required(&self, key: &str) -> Result<&Value, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::missing(key))
    }

    pub fn str(&self, key: &str) -> Result<&str, ConfigError> {
        match self.required(key)? {
            Value::String(s) => Ok(s.as_str()),
            other => Err(ConfigError::invalid(key, other, "a string")),
        }
    }

    pub fn f64(&self, key: &str) -> Result<f64, ConfigError> {
        number(key, self.required(key)?, Value::as_f64, "a number")
    }

    pub fn f64_or(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        self.get(key)
            .map_or(Ok(default), |v| number(key, v, Value::as_f64, "a number"))
    }

    pub fn i64(&self, key: &str) -> Result<i64, ConfigError> {
        number(key, self.required(key)?, Value::as_i64, "an integer")
    }

    pub fn i64_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.get(key)
            .map_or(Ok(default), |v| number(key, v, Value::as_i64, "an integer"))
    }

    pub fn u64(&self, key: &str) -> Result<u64, ConfigError> {
        number(key, self.required(key)?, Value::as_u64, "a non-negative integer")
    }

    pub fn u64_or(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.get(key).map_or(Ok(default), |v| {
            number(key, v, Value::as_u64, "a non-negative integer")
        })
    }

    /// A positive minibatch size, where `"max"` stands for `usize::MAX`.
    pub fn batch_size_or(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        const EXPECTED: &str = "a positive integer or \"max\"";
        match self.get(key) {
            None => Ok(default),
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("max") => Ok(usize::MAX),
            Some(v) => match number(key, v, Value::as_u64, EXPECTED)? {
                0 => Err(ConfigError::invalid(key, v, EXPECTED)),
                n => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
            },
        }
    }

    /// A list of numbers, given either as a JSON array or as a comma separated string.
    pub fn f64_list_or(&self, key: &str, default: &[f64]) -> Result<Vec<f64>, ConfigError> {
        const EXPECTED: &str = "a list of numbers";
        match self.get(key) {
            None => Ok(default.to_vec()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| number(key, v, Value::as_f64, EXPECTED))
                .collect(),
            Some(Value::String(s)) => s
                .split(',')
                .map(|item| {
                    item.trim()
                        .parse()
                        .map_err(|_| ConfigError::invalid(key, s, EXPECTED))
                })
                .collect(),
            Some(v) => Ok(vec![number(key, v, Value::as_f64, EXPECTED)?]),
        }
    }
}

/// Reads a number stored either as a JSON number or as a string.
fn number<T: FromStr>(
    key: &str,
    value: &Value,
    convert: fn(&Value) -> Option<T>,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let parsed = match value {
        Value::String(s) => s.trim().parse().ok(),
        other => convert(other),
    };
    parsed.ok_or_else(|| ConfigError::invalid(key, value, expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_and_strings_agree() {
        let json = Arguments::from_json(r#"{"rate": 0.5, "tmax": 10, "opt": "bgd"}"#).unwrap();
        let cli = Arguments::from_args(&["rate=0.5", "tmax = 10", "opt=bgd"]).unwrap();
        for args in [json, cli].iter() {
            assert_eq!(args.f64("rate"), Ok(0.5));
            assert_eq!(args.i64("tmax"), Ok(10));
            assert_eq!(args.str("opt"), Ok("bgd"));
        }
    }

    #[test]
    fn defaults_and_missing_keys() {
        let args = Arguments::new().set("seed", 3);
        assert_eq!(args.u64_or("seed", 1), Ok(3));
        assert_eq!(args.f64_or("rho", 0.9), Ok(0.9));
        assert_eq!(args.f64("rate"), Err(ConfigError::missing("rate")));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let args = Arguments::new().set("rate", "fast").set("seed", -2).set("tmax", 1.5);
        assert!(matches!(args.f64("rate"), Err(ConfigError::Invalid { .. })));
        assert!(matches!(args.u64("seed"), Err(ConfigError::Invalid { .. })));
        assert!(matches!(args.i64_or("tmax", 200), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn batch_size_sentinel() {
        let args = Arguments::new().set("a", "max").set("b", 16).set("c", 0);
        assert_eq!(args.batch_size_or("a", 32), Ok(usize::MAX));
        assert_eq!(args.batch_size_or("b", 32), Ok(16));
        assert_eq!(args.batch_size_or("missing", 32), Ok(32));
        assert!(args.batch_size_or("c", 32).is_err());
    }

    #[test]
    fn rate_lists() {
        let args = Arguments::new()
            .set("csv", "1, 0.5,0.1")
            .set("json", vec![2., 1.])
            .set("bad", "1,x");
        assert_eq!(args.f64_list_or("csv", &[]), Ok(vec![1., 0.5, 0.1]));
        assert_eq!(args.f64_list_or("json", &[]), Ok(vec![2., 1.]));
        assert_eq!(args.f64_list_or("none", &[3.]), Ok(vec![3.]));
        assert!(args.f64_list_or("bad", &[]).is_err());
    }

    #[test]
    fn malformed_sources() {
        assert!(matches!(
            Arguments::from_json("[1, 2]"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Arguments::from_args(&["rate"]),
            Err(ConfigError::Parse(_))
        ));
    }
}
