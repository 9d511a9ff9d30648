use std::{error::Error, fmt::Display};

/// Error encountered while reading optimizer configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required key was not provided.
    Missing { key: String },
    /// A key was provided but its value could not be interpreted.
    Invalid {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// No optimizer is registered under the (canonicalized) name.
    UnknownOptimizer(String),
    /// The configuration source itself was malformed.
    Parse(String),
}

impl ConfigError {
    pub fn missing(key: &str) -> Self {
        Self::Missing { key: key.to_owned() }
    }

    pub fn invalid(key: &str, value: impl Display, expected: &'static str) -> Self {
        Self::Invalid {
            key: key.to_owned(),
            value: value.to_string(),
            expected,
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing { key } => write!(f, "Missing required argument '{}'", key),
            ConfigError::Invalid {
                key,
                value,
                expected,
            } => write!(
                f,
                "Invalid value '{}' for argument '{}', expected {}",
                value, key, expected
            ),
            ConfigError::UnknownOptimizer(name) => write!(f, "Unknown optimizer: {}", name),
            ConfigError::Parse(msg) => write!(f, "Failed to parse arguments: {}", msg),
        }
    }
}

impl Error for ConfigError {}

/// Error encountered while evaluating a cost function or its derivatives.
#[derive(Debug, Clone, PartialEq)]
pub enum CostError {
    /// Both prototype distances are zero, so the relative margin is undefined.
    Degenerate { example: usize },
    /// The example's feature vector doesn't match the parameter dimensionality.
    ShapeMismatch {
        expected: usize,
        found: usize,
        example: Option<usize>,
    },
    /// There is no prototype with the example's label, or none with any other label.
    MissingClass { label: i32, example: usize },
    /// The operation needs at least one example.
    EmptyDataSet,
}

impl Display for CostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostError::Degenerate { example } => write!(
                f,
                "Degenerate margin at example {}: both prototype distances are zero",
                example
            ),
            CostError::ShapeMismatch {
                expected,
                found,
                example: Some(example),
            } => write!(
                f,
                "Example {} has {} features, parameters have {} dimensions",
                example, found, expected
            ),
            CostError::ShapeMismatch {
                expected,
                found,
                example: None,
            } => write!(f, "Expected {} dimensions, found {}", expected, found),
            CostError::MissingClass { label, example } => write!(
                f,
                "Example {} with label {} has no matching or no rival prototype",
                example, label
            ),
            CostError::EmptyDataSet => f.write_str("The data set contains no examples"),
        }
    }
}

impl Error for CostError {}
