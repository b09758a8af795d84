//! Query parameter declaration, validation, and processing.

use std::sync::Arc;

/// A query parameter's value after processing, typed for the handler's
/// convenience. Processors that don't need a richer type can return `Str`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// `true` iff `value` is acceptable for a parameter named `name`. Runs
/// before the processor; a rejection is reported as
/// `invalidRequestParameters`.
pub trait ParamValidator: Send + Sync {
    fn is_valid(&self, name: &str, value: &str) -> bool;
}

/// Converts a raw string value into the `(name, value)` pair the handler
/// ultimately sees. The processor may rename the parameter (e.g. `"id"` ->
/// `"widgetId"`) as well as retype it.
pub trait ParamProcessor: Send + Sync {
    fn process(&self, name: &str, value: &str) -> (String, ParamValue);
}

/// Accepts any non-empty value; emptiness is already screened out before a
/// validator runs, since a present-but-empty value is treated as absent.
pub struct AnyValue;

impl ParamValidator for AnyValue {
    fn is_valid(&self, _name: &str, _value: &str) -> bool {
        true
    }
}

/// Passes the raw string through unchanged, under its declared name.
pub struct Identity;

impl ParamProcessor for Identity {
    fn process(&self, name: &str, value: &str) -> (String, ParamValue) {
        (name.to_string(), ParamValue::Str(value.to_string()))
    }
}

/// Accepts only values that parse as a base-10 integer.
pub struct IntegerOnly;

impl ParamValidator for IntegerOnly {
    fn is_valid(&self, _name: &str, value: &str) -> bool {
        value.parse::<i64>().is_ok()
    }
}

/// Parses the value as an integer. Pair with [`IntegerOnly`] so invalid
/// input is rejected before this ever runs.
pub struct ParseInteger;

impl ParamProcessor for ParseInteger {
    fn process(&self, name: &str, value: &str) -> (String, ParamValue) {
        let parsed = value.parse::<i64>().unwrap_or_default();
        (name.to_string(), ParamValue::Int(parsed))
    }
}

/// One query parameter an endpoint declares: its name, whether it is
/// required, and the validator/processor pair that gates and shapes it.
#[derive(Clone)]
pub struct QueryParamDescriptor {
    pub name: String,
    pub required: bool,
    pub validator: Arc<dyn ParamValidator>,
    pub processor: Arc<dyn ParamProcessor>,
}

impl QueryParamDescriptor {
    /// An optional, free-form string parameter, the common case.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            validator: Arc::new(AnyValue),
            processor: Arc::new(Identity),
        }
    }

    /// A required, free-form string parameter.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            required: true,
            ..Self::optional(name)
        }
    }

    pub fn with_validator(mut self, validator: impl ParamValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_processor(mut self, processor: impl ParamProcessor + 'static) -> Self {
        self.processor = Arc::new(processor);
        self
    }
}
