//! Accumulate-and-report rule checking
//!
//! A [`Validator`] is built once per validated entity or request. Rules are
//! applied with [`Validator::check`]; every failing field is recorded, so a
//! caller always sees the complete set of problems rather than the first one.
//! Only the first failure per field is kept.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::{Error, Result};

/// Field → message pairs collected by a [`Validator`]
///
/// Serializes as a flat JSON object (`{"title": "must be provided"}`) so the
/// handler layer can echo it in a bad-request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Message recorded for `key`, if any
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(field, message)` pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", key, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Mutable accumulator of validation failures
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no rule has failed
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` under `key` unless `key` already carries a message
    pub fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .0
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` under `key` when `ok` is false
    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Every recorded failure, consuming the validator
    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// `Ok(())` when valid, otherwise every recorded failure as
    /// [`Error::Validation`]
    pub fn into_result(self) -> Result<()> {
        if self.valid() {
            Ok(())
        } else {
            Err(Error::Validation(self.errors))
        }
    }
}

/// True when `value` is one of `permitted`
pub fn permitted_value<T: PartialEq + ?Sized>(value: &T, permitted: &[&T]) -> bool {
    permitted.iter().any(|p| *p == value)
}

/// True when no two elements of `values` are equal
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}
