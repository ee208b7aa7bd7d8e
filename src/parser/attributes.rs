//! Typed access to the attributes of one start tag.

use std::str::FromStr;

use crate::error::{Error, Result};

use super::markup::Attribute;

/// Attributes of a single element, with strict typed getters.
///
/// Required getters fail with [`Error::MissingAttribute`] when the attribute
/// is absent and [`Error::InvalidAttribute`] when it does not parse.
#[derive(Debug, Clone, Copy)]
pub struct Attributes<'a> {
    element: &'static str,
    attrs: &'a [Attribute],
}

impl<'a> Attributes<'a> {
    pub fn new(element: &'static str, attrs: &'a [Attribute]) -> Self {
        Self { element, attrs }
    }

    /// Element these attributes belong to.
    pub fn element(&self) -> &'static str {
        self.element
    }

    /// Raw value of an attribute that may be absent.
    pub fn optional(&self, name: &str) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Raw value of an attribute that must be present.
    pub fn required(&self, name: &'static str) -> Result<&'a str> {
        self.optional(name).ok_or(Error::MissingAttribute {
            element: self.element,
            attribute: name,
        })
    }

    /// A required floating point attribute; must be finite.
    pub fn required_f64(&self, name: &'static str) -> Result<f64> {
        let raw = self.required(name)?;
        self.parse_f64(name, raw)
    }

    /// A required floating point attribute that must be greater than zero.
    pub fn positive_f64(&self, name: &'static str) -> Result<f64> {
        let value = self.required_f64(name)?;
        if value > 0.0 {
            Ok(value)
        } else {
            Err(self.invalid(name, self.required(name)?))
        }
    }

    /// A required integer attribute.
    pub fn required_int<T: FromStr>(&self, name: &'static str) -> Result<T> {
        let raw = self.required(name)?;
        raw.trim().parse().map_err(|_| self.invalid(name, raw))
    }

    /// An integer attribute that may be absent.
    pub fn optional_int<T: FromStr>(&self, name: &'static str) -> Result<Option<T>> {
        match self.optional(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(name, raw)),
            None => Ok(None),
        }
    }

    /// A required attribute holding whitespace-separated floats.
    pub fn required_f64_list(&self, name: &'static str) -> Result<Vec<f64>> {
        let raw = self.required(name)?;
        let values = raw
            .split_ascii_whitespace()
            .map(|token| self.parse_f64(name, token))
            .collect::<Result<Vec<_>>>()?;
        if values.is_empty() {
            return Err(self.invalid(name, raw));
        }
        Ok(values)
    }

    fn parse_f64(&self, name: &'static str, raw: &str) -> Result<f64> {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(self.invalid(name, raw)),
        }
    }

    /// Error for an attribute whose value is unacceptable.
    pub fn invalid(&self, name: &'static str, value: &str) -> Error {
        Error::InvalidAttribute {
            element: self.element,
            attribute: name,
            value: value.to_string(),
        }
    }
}
