//! The `Module` value exchanged between the driver and the field.
//!
//! A module is one L-system symbol together with its numeric parameters.
//! Parameter storage is fixed capacity so decoding a query never grows a
//! heap buffer.

use std::fmt;

use thiserror::Error;

use crate::consts::MAX_PARAM;

/// Fixed-capacity parameter list of a module.
pub type Params = heapless::Vec<f64, MAX_PARAM>;

/// Errors raised while building a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// More parameters than a module can carry.
    #[error("module '{symbol}' has more than {max} parameters", max = MAX_PARAM)]
    TooManyParams {
        /// Symbol of the offending module.
        symbol: char,
    },
}

/// One symbol plus up to [`MAX_PARAM`] parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    /// Single-character symbol.
    pub symbol: char,
    /// Ordered parameter values.
    pub params: Params,
}

impl Module {
    /// Module with no parameters.
    pub fn new(symbol: char) -> Self {
        Self {
            symbol,
            params: Params::new(),
        }
    }

    /// Module with the given parameters.
    ///
    /// # Errors
    /// `ModuleError::TooManyParams` if `params` exceeds [`MAX_PARAM`].
    pub fn with_params(symbol: char, params: &[f64]) -> Result<Self, ModuleError> {
        let mut module = Self::new(symbol);
        for &value in params {
            module.push_param(value)?;
        }
        Ok(module)
    }

    /// Append one parameter.
    pub fn push_param(&mut self, value: f64) -> Result<(), ModuleError> {
        self.params
            .push(value)
            .map_err(|_| ModuleError::TooManyParams {
                symbol: self.symbol,
            })
    }

    /// Parameter `i`, if present.
    #[inline]
    pub fn param(&self, i: usize) -> Option<f64> {
        self.params.get(i).copied()
    }

    /// Number of parameters.
    #[inline]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

/// Writes `sym(p0,p1,...)`; the parentheses are always present so the
/// reply line keeps the shape the driver scans for.
impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.symbol)?;
        for (i, value) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_params() {
        assert_eq!(Module::new('A').to_string(), "A()");
    }

    #[test]
    fn display_with_params() {
        let m = Module::with_params('E', &[1.0, 2.5, -3.0]).unwrap();
        assert_eq!(m.to_string(), "E(1,2.5,-3)");
    }

    #[test]
    fn capacity_is_enforced() {
        let values = [0.0; MAX_PARAM];
        let mut m = Module::with_params('B', &values).unwrap();
        assert_eq!(m.param_count(), MAX_PARAM);
        assert_eq!(
            m.push_param(1.0),
            Err(ModuleError::TooManyParams { symbol: 'B' })
        );
    }

    #[test]
    fn param_access() {
        let m = Module::with_params('C', &[4.0]).unwrap();
        assert_eq!(m.param(0), Some(4.0));
        assert_eq!(m.param(1), None);
    }
}
