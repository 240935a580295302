//! Optional turtle-state fields trailing each query line.
//!
//! Which fields the driver sends, and where their numbers start on each
//! data line, is fixed at start-up from the printf-style formats in the
//! environment-description file.

use std::fmt;

use enviro::consts::MAX_TURTLE_PARAMS;

use crate::parser::ParseError;
use crate::tokenizer::{NUMBER_SEPARATORS, Tokens};

/// Parameter count and numeric offset of one optional field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParamSpec {
    /// Values per line, from the number of `%` conversions (at most 3)
    pub count: usize,
    /// Byte offset of the first value on the data line
    pub skip: usize,
}

impl ParamSpec {
    /// Derive from a printf-style format such as `"P: %f %f %f"`.
    pub fn from_format(format: &str) -> Self {
        Self {
            count: format.matches('%').count().min(MAX_TURTLE_PARAMS),
            skip: format.find('%').unwrap_or(0),
        }
    }

    /// Whether the driver sends this field at all.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.count > 0
    }
}

/// The six optional fields, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurtleField {
    /// Turtle position
    Position,
    /// Heading vector
    Heading,
    /// Left vector
    Left,
    /// Up vector
    Up,
    /// Current line width
    LineWidth,
    /// Current scale factor
    ScaleFactor,
}

impl TurtleField {
    /// All fields in the order their lines follow a query.
    pub const ALL: [Self; 6] = [
        Self::Position,
        Self::Heading,
        Self::Left,
        Self::Up,
        Self::LineWidth,
        Self::ScaleFactor,
    ];

    /// Keyword in the environment-description file.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Position => "turtle position",
            Self::Heading => "turtle heading",
            Self::Left => "turtle left",
            Self::Up => "turtle up",
            Self::LineWidth => "turtle line width",
            Self::ScaleFactor => "turtle scale factor",
        }
    }

    /// Field for a keyword, ignoring case and surrounding blanks.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.keyword().eq_ignore_ascii_case(keyword))
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TurtleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword()["turtle ".len()..])
    }
}

/// Per-field specs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurtleSpec {
    specs: [ParamSpec; 6],
}

impl TurtleSpec {
    /// Parameter layout of `field`.
    pub fn get(&self, field: TurtleField) -> ParamSpec {
        self.specs[field.slot()]
    }

    /// Replace the parameter layout of `field`.
    pub fn set(&mut self, field: TurtleField, spec: ParamSpec) {
        self.specs[field.slot()] = spec;
    }

    /// Fields the driver sends, in wire order.
    pub fn enabled_fields(&self) -> impl Iterator<Item = TurtleField> + '_ {
        TurtleField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_enabled())
    }
}

/// Turtle parameters at the communication symbol.
///
/// Only fields enabled in the [`TurtleSpec`] are filled in; the rest stay
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TurtleState {
    /// Position
    pub position: [f64; 3],
    /// Heading vector
    pub heading: [f64; 3],
    /// Left vector
    pub left: [f64; 3],
    /// Up vector
    pub up: [f64; 3],
    /// Line width
    pub line_width: f64,
    /// Scale factor
    pub scale_factor: f64,
}

impl TurtleState {
    fn slots(&mut self, field: TurtleField) -> &mut [f64] {
        match field {
            TurtleField::Position => &mut self.position,
            TurtleField::Heading => &mut self.heading,
            TurtleField::Left => &mut self.left,
            TurtleField::Up => &mut self.up,
            TurtleField::LineWidth => std::slice::from_mut(&mut self.line_width),
            TurtleField::ScaleFactor => std::slice::from_mut(&mut self.scale_factor),
        }
    }
}

/// Decode one data line for `field` into `state`.
///
/// The first `spec.skip` bytes are a fixed-width header and are ignored.
/// Vector fields take `spec.count` values; width and scale take one.
pub fn decode_field(
    field: TurtleField,
    spec: ParamSpec,
    line: &str,
    state: &mut TurtleState,
) -> Result<(), ParseError> {
    let missing = || ParseError::MissingTurtleLine { field };
    let numbers = line.get(spec.skip..).ok_or_else(missing)?;
    let slots = state.slots(field);
    let wanted = spec.count.min(slots.len());

    let mut values = Tokens::new(numbers, NUMBER_SEPARATORS);
    for slot in slots.iter_mut().take(wanted) {
        let text = values.next().ok_or_else(missing)?;
        *slot = text.parse::<f64>().map_err(|_| ParseError::BadNumber {
            text: text.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_count_clamped() {
        let counts: Vec<_> = ["", "%f", "%f %f", "%f %f %f", "%f %f %f %f"]
            .into_iter()
            .map(|f| ParamSpec::from_format(f).count)
            .collect();
        assert_eq!(counts, [0, 1, 2, 3, 3]);
    }

    #[test]
    fn skip_is_offset_of_first_conversion() {
        assert_eq!(ParamSpec::from_format("P: %f %f %f").skip, 3);
        assert_eq!(ParamSpec::from_format("%f").skip, 0);
        assert_eq!(ParamSpec::from_format("none").skip, 0);
    }

    #[test]
    fn keywords() {
        assert_eq!(
            TurtleField::from_keyword(" Turtle Line Width "),
            Some(TurtleField::LineWidth)
        );
        assert_eq!(TurtleField::from_keyword("turtle roll"), None);
        assert_eq!(TurtleField::ScaleFactor.to_string(), "scale factor");
    }

    #[test]
    fn enabled_fields_in_wire_order() {
        let mut spec = TurtleSpec::default();
        spec.set(TurtleField::ScaleFactor, ParamSpec::from_format("%f"));
        spec.set(TurtleField::Position, ParamSpec::from_format("%f %f"));
        let fields: Vec<_> = spec.enabled_fields().collect();
        assert_eq!(fields, [TurtleField::Position, TurtleField::ScaleFactor]);
    }

    #[test]
    fn decode_vector_after_header() {
        let mut state = TurtleState::default();
        let spec = ParamSpec::from_format("P: %f %f %f");
        decode_field(TurtleField::Position, spec, "P: 1 2.5 -3", &mut state).unwrap();
        assert_eq!(state.position, [1.0, 2.5, -3.0]);
    }

    #[test]
    fn decode_partial_vector() {
        let mut state = TurtleState::default();
        let spec = ParamSpec::from_format("H:%f,%f");
        decode_field(TurtleField::Heading, spec, "H:0.5,0.25", &mut state).unwrap();
        assert_eq!(state.heading, [0.5, 0.25, 0.0]);
    }

    #[test]
    fn decode_scalar_uses_one_value() {
        let mut state = TurtleState::default();
        let spec = ParamSpec::from_format("W %f %f");
        decode_field(TurtleField::LineWidth, spec, "W 4 9", &mut state).unwrap();
        assert_eq!(state.line_width, 4.0);
    }

    #[test]
    fn short_line_is_missing() {
        let mut state = TurtleState::default();
        let spec = ParamSpec::from_format("Position: %f %f %f");
        assert_eq!(
            decode_field(TurtleField::Position, spec, "P", &mut state),
            Err(ParseError::MissingTurtleLine {
                field: TurtleField::Position
            })
        );
        assert_eq!(
            decode_field(TurtleField::Position, spec, "Position: 1 2", &mut state),
            Err(ParseError::MissingTurtleLine {
                field: TurtleField::Position
            })
        );
    }
}
