//! Wire-format parsing: query lines, modules, control lines and replies.
//!
//! Query line: `<index>[ ]E<module>[<module>]`, where each module is
//! `<symbol>[(<number>[,<number>]*)]`, optionally wrapped in one more pair
//! of parentheses as in `7E(A)(B(1,2))`.

use enviro::consts::{CONTROL_PREFIX, MAX_PARAM};
use enviro::module::Module;
use enviro::protocol::ChunkFlags;
use thiserror::Error;

use crate::tokenizer::{BLANKS, Tokens};
use crate::turtle::TurtleField;

/// Malformed protocol input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Query line does not start with the query index.
    #[error("query line has no symbol index: {line:?}")]
    MissingIndex {
        /// Offending line
        line: String,
    },

    /// Query line has no `E` marker after the index.
    #[error("query line has no 'E' marker: {line:?}")]
    MissingMarker {
        /// Offending line
        line: String,
    },

    /// Module text ended before a symbol.
    #[error("module symbol missing")]
    MissingSymbol,

    /// `(` without a matching `)`.
    #[error("unmatched parenthesis after '{symbol}'")]
    UnmatchedParen {
        /// Symbol whose parameter list is unterminated
        symbol: char,
    },

    /// More than `MAX_PARAM` parameters.
    #[error("module '{symbol}' has more than {max} parameters", max = MAX_PARAM)]
    TooManyParams {
        /// Offending symbol
        symbol: char,
    },

    /// Parameter is not a number.
    #[error("invalid number {text:?}")]
    BadNumber {
        /// Offending text
        text: String,
    },

    /// Text left inside a wrapped module after its parameter list.
    #[error("unexpected {text:?} after module '{symbol}'")]
    TrailingInput {
        /// Module that was parsed
        symbol: char,
        /// Leftover text
        text: String,
    },

    /// `Control:` line without a flags value.
    #[error("malformed control line: {line:?}")]
    BadControl {
        /// Offending line
        line: String,
    },

    /// Expected turtle line missing or too short.
    #[error("turtle {field} line missing or incomplete")]
    MissingTurtleLine {
        /// Field being decoded
        field: TurtleField,
    },
}

/// Index and modules of one query line.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHead {
    /// Query index echoed back in the reply
    pub index: u32,
    /// Communication module
    pub comm_symbol: Module,
    /// Module following it in the driver's string
    pub next_symbol: Option<Module>,
}

/// Decoded `Control:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    /// Chunk flags
    pub flags: ChunkFlags,
    /// Simulation step, when the driver sent one
    pub step: Option<i64>,
}

/// Parse one module at the cursor and advance the cursor past it.
pub fn parse_module(cursor: &mut &str) -> Result<Module, ParseError> {
    let text = cursor.trim_start();
    if !text.starts_with('(') {
        let mut rest = text;
        let module = parse_bare_module(&mut rest)?;
        *cursor = rest;
        return Ok(module);
    }

    let close = matching_paren(text).ok_or_else(|| ParseError::UnmatchedParen {
        symbol: text[1..].trim_start().chars().next().unwrap_or('('),
    })?;
    let mut inner = &text[1..close];
    let module = parse_bare_module(&mut inner)?;
    if !inner.trim().is_empty() {
        return Err(ParseError::TrailingInput {
            symbol: module.symbol,
            text: inner.trim().to_string(),
        });
    }
    *cursor = &text[close + 1..];
    Ok(module)
}

fn parse_bare_module(cursor: &mut &str) -> Result<Module, ParseError> {
    let text = cursor.trim_start();
    let mut chars = text.chars();
    let symbol = match chars.next() {
        Some(c) if c != '(' && c != ')' && !c.is_whitespace() => c,
        _ => return Err(ParseError::MissingSymbol),
    };
    let rest = chars.as_str();
    let mut module = Module::new(symbol);

    let Some(args) = rest.strip_prefix('(') else {
        *cursor = rest;
        return Ok(module);
    };
    let close = args
        .find(')')
        .ok_or(ParseError::UnmatchedParen { symbol })?;
    let list = &args[..close];
    if !list.trim().is_empty() {
        for item in list.split(',') {
            let item = item.trim();
            let value = item.parse::<f64>().map_err(|_| ParseError::BadNumber {
                text: item.to_string(),
            })?;
            module
                .push_param(value)
                .map_err(|_| ParseError::TooManyParams { symbol })?;
        }
    }
    *cursor = &args[close + 1..];
    Ok(module)
}

/// Byte index of the `)` closing the `(` at the start of `text`.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a query line into its index and modules.
pub fn parse_query_line(line: &str) -> Result<QueryHead, ParseError> {
    let text = line.trim_start();
    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let index = text[..digits]
        .parse::<u32>()
        .map_err(|_| ParseError::MissingIndex {
            line: line.to_string(),
        })?;

    let mut cursor = text[digits..]
        .trim_start()
        .strip_prefix('E')
        .ok_or_else(|| ParseError::MissingMarker {
            line: line.to_string(),
        })?;

    let comm_symbol = parse_module(&mut cursor)?;
    let next_symbol = if cursor.trim().is_empty() {
        None
    } else {
        Some(parse_module(&mut cursor)?)
    };

    Ok(QueryHead {
        index,
        comm_symbol,
        next_symbol,
    })
}

/// Parse `Control: <flags> [<step>]`.
///
/// Returns `None` when the line is not a control line at all.
pub fn parse_control_line(line: &str) -> Option<Result<Control, ParseError>> {
    let rest = line.trim_start().strip_prefix(CONTROL_PREFIX)?;
    let mut fields = Tokens::new(rest, BLANKS);
    let bad = || ParseError::BadControl {
        line: line.to_string(),
    };

    let flags = match fields.next().map(str::parse::<i64>) {
        Some(Ok(value)) => ChunkFlags::from_wire(value),
        _ => return Some(Err(bad())),
    };
    let step = match fields.next().map(str::parse::<i64>) {
        None => None,
        Some(Ok(step)) => Some(step),
        Some(Err(_)) => return Some(Err(bad())),
    };
    Some(Ok(Control { flags, step }))
}

/// Reply line for one answered query: `<index> <sym>(<p0>,...)\n`.
pub fn format_reply(index: u32, module: &Module) -> String {
    format!("{index} {module}\n")
}
