//! Environment-description file.
//!
//! Line oriented, `keyword<TAB or ':'>value`:
//!
//! ```text
//! communication type: files
//! executable: ecosystem -e ecosystem.e
//! turtle position: P: %f %f %f
//! turtle line width: W: %f
//! ```
//!
//! Unknown keywords and unknown communication types are reported and
//! skipped; they never abort start-up.

use std::path::Path;

use enviro::config::{ConfigError, read_config_file};
use enviro_ipc::ChannelKind;
use tracing::{debug, warn};

use crate::turtle::{ParamSpec, TurtleField, TurtleSpec};

/// Settings read from the environment-description file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentDescription {
    /// Requested transport, if the file names a valid one
    pub communication: Option<ChannelKind>,
    /// Field executable line; informational only
    pub executable: Option<String>,
    /// Optional turtle fields
    pub turtle: TurtleSpec,
}

impl EnvironmentDescription {
    /// Read and parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = read_config_file(path)?;
        debug!(path = %path.display(), "loaded environment description");
        Ok(Self::parse(&text))
    }

    /// Parse the file contents.
    pub fn parse(text: &str) -> Self {
        let mut description = Self::default();
        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim_end();
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((keyword, value)) = split_directive(line) else {
                warn!(line = number + 1, "environment file: no separator in {:?}", line);
                continue;
            };
            description.apply(number + 1, keyword, value);
        }
        description
    }

    fn apply(&mut self, line: usize, keyword: &str, value: &str) {
        let keyword = keyword.trim();
        if keyword.eq_ignore_ascii_case("communication type") {
            match value.parse::<ChannelKind>() {
                Ok(kind) => self.communication = Some(kind),
                Err(e) => warn!(line, "environment file: {}", e),
            }
        } else if keyword.eq_ignore_ascii_case("executable") {
            self.executable = Some(value.trim().to_string());
        } else if let Some(field) = TurtleField::from_keyword(keyword) {
            let spec = ParamSpec::from_format(value);
            debug!(line, %field, count = spec.count, skip = spec.skip, "turtle field");
            self.turtle.set(field, spec);
        } else {
            warn!(line, "environment file: unknown keyword {:?}", keyword);
        }
    }
}

/// Split at the first `:` or TAB; the value keeps its inner spacing but
/// loses the blanks right after the separator.
fn split_directive(line: &str) -> Option<(&str, &str)> {
    let at = line.find([':', '\t'])?;
    Some((&line[..at], line[at + 1..].trim_start()))
}
