//! Search configuration.

use serde::{Deserialize, Serialize};

/// Default camel-case prefixes stripped by smart-prefix matching.
pub const DEFAULT_PREFIX_PATTERN: &str = "my|our|is|get|set";

/// User-tunable options for pattern inference and matching.
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```rust
/// use caret_core::SpawnSettings;
///
/// let settings: SpawnSettings = serde_json::from_str(r#"{ "hex_search": true }"#).unwrap();
/// assert!(settings.hex_search);
/// assert!(settings.case_sensitive);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    /// Inferred and explicit patterns match case-sensitively.
    pub case_sensitive: bool,
    /// An identifier run that is a number searches for any number of a compatible base.
    pub numeric_search: bool,
    /// Numeric search also recognizes hexadecimal literals.
    pub hex_search: bool,
    /// Textual identifiers also match their prefixed/unprefixed camel-case variants.
    pub smart_prefix: bool,
    /// Alternation of prefixes used by smart-prefix matching.
    pub prefix_pattern: String,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            numeric_search: false,
            hex_search: false,
            smart_prefix: false,
            prefix_pattern: DEFAULT_PREFIX_PATTERN.to_string(),
        }
    }
}

impl SpawnSettings {
    /// Returns `true` if numbers get numeric patterns.
    pub fn numeric_enabled(&self) -> bool {
        self.numeric_search || self.hex_search
    }
}
