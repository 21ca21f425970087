//! Host rule configuration types.
//!
//! Rules decide which hosts take part in automatic stacking. A rule is
//! either an exact host or a regular expression tested against the host.
//!
//! # JSON Format
//!
//! ```jsonc
//! "excludes": [
//!     "www.example.com",                          // exact, case-sensitive
//!     { "pattern": "^(.+\\.)?example\\.net$" }    // regular expression
//! ]
//! ```

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Host matching rule.
///
/// # Performance
///
/// Call [`HostRule::prepare()`] after loading rules from config to compile
/// pattern rules once. Unprepared patterns are compiled on every match.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum HostRule {
    /// Exact, case-sensitive host match.
    Exact(String),

    /// Regular expression tested against the host (unanchored unless the
    /// pattern anchors itself).
    Pattern {
        /// The regular expression source.
        pattern: String,

        // Compiled form (computed by prepare())
        #[serde(skip)]
        #[schemars(skip)]
        compiled: Option<Regex>,
    },
}

impl HostRule {
    /// Creates an exact host rule.
    #[must_use]
    pub fn exact(host: impl Into<String>) -> Self { Self::Exact(host.into()) }

    /// Creates a compiled pattern rule.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn pattern(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let mut rule = Self::Pattern { pattern: pattern.into(), compiled: None };
        rule.prepare()?;
        Ok(rule)
    }

    /// Compiles the pattern of a pattern rule. Exact rules are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid regular expression.
    pub fn prepare(&mut self) -> Result<(), regex::Error> {
        if let Self::Pattern { pattern, compiled } = self
            && compiled.is_none()
        {
            *compiled = Some(Regex::new(pattern)?);
        }
        Ok(())
    }

    /// Returns the rule source (host or pattern) for display.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Exact(host) => host,
            Self::Pattern { pattern, .. } => pattern,
        }
    }

    /// Checks the rule against a host.
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        match self {
            Self::Exact(expected) => host == expected,
            Self::Pattern { compiled: Some(re), .. } => re.is_match(host),
            Self::Pattern { pattern, compiled: None } => {
                Regex::new(pattern).is_ok_and(|re| re.is_match(host))
            }
        }
    }
}
