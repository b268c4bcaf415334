//! Pattern matching implementation

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Pattern is empty")]
    EmptyPattern,
    #[error("No patterns given")]
    NoPatterns,
    #[error("Pattern contains invalid character '{0}' (valid: {1})")]
    InvalidCharacter(char, String),
    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),
}

/// Type of pattern matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Match at start of address (after the network's leading character)
    Prefix,
    /// Match at end of address
    Suffix,
    /// Match anywhere in address
    Contains,
    /// Regular expression over the whole address
    Regex,
}

/// A pattern to search for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// The pattern string to match
    pub value: String,
    /// Type of matching
    pub pattern_type: PatternType,
    /// Case insensitive matching
    pub case_insensitive: bool,
}

impl Pattern {
    /// Create a new prefix pattern
    pub fn prefix(value: impl Into<String>) -> Self {
        Self::with_type(value, PatternType::Prefix)
    }

    /// Create a new suffix pattern
    pub fn suffix(value: impl Into<String>) -> Self {
        Self::with_type(value, PatternType::Suffix)
    }

    /// Create a new contains pattern
    pub fn contains(value: impl Into<String>) -> Self {
        Self::with_type(value, PatternType::Contains)
    }

    /// Create a new regular expression pattern
    pub fn regex(value: impl Into<String>) -> Self {
        Self::with_type(value, PatternType::Regex)
    }

    fn with_type(value: impl Into<String>, pattern_type: PatternType) -> Self {
        Self {
            value: value.into(),
            pattern_type,
            case_insensitive: false,
        }
    }

    /// Interpret user input: text made only of address characters is a
    /// prefix, anything else is a regular expression. With `case_insensitive`
    /// a character counts when either of its cases is an address character.
    pub fn parse(input: &str, valid_chars: &str, case_insensitive: bool) -> Self {
        let lowered = valid_chars.to_lowercase();
        let is_address_char = |c: char| {
            if case_insensitive {
                lowered.contains(c.to_ascii_lowercase())
            } else {
                valid_chars.contains(c)
            }
        };

        let pattern = if !input.is_empty() && input.chars().all(is_address_char) {
            Self::prefix(input)
        } else {
            Self::regex(input)
        };
        Self { case_insensitive, ..pattern }
    }

    /// Make pattern case insensitive
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Validate pattern against valid characters. Regular expressions are
    /// checked when compiled.
    pub fn validate(&self, valid_chars: &str) -> Result<(), PatternError> {
        if self.value.is_empty() {
            return Err(PatternError::EmptyPattern);
        }
        if self.pattern_type == PatternType::Regex {
            return Ok(());
        }

        let lowered = valid_chars.to_lowercase();
        for c in self.value.chars() {
            let valid = if self.case_insensitive {
                lowered.contains(c.to_ascii_lowercase())
            } else {
                valid_chars.contains(c)
            };

            if !valid {
                return Err(PatternError::InvalidCharacter(c, valid_chars.to_string()));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Anything that can decide whether an address is wanted
pub trait Matcher: Send + Sync {
    /// Reject malformed configuration before a search starts
    fn validate(&self) -> Result<(), PatternError> {
        Ok(())
    }

    /// Label of the first matching pattern, if any
    fn find(&self, address: &str) -> Option<&str>;
}

#[derive(Debug, Clone)]
struct Compiled {
    pattern: Pattern,
    /// Lowercased value for case-insensitive literal patterns
    needle: String,
    regex: Option<Regex>,
}

/// Pattern matcher for checking addresses
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    compiled: Vec<Compiled>,
    address_prefix: String,
    valid_chars: Option<String>,
}

impl PatternMatcher {
    /// Create a new matcher with given patterns, compiling regexes
    pub fn new(patterns: Vec<Pattern>) -> Result<Self, PatternError> {
        let compiled = patterns
            .into_iter()
            .map(|pattern| {
                let regex = match pattern.pattern_type {
                    PatternType::Regex => Some(
                        RegexBuilder::new(&pattern.value)
                            .case_insensitive(pattern.case_insensitive)
                            .build()
                            .map_err(|e| PatternError::InvalidRegex(e.to_string()))?,
                    ),
                    _ => None,
                };
                let needle = if pattern.case_insensitive {
                    pattern.value.to_lowercase()
                } else {
                    pattern.value.clone()
                };
                Ok(Compiled { pattern, needle, regex })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;

        Ok(Self {
            compiled,
            address_prefix: String::new(),
            valid_chars: None,
        })
    }

    /// Create a matcher with a single pattern
    pub fn single(pattern: Pattern) -> Result<Self, PatternError> {
        Self::new(vec![pattern])
    }

    /// Leading characters every address shares; prefix patterns that do not
    /// start with them are matched right after.
    pub fn with_address_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.address_prefix = prefix.into();
        self
    }

    /// Characters allowed in literal patterns
    pub fn with_valid_chars(mut self, valid_chars: impl Into<String>) -> Self {
        self.valid_chars = Some(valid_chars.into());
        self
    }

    /// Check if address matches any pattern.
    /// Returns the index of the matching pattern, or None
    pub fn matches(&self, address: &str) -> Option<usize> {
        let lowered = if self.compiled.iter().any(|c| c.pattern.case_insensitive) {
            Some(address.to_lowercase())
        } else {
            None
        };

        self.compiled.iter().position(|c| {
            let addr = match (&lowered, c.pattern.case_insensitive) {
                (Some(lowered), true) => lowered.as_str(),
                _ => address,
            };
            self.check_pattern(addr, c)
        })
    }

    fn check_pattern(&self, addr: &str, compiled: &Compiled) -> bool {
        let pat = compiled.needle.as_str();
        match compiled.pattern.pattern_type {
            PatternType::Prefix => {
                let prefix = self.address_prefix.as_str();
                if prefix.is_empty() || pat.starts_with(prefix) {
                    addr.starts_with(pat)
                } else {
                    addr.strip_prefix(prefix).is_some_and(|rest| rest.starts_with(pat))
                }
            }
            PatternType::Suffix => addr.ends_with(pat),
            PatternType::Contains => addr.contains(pat),
            PatternType::Regex => compiled.regex.as_ref().is_some_and(|re| re.is_match(addr)),
        }
    }

    /// Get all patterns
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.compiled.iter().map(|c| &c.pattern)
    }
}

impl Matcher for PatternMatcher {
    fn validate(&self) -> Result<(), PatternError> {
        if self.compiled.is_empty() {
            return Err(PatternError::NoPatterns);
        }
        for c in &self.compiled {
            match &self.valid_chars {
                Some(valid) => c.pattern.validate(valid)?,
                None if c.pattern.value.is_empty() => return Err(PatternError::EmptyPattern),
                None => {}
            }
        }
        Ok(())
    }

    fn find(&self, address: &str) -> Option<&str> {
        self.matches(address)
            .map(|i| self.compiled[i].pattern.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE58: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

    fn btc(pattern: Pattern) -> PatternMatcher {
        PatternMatcher::single(pattern)
            .unwrap()
            .with_address_prefix("1")
            .with_valid_chars(BASE58)
    }

    #[test]
    fn test_prefix_skips_network_character() {
        let matcher = btc(Pattern::prefix("Love"));
        assert!(matcher.matches("1Love1234567890abcdef1234567890ab").is_some());
        assert!(matcher.matches("1Lov31234567890abcdef1234567890ab").is_none());
    }

    #[test]
    fn test_prefix_including_network_character() {
        let matcher = btc(Pattern::prefix("1A8"));
        assert!(matcher.matches("1A8TizQJEsLpXqWFjWL24ZfLnHUxMsjorE").is_some());
        assert!(matcher.matches("1BXrxCquE6EHb24RU9QW8VvCNEtdRhb5qV").is_none());
    }

    #[test]
    fn test_suffix_match() {
        let matcher = btc(Pattern::suffix("Fx"));
        assert!(matcher.matches("19Y2gF7cMJXfLFANF35CPSHPLtRBMiD4Fx").is_some());
        assert!(matcher.matches("13Wd8bCbFaPabLdoDFEgmSvf8KqRPT9JUx").is_none());
    }

    #[test]
    fn test_contains_match() {
        let matcher = btc(Pattern::contains("cafe"));
        assert!(matcher.matches("1234cafe567890abcdef1234567890abc").is_some());
        assert!(matcher.matches("1234567890abcdef1234567890abcdef1").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let matcher = btc(Pattern::prefix("LOVE").case_insensitive());
        assert!(matcher.matches("1love1234567890abcdef1234567890ab").is_some());
        assert!(matcher.matches("1LoVe1234567890abcdef1234567890ab").is_some());
    }

    #[test]
    fn test_regex_match() {
        let matcher = btc(Pattern::regex("^1[1-9]"));
        assert!(matcher.matches("13zZGjyh1vPVikJ924sb7CWtU6yCjbn15y").is_some());
        assert!(matcher.matches("1KvjetVmfHULYHSQiikGiYQuGo37nz1jE4").is_none());
    }

    #[test]
    fn test_invalid_regex() {
        assert!(matches!(
            PatternMatcher::single(Pattern::regex("(")),
            Err(PatternError::InvalidRegex(_))
        ));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let matcher = PatternMatcher::new(vec![Pattern::suffix("zz"), Pattern::prefix("A")])
            .unwrap()
            .with_address_prefix("1");
        assert_eq!(matcher.find("1A8TizQJEsLpXqWFjWL24ZfLnHUxMsjorE"), Some("A"));
        assert_eq!(matcher.find("1AbczzzzzzzzzzzzzzzzzzzzzzzzzzzZzz"), Some("zz"));
        assert_eq!(matcher.find("1BXrxCquE6EHb24RU9QW8VvCNEtdRhb5qV"), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Pattern::parse("Love", BASE58, false), Pattern::prefix("Love"));
        // '0' and 'l' are not base58
        assert_eq!(Pattern::parse("0l", BASE58, false), Pattern::regex("0l"));
        assert_eq!(Pattern::parse("^1A.*z$", BASE58, false), Pattern::regex("^1A.*z$"));
    }

    #[test]
    fn test_parse_ignore_case() {
        // 'l' is only base58 as 'L'
        assert_eq!(Pattern::parse("love", BASE58, false).pattern_type, PatternType::Regex);
        let parsed = Pattern::parse("love", BASE58, true);
        assert_eq!(parsed, Pattern::prefix("love").case_insensitive());

        let matcher = btc(parsed);
        assert!(matcher.validate().is_ok());
        assert_eq!(matcher.find("1LoVeXqWFjWL24ZfLnHUxMsjorE8TizQJE"), Some("love"));
        // Anchored after the leading '1', not anywhere in the address
        assert_eq!(matcher.find("1QxyzLoVe2345abcdefghijkmnopqrstu"), None);

        // Case folding never admits a character with no base58 form
        assert_eq!(Pattern::parse("0ve", BASE58, true).pattern_type, PatternType::Regex);
    }

    #[test]
    fn test_validate_pattern() {
        assert!(btc(Pattern::prefix("Love")).validate().is_ok());
        assert_eq!(
            btc(Pattern::prefix("0Love")).validate(),
            Err(PatternError::InvalidCharacter('0', BASE58.to_string()))
        );
        assert_eq!(btc(Pattern::suffix("")).validate(), Err(PatternError::EmptyPattern));
        assert_eq!(
            PatternMatcher::new(vec![]).unwrap().validate(),
            Err(PatternError::NoPatterns)
        );
        // Regexes skip the character check
        assert!(btc(Pattern::regex("^1[0-9]")).validate().is_ok());
    }
}
