//! Difficulty estimates for vanity patterns

use crate::{Pattern, PatternType};

/// Expected number of addresses to test before one matches `pattern`.
///
/// `address_prefix` is the leading text every address shares; a prefix
/// pattern that repeats it costs nothing for those characters. `address_len`
/// is the typical address length, used for contains patterns. Regular
/// expressions have no closed-form estimate and return `None`.
pub fn calculate_difficulty(
    pattern: &Pattern,
    address_prefix: &str,
    alphabet_size: usize,
    address_len: usize,
) -> Option<f64> {
    let value = match pattern.pattern_type {
        PatternType::Prefix if !address_prefix.is_empty() => {
            pattern.value.strip_prefix(address_prefix).unwrap_or(&pattern.value)
        }
        _ => pattern.value.as_str(),
    };
    let pattern_len = value.chars().count();
    let base_difficulty = (alphabet_size as f64).powi(pattern_len as i32);

    let difficulty = match pattern.pattern_type {
        PatternType::Prefix | PatternType::Suffix => base_difficulty,
        PatternType::Contains => {
            let positions = (address_len as f64 - pattern_len as f64 + 1.0).max(1.0);
            base_difficulty / positions
        }
        PatternType::Regex => return None,
    };

    if pattern.case_insensitive {
        // Each letter can match in either case
        let num_letters = value.chars().filter(|c| c.is_alphabetic()).count();
        Some((difficulty / 2.0_f64.powi(num_letters as i32)).max(1.0))
    } else {
        Some(difficulty)
    }
}

/// Expected tries until any of `patterns` matches. `None` when a pattern has
/// no estimate or the list is empty.
pub fn combined_difficulty(
    patterns: &[Pattern],
    address_prefix: &str,
    alphabet_size: usize,
    address_len: usize,
) -> Option<f64> {
    let rate = patterns.iter().try_fold(0.0, |rate, pattern| {
        calculate_difficulty(pattern, address_prefix, alphabet_size, address_len).map(|d| rate + 1.0 / d)
    })?;
    (rate > 0.0).then(|| 1.0 / rate)
}

/// Format difficulty as human-readable string
pub fn format_difficulty(difficulty: f64) -> String {
    if difficulty >= 1e15 {
        format!("{:.2}P", difficulty / 1e15)
    } else if difficulty >= 1e12 {
        format!("{:.2}T", difficulty / 1e12)
    } else if difficulty >= 1e9 {
        format!("{:.2}G", difficulty / 1e9)
    } else if difficulty >= 1e6 {
        format!("{:.2}M", difficulty / 1e6)
    } else if difficulty >= 1e3 {
        format!("{:.2}K", difficulty / 1e3)
    } else {
        format!("{:.0}", difficulty)
    }
}
