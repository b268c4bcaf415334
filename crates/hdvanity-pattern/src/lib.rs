//! HDVanity Pattern Matching Engine
//!
//! Pattern types: prefix, suffix, contains, regex

mod matcher;
mod difficulty;

pub use matcher::{Matcher, Pattern, PatternError, PatternMatcher, PatternType};
pub use difficulty::{calculate_difficulty, combined_difficulty, format_difficulty};
