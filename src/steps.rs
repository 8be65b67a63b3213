use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::model::{ParsedStep, RawRecipe};
use crate::normalize::normalize_value;

struct TimerPatterns {
    minutes: Regex,
    hours: Regex,
    seconds: Regex,
}

fn timer_patterns() -> &'static TimerPatterns {
    static PATTERNS: OnceLock<TimerPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| TimerPatterns {
        minutes: Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?)\b").unwrap(),
        hours: Regex::new(r"(?i)(\d+)\s*(?:hours?|hrs?)\b").unwrap(),
        seconds: Regex::new(r"(?i)(\d+)\s*(?:seconds?|secs?)\b").unwrap(),
    })
}

/// Durations mentioned in an instruction, converted to minutes.
///
/// Minutes are listed first, then hours, then seconds, each in order of
/// appearance.
pub fn detect_timers(text: &str) -> Vec<f64> {
    let patterns = timer_patterns();
    let mut timers = Vec::new();

    for (pattern, to_minutes) in [
        (&patterns.minutes, 1.0),
        (&patterns.hours, 60.0),
        (&patterns.seconds, 1.0 / 60.0),
    ] {
        for caps in pattern.captures_iter(text) {
            if let Ok(amount) = caps[1].parse::<u32>() {
                timers.push(f64::from(amount) * to_minutes);
            }
        }
    }

    timers
}

/// Normalize each raw instruction of a recipe into a numbered step.
///
/// Entries that normalize to nothing are dropped, so step numbers stay
/// contiguous.
pub fn parse_steps(instructions: &[Value]) -> Vec<ParsedStep> {
    instructions
        .iter()
        .map(normalize_value)
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(index, text)| {
            let timers = detect_timers(&text);
            ParsedStep {
                step_number: index + 1,
                has_timer: !timers.is_empty(),
                timers,
                text,
            }
        })
        .collect()
}

pub fn parse_recipe_steps(recipe: &RawRecipe) -> Vec<ParsedStep> {
    parse_steps(&recipe.instructions)
}
