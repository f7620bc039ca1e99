//! Simulated name changes.
//!
//! Node names may end in a counter such as `"Manufacturing (53)"`. A rename
//! replaces that counter with a fresh two-digit one.

use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

use super::broadcaster::BroadcastError;

static COUNTER_SUFFIX: OnceLock<Regex> = OnceLock::new();

/// Trailing counter pattern, compiled on first use
fn counter_suffix() -> Result<&'static Regex, BroadcastError> {
    if let Some(re) = COUNTER_SUFFIX.get() {
        return Ok(re);
    }
    let re = Regex::new(r" \(\d+\)$")
        .map_err(|e| BroadcastError::Rename(format!("Regex error: {}", e)))?;
    Ok(COUNTER_SUFFIX.get_or_init(|| re))
}

/// Remove a trailing `" (<digits>)"` counter, if any
pub fn strip_counter(name: &str) -> Result<String, BroadcastError> {
    Ok(counter_suffix()?.replace(name, "").into_owned())
}

/// Produce the next simulated name for `current`
pub fn next_name<R: Rng + ?Sized>(current: &str, rng: &mut R) -> Result<String, BroadcastError> {
    let base = strip_counter(current)?;
    let counter: u32 = rng.gen_range(10..=99);
    Ok(format!("{} ({})", base, counter))
}
