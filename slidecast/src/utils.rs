//! Utility functions for Slidecast
//!
//! This module contains helper functions for parsing and formatting playback
//! times.

use anyhow::{anyhow, Result};
use std::time::Duration;

/// Formats a duration as `m:ss.d` (e.g., "1:02.5")
pub fn format_elapsed(elapsed: Duration) -> String {
    let tenths = elapsed.as_millis() / 100;
    let minutes = tenths / 600;
    let seconds = (tenths / 10) % 60;
    let fraction = tenths % 10;
    format!("{}:{:02}.{}", minutes, seconds, fraction)
}

/// Parses a human-readable time (e.g., "1500", "250ms", "1.5s", "1:02.5") into milliseconds
///
/// A bare number is taken as milliseconds.
pub fn parse_millis(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return Err(anyhow!("Empty time value"));
    }

    if let Some((minutes, seconds)) = s.split_once(':') {
        let minutes: u64 = minutes
            .parse()
            .map_err(|_| anyhow!("Invalid minutes in time: {}", s))?;
        let seconds: f64 = seconds
            .parse()
            .map_err(|_| anyhow!("Invalid seconds in time: {}", s))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(anyhow!("Seconds out of range in time: {}", s));
        }
        return minutes
            .checked_mul(60_000)
            .and_then(|ms| ms.checked_add((seconds * 1000.0).round() as u64))
            .ok_or_else(|| anyhow!("Time out of range: {}", s));
    }

    // Find where the numeric part ends
    let numeric_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());

    let (num_str, unit) = s.split_at(numeric_end);
    let num: f64 = num_str
        .parse()
        .map_err(|_| anyhow!("Invalid number in time: {}", s))?;

    let multiplier = match unit.trim() {
        "" | "ms" => 1.0,
        "s" | "sec" => 1000.0,
        "m" | "min" => 60_000.0,
        _ => return Err(anyhow!("Unknown unit in time: {}", unit)),
    };

    let ms = (num * multiplier).round();
    if ms >= u64::MAX as f64 {
        return Err(anyhow!("Time out of range: {}", s));
    }
    Ok(ms as u64)
}

/// Same as [`parse_millis`], returning a [`Duration`]
pub fn parse_duration(s: &str) -> Result<Duration> {
    parse_millis(s).map(Duration::from_millis)
}
