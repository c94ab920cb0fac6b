//! Duration parsing utilities.

use anyhow::Context;
use std::time::Duration;

/// Parse a duration string like "200ms", "1s", "5m", "1h" or "2".
/// Supports:
/// - Plain numbers (interpreted as seconds): "2"
/// - Milliseconds suffix: "200ms"
/// - Seconds suffix: "30s"
/// - Minutes suffix: "5m"
/// - Hours suffix: "1h"
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    // "ms" must be checked before "m" and "s"
    if let Some(num_str) = s.strip_suffix("ms") {
        let millis: u64 = num_str
            .parse()
            .with_context(|| format!("Invalid milliseconds value: {num_str}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(num_str) = s.strip_suffix('h') {
        let hours: u64 = num_str
            .parse()
            .with_context(|| format!("Invalid hours value: {num_str}"))?;
        let secs = hours
            .checked_mul(3600)
            .with_context(|| format!("Hours value out of range: {num_str}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(num_str) = s.strip_suffix('m') {
        let minutes: u64 = num_str
            .parse()
            .with_context(|| format!("Invalid minutes value: {num_str}"))?;
        let secs = minutes
            .checked_mul(60)
            .with_context(|| format!("Minutes value out of range: {num_str}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(num_str) = s.strip_suffix('s') {
        let secs: u64 = num_str
            .parse()
            .with_context(|| format!("Invalid seconds value: {num_str}"))?;
        return Ok(Duration::from_secs(secs));
    }

    // No suffix - treat as seconds
    let secs: u64 = s
        .parse()
        .with_context(|| format!("Invalid duration value: {s}"))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("200ms").unwrap(), Duration::from_millis(200));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration(" 2 ").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("fast").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_duration_rejects_overflow() {
        let huge = u64::MAX;
        assert!(parse_duration(&format!("{huge}h")).is_err());
        assert!(parse_duration(&format!("{huge}m")).is_err());
        assert!(parse_duration(&format!("{huge}s")).is_ok());
    }
}
