use std::time::Duration;

/// Parses `1s`, `250ms`, `1m30s`, `1.5s` and bare seconds (`5`).
pub fn parse_duration(input: &str) -> Option<Duration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let value = rest[..number_len].parse::<f64>().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total += Duration::from_nanos((value * nanos_per_unit).round() as u64);
    }
    Some(total)
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        let minutes = secs / 60;
        let rest = duration - Duration::from_secs(minutes * 60);
        if rest.is_zero() {
            return format!("{minutes}m");
        }
        return format!("{minutes}m{}", format_duration(rest));
    }
    if secs >= 1 {
        return format!("{}s", trim_decimals(duration.as_secs_f64()));
    }
    let micros = duration.as_micros();
    if micros >= 1000 {
        format!("{}ms", trim_decimals(micros as f64 / 1000.0))
    } else {
        format!("{micros}µs")
    }
}

fn trim_decimals(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Sleep owed after a round that took `elapsed` against the requested `interval`.
pub fn pacing_delay(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_accepts_units_and_bare_seconds() {
        assert_eq!(parse_duration("150ms"), Some(Duration::from_millis(150)));
        assert_eq!(parse_duration("2s"), Some(Duration::from_secs(2)));
        assert_eq!(parse_duration("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("250us"), Some(Duration::from_micros(250)));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_none());
        assert!(parse_duration("invalid").is_none());
        assert!(parse_duration("10 parsecs").is_none());
        assert!(parse_duration("ms").is_none());
    }

    #[test]
    fn format_duration_is_compact() {
        assert_eq!(format_duration(Duration::from_secs(1)), "1s");
        assert_eq!(format_duration(Duration::from_millis(1100)), "1.1s");
        assert_eq!(format_duration(Duration::from_millis(900)), "900ms");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_micros(20)), "20µs");
    }

    #[test]
    fn format_then_parse_keeps_value() {
        let value = Duration::from_millis(1300);
        assert_eq!(parse_duration(&format_duration(value)), Some(value));
    }

    #[test]
    fn pacing_delay_never_underflows() {
        let interval = Duration::from_secs(1);
        assert_eq!(
            pacing_delay(interval, Duration::from_millis(300)),
            Duration::from_millis(700)
        );
        assert_eq!(pacing_delay(interval, Duration::from_secs(3)), Duration::ZERO);
        assert_eq!(pacing_delay(interval, interval), Duration::ZERO);
    }
}
