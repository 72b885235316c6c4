use std::time::Duration;

/// Integer mean of `sum` over `count` samples; zero when there are none.
pub fn average_delay(sum: Duration, count: u64) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = sum.as_nanos() / u128::from(count);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Percentage of failed probes; zero before anything completed.
pub fn error_rate(successes: u64, errors: u64) -> f64 {
    let total = successes + errors;
    if total == 0 {
        return 0.0;
    }
    errors as f64 / total as f64 * 100.0
}
