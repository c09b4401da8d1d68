//! Human-readable size and duration formatting for log lines

use std::fmt;
use std::time::Duration;

/// Byte count rendered as `512B`, `1.5KB`, `3MB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

impl ByteSize {
    pub fn to_human_readable(&self) -> String {
        const UNITS: &[(&str, u64)] = &[
            ("B", 1),
            ("KB", 1024),
            ("MB", 1024 * 1024),
            ("GB", 1024 * 1024 * 1024),
        ];

        for (i, &(unit, divisor)) in UNITS.iter().enumerate().rev() {
            if self.0 >= divisor {
                let value = self.0 / divisor;
                let remainder = self.0 % divisor;

                if remainder == 0 || i == 0 {
                    return format!("{}{}", value, unit);
                }
                let decimal = remainder * 10 / divisor;
                if decimal > 0 {
                    return format!("{}.{}{}", value, decimal, unit);
                }
                return format!("{}{}", value, unit);
            }
        }

        format!("{}B", self.0)
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

/// Duration rendered as `850ms`, `42.0s` or `3.5min`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs_f64();
        if secs < 1.0 {
            write!(f, "{}ms", self.0.as_millis())
        } else if secs < 60.0 {
            write!(f, "{:.1}s", secs)
        } else {
            write!(f, "{:.1}min", secs / 60.0)
        }
    }
}

/// Items per second and remaining time for a progress line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throughput {
    pub per_sec: f64,
    pub eta: Duration,
}

impl Throughput {
    pub fn measure(done: usize, total: usize, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let per_sec = if secs > 0.0 { done as f64 / secs } else { 0.0 };
        let remaining = total.saturating_sub(done) as f64;
        let eta = if per_sec > 0.0 {
            Duration::from_secs_f64(remaining / per_sec)
        } else {
            Duration::ZERO
        };

        Self { per_sec, eta }
    }
}
