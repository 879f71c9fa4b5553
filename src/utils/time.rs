use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Whole seconds between two instants, never negative.
pub fn elapsed_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let t = now();
        assert_eq!(elapsed_seconds(t, t + Duration::seconds(90)), 90);
        assert_eq!(elapsed_seconds(t + Duration::seconds(5), t), 0);
    }
}
