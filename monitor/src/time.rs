use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

/// Fixed-width, lexicographically sortable storage form of a timestamp.
pub fn to_storage(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_storage(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid stored timestamp {raw:?}"))?;
    Ok(ts.with_timezone(&Utc))
}

/// `now - span`, saturating at the earliest representable instant.
pub fn cutoff(now: DateTime<Utc>, span: Duration) -> DateTime<Utc> {
    let delta = TimeDelta::from_std(span).unwrap_or(TimeDelta::MAX);
    now.checked_sub_signed(delta).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn storage_form_sorts_chronologically() {
        let early = Utc.with_ymd_and_hms(2025, 9, 1, 8, 5, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 10, 19, 23, 0, 0).unwrap();
        let (a, b) = (to_storage(early), to_storage(late));
        assert_eq!(a, "2025-09-01T08:05:00.000Z");
        assert!(a < b);
        assert_eq!(from_storage(&b).unwrap(), late);
    }

    #[test]
    fn cutoff_saturates() {
        let now = Utc::now();
        assert_eq!(cutoff(now, Duration::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(cutoff(now, Duration::from_secs(60)), now - TimeDelta::minutes(1));
    }
}
