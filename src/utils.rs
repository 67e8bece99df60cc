use chrono::{DateTime, TimeZone, Utc};

use crate::errors::{Error, Result};

/// Microseconds in one day.
pub(crate) const USECS_PER_DAY: i64 = 86_400_000_000;

/// Timestamp sentinel standing for minus infinity.
pub(crate) const NOBEGIN: i64 = i64::MIN;

/// Timestamp sentinel standing for plus infinity.
pub(crate) const NOEND: i64 = i64::MAX;

/// Convert a chrono datetime to the internal microsecond count.
pub(crate) fn to_micros<Tz: TimeZone>(dt: &DateTime<Tz>) -> i64 {
    dt.timestamp_micros()
}

/// Convert an internal microsecond count back to a UTC datetime.
///
/// The infinity sentinels clamp to the extreme datetimes chrono can carry.
pub(crate) fn from_micros(micros: i64) -> DateTime<Utc> {
    match Utc.timestamp_micros(micros) {
        chrono::offset::LocalResult::Single(dt) => dt,
        _ => {
            if micros < 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            }
        }
    }
}

/// Fold a duration into a single microsecond count for bucketing.
///
/// Month components have no fixed length and are rejected at the API
/// boundary; chrono's `TimeDelta` cannot carry them, so only the positivity
/// and range checks remain here.
pub(crate) fn interval_to_units(delta: &chrono::TimeDelta) -> Result<i64> {
    let units = delta
        .num_microseconds()
        .ok_or_else(|| Error::RangeOverflow("duration exceeds the microsecond range".into()))?;
    if units <= 0 {
        return Err(Error::bounds("duration must be strictly positive"));
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn micros_round_trip() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 8, 0, 0).unwrap();
        assert_eq!(from_micros(to_micros(&dt)), dt);
    }

    #[test]
    fn units_rejects_non_positive() {
        assert!(interval_to_units(&TimeDelta::zero()).is_err());
        assert!(interval_to_units(&TimeDelta::seconds(-1)).is_err());
        assert_eq!(
            interval_to_units(&TimeDelta::days(1)).unwrap(),
            USECS_PER_DAY
        );
    }
}
