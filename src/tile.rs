//! Value and time bucketing, and grid splitting of temporal numbers.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use crate::base::Datum;
use crate::boxes::TBox;
use crate::collections::base::Span;
use crate::collections::datetime::TsTzSpan;
use crate::errors::{Error, Result};
use crate::temporal::{BaseValue, NumberBase, Temporal};
use crate::utils::{from_micros, interval_to_units, to_micros, NOBEGIN, NOEND};

/// Initial value of the bucket a 32-bit integer falls in.
///
/// The offset is applied before the division and re-applied after it, with
/// overflow checks at both ends of the range.
pub fn int_bucket(value: i32, size: i32, origin: i32) -> Result<i32> {
    if size <= 0 {
        return Err(Error::bounds("bucket size must be strictly positive"));
    }
    let mut value = value;
    let offset = origin % size;
    if offset != 0 {
        if (offset > 0 && value < i32::MIN + offset)
            || (offset < 0 && value > i32::MAX + offset)
        {
            return Err(Error::RangeOverflow("number out of range".into()));
        }
        value -= offset;
    }
    let mut result = (value / size) * size;
    if value < 0 && value % size != 0 {
        // truncation rounds toward zero; shift down one more bucket
        if result < i32::MIN + size {
            return Err(Error::RangeOverflow("number out of range".into()));
        }
        result -= size;
    }
    Ok(result + offset)
}

/// Initial value of the bucket a float falls in.
pub fn float_bucket(value: f64, size: f64, origin: f64) -> Result<f64> {
    if size <= 0.0 {
        return Err(Error::bounds("bucket size must be strictly positive"));
    }
    let offset = origin % size;
    Ok((value - offset).div_euclid(size) * size + offset)
}

/// Bucket dispatch over numeric datums.
pub fn number_bucket(value: &Datum, size: &Datum, origin: &Datum) -> Result<Datum> {
    match (value, size, origin) {
        (Datum::Int4(v), Datum::Int4(s), Datum::Int4(o)) => {
            int_bucket(*v, *s, *o).map(Datum::Int4)
        }
        (Datum::Float8(v), Datum::Float8(s), Datum::Float8(o)) => {
            float_bucket(*v, *s, *o).map(Datum::Float8)
        }
        _ => Err(Error::TypeMismatch(format!(
            "bucketing over {:?} values",
            value.base_type()
        ))),
    }
}

/// Initial timestamp of the bucket a timestamp falls in, in microseconds.
pub(crate) fn timestamptz_bucket_micros(
    timestamp: i64,
    size: i64,
    origin: i64,
) -> Result<i64> {
    if size <= 0 {
        return Err(Error::bounds("bucket size must be strictly positive"));
    }
    let mut timestamp = timestamp;
    let offset = origin % size;
    if offset != 0 {
        if (offset > 0 && timestamp < NOBEGIN + offset)
            || (offset < 0 && timestamp > NOEND + offset)
        {
            return Err(Error::RangeOverflow("timestamp out of range".into()));
        }
        timestamp -= offset;
    }
    let mut result = (timestamp / size) * size;
    if timestamp < 0 && timestamp % size != 0 {
        if result < NOBEGIN + size {
            return Err(Error::RangeOverflow("timestamp out of range".into()));
        }
        result -= size;
    }
    Ok(result + offset)
}

/// Initial timestamp of the bucket a timestamp falls in.
pub fn timestamptz_bucket<Tz: TimeZone>(
    timestamp: DateTime<Tz>,
    duration: TimeDelta,
    origin: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    let units = interval_to_units(&duration)?;
    timestamptz_bucket_micros(to_micros(&timestamp), units, to_micros(&origin))
        .map(from_micros)
}

/// The list of value buckets covering a float span.
pub fn float_bucket_list(span: &Span<f64>, size: f64, origin: f64) -> Result<Vec<Span<f64>>> {
    let mut buckets = Vec::new();
    let mut lower = float_bucket(span.lower(), size, origin)?;
    while lower < span.upper() || (lower == span.upper() && span.upper_inc()) {
        buckets.push(Span::new(lower, lower + size, true, false)?);
        lower += size;
    }
    Ok(buckets)
}

/// The list of time buckets covering a time span.
pub fn time_bucket_list(
    span: &TsTzSpan,
    duration: TimeDelta,
    origin: DateTime<Utc>,
) -> Result<Vec<TsTzSpan>> {
    let units = interval_to_units(&duration)?;
    let mut buckets = Vec::new();
    let mut lower =
        timestamptz_bucket_micros(span.inner.lower(), units, to_micros(&origin))?;
    while lower < span.inner.upper() || (lower == span.inner.upper() && span.upper_inc()) {
        let upper = lower
            .checked_add(units)
            .ok_or_else(|| Error::RangeOverflow("timestamp out of range".into()))?;
        buckets.push(TsTzSpan::from_micros_bounds(lower, upper, true, false));
        lower = upper;
    }
    Ok(buckets)
}

/// The multidimensional grid of value × time tiles covering a box.
pub fn tbox_tile_list(
    bounds: &TBox,
    size: f64,
    duration: TimeDelta,
    origin: f64,
    torigin: DateTime<Utc>,
) -> Result<Vec<TBox>> {
    let span = bounds
        .value_span()
        .ok_or_else(|| Error::bounds("tile grid needs a value dimension"))?;
    let period = bounds
        .tstz_span()
        .ok_or_else(|| Error::bounds("tile grid needs a time dimension"))?;
    let value_buckets = float_bucket_list(&span, size, origin)?;
    let time_buckets = time_bucket_list(&period, duration, torigin)?;
    let mut tiles = Vec::with_capacity(value_buckets.len() * time_buckets.len());
    for vb in &value_buckets {
        for tb in &time_buckets {
            tiles.push(TBox::new(Some(*vb), Some(*tb))?);
        }
    }
    Ok(tiles)
}

/// Split a temporal value along time buckets. Returns the bucket start
/// with the fragment falling in it.
pub fn time_split<V: BaseValue>(
    value: &Temporal<V>,
    duration: TimeDelta,
    origin: DateTime<Utc>,
) -> Result<Vec<(DateTime<Utc>, Temporal<V>)>> {
    let buckets = time_bucket_list(&value.timespan(), duration, origin)?;
    let mut result = Vec::new();
    for bucket in buckets {
        if let Some(fragment) = value.at_period(&bucket) {
            result.push((bucket.lower(), fragment));
        }
    }
    Ok(result)
}

/// Split a temporal number along value buckets. Returns the bucket start
/// with the fragment taking values in it.
pub fn value_split<V>(
    value: &Temporal<V>,
    size: f64,
    origin: f64,
) -> Result<Vec<(f64, Temporal<V>)>>
where
    V: NumberBase,
{
    use crate::temporal::TNumber;
    let span = value
        .value_span()
        .ok_or_else(|| Error::bounds("value split needs a value dimension"))?;
    let mut result = Vec::new();
    for bucket in float_bucket_list(&span, size, origin)? {
        let typed = Span::new(
            V::from_f64(bucket.lower()),
            V::from_f64(bucket.upper()),
            true,
            false,
        )?;
        if let Some(fragment) = value.at_span(&typed) {
            result.push((bucket.lower(), fragment));
        }
    }
    Ok(result)
}

/// Split a temporal number along a value × time grid.
pub fn value_time_split<V>(
    value: &Temporal<V>,
    size: f64,
    duration: TimeDelta,
    origin: f64,
    torigin: DateTime<Utc>,
) -> Result<Vec<(f64, DateTime<Utc>, Temporal<V>)>>
where
    V: NumberBase,
{
    let mut result = Vec::new();
    for (bucket, fragment) in value_split(value, size, origin)? {
        for (tbucket, piece) in time_split(&fragment, duration, torigin)? {
            result.push((bucket, tbucket, piece));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::base::Collection;
    use crate::collections::datetime::ts;
    use pretty_assertions::assert_eq;

    #[test]
    fn int_buckets_truncate_toward_minus_infinity() {
        assert_eq!(int_bucket(7, 5, 0).unwrap(), 5);
        assert_eq!(int_bucket(-7, 5, 0).unwrap(), -10);
        assert_eq!(int_bucket(7, 5, 1).unwrap(), 6);
        assert!(int_bucket(i32::MIN + 1, 5, 2).is_err());
    }

    #[test]
    fn float_buckets() {
        assert_eq!(float_bucket(7.5, 5.0, 0.0).unwrap(), 5.0);
        assert_eq!(float_bucket(-0.5, 5.0, 0.0).unwrap(), -5.0);
        assert_eq!(float_bucket(7.5, 5.0, 2.0).unwrap(), 7.0);
    }

    #[test]
    fn datum_dispatch() {
        let bucket =
            number_bucket(&Datum::Int4(7), &Datum::Int4(5), &Datum::Int4(0)).unwrap();
        assert_eq!(bucket, Datum::Int4(5));
        assert!(number_bucket(&Datum::Int4(7), &Datum::Float8(5.0), &Datum::Int4(0)).is_err());
    }

    #[test]
    fn timestamp_buckets_align_to_origin() {
        let bucket = timestamptz_bucket(
            ts("2020-01-01 10:35:00"),
            TimeDelta::minutes(15),
            ts("2020-01-01"),
        )
        .unwrap();
        assert_eq!(bucket, ts("2020-01-01 10:30:00"));
    }

    #[test]
    fn time_split_partitions_the_value() {
        let t: Temporal<f64> = "[0@2020-01-01, 10@2020-01-03]".parse().unwrap();
        let pieces = time_split(&t, TimeDelta::days(1), ts("2020-01-01")).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].0, ts("2020-01-01"));
        // fragments cover the whole period without overlap
        let mut union = pieces[0].1.time();
        for (_, piece) in &pieces[1..] {
            assert!(!union.overlaps(&piece.time()));
            union = union.union(&piece.time());
        }
        assert_eq!(union, t.time());
    }

    #[test]
    fn value_split_partitions_the_range() {
        let t: Temporal<f64> = "[0@2020-01-01, 10@2020-01-11]".parse().unwrap();
        let pieces = value_split(&t, 5.0, 0.0).unwrap();
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].0, 0.0);
        assert_eq!(pieces[1].0, 5.0);
        assert_eq!(pieces[2].0, 10.0);
    }

    #[test]
    fn tile_grid_is_dense() {
        let bounds: TBox = "TBOXFLOAT XT([0, 10],[2020-01-01, 2020-01-03])"
            .parse()
            .unwrap();
        let tiles = tbox_tile_list(
            &bounds,
            5.0,
            TimeDelta::days(1),
            0.0,
            ts("2020-01-01"),
        )
        .unwrap();
        // 3 value buckets × 3 time buckets
        assert_eq!(tiles.len(), 9);
        assert!(tiles.iter().all(|t| t.has_x() && t.has_t()));
    }
}
