use super::interpolation::TInterpolation;
use super::temporal::{BaseValue, Temporal};
use super::tinstant::TInstant;
use super::tsequence::TSequence;
use super::tsequence_set::TSequenceSet;
use crate::collections::base::Span;
use crate::errors::Result;
use crate::BoundingBox;

/// How a lifted operator behaves between synchronization instants.
pub(crate) struct LiftSpec<A, B> {
    /// Fractions in `(0, 1)` of a synchronized segment at which the
    /// operator's output changes discretely, given the effective segment
    /// endpoints of both arguments.
    #[allow(clippy::type_complexity)]
    pub crossings: Option<Box<dyn Fn(&A, &A, &B, &B) -> Vec<f64>>>,
    /// Whether the operator preserves linearity, making the output linear
    /// when both inputs are.
    pub preserves_linearity: bool,
}

impl<A, B> LiftSpec<A, B> {
    pub(crate) fn no_cross(preserves_linearity: bool) -> Self {
        LiftSpec {
            crossings: None,
            preserves_linearity,
        }
    }

    pub(crate) fn with_crossings(
        preserves_linearity: bool,
        crossings: impl Fn(&A, &A, &B, &B) -> Vec<f64> + 'static,
    ) -> Self {
        LiftSpec {
            crossings: Some(Box::new(crossings)),
            preserves_linearity,
        }
    }
}

/// Apply a pointwise operator to two temporal values over their common
/// time partition. Returns `None` when the values never coexist in time.
pub(crate) fn lift_binary<A, B, C>(
    a: &Temporal<A>,
    b: &Temporal<B>,
    spec: &LiftSpec<A, B>,
    f: &dyn Fn(&A, &B) -> Result<C>,
) -> Result<Option<Temporal<C>>>
where
    A: BaseValue,
    B: BaseValue,
    C: BaseValue,
{
    // bounding-period rejection
    if !a.timespan().overlaps(&b.timespan()) {
        return Ok(None);
    }
    match (a, b) {
        (Temporal::Instant(ai), _) => {
            let Some(bv) = b.value_at_micros(ai.t_micros()) else {
                return Ok(None);
            };
            let value = f(ai.value(), &bv)?;
            Ok(Some(Temporal::Instant(TInstant::from_micros(
                value,
                ai.t_micros(),
            ))))
        }
        (_, Temporal::Instant(bi)) => {
            let Some(av) = a.value_at_micros(bi.t_micros()) else {
                return Ok(None);
            };
            let value = f(&av, bi.value())?;
            Ok(Some(Temporal::Instant(TInstant::from_micros(
                value,
                bi.t_micros(),
            ))))
        }
        (Temporal::Sequence(sa), _) if sa.is_discrete() => {
            lift_discrete(sa.instants(), b, &|av, t| {
                b.value_at_micros(t).map(|bv| f(av, &bv)).transpose()
            })
        }
        (_, Temporal::Sequence(sb)) if sb.is_discrete() => {
            lift_discrete(sb.instants(), a, &|bv, t| {
                a.value_at_micros(t).map(|av| f(&av, bv)).transpose()
            })
        }
        (Temporal::Sequence(sa), Temporal::Sequence(sb)) => {
            let fragments = sync_sequences(sa, sb, spec, f)?;
            Ok(wrap_fragments(fragments, true))
        }
        (Temporal::Sequence(sa), Temporal::SequenceSet(sb)) => {
            let mut fragments = Vec::new();
            for seq in sb.sequences() {
                fragments.extend(sync_sequences(sa, seq, spec, f)?);
            }
            Ok(wrap_fragments(fragments, false))
        }
        (Temporal::SequenceSet(sa), Temporal::Sequence(sb)) => {
            let mut fragments = Vec::new();
            for seq in sa.sequences() {
                fragments.extend(sync_sequences(seq, sb, spec, f)?);
            }
            Ok(wrap_fragments(fragments, false))
        }
        (Temporal::SequenceSet(sa), Temporal::SequenceSet(sb)) => {
            let mut fragments = Vec::new();
            for seq_a in sa.sequences() {
                for seq_b in sb.sequences() {
                    if seq_a.period_micros().overlaps(&seq_b.period_micros()) {
                        fragments.extend(sync_sequences(seq_a, seq_b, spec, f)?);
                    }
                }
            }
            Ok(wrap_fragments(fragments, false))
        }
    }
}

/// Lift an operator between a temporal value and a constant by widening
/// the constant into a matching sequence.
pub(crate) fn lift_with_value<A, B, C>(
    a: &Temporal<A>,
    value: &B,
    spec: &LiftSpec<A, B>,
    f: &dyn Fn(&A, &B) -> Result<C>,
) -> Result<Option<Temporal<C>>>
where
    A: BaseValue,
    B: BaseValue,
    C: BaseValue,
{
    let widened: Temporal<B> = match a {
        Temporal::Instant(inst) => {
            Temporal::Instant(TInstant::from_micros(value.clone(), inst.t_micros()))
        }
        Temporal::Sequence(seq) if seq.is_discrete() => Temporal::Sequence(
            TSequence::discrete(
                seq.instants()
                    .iter()
                    .map(|i| TInstant::from_micros(value.clone(), i.t_micros()))
                    .collect(),
            )?,
        ),
        _ => Temporal::Sequence(TSequence::from_value_and_tstz_span(
            value.clone(),
            a.timespan(),
            B::default_interp(),
        )?),
    };
    lift_binary(a, &widened, spec, f)
}

fn lift_discrete<O, C, V>(
    instants: &[TInstant<O>],
    _other: &Temporal<V>,
    eval: &dyn Fn(&O, i64) -> Result<Option<C>>,
) -> Result<Option<Temporal<C>>>
where
    O: BaseValue,
    C: BaseValue,
    V: BaseValue,
{
    let mut result = Vec::new();
    for inst in instants {
        if let Some(value) = eval(inst.value(), inst.t_micros())? {
            result.push(TInstant::from_micros(value, inst.t_micros()));
        }
    }
    if result.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Temporal::Sequence(TSequence::discrete(result)?)))
    }
}

fn wrap_fragments<C: BaseValue>(
    fragments: Vec<TSequence<C>>,
    single_becomes_sequence: bool,
) -> Option<Temporal<C>> {
    match fragments.len() {
        0 => None,
        1 if single_becomes_sequence => {
            Some(Temporal::Sequence(fragments.into_iter().next()?))
        }
        _ => TSequenceSet::from_fragments(fragments).map(Temporal::SequenceSet),
    }
}

/// The common time partition of two synchronized continuous sequences:
/// the union of their instants within the shared period, in order.
fn partition_times<A: BaseValue, B: BaseValue>(
    a: &TSequence<A>,
    b: &TSequence<B>,
    period: &Span<i64>,
) -> Vec<i64> {
    let mut times: Vec<i64> = Vec::with_capacity(a.num_instants() + b.num_instants() + 2);
    times.push(period.lower());
    times.extend(
        a.instants()
            .iter()
            .map(TInstant::t_micros)
            .filter(|t| *t > period.lower() && *t < period.upper()),
    );
    times.extend(
        b.instants()
            .iter()
            .map(TInstant::t_micros)
            .filter(|t| *t > period.lower() && *t < period.upper()),
    );
    if period.upper() > period.lower() {
        times.push(period.upper());
    }
    times.sort_unstable();
    times.dedup();
    times
}

/// Synchronize two continuous sequences and apply the operator.
fn sync_sequences<A, B, C>(
    a: &TSequence<A>,
    b: &TSequence<B>,
    spec: &LiftSpec<A, B>,
    f: &dyn Fn(&A, &B) -> Result<C>,
) -> Result<Vec<TSequence<C>>>
where
    A: BaseValue,
    B: BaseValue,
    C: BaseValue,
{
    let Some(period) = a.period_micros().intersection(&b.period_micros()) else {
        return Ok(Vec::new());
    };
    let eval_pair = |t: i64| -> Option<(A, B)> { Some((a.eval_at(t)?, b.eval_at(t)?)) };
    if period.lower() == period.upper() {
        let Some((av, bv)) = eval_pair(period.lower()) else {
            return Ok(Vec::new());
        };
        let value = f(&av, &bv)?;
        return Ok(vec![TSequence::from_parts(
            vec![TInstant::from_micros(value, period.lower())],
            true,
            true,
            if spec.preserves_linearity
                && a.interpolation() == TInterpolation::Linear
                && b.interpolation() == TInterpolation::Linear
            {
                TInterpolation::Linear
            } else {
                TInterpolation::Stepwise
            },
        )]);
    }
    let times = partition_times(a, b, &period);
    log::debug!(
        "synchronized {} x {} instants over {} partition times",
        a.num_instants(),
        b.num_instants(),
        times.len()
    );
    let linear_result = spec.preserves_linearity
        && a.interpolation() == TInterpolation::Linear
        && b.interpolation() == TInterpolation::Linear;

    // collect crossing instants per segment
    let mut all_times: Vec<i64> = Vec::with_capacity(times.len());
    for window in times.windows(2) {
        let (t0, t1) = (window[0], window[1]);
        all_times.push(t0);
        if let Some(crossings) = &spec.crossings {
            let (Some(a0), Some(b0)) = (a.eval_at(t0), b.eval_at(t0)) else {
                continue;
            };
            let a1 = if a.interpolation() == TInterpolation::Linear {
                a.eval_at(t1)
            } else {
                Some(a0.clone())
            };
            let b1 = if b.interpolation() == TInterpolation::Linear {
                b.eval_at(t1)
            } else {
                Some(b0.clone())
            };
            if let (Some(a1), Some(b1)) = (a1, b1) {
                let mut fracs = crossings(&a0, &a1, &b0, &b1);
                fracs.sort_by(f64::total_cmp);
                for frac in fracs {
                    let t = t0 + ((t1 - t0) as f64 * frac).round() as i64;
                    if t > t0 && t < t1 {
                        all_times.push(t);
                    }
                }
            }
        }
    }
    all_times.push(*times.last().expect("partition is non-empty"));
    all_times.dedup();

    if linear_result {
        let mut instants = Vec::with_capacity(all_times.len());
        for t in &all_times {
            let Some((av, bv)) = eval_pair(*t) else {
                continue;
            };
            instants.push(TInstant::from_micros(f(&av, &bv)?, *t));
        }
        return Ok(vec![TSequence::from_parts(
            instants,
            period.lower_inc(),
            period.upper_inc(),
            TInterpolation::Linear,
        )]);
    }
    assemble_stepwise(
        &all_times,
        period.lower_inc(),
        period.upper_inc(),
        &|t| {
            let (av, bv) = eval_pair(t)?;
            Some(f(&av, &bv))
        },
    )
}

/// Build step-interpolated fragments from the values at the partition
/// points and on the open intervals between them.
///
/// `eval` is queried at partition points and at interval midpoints; on an
/// open interval between consecutive partition points the lifted value is
/// constant, so the midpoint decides it.
pub(crate) fn assemble_stepwise<C: BaseValue>(
    times: &[i64],
    lower_inc: bool,
    upper_inc: bool,
    eval: &dyn Fn(i64) -> Option<Result<C>>,
) -> Result<Vec<TSequence<C>>> {
    debug_assert!(!times.is_empty());
    enum Atom<C> {
        Point(i64, C),
        Interval(i64, C),
    }
    let mut atoms: Vec<Atom<C>> = Vec::with_capacity(times.len() * 2);
    for (idx, &t) in times.iter().enumerate() {
        if let Some(v) = eval(t).transpose()? {
            atoms.push(Atom::Point(t, v));
        }
        if idx + 1 < times.len() {
            let mid = t + (times[idx + 1] - t) / 2;
            if let Some(v) = eval(mid).transpose()? {
                atoms.push(Atom::Interval(t, v));
            }
        }
    }
    let last_t = *times.last().expect("non-empty");
    let mut fragments: Vec<TSequence<C>> = Vec::new();
    let mut cur: Vec<TInstant<C>> = Vec::new();
    let mut cur_val: Option<C> = None;
    let mut cur_lower_inc = lower_inc;
    for i in 0..atoms.len() {
        match &atoms[i] {
            Atom::Point(t, v) => match &cur_val {
                None => {
                    cur.push(TInstant::from_micros(v.clone(), *t));
                    cur_val = Some(v.clone());
                }
                Some(cv) if cv == v => {}
                Some(cv) => {
                    let continues = matches!(
                        atoms.get(i + 1),
                        Some(Atom::Interval(_, nv)) if nv == v
                    );
                    if continues {
                        // step change at an inclusive interior instant
                        cur.push(TInstant::from_micros(v.clone(), *t));
                        cur_val = Some(v.clone());
                    } else {
                        // isolated point value: close the run exclusively
                        // and emit the singleton
                        if cur.last().map(TInstant::t_micros) != Some(*t) {
                            cur.push(TInstant::from_micros(cv.clone(), *t));
                        }
                        fragments.push(TSequence::from_parts(
                            std::mem::take(&mut cur),
                            cur_lower_inc,
                            false,
                            TInterpolation::Stepwise,
                        ));
                        if *t < last_t || upper_inc {
                            fragments.push(TSequence::from_parts(
                                vec![TInstant::from_micros(v.clone(), *t)],
                                true,
                                true,
                                TInterpolation::Stepwise,
                            ));
                        }
                        cur_val = None;
                        cur_lower_inc = false;
                    }
                }
            },
            Atom::Interval(t0, v) => match &cur_val {
                None => {
                    cur.push(TInstant::from_micros(v.clone(), *t0));
                    cur_val = Some(v.clone());
                    cur_lower_inc = false;
                }
                Some(cv) if cv == v => {}
                Some(cv) => {
                    // the value changes just after t0: close at t0 inclusive
                    if cur.last().map(TInstant::t_micros) != Some(*t0) {
                        cur.push(TInstant::from_micros(cv.clone(), *t0));
                    }
                    fragments.push(TSequence::from_parts(
                        std::mem::take(&mut cur),
                        cur_lower_inc,
                        true,
                        TInterpolation::Stepwise,
                    ));
                    cur.push(TInstant::from_micros(v.clone(), *t0));
                    cur_val = Some(v.clone());
                    cur_lower_inc = false;
                }
            },
        }
    }
    if let Some(cv) = cur_val {
        if cur.last().map(TInstant::t_micros) != Some(last_t) {
            cur.push(TInstant::from_micros(cv, last_t));
        }
        let single_point = cur.len() == 1;
        fragments.push(TSequence::from_parts(
            cur,
            cur_lower_inc || single_point,
            upper_inc || single_point,
            TInterpolation::Stepwise,
        ));
    }
    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::datetime::ts;
    use pretty_assertions::assert_eq;

    fn tf(s: &str) -> Temporal<f64> {
        s.parse().unwrap()
    }

    fn teq_spec() -> LiftSpec<f64, f64> {
        LiftSpec::with_crossings(false, |a0: &f64, a1: &f64, b0: &f64, b1: &f64| {
            let da = a1 - a0;
            let db = b1 - b0;
            if (da - db).abs() <= f64::EPSILON {
                return Vec::new();
            }
            let frac = (b0 - a0) / (da - db);
            if frac > 0.0 && frac < 1.0 {
                vec![frac]
            } else {
                Vec::new()
            }
        })
    }

    #[test]
    fn disjoint_periods_return_none() {
        let a = tf("[1@2020-01-01, 2@2020-01-02]");
        let b = tf("[1@2020-03-01, 2@2020-03-02]");
        let spec = LiftSpec::no_cross(true);
        let result =
            lift_binary(&a, &b, &spec, &|x: &f64, y: &f64| Ok(x + y)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn instant_against_sequence() {
        let a = tf("5@2020-01-02");
        let b = tf("[0@2020-01-01, 10@2020-01-03]");
        let spec = LiftSpec::no_cross(true);
        let result = lift_binary(&a, &b, &spec, &|x: &f64, y: &f64| Ok(x + y))
            .unwrap()
            .unwrap();
        assert_eq!(result.values(), vec![10.0]);
    }

    #[test]
    fn sum_of_linear_sequences_is_linear() {
        let a = tf("[0@2020-01-01, 10@2020-01-03]");
        let b = tf("[5@2020-01-02, 7@2020-01-04]");
        let spec = LiftSpec::no_cross(true);
        let result = lift_binary(&a, &b, &spec, &|x: &f64, y: &f64| Ok(x + y))
            .unwrap()
            .unwrap();
        assert_eq!(result.interpolation(), TInterpolation::Linear);
        // common period [01-02, 01-03]: a is 5->10, b is 5->6
        assert_eq!(result.start_value(), &10.0);
        assert_eq!(result.end_value(), &16.0);
    }

    #[test]
    fn equality_crossing_produces_singleton_true() {
        let a = tf("[0@2020-01-01, 10@2020-01-03]");
        let b = tf("[10@2020-01-01, 0@2020-01-03]");
        let result = lift_binary(&a, &b, &teq_spec(), &|x: &f64, y: &f64| {
            Ok((x - y).abs() <= f64::EPSILON)
        })
        .unwrap()
        .unwrap();
        // false before the crossing, true exactly at it, false after
        assert_eq!(result.value_at_timestamp(ts("2020-01-01")), Some(false));
        assert_eq!(result.value_at_timestamp(ts("2020-01-02")), Some(true));
        assert_eq!(result.value_at_timestamp(ts("2020-01-02 12:00:00")), Some(false));
        assert_eq!(result.value_at_timestamp(ts("2020-01-03")), Some(false));
    }

    #[test]
    fn synchronization_symmetry() {
        let a = tf("[0@2020-01-01, 10@2020-01-03]");
        let b = tf("[5@2020-01-02, 7@2020-01-04]");
        let spec = LiftSpec::no_cross(true);
        let ab = lift_binary(&a, &b, &spec, &|x: &f64, y: &f64| Ok(x + y))
            .unwrap()
            .unwrap();
        let ba = lift_binary(&b, &a, &spec, &|x: &f64, y: &f64| Ok(y + x))
            .unwrap()
            .unwrap();
        assert_eq!(ab.time(), ba.time());
        assert_eq!(ab.timestamps(), ba.timestamps());
    }

    #[test]
    fn discrete_sequences_intersect_timestamps() {
        let a: Temporal<f64> = "{1@2020-01-01, 2@2020-01-02, 3@2020-01-03}".parse().unwrap();
        let b = tf("[10@2020-01-02, 20@2020-01-04]");
        let spec = LiftSpec::no_cross(true);
        let result = lift_binary(&a, &b, &spec, &|x: &f64, y: &f64| Ok(x + y))
            .unwrap()
            .unwrap();
        assert_eq!(result.interpolation(), TInterpolation::Discrete);
        assert_eq!(result.values(), vec![12.0, 18.0]);
    }

    #[test]
    fn value_lift_widens_the_constant() {
        let a = tf("[0@2020-01-01, 10@2020-01-03]");
        let result = lift_with_value(
            &a,
            &5.0,
            &teq_spec(),
            &|x: &f64, y: &f64| Ok((x - y).abs() <= f64::EPSILON),
        )
        .unwrap()
        .unwrap();
        assert_eq!(result.value_at_timestamp(ts("2020-01-02")), Some(true));
        assert_eq!(result.value_at_timestamp(ts("2020-01-01")), Some(false));
    }
}
