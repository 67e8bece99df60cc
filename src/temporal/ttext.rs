use super::lifting::{lift_binary, lift_with_value, LiftSpec};
use super::temporal::Temporal;
use super::tinstant::TInstant;
use super::tsequence::TSequence;
use super::tsequence_set::TSequenceSet;
use crate::errors::Result;

/// A text value evolving over time.
///
/// ## Example
/// ```
/// # use teos::temporal::TText;
/// let t: TText = "[\"AA\"@2020-01-01, \"BB\"@2020-01-02]".parse().unwrap();
/// assert_eq!(t.min_value().map(String::as_str), Some("AA"));
/// ```
pub type TText = Temporal<String>;
pub type TTextInstant = TInstant<String>;
pub type TTextSequence = TSequence<String>;
pub type TTextSequenceSet = TSequenceSet<String>;

pub trait TTextTrait {
    /// Temporal concatenation with another temporal text.
    fn concatenate(&self, other: &TText) -> Result<Option<TText>>;

    /// Temporal concatenation with a constant suffix.
    fn concatenate_value(&self, suffix: &str) -> Result<Option<TText>>;

    /// Uppercase every value.
    fn uppercase(&self) -> TText;

    /// Lowercase every value.
    fn lowercase(&self) -> TText;
}

impl TTextTrait for TText {
    fn concatenate(&self, other: &TText) -> Result<Option<TText>> {
        lift_binary(
            self,
            other,
            &LiftSpec::no_cross(false),
            &|a: &String, b: &String| Ok(format!("{a}{b}")),
        )
    }

    fn concatenate_value(&self, suffix: &str) -> Result<Option<TText>> {
        lift_with_value(
            self,
            &suffix.to_string(),
            &LiftSpec::no_cross(false),
            &|a: &String, b: &String| Ok(format!("{a}{b}")),
        )
    }

    fn uppercase(&self) -> TText {
        self.map_values(&|v: &String| Ok(v.to_uppercase()))
            .expect("case mapping cannot fail")
    }

    fn lowercase(&self) -> TText {
        self.map_values(&|v: &String| Ok(v.to_lowercase()))
            .expect("case mapping cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::datetime::ts;

    #[test]
    fn concat_and_case() {
        let t: TText = "[\"a\"@2020-01-01, \"b\"@2020-01-02]".parse().unwrap();
        let upper = t.uppercase();
        assert_eq!(upper.value_at_timestamp(ts("2020-01-01")).unwrap(), "A");
        let suffixed = t.concatenate_value("!").unwrap().unwrap();
        assert_eq!(suffixed.value_at_timestamp(ts("2020-01-02")).unwrap(), "b!");
    }

    #[test]
    fn text_comparisons_are_lexicographic() {
        let t: TText = "[\"aa\"@2020-01-01, \"bb\"@2020-01-02]".parse().unwrap();
        assert!(t.ever_lt(&"ab".to_string()));
        assert!(t.always_ge(&"aa".to_string()));
    }
}
