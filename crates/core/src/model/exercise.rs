use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

//
// ─── REPS LABEL ────────────────────────────────────────────────────────────────
//

/// Rep target as supplied by the workout source.
///
/// Generators send plain numbers (`10`, `8.5`) as well as ranges or
/// free text (`"8-12"`, `"AMRAP"`). The label is displayed verbatim and never
/// interpreted numerically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepsLabel {
    Number(serde_json::Number),
    Text(String),
}

impl RepsLabel {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl Default for RepsLabel {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<u64> for RepsLabel {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for RepsLabel {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl fmt::Display for RepsLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepsLabel::Number(n) => write!(f, "{n}"),
            RepsLabel::Text(s) => f.write_str(s),
        }
    }
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// Unvalidated exercise as it arrives from a workout source.
///
/// `target_sets` is signed so that bad generator output (`0`, `-1`) survives
/// decoding and is rejected by validation with a precise error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseDraft {
    #[serde(alias = "exerciseName")]
    pub name: String,
    #[serde(alias = "sets")]
    pub target_sets: i64,
    #[serde(default, alias = "repsLabel", deserialize_with = "null_as_default")]
    pub reps: RepsLabel,
}

fn null_as_default<'de, D>(deserializer: D) -> Result<RepsLabel, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RepsLabel>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExerciseDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, target_sets: i64, reps: impl Into<RepsLabel>) -> Self {
        Self {
            name: name.into(),
            target_sets,
            reps: reps.into(),
        }
    }
}

/// A validated exercise: a named movement with at least one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    name: String,
    target_sets: u32,
    reps_label: RepsLabel,
}

impl Exercise {
    /// Only `WorkoutDraft::validate` builds exercises, so `target_sets` is
    /// always positive.
    pub(crate) fn new(name: String, target_sets: u32, reps_label: RepsLabel) -> Self {
        debug_assert!(target_sets > 0);
        Self {
            name,
            target_sets,
            reps_label,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn target_sets(&self) -> u32 {
        self.target_sets
    }

    #[must_use]
    pub fn reps_label(&self) -> &RepsLabel {
        &self.reps_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reps_label_accepts_numbers_and_text() {
        let n: RepsLabel = serde_json::from_str("12").unwrap();
        let s: RepsLabel = serde_json::from_str("\"8-12\"").unwrap();
        assert_eq!(n, RepsLabel::from(12));
        assert_eq!(s, RepsLabel::text("8-12"));
        assert_eq!(n.to_string(), "12");
        assert_eq!(s.to_string(), "8-12");
    }

    #[test]
    fn draft_accepts_generator_field_names() {
        let raw = r#"{"exerciseName":"Lunge","sets":3,"reps":"10 each leg"}"#;
        let draft: ExerciseDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.name, "Lunge");
        assert_eq!(draft.target_sets, 3);
        assert_eq!(draft.reps, RepsLabel::text("10 each leg"));
    }

    #[test]
    fn draft_accepts_canonical_field_names() {
        let raw = r#"{"name":"Row","targetSets":-1,"repsLabel":8}"#;
        let draft: ExerciseDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.target_sets, -1);
        assert_eq!(draft.reps, RepsLabel::from(8));
    }

    #[test]
    fn any_json_number_is_kept_verbatim() {
        for (raw, shown) in [("-1", "-1"), ("8.5", "8.5"), ("10.0", "10.0"), ("0", "0")] {
            let json = format!(r#"{{"exerciseName":"Squat","sets":2,"reps":{raw}}}"#);
            let draft: ExerciseDraft = serde_json::from_str(&json).unwrap();
            assert!(matches!(draft.reps, RepsLabel::Number(_)), "{raw}");
            assert_eq!(draft.reps.to_string(), shown);
        }
    }

    #[test]
    fn null_reps_decodes_as_empty_label() {
        let raw = r#"{"exerciseName":"Squat","sets":2,"reps":null}"#;
        let draft: ExerciseDraft = serde_json::from_str(raw).unwrap();
        assert_eq!(draft.reps, RepsLabel::default());
    }

    #[test]
    fn missing_reps_defaults_to_empty_label() {
        let draft: ExerciseDraft = serde_json::from_str(r#"{"name":"Plank","sets":1}"#).unwrap();
        assert_eq!(draft.reps.to_string(), "");
    }
}
