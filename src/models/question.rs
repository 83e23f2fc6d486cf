use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub packet_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: sqlx::types::Json<QuestionOptions>,
    pub marks: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    TrueFalse,
}

/// Option storage format, decided once when the question is created.
/// Legacy questions keep a plain string list and award the question's flat
/// `marks` for any matching selection; scored questions carry a point value
/// per option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionOptions {
    Scored(Vec<ScoredOption>),
    Legacy(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredOption {
    pub text: String,
    #[serde(default)]
    pub marks: i32,
}

impl QuestionOptions {
    pub fn len(&self) -> usize {
        match self {
            QuestionOptions::Scored(opts) => opts.len(),
            QuestionOptions::Legacy(opts) => opts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks awarded for a selected answer, matched against option display
    /// text case-insensitively. `None` when nothing matches.
    pub fn marks_for(&self, answer: &str, flat_marks: i32) -> Option<i32> {
        if answer.is_empty() {
            return None;
        }
        match self {
            QuestionOptions::Scored(opts) => opts
                .iter()
                .find(|o| o.text.eq_ignore_ascii_case(answer))
                .map(|o| o.marks),
            QuestionOptions::Legacy(opts) => opts
                .iter()
                .find(|t| t.eq_ignore_ascii_case(answer))
                .map(|_| flat_marks),
        }
    }

    /// The highest obtainable point value for this question. An empty option
    /// list is worth nothing.
    pub fn max_marks(&self, flat_marks: i32) -> i32 {
        match self {
            QuestionOptions::Scored(opts) => opts.iter().map(|o| o.marks).max().unwrap_or(0),
            QuestionOptions::Legacy(opts) => {
                if opts.is_empty() {
                    0
                } else {
                    flat_marks
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_deserialize_into_tagged_variants() {
        let legacy: QuestionOptions = serde_json::from_str(r#"["True", "False"]"#).unwrap();
        assert!(matches!(legacy, QuestionOptions::Legacy(ref v) if v.len() == 2));

        let scored: QuestionOptions =
            serde_json::from_str(r#"[{"text": "Always", "marks": 3}, {"text": "Never"}]"#)
                .unwrap();
        match scored {
            QuestionOptions::Scored(v) => {
                assert_eq!(v[0].marks, 3);
                assert_eq!(v[1].marks, 0);
            }
            _ => panic!("expected scored options"),
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let opts = QuestionOptions::Scored(vec![
            ScoredOption {
                text: "Strongly Agree".into(),
                marks: 3,
            },
            ScoredOption {
                text: "Disagree".into(),
                marks: 0,
            },
        ]);
        assert_eq!(opts.marks_for("strongly agree", 1), Some(3));
        assert_eq!(opts.marks_for("DISAGREE", 1), Some(0));
        assert_eq!(opts.marks_for("maybe", 1), None);
        assert_eq!(opts.marks_for("", 1), None);
    }

    #[test]
    fn legacy_options_award_flat_marks() {
        let opts = QuestionOptions::Legacy(vec!["True".into(), "False".into()]);
        assert_eq!(opts.marks_for("true", 1), Some(1));
        assert_eq!(opts.marks_for("False", 2), Some(2));
        assert_eq!(opts.max_marks(1), 1);
    }

    #[test]
    fn empty_options_are_worth_nothing() {
        let opts = QuestionOptions::Legacy(vec![]);
        assert_eq!(opts.max_marks(5), 0);
        assert_eq!(opts.marks_for("anything", 5), None);
    }
}
