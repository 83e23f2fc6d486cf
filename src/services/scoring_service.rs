use crate::models::question::QuestionOptions;
use crate::models::quiz_attempt::PacketScore;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Snapshot of a question at scoring time. Attempts keep packet names, not
/// ids, so later packet edits cannot change a stored result.
#[derive(Debug, Clone)]
pub struct ScoredQuestion {
    pub id: Uuid,
    pub packet_name: String,
    pub options: QuestionOptions,
    pub marks: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    pub total_marks: i32,
    pub total_questions: i32,
    pub max_marks: i32,
    /// Rounded percentage of `max_marks`; 0 when nothing was achievable.
    pub percentage: i32,
    pub packet_marks: BTreeMap<String, PacketScore>,
}

/// Scores a set of answers against question snapshots. Unanswered questions
/// and answers that match no option contribute nothing; packets in which no
/// answer matched are absent from the breakdown.
pub fn score_attempt(
    questions: &[ScoredQuestion],
    answers: &BTreeMap<Uuid, String>,
) -> ScoreSummary {
    let mut total_marks = 0;
    let mut max_marks = 0;
    let mut packet_marks: BTreeMap<String, PacketScore> = BTreeMap::new();

    for question in questions {
        max_marks += question.options.max_marks(question.marks);

        let Some(answer) = answers.get(&question.id) else {
            continue;
        };
        let Some(awarded) = question.options.marks_for(answer, question.marks) else {
            continue;
        };

        total_marks += awarded;
        let entry = packet_marks.entry(question.packet_name.clone()).or_default();
        entry.marks += awarded;
        entry.questions += 1;
    }

    let percentage = if max_marks > 0 {
        ((total_marks as f64 / max_marks as f64) * 100.0).round() as i32
    } else {
        0
    };

    ScoreSummary {
        total_marks,
        total_questions: questions.len() as i32,
        max_marks,
        percentage,
        packet_marks,
    }
}
