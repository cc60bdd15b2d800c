use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{
    domain::{Difficulty, QuestionType, SessionId},
    error::ProtocolError,
};

/// Rephrases granted per question when the server omits the count.
pub const DEFAULT_REPHRASES: u32 = 2;

fn default_rephrases() -> u32 {
    DEFAULT_REPHRASES
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub difficulty: Difficulty,
    #[serde(rename = "question")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

/// Body of `GET /api/current-question/{id}` and of a submit that advances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question: Question,
    pub progress: Progress,
    #[serde(default = "default_rephrases")]
    pub rephrases_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: SessionId,
    pub answer: String,
}

/// Raw submit body. The server mixes three shapes in one object, so every
/// field is optional and [`SubmitAnswerResponse::into_reply`] picks one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rephrases_remaining: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitReply {
    OffTopic { message: Option<String> },
    Completed { results: Value },
    Next(QuestionPayload),
}

impl SubmitAnswerResponse {
    /// Warning wins over completion, completion over a next question.
    pub fn into_reply(self) -> Result<SubmitReply, ProtocolError> {
        if let Some(warning) = self.warning.as_ref().filter(|w| is_truthy(w)) {
            return Ok(SubmitReply::OffTopic {
                message: warning.as_str().map(str::to_owned),
            });
        }

        if self.completed.as_ref().is_some_and(is_truthy) {
            return Ok(SubmitReply::Completed {
                results: self.results.unwrap_or(Value::Null),
            });
        }

        let question = self.question.ok_or(ProtocolError::MissingField("question"))?;
        let progress = self.progress.ok_or(ProtocolError::MissingField("progress"))?;
        Ok(SubmitReply::Next(QuestionPayload {
            question,
            progress,
            rephrases_remaining: self.rephrases_remaining.unwrap_or(DEFAULT_REPHRASES),
        }))
    }
}

/// JSON truthiness as the backend uses it: `warning` is a message string,
/// `completed` a boolean.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RephraseResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rephrased_question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rephrases_remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rephrased {
    pub text: String,
    pub rephrases_remaining: u32,
}

impl RephraseResponse {
    pub fn into_rephrased(self) -> Result<Rephrased, ProtocolError> {
        if let Some(error) = self.error {
            return Err(ProtocolError::Rejected(error));
        }
        let text = self
            .rephrased_question
            .ok_or(ProtocolError::MissingField("rephrased_question"))?;
        let rephrases_remaining = self
            .rephrases_remaining
            .ok_or(ProtocolError::MissingField("rephrases_remaining"))?;
        Ok(Rephrased {
            text,
            rephrases_remaining,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartWithSkillsRequest {
    pub skills: Vec<String>,
}

/// Returned by both start endpoints and by restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStarted {
    pub session_id: SessionId,
    #[serde(default)]
    pub skills: Vec<String>,
}

// Report fields come from model output and may be missing, null or of the
// wrong shape. Each field decodes on its own and falls back to its default.

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the list elements that decode and drops the rest.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| serde_json::from_value(value).ok().map(|v| (key, v)))
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    #[serde(default, deserialize_with = "lenient")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakArea {
    #[serde(default, deserialize_with = "lenient")]
    pub topic: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub avg_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub questions_failed: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub index: u32,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub difficulty: Difficulty,
    #[serde(default, deserialize_with = "lenient")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient")]
    pub answer: String,
    #[serde(default, deserialize_with = "lenient")]
    pub feedback: String,
    #[serde(default, deserialize_with = "lenient")]
    pub score: f64,
}

/// Final report carried by a completed submit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsReport {
    #[serde(default, deserialize_with = "lenient")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub verdict: Option<String>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub section_scores: BTreeMap<String, SectionScore>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub weak_areas: Vec<WeakArea>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub improvement_suggestions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub learning_resources: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub review: Vec<ReviewItem>,
}

impl ResultsReport {
    pub fn section(&self, section: QuestionType) -> Option<&SectionScore> {
        self.section_scores.get(section.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn next_payload() -> Value {
        json!({
            "completed": false,
            "question": {"type": "theory", "difficulty": "easy", "question": "What is overfitting?"},
            "progress": {"current": 2, "total": 15},
            "rephrases_remaining": 2
        })
    }

    #[test]
    fn string_warning_is_off_topic() {
        let raw = json!({"warning": "WARNING: Stay on topic.", "continue": true});
        let reply = serde_json::from_value::<SubmitAnswerResponse>(raw)
            .expect("decode")
            .into_reply()
            .expect("reply");
        assert_eq!(
            reply,
            SubmitReply::OffTopic {
                message: Some("WARNING: Stay on topic.".into())
            }
        );
    }

    #[test]
    fn false_completed_with_question_is_next() {
        let reply = serde_json::from_value::<SubmitAnswerResponse>(next_payload())
            .expect("decode")
            .into_reply()
            .expect("reply");
        let SubmitReply::Next(payload) = reply else {
            panic!("expected next question, got {reply:?}");
        };
        assert_eq!(payload.progress.current, 2);
        assert_eq!(payload.question.kind, QuestionType::Theory);
    }

    #[test]
    fn completed_carries_results() {
        let raw = json!({"completed": true, "results": {"percentage": 82, "verdict": "GOOD"}});
        let reply = serde_json::from_value::<SubmitAnswerResponse>(raw)
            .expect("decode")
            .into_reply()
            .expect("reply");
        assert_eq!(
            reply,
            SubmitReply::Completed {
                results: json!({"percentage": 82, "verdict": "GOOD"})
            }
        );
    }

    #[test]
    fn empty_body_is_malformed() {
        let err = SubmitAnswerResponse::default().into_reply().unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField("question")));
    }

    #[test]
    fn missing_rephrase_count_defaults_to_two() {
        let raw = json!({
            "question": {"type": "coding", "difficulty": "hard", "question": "Reverse a list"},
            "progress": {"current": 12, "total": 15}
        });
        let payload: QuestionPayload = serde_json::from_value(raw).expect("decode");
        assert_eq!(payload.rephrases_remaining, DEFAULT_REPHRASES);
    }

    #[test]
    fn rephrase_error_body_is_rejection() {
        let raw = json!({"error": "No rephrase attempts remaining"});
        let err = serde_json::from_value::<RephraseResponse>(raw)
            .expect("decode")
            .into_rephrased()
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Rejected(msg) if msg.contains("No rephrase")));
    }

    #[test]
    fn results_report_tolerates_sparse_payload() {
        let report: ResultsReport =
            serde_json::from_value(json!({"percentage": 82, "verdict": "GOOD"})).expect("decode");
        assert_eq!(report.percentage, Some(82.0));
        assert!(report.review.is_empty());
        assert!(report.section_scores.is_empty());
    }

    #[test]
    fn malformed_report_fields_do_not_spoil_the_rest() {
        let report: ResultsReport = serde_json::from_value(json!({
            "percentage": 82.0,
            "verdict": null,
            "section_scores": {"theory": {"percentage": "n/a", "count": 6}, "coding": 7},
            "weak_areas": [{"topic": null, "avg_score": 20.0}, {"topic": "sql"}, "oops"],
            "improvement_suggestions": ["Revise joins", 3],
            "learning_resources": "https://docs.python.org",
            "review": [
                {"index": 1, "type": "theory", "difficulty": "easy", "question": "Q1", "score": null},
                {"index": 2, "type": "astrology", "difficulty": "easy", "question": "Q2"}
            ]
        }))
        .expect("decode");

        assert_eq!(report.percentage, Some(82.0));
        assert_eq!(report.verdict, None);
        assert_eq!(report.section(QuestionType::Theory).and_then(|s| s.percentage), None);
        assert_eq!(report.section(QuestionType::Theory).and_then(|s| s.count), Some(6));
        assert!(report.section(QuestionType::Coding).is_none());
        assert_eq!(report.weak_areas.len(), 2);
        assert_eq!(report.weak_areas[0].topic, None);
        assert_eq!(report.weak_areas[1].topic.as_deref(), Some("sql"));
        assert_eq!(report.improvement_suggestions, vec!["Revise joins".to_string()]);
        assert!(report.learning_resources.is_empty());
        assert_eq!(report.review.len(), 1);
        assert_eq!(report.review[0].score, 0.0);
    }
}
