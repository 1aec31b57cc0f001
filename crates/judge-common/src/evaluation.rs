//! Multi-judge evaluation: the fixed judge panel, the prompt that asks the
//! model to play it, and the validating decode of the model's answer.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::JudgeError;
use crate::gemini::{GeminiClient, GeminiConfig};

/// Feedback points per verdict, and entries in each overall list.
pub const POINTS_PER_LIST: usize = 3;
pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

/// One of the four fixed judge personas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum JudgeId {
    Corporate,
    Research,
    Vc,
    Community,
}

impl JudgeId {
    /// Panel order. Verdicts are expected in exactly this order.
    pub const ALL: [JudgeId; 4] = [
        JudgeId::Corporate,
        JudgeId::Research,
        JudgeId::Vc,
        JudgeId::Community,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JudgeId::Corporate => "corporate",
            JudgeId::Research => "research",
            JudgeId::Vc => "vc",
            JudgeId::Community => "community",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            JudgeId::Corporate => "Corporate Judge",
            JudgeId::Research => "Research Judge",
            JudgeId::Vc => "VC Judge",
            JudgeId::Community => "Community Judge",
        }
    }

    pub fn focus(self) -> &'static str {
        match self {
            JudgeId::Corporate => "Business Model, ROI, Viability",
            JudgeId::Research => "Innovation, Technology, Novelty",
            JudgeId::Vc => "Scalability, Market Size, Team",
            JudgeId::Community => "Social Impact, Inclusivity, User Benefit",
        }
    }
}

impl fmt::Display for JudgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub judge_id: JudgeId,
    /// 1 to 10.
    pub score: f64,
    pub feedback: Vec<String>,
    pub improvement: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// One verdict per judge, in panel order.
    pub verdicts: Vec<Verdict>,
    pub overall_strengths: Vec<String>,
    pub overall_weaknesses: Vec<String>,
    pub final_text: String,
}

/// Why a syntactically valid evaluation was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("expected {expected} verdicts, got {actual}")]
    VerdictCount { expected: usize, actual: usize },

    #[error("verdict {index} is from {actual}, expected {expected}")]
    JudgeOrder {
        index: usize,
        expected: JudgeId,
        actual: JudgeId,
    },

    #[error("{judge} score {score} is outside 1..=10")]
    ScoreOutOfRange { judge: JudgeId, score: f64 },

    #[error("{field} has {actual} entries, expected {expected}")]
    ListLength {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl EvaluationResult {
    /// Check the structure the prompt asks for: four verdicts in panel order,
    /// scores in range, and three entries in every list.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.verdicts.len() != JudgeId::ALL.len() {
            return Err(ShapeError::VerdictCount {
                expected: JudgeId::ALL.len(),
                actual: self.verdicts.len(),
            });
        }

        for (index, (verdict, expected)) in self.verdicts.iter().zip(JudgeId::ALL).enumerate() {
            if verdict.judge_id != expected {
                return Err(ShapeError::JudgeOrder {
                    index,
                    expected,
                    actual: verdict.judge_id,
                });
            }
            if !verdict.score.is_finite()
                || verdict.score < MIN_SCORE
                || verdict.score > MAX_SCORE
            {
                return Err(ShapeError::ScoreOutOfRange {
                    judge: verdict.judge_id,
                    score: verdict.score,
                });
            }
            check_len(&format!("{} feedback", verdict.judge_id), &verdict.feedback)?;
        }

        check_len("overallStrengths", &self.overall_strengths)?;
        check_len("overallWeaknesses", &self.overall_weaknesses)?;
        Ok(())
    }
}

fn check_len(field: &str, items: &[String]) -> Result<(), ShapeError> {
    if items.len() != POINTS_PER_LIST {
        return Err(ShapeError::ListLength {
            field: field.to_string(),
            expected: POINTS_PER_LIST,
            actual: items.len(),
        });
    }
    Ok(())
}

/// Decode model output into a validated [`EvaluationResult`].
///
/// Parse and shape failures are logged with their detail; the caller only
/// sees [`JudgeError::Parse`] and the raw text is dropped.
pub fn decode_evaluation(text: &str) -> Result<EvaluationResult, JudgeError> {
    let result: EvaluationResult = serde_json::from_str(text).map_err(|e| {
        error!(error = %e, "failed to parse model response as evaluation JSON");
        JudgeError::Parse
    })?;

    result.validate().map_err(|e| {
        error!(error = %e, "model response has the wrong evaluation shape");
        JudgeError::Parse
    })?;

    Ok(result)
}

/// Assemble the head-judge prompt. Deterministic: the same inputs always
/// produce the same text, and both inputs appear verbatim.
pub fn build_prompt(guidelines: &str, solution: &str) -> String {
    let panel: String = JudgeId::ALL
        .iter()
        .enumerate()
        .map(|(i, judge)| {
            format!(
                "{}. {} (ID: '{}') - Focus on {}.\n",
                i + 1,
                judge.title(),
                judge.as_str(),
                judge.focus()
            )
        })
        .collect();

    let order = JudgeId::ALL
        .iter()
        .map(|j| j.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are the Head Judge for a Hackathon.\n\n\
HACKATHON GUIDELINES (scraped from the event website):\n{guidelines}\n\n\
PARTICIPANT SOLUTION:\n{solution}\n\n\
The guideline text may contain navigation and other noise. First extract the rules that \
matter for judging, focusing on the judging criteria. Then evaluate the solution against \
those rules and against general startup and hackathon criteria.\n\n\
Simulate these {count} judges:\n{panel}\n\
Respond with a single JSON object of exactly this structure:\n\
{{\n  \
\"verdicts\": [\n    \
{{\n      \
\"judgeId\": \"corporate\",\n      \
\"score\": number from {min} to {max},\n      \
\"feedback\": [string, string, string] ({points} distinct points),\n      \
\"improvement\": string (1 specific suggestion)\n    \
}}\n    \
... one entry per judge, in this order: {order}\n  \
],\n  \
\"overallStrengths\": [string, string, string] (top {points} strengths of the project),\n  \
\"overallWeaknesses\": [string, string, string] (top {points} areas for improvement),\n  \
\"finalText\": string (short concluding remark)\n\
}}\n",
        count = JudgeId::ALL.len(),
        min = MIN_SCORE as u32,
        max = MAX_SCORE as u32,
        points = POINTS_PER_LIST,
    )
}

/// Runs the judge panel against a Gemini model.
#[derive(Clone)]
pub struct Evaluator {
    gemini: GeminiClient,
}

impl Evaluator {
    pub fn new(config: GeminiConfig) -> Result<Self, JudgeError> {
        Ok(Self {
            gemini: GeminiClient::new(config)?,
        })
    }

    pub fn from_env() -> Result<Self, JudgeError> {
        Self::new(GeminiConfig::from_env())
    }

    pub fn model(&self) -> &str {
        &self.gemini.config().model
    }

    /// One generation request, one decode attempt.
    pub async fn evaluate(
        &self,
        guidelines: &str,
        solution: &str,
        api_key: &str,
    ) -> Result<EvaluationResult, JudgeError> {
        let prompt = build_prompt(guidelines, solution);
        let text = self.gemini.generate_json(&prompt, api_key).await?;
        let result = decode_evaluation(&text)?;
        info!(
            model = %self.model(),
            scores = ?result.verdicts.iter().map(|v| v.score).collect::<Vec<_>>(),
            "evaluation complete"
        );
        Ok(result)
    }
}

/// Evaluate with a client configured from the environment.
pub async fn evaluate(
    guidelines: &str,
    solution: &str,
    api_key: &str,
) -> Result<EvaluationResult, JudgeError> {
    let evaluator = Evaluator::from_env().inspect_err(|e| {
        error!(error = %e, "failed to build gemini client");
    })?;
    evaluator.evaluate(guidelines, solution, api_key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> String {
        let verdicts: Vec<serde_json::Value> = JudgeId::ALL
            .iter()
            .enumerate()
            .map(|(i, judge)| {
                serde_json::json!({
                    "judgeId": judge.as_str(),
                    "score": 6 + i,
                    "feedback": ["one", "two", "three"],
                    "improvement": format!("improve {judge}"),
                })
            })
            .collect();
        serde_json::json!({
            "verdicts": verdicts,
            "overallStrengths": ["a", "b", "c"],
            "overallWeaknesses": ["x", "y", "z"],
            "finalText": "Solid attempt.",
        })
        .to_string()
    }

    fn mutate(f: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut value: serde_json::Value = serde_json::from_str(&sample_json()).unwrap();
        f(&mut value);
        value.to_string()
    }

    #[test]
    fn prompt_embeds_inputs_and_names_every_judge() {
        let guidelines = "Judge on originality.\n  * keep it {braced}";
        let solution = "A todo app.";
        let prompt = build_prompt(guidelines, solution);
        assert!(prompt.contains(guidelines));
        assert!(prompt.contains(solution));
        for judge in JudgeId::ALL {
            assert!(
                prompt.contains(&format!("'{}'", judge.as_str())),
                "prompt should name {judge}"
            );
            assert!(prompt.contains(judge.focus()));
        }
        assert_eq!(prompt, build_prompt(guidelines, solution));
    }

    #[test]
    fn decodes_sample_evaluation_unchanged() {
        let result = decode_evaluation(&sample_json()).unwrap();
        assert_eq!(result.verdicts.len(), 4);
        assert_eq!(result.overall_strengths, ["a", "b", "c"]);
        assert_eq!(result.overall_weaknesses, ["x", "y", "z"]);
        assert_eq!(result.final_text, "Solid attempt.");
        assert_eq!(result.verdicts[2].judge_id, JudgeId::Vc);
        assert_eq!(result.verdicts[3].score, 9.0);

        let reencoded: serde_json::Value = serde_json::to_value(&result).unwrap();
        let original: serde_json::Value = serde_json::from_str(&sample_json()).unwrap();
        assert_eq!(reencoded["verdicts"][0]["judgeId"], original["verdicts"][0]["judgeId"]);
        assert_eq!(reencoded["finalText"], original["finalText"]);
    }

    #[test]
    fn non_json_is_generic_parse_error() {
        assert!(matches!(decode_evaluation("not json"), Err(JudgeError::Parse)));
    }

    #[test]
    fn missing_field_is_parse_error() {
        let text = mutate(|v| {
            v.as_object_mut().unwrap().remove("finalText");
        });
        assert!(matches!(decode_evaluation(&text), Err(JudgeError::Parse)));
    }

    #[test]
    fn unknown_judge_is_parse_error() {
        let text = mutate(|v| v["verdicts"][1]["judgeId"] = "academic".into());
        assert!(matches!(decode_evaluation(&text), Err(JudgeError::Parse)));
    }

    #[test]
    fn wrong_verdict_count_is_rejected() {
        let text = mutate(|v| {
            v["verdicts"].as_array_mut().unwrap().pop();
        });
        let parsed: EvaluationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed.validate(),
            Err(ShapeError::VerdictCount {
                expected: 4,
                actual: 3
            })
        );
        assert!(matches!(decode_evaluation(&text), Err(JudgeError::Parse)));
    }

    #[test]
    fn swapped_judges_are_rejected() {
        let text = mutate(|v| v["verdicts"].as_array_mut().unwrap().swap(0, 1));
        let parsed: EvaluationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed.validate(),
            Err(ShapeError::JudgeOrder {
                index: 0,
                expected: JudgeId::Corporate,
                actual: JudgeId::Research,
            })
        );
    }

    #[test]
    fn score_outside_range_is_rejected() {
        for bad in [0.0, 10.5, 11.0] {
            let text = mutate(|v| v["verdicts"][0]["score"] = bad.into());
            let parsed: EvaluationResult = serde_json::from_str(&text).unwrap();
            assert!(
                matches!(parsed.validate(), Err(ShapeError::ScoreOutOfRange { .. })),
                "score {bad} should be rejected"
            );
        }
        let text = mutate(|v| v["verdicts"][0]["score"] = 7.5.into());
        assert!(decode_evaluation(&text).is_ok());
    }

    #[test]
    fn short_lists_are_rejected() {
        let text = mutate(|v| v["overallWeaknesses"] = serde_json::json!(["x", "y"]));
        let parsed: EvaluationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed.validate(),
            Err(ShapeError::ListLength {
                field: "overallWeaknesses".to_string(),
                expected: 3,
                actual: 2,
            })
        );

        let text = mutate(|v| v["verdicts"][2]["feedback"] = serde_json::json!(["only one"]));
        assert!(matches!(decode_evaluation(&text), Err(JudgeError::Parse)));
    }

    #[test]
    fn judge_ids_serialize_lowercase() {
        let ids: Vec<String> = JudgeId::ALL
            .iter()
            .map(|j| serde_json::to_value(j).unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["corporate", "research", "vc", "community"]);
    }
}
