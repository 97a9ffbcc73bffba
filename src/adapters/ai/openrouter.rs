//! OpenRouter implementation of the writing evaluator.
//!
//! Talks to the chat-completions API, asks for the rubric result as JSON,
//! and extracts it from the assistant message (the model sometimes wraps
//! the JSON in prose, so the parser takes the outermost brace span).
//!
//! Per the evaluator contract, every failure path - transport, API
//! status, unparseable reply - degrades to the deterministic fallback
//! rather than surfacing an error to the learner.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AiConfig;
use crate::domain::evaluation::{
    CriteriaFeedback, RubricContext, RubricScores, WritingFeedback,
};
use crate::ports::WritingEvaluator;

/// System prompt for rubric grading.
const GRADING_SYSTEM_PROMPT: &str = r#"You are a friendly and encouraging Thai language teacher named "ProficienThAI".
You help non-native speakers (mainly Chinese students) improve their Thai reading and writing skills.

Your personality:
- Warm and supportive
- Give constructive feedback
- Celebrate small wins
- Use simple Thai that intermediate learners can understand

เกณฑ์การประเมินงานเขียนภาษาไทย (สำหรับนักศึกษาต่างชาติ) - แต่ละเกณฑ์ให้คะแนน 1-4:

1. เนื้อหาและการนำเสนอ (Content & Presentation) [content]
2. การลำดับความ (Organization) [organization]
3. ไวยากรณ์และโครงสร้างประโยค (Grammar and Structure) [grammar]
4. การเลือกใช้คำศัพท์ (Vocabulary Use) [vocabulary]
5. อักขระวิธีและการเว้นวรรค (Mechanics and Space) [mechanics]

ให้ 4 = ดีมาก, 3 = ดี, 2 = พอใช้, 1 = ต้องปรับปรุง

IMPORTANT: Always respond in Thai language."#;

/// System prompt for free-form conversation; `{context}` is substituted.
const CHAT_SYSTEM_PROMPT: &str = r#"You are ProficienThAI, a friendly Thai language learning chatbot.
You help students improve their Thai reading and writing skills.
Respond naturally in Thai, keeping messages concise and helpful.
If the student asks about assignments or feedback, guide them to use the appropriate menu.
Be encouraging and supportive.

Context: {context}"#;

/// Fixed reply when the conversational call fails.
const CHAT_FALLBACK: &str = "ขอโทษครับ เกิดข้อผิดพลาด กรุณาลองใหม่อีกครั้งนะครับ";

/// Writing evaluator backed by the OpenRouter chat-completions API.
pub struct OpenRouterEvaluator {
    config: AiConfig,
    client: Client,
}

#[derive(Debug, thiserror::Error)]
enum EvaluatorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty completion")]
    EmptyCompletion,

    #[error("parse error: {0}")]
    Parse(String),
}

impl OpenRouterEvaluator {
    /// Creates an evaluator from the AI configuration.
    pub fn new(config: AiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Sends one chat completion and returns the assistant text.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, EvaluatorError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", "ProficienThAI")
            .json(&request)
            .send()
            .await
            .map_err(|e| EvaluatorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvaluatorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| EvaluatorError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(EvaluatorError::EmptyCompletion)
    }

    async fn try_evaluate(
        &self,
        text: &str,
        context: &RubricContext,
    ) -> Result<WritingFeedback, EvaluatorError> {
        let user_prompt = grading_prompt(text, context);
        let content = self
            .complete(GRADING_SYSTEM_PROMPT, &user_prompt, 0.7, 1000)
            .await?;
        parse_feedback(&content)
    }
}

/// Builds the grading request body.
fn grading_prompt(text: &str, context: &RubricContext) -> String {
    let lead = if context.is_final_submission {
        "นักเรียนส่งงานเขียน:"
    } else {
        "นักเรียนขอผลป้อนกลับฉบับร่าง:"
    };

    format!(
        r#"{lead}

โจทย์: {task}

งานเขียนของนักเรียน:
"""
{text}
"""

กรุณาประเมินโดยใช้เกณฑ์ 5 ข้อ (1-4 คะแนนต่อข้อ) ตอบเป็น JSON format ดังนี้:
{{
  "scores": {{ "content": <1-4>, "organization": <1-4>, "grammar": <1-4>, "vocabulary": <1-4>, "mechanics": <1-4> }},
  "criteriaFeedback": {{ "content": "...", "organization": "...", "grammar": "...", "vocabulary": "...", "mechanics": "..." }},
  "feedback": "<ข้อความสรุปภาพรวม 2-3 ประโยค>",
  "suggestions": ["<คำแนะนำข้อ 1>", "<คำแนะนำข้อ 2>", "<คำแนะนำข้อ 3>"],
  "encouragement": "<ข้อความให้กำลังใจ>"
}}"#,
        lead = lead,
        task = context.task_description,
        text = text,
    )
}

/// Extracts the outermost JSON object from the assistant message and maps
/// it into a complete feedback value. Missing subscores default to the
/// neutral 2; all scores are clamped into the rubric range and the total
/// is recomputed here, never trusted from the model.
fn parse_feedback(content: &str) -> Result<WritingFeedback, EvaluatorError> {
    let start = content
        .find('{')
        .ok_or_else(|| EvaluatorError::Parse("no JSON object in completion".to_string()))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| EvaluatorError::Parse("no JSON object in completion".to_string()))?;
    if end < start {
        return Err(EvaluatorError::Parse("malformed JSON span".to_string()));
    }

    let raw: RawFeedback = serde_json::from_str(&content[start..=end])
        .map_err(|e| EvaluatorError::Parse(e.to_string()))?;

    let scores = RubricScores {
        content: raw.scores.content.unwrap_or(2),
        organization: raw.scores.organization.unwrap_or(2),
        grammar: raw.scores.grammar.unwrap_or(2),
        vocabulary: raw.scores.vocabulary.unwrap_or(2),
        mechanics: raw.scores.mechanics.unwrap_or(2),
    }
    .clamped();

    Ok(WritingFeedback {
        scores,
        feedback: raw.feedback,
        suggestions: raw.suggestions,
        encouragement: raw.encouragement,
        criteria: CriteriaFeedback {
            content: raw.criteria_feedback.content,
            organization: raw.criteria_feedback.organization,
            grammar: raw.criteria_feedback.grammar,
            vocabulary: raw.criteria_feedback.vocabulary,
            mechanics: raw.criteria_feedback.mechanics,
        },
    })
}

#[async_trait]
impl WritingEvaluator for OpenRouterEvaluator {
    async fn evaluate(&self, text: &str, context: &RubricContext) -> WritingFeedback {
        match self.try_evaluate(text, context).await {
            Ok(feedback) => feedback,
            Err(err) => {
                tracing::warn!(error = %err, "grading call failed, using fallback feedback");
                WritingFeedback::fallback()
            }
        }
    }

    async fn converse(&self, message: &str, user_context: &str) -> String {
        let system = CHAT_SYSTEM_PROMPT.replace("{context}", user_context);
        match self.complete(&system, message, 0.8, 300).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "conversation call failed, using fallback reply");
                CHAT_FALLBACK.to_string()
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct RawFeedback {
    #[serde(default)]
    scores: RawScores,
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    encouragement: String,
    #[serde(default, rename = "criteriaFeedback")]
    criteria_feedback: RawCriteria,
}

#[derive(Debug, Default, Deserialize)]
struct RawScores {
    content: Option<u8>,
    organization: Option<u8>,
    grammar: Option<u8>,
    vocabulary: Option<u8>,
    mechanics: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCriteria {
    #[serde(default)]
    content: String,
    #[serde(default)]
    organization: String,
    #[serde(default)]
    grammar: String,
    #[serde(default)]
    vocabulary: String,
    #[serde(default)]
    mechanics: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_wrapped_in_prose() {
        let content = r#"นี่คือผลการประเมินครับ:
{
  "scores": { "content": 3, "organization": 4, "grammar": 2, "vocabulary": 3, "mechanics": 4 },
  "criteriaFeedback": { "content": "ดี", "organization": "ดีมาก", "grammar": "พอใช้", "vocabulary": "ดี", "mechanics": "ดีมาก" },
  "feedback": "เขียนได้ดีครับ",
  "suggestions": ["อ่านทบทวน"],
  "encouragement": "สู้ๆ"
}
หวังว่าจะเป็นประโยชน์"#;

        let feedback = parse_feedback(content).unwrap();
        assert_eq!(feedback.scores.total(), 16);
        assert_eq!(feedback.feedback, "เขียนได้ดีครับ");
        assert_eq!(feedback.suggestions, vec!["อ่านทบทวน"]);
        assert_eq!(feedback.criteria.organization, "ดีมาก");
    }

    #[test]
    fn missing_scores_default_to_neutral() {
        let content = r#"{ "feedback": "ok", "suggestions": [], "encouragement": "" }"#;
        let feedback = parse_feedback(content).unwrap();
        assert_eq!(feedback.scores, RubricScores::neutral());
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let content = r#"{ "scores": { "content": 9, "organization": 0, "grammar": 4, "vocabulary": 1, "mechanics": 2 } }"#;
        let feedback = parse_feedback(content).unwrap();
        assert_eq!(feedback.scores.content, 4);
        assert_eq!(feedback.scores.organization, 1);
    }

    #[test]
    fn completion_without_json_is_a_parse_error() {
        assert!(parse_feedback("ขอโทษครับ ประเมินไม่ได้").is_err());
        assert!(parse_feedback("").is_err());
        assert!(parse_feedback("} backwards {").is_err());
    }

    #[test]
    fn grading_prompt_distinguishes_drafts_from_submissions() {
        let draft = grading_prompt("ข้อความ", &RubricContext::draft(None));
        assert!(draft.contains("ฉบับร่าง"));
        assert!(draft.contains("งานเขียนทั่วไป"));

        let submission = grading_prompt("ข้อความ", &RubricContext::submission("โจทย์สัปดาห์นี้"));
        assert!(submission.contains("นักเรียนส่งงานเขียน:"));
        assert!(submission.contains("โจทย์สัปดาห์นี้"));
    }
}
