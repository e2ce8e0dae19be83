//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the fact-checking LLM.
//! It implements the `ContentAnalyzer` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use fact_tutor_core::{
    ports::{ContentAnalyzer, PortError, PortResult},
    AnalysisResult, Attachment,
};
use serde_json::Value;
use tracing::debug;

const SYSTEM_PROMPT: &str = "Tu es un tuteur d'éducation aux médias pour des élèves. \
Analyse la crédibilité du contenu fourni et réponds UNIQUEMENT avec un objet JSON, sans texte autour, de la forme: \
{\"score\": 0-100, \"verdict\": \"verified\"|\"suspicious\"|\"false\"|\"unverified\", \
\"factualElements\": [{\"claim\": \"...\", \"status\": \"true\"|\"false\"|\"partially-true\"|\"unverifiable\", \"explanation\": \"...\"}], \
\"sources\": [{\"title\": \"...\", \"url\": \"...\", \"reliability\": \"high\"|\"medium\"|\"low\", \"type\": \"official\"|\"academic\"|\"media\"|\"community\"}], \
\"pedagogicalExplanation\": \"...\", \"criticalThinkingSteps\": [\"...\"], \
\"exercise\": {\"question\": \"...\", \"hints\": [\"...\"], \"expectedApproach\": \"...\"}, \
\"suggestedQuizzes\": [{\"id\": \"1\", \"question\": \"...\", \"options\": [\"...\"], \"correctAnswer\": 0, \"explanation\": \"...\", \"difficulty\": \"easy\"|\"medium\"|\"hard\"}]}. \
Rédige toutes les explications en français.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ContentAnalyzer` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `ContentAnalyzer` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentAnalyzer for OpenAiAnalysisAdapter {
    async fn analyze(&self, content: &str, attachments: &[Attachment]) -> PortResult<AnalysisResult> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt(content, attachments))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unavailable(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::InvalidResponse("Analysis LLM returned no text content.".to_string())
            })?;
        debug!(chars = text.len(), "Received analysis from LLM");

        parse_analysis(&text)
    }
}

fn user_prompt(content: &str, attachments: &[Attachment]) -> String {
    let mut prompt = format!("CONTENU À ANALYSER:\n{}", content);
    if !attachments.is_empty() {
        prompt.push_str("\n\nPIÈCES JOINTES:");
        for attachment in attachments {
            prompt.push_str("\n- ");
            prompt.push_str(&attachment.describe());
        }
    }
    prompt
}

/// Parses the model's JSON answer, tolerating a surrounding markdown fence.
fn parse_analysis(text: &str) -> PortResult<AnalysisResult> {
    let trimmed = text.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    let malformed = |e: serde_json::Error| {
        PortError::InvalidResponse(format!("Malformed analysis JSON: {}", e))
    };
    let mut value: Value = serde_json::from_str(json.trim()).map_err(malformed)?;

    // Clamp before the score has to fit a `u8`.
    if let Some(score) = value.get("score").and_then(Value::as_f64) {
        value["score"] = Value::from(score.round().clamp(0.0, 100.0) as u8);
    }
    serde_json::from_value(value).map_err(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fact_tutor_core::domain::Verdict;

    const ANSWER: &str = r#"{
        "score": 140,
        "verdict": "false",
        "factualElements": [],
        "sources": [],
        "pedagogicalExplanation": "Aucune source ne confirme cette affirmation.",
        "criticalThinkingSteps": ["Chercher l'auteur"]
    }"#;

    #[test]
    fn parses_plain_and_fenced_answers() {
        let plain = parse_analysis(ANSWER).unwrap();
        let fenced = parse_analysis(&format!("```json\n{}\n```", ANSWER)).unwrap();
        assert_eq!(plain, fenced);
        assert_eq!(plain.verdict, Verdict::False);
        assert!(plain.suggested_quizzes.is_none());
    }

    #[test]
    fn clamps_the_score() {
        let with_score = |score: &str| ANSWER.replace("140", score);

        assert_eq!(parse_analysis(ANSWER).unwrap().score, 100);
        assert_eq!(parse_analysis(&with_score("1000")).unwrap().score, 100);
        assert_eq!(parse_analysis(&with_score("-12")).unwrap().score, 0);
        assert_eq!(parse_analysis(&with_score("72.6")).unwrap().score, 73);
    }

    #[test]
    fn rejects_prose() {
        let err = parse_analysis("Je ne peux pas analyser ce contenu.").unwrap_err();
        assert!(matches!(err, PortError::InvalidResponse(_)));
    }

    #[test]
    fn user_prompt_lists_attachments() {
        let link = Attachment::link("https://example.org/article").unwrap();
        let prompt = user_prompt("Une rumeur", &[link]);
        assert!(prompt.contains("Une rumeur"));
        assert!(prompt.contains("Lien : https://example.org/article"));
    }
}
