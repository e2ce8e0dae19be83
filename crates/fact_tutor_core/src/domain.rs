//! crates/fact_tutor_core/src/domain.rs
//!
//! Defines the core data structures for the tutor: chats, messages,
//! analysis results, quizzes, settings and the session user.
//! These records carry no behavior beyond small constructors and accessors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to every chat until its first user message arrives.
pub const DEFAULT_CHAT_TITLE: &str = "Nouvelle conversation";

//=========================================================================================
// Chats and Messages
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatCategory {
    FakeNewsLinux,
    FakeNewsOpensource,
    Cybersecurity,
    Privacy,
    DigitalCulture,
    #[default]
    General,
}

impl ChatCategory {
    pub const ALL: [ChatCategory; 6] = [
        ChatCategory::FakeNewsLinux,
        ChatCategory::FakeNewsOpensource,
        ChatCategory::Cybersecurity,
        ChatCategory::Privacy,
        ChatCategory::DigitalCulture,
        ChatCategory::General,
    ];

    /// Human-readable label shown in the sidebar.
    pub fn label(&self) -> &'static str {
        match self {
            ChatCategory::FakeNewsLinux => "Fake News Linux",
            ChatCategory::FakeNewsOpensource => "Fake News Open Source",
            ChatCategory::Cybersecurity => "Cybersécurité",
            ChatCategory::Privacy => "Vie Privée",
            ChatCategory::DigitalCulture => "Culture Numérique",
            ChatCategory::General => "Général",
        }
    }
}

/// A titled, ordered conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub title: String,
    pub category: ChatCategory,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Creates an empty chat carrying the default title.
    pub fn new(category: ChatCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            category,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when no message in the chat was written by the user.
    pub fn has_no_user_message(&self) -> bool {
        !self.messages.iter().any(|m| m.role == Role::User)
    }

    pub fn find_message(&self, message_id: Uuid) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message appended to a chat. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// A message as submitted by a caller, before the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            analysis: None,
            attachments: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            analysis: None,
            attachments: None,
        }
    }

    pub fn with_analysis(mut self, analysis: AnalysisResult) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Attaches files or links; an empty list is stored as no attachments.
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = if attachments.is_empty() {
            None
        } else {
            Some(attachments)
        };
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Link,
    Text,
    Pdf,
}

/// A file, link or text snippet submitted alongside a message.
///
/// `content` holds the raw text, the URL, or a base64 data URL depending on `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

//=========================================================================================
// Analysis Results
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Verified,
    Suspicious,
    False,
    Unverified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactStatus {
    True,
    False,
    PartiallyTrue,
    Unverifiable,
}

/// One atomic claim extracted from analysed content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactElement {
    pub claim: String,
    pub status: FactStatus,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Official,
    Academic,
    Media,
    Community,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub reliability: Reliability,
    #[serde(rename = "type")]
    pub kind: SourceType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub question: String,
    pub hints: Vec<String>,
    pub expected_approach: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    pub difficulty: Difficulty,
}

/// The credibility analysis attached to an assistant message.
/// Produced wholesale by a `ContentAnalyzer`, never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub score: u8,
    pub verdict: Verdict,
    pub factual_elements: Vec<FactElement>,
    pub sources: Vec<Source>,
    pub pedagogical_explanation: String,
    pub critical_thinking_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_quizzes: Option<Vec<Quiz>>,
}

impl AnalysisResult {
    pub fn find_quiz(&self, quiz_id: &str) -> Option<&Quiz> {
        self.suggested_quizzes
            .as_deref()
            .and_then(|quizzes| quizzes.iter().find(|q| q.id == quiz_id))
    }
}

//=========================================================================================
// Settings and Session
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserMode {
    #[default]
    Student,
    Teacher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilitySettings {
    pub dyslexia_font: bool,
    pub high_contrast: bool,
    pub text_to_speech: bool,
    pub reduced_motion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySettings {
    /// Whether the analysis panel opens automatically on a new analysis.
    pub dual_view: bool,
    pub show_sources: bool,
    pub detailed_analysis: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            dual_view: true,
            show_sources: true,
            detailed_analysis: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub mode: UserMode,
    pub accessibility: AccessibilitySettings,
    pub display: DisplaySettings,
}

/// A top-level shallow patch for `UserSettings`.
///
/// Nested groups are replaced wholesale when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub mode: Option<UserMode>,
    #[serde(default)]
    pub accessibility: Option<AccessibilitySettings>,
    #[serde(default)]
    pub display: Option<DisplaySettings>,
}

/// Represents the session user. The default anonymous student is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserMode,
    pub name: String,
}

impl User {
    pub const DEFAULT_ID: &'static str = "default-user";

    pub fn anonymous_student() -> Self {
        Self {
            id: Self::DEFAULT_ID.to_string(),
            email: "student@nird.com".to_string(),
            role: UserMode::Student,
            name: display_name_for(UserMode::Student).to_string(),
        }
    }
}

pub fn display_name_for(role: UserMode) -> &'static str {
    match role {
        UserMode::Teacher => "Enseignant",
        UserMode::Student => "Élève",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_match_first_launch() {
        let settings = UserSettings::default();
        assert_eq!(settings.mode, UserMode::Student);
        assert!(!settings.accessibility.dyslexia_font);
        assert!(!settings.accessibility.reduced_motion);
        assert!(settings.display.dual_view);
        assert!(settings.display.show_sources);
        assert!(settings.display.detailed_analysis);
    }

    #[test]
    fn attachment_uses_type_tag_on_the_wire() {
        let json = r#"{"type":"pdf","content":"data:application/pdf;base64,AAAA","name":"doc.pdf"}"#;
        let attachment: Attachment = serde_json::from_str(json).unwrap();
        assert_eq!(attachment.kind, AttachmentKind::Pdf);
        assert_eq!(attachment.name.as_deref(), Some("doc.pdf"));
    }

    #[test]
    fn enums_serialize_with_original_spelling() {
        assert_eq!(
            serde_json::to_string(&ChatCategory::FakeNewsOpensource).unwrap(),
            "\"fake-news-opensource\""
        );
        assert_eq!(
            serde_json::to_string(&FactStatus::PartiallyTrue).unwrap(),
            "\"partially-true\""
        );
        assert_eq!(serde_json::to_string(&Verdict::False).unwrap(), "\"false\"");
    }

    #[test]
    fn chat_without_user_message_counts_as_empty() {
        let mut chat = Chat::new(ChatCategory::Privacy);
        assert!(chat.has_no_user_message());
        chat.messages.push(Message {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: "Bonjour".to_string(),
            timestamp: Utc::now(),
            analysis: None,
            attachments: None,
        });
        assert!(chat.has_no_user_message());
    }
}
