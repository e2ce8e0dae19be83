//! crates/fact_tutor_core/src/progress.rs
//!
//! Learning progress derived from the chat history: level, activity counts and
//! unlocked achievements.

use serde::Serialize;

use crate::domain::{Chat, Role};

const ACTIVITIES_PER_LEVEL: usize = 5;
const MAX_LEVEL: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Achievement {
    FirstStep,
    Detective,
    Expert,
    Master,
}

impl Achievement {
    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstStep => "Premier pas",
            Achievement::Detective => "Détective",
            Achievement::Expert => "Expert",
            Achievement::Master => "Maître",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Achievement::FirstStep => "🎯",
            Achievement::Detective => "🔍",
            Achievement::Expert => "⭐",
            Achievement::Master => "🏆",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstStep => "Première analyse réalisée",
            Achievement::Detective => "5 analyses complétées",
            Achievement::Expert => "Score moyen ≥ 80%",
            Achievement::Master => "Niveau 5 atteint",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningProgress {
    pub level: usize,
    pub total_activities: usize,
    pub total_analyses: usize,
    pub user_messages: usize,
    /// Rounded mean score of every analysis, 0 when there is none.
    pub average_score: u8,
    pub achievements: Vec<Achievement>,
    /// Percentage of the way to the next level.
    pub next_level_progress: f64,
}

pub fn calculate_progress(chats: &[Chat]) -> LearningProgress {
    let messages = chats.iter().flat_map(|chat| chat.messages.iter());

    let mut user_messages = 0usize;
    let mut total_analyses = 0usize;
    let mut score_sum = 0u32;
    for message in messages {
        if message.role == Role::User {
            user_messages += 1;
        }
        if let Some(analysis) = &message.analysis {
            total_analyses += 1;
            score_sum += u32::from(analysis.score);
        }
    }

    let average = if total_analyses > 0 {
        f64::from(score_sum) / total_analyses as f64
    } else {
        0.0
    };
    let total_activities = user_messages + total_analyses;
    let level = (total_activities / ACTIVITIES_PER_LEVEL + 1).min(MAX_LEVEL);

    let mut achievements = Vec::new();
    if total_analyses >= 1 {
        achievements.push(Achievement::FirstStep);
    }
    if total_analyses >= 5 {
        achievements.push(Achievement::Detective);
    }
    if average >= 80.0 {
        achievements.push(Achievement::Expert);
    }
    if level >= 5 {
        achievements.push(Achievement::Master);
    }

    LearningProgress {
        level,
        total_activities,
        total_analyses,
        user_messages,
        average_score: average.round() as u8,
        achievements,
        next_level_progress: (total_activities % ACTIVITIES_PER_LEVEL) as f64
            / ACTIVITIES_PER_LEVEL as f64
            * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatCategory, NewMessage};
    use crate::mock_analysis::generate_mock_analysis;
    use crate::store::ChatStore;

    #[test]
    fn empty_history_starts_at_level_one() {
        let progress = calculate_progress(&[Chat::new(ChatCategory::General)]);
        assert_eq!(progress.level, 1);
        assert_eq!(progress.total_activities, 0);
        assert_eq!(progress.average_score, 0);
        assert!(progress.achievements.is_empty());
        assert_eq!(progress.next_level_progress, 0.0);
    }

    #[test]
    fn analyses_unlock_achievements() {
        let mut store = ChatStore::new();
        let chat_id = store.state().active_chat.unwrap();
        for _ in 0..5 {
            store.add_message(chat_id, NewMessage::user("Est-ce vrai ?"));
            let mut analysis = generate_mock_analysis();
            analysis.score = 90;
            store.add_message(chat_id, NewMessage::assistant("Analyse").with_analysis(analysis));
        }

        let progress = store.progress();
        assert_eq!(progress.user_messages, 5);
        assert_eq!(progress.total_analyses, 5);
        assert_eq!(progress.total_activities, 10);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.average_score, 90);
        assert_eq!(
            progress.achievements,
            vec![Achievement::FirstStep, Achievement::Detective, Achievement::Expert]
        );
    }

    #[test]
    fn level_is_capped_at_ten() {
        let mut store = ChatStore::new();
        let chat_id = store.state().active_chat.unwrap();
        for i in 0..63 {
            store.add_message(chat_id, NewMessage::user(format!("question {}", i)));
        }

        let progress = store.progress();
        assert_eq!(progress.level, MAX_LEVEL);
        assert!(progress.achievements.contains(&Achievement::Master));
        assert!((progress.next_level_progress - 60.0).abs() < 1e-9);
    }
}
