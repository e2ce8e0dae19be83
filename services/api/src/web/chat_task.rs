//! services/api/src/web/chat_task.rs
//!
//! The asynchronous "worker" functions that answer a submission after a
//! simulated delay: the tutor's reply to a plain question, and the credibility
//! analysis. Both are bound to their chat's cancellation token.

use crate::web::state::AppState;
use fact_tutor_core::{
    tutor::{analysis_failed_message, compose_reply, ANALYSIS_COMPLETE_MESSAGE},
    Attachment, NewMessage, UserMode,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

/// Schedules the tutor's reply to a question in `chat_id`.
pub fn spawn_reply(
    app_state: Arc<AppState>,
    chat_id: Uuid,
    mode: UserMode,
    content: String,
) -> JoinHandle<()> {
    let token = app_state.tasks.token_for(chat_id);
    let delay = app_state.config.reply_delay;

    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                info!(%chat_id, "Reply cancelled before delivery.");
            }
            _ = tokio::time::sleep(delay) => {
                let reply = compose_reply(mode, &content);
                app_state
                    .store
                    .lock()
                    .await
                    .add_message(chat_id, NewMessage::assistant(reply));
            }
        }
    })
}

/// Schedules an analysis of submitted content in `chat_id`.
///
/// The analysing flag is cleared however the job ends: success, analyzer
/// failure, or cancellation.
pub fn spawn_analysis(
    app_state: Arc<AppState>,
    chat_id: Uuid,
    content: String,
    attachments: Vec<Attachment>,
) -> JoinHandle<()> {
    let token = app_state.tasks.token_for(chat_id);
    let delay = app_state.config.analysis_delay;

    tokio::spawn(async move {
        let analyzer = app_state.analyzer.clone();
        let outcome = tokio::select! {
            _ = token.cancelled() => None,
            result = async {
                tokio::time::sleep(delay).await;
                analyzer.analyze(&content, &attachments).await
            } => Some(result),
        };

        let mut store = app_state.store.lock().await;
        match outcome {
            None => info!(%chat_id, "Analysis cancelled before completion."),
            Some(Ok(analysis)) => {
                info!(%chat_id, score = analysis.score, "Analysis completed.");
                store.add_message(
                    chat_id,
                    NewMessage::assistant(ANALYSIS_COMPLETE_MESSAGE).with_analysis(analysis.clone()),
                );
                if store.state().user_settings.display.dual_view
                    && store.state().find_chat(chat_id).is_some()
                {
                    store.set_current_analysis(Some(analysis));
                }
            }
            Some(Err(e)) => {
                error!(%chat_id, "Analysis failed: {:?}", e);
                store.add_message(
                    chat_id,
                    NewMessage::assistant(analysis_failed_message(&e.to_string())),
                );
            }
        }
        store.set_is_analyzing(false);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use fact_tutor_core::{
        domain::Role, AnalysisResult, ContentAnalyzer, MockAnalyzer, PortError, PortResult,
    };
    use std::time::Duration;

    struct FailingAnalyzer;

    #[async_trait]
    impl ContentAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _: &str, _: &[Attachment]) -> PortResult<AnalysisResult> {
            Err(PortError::Unavailable("fact-checking service is down".to_string()))
        }
    }

    fn test_state(analyzer: Arc<dyn ContentAnalyzer>) -> Arc<AppState> {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.reply_delay = Duration::from_millis(10);
        config.analysis_delay = Duration::from_millis(10);
        Arc::new(AppState::new(Arc::new(config), analyzer))
    }

    async fn active_chat(app_state: &AppState) -> Uuid {
        let mut store = app_state.store.lock().await;
        let chat_id = store.state().active_chat.unwrap();
        store.add_message(chat_id, NewMessage::user("Linux n'a jamais de virus"));
        chat_id
    }

    #[tokio::test]
    async fn reply_is_appended_after_the_delay() {
        let app_state = test_state(Arc::new(MockAnalyzer::new()));
        let chat_id = active_chat(&app_state).await;

        spawn_reply(app_state.clone(), chat_id, UserMode::Teacher, "Question".to_string())
            .await
            .unwrap();

        let store = app_state.store.lock().await;
        let chat = store.state().find_chat(chat_id).unwrap();
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1].role, Role::Assistant);
        assert!(chat.messages[1].content.starts_with("🎓"));
    }

    #[tokio::test]
    async fn deleting_the_chat_cancels_its_reply() {
        let app_state = test_state(Arc::new(MockAnalyzer::new()));
        let chat_id = active_chat(&app_state).await;

        let handle =
            spawn_reply(app_state.clone(), chat_id, UserMode::Student, "Question".to_string());
        app_state.tasks.cancel_chat(chat_id);
        app_state.store.lock().await.delete_chat(chat_id);
        handle.await.unwrap();

        let store = app_state.store.lock().await;
        assert!(store.state().chats.is_empty());
    }

    #[tokio::test]
    async fn successful_analysis_opens_the_dual_view() {
        let app_state = test_state(Arc::new(MockAnalyzer::new()));
        let chat_id = active_chat(&app_state).await;
        app_state.store.lock().await.set_is_analyzing(true);

        spawn_analysis(app_state.clone(), chat_id, "contenu".to_string(), Vec::new())
            .await
            .unwrap();

        let store = app_state.store.lock().await;
        let state = store.state();
        let last = state.find_chat(chat_id).unwrap().messages.last().unwrap();
        assert!(last.analysis.is_some());
        assert_eq!(last.content, ANALYSIS_COMPLETE_MESSAGE);
        assert!(state.current_analysis.is_some());
        assert!(state.dual_view_open);
        assert!(!state.is_analyzing);
    }

    #[tokio::test]
    async fn failed_analysis_leaves_a_message_and_clears_the_flag() {
        let app_state = test_state(Arc::new(FailingAnalyzer));
        let chat_id = active_chat(&app_state).await;
        app_state.store.lock().await.set_is_analyzing(true);

        spawn_analysis(app_state.clone(), chat_id, "contenu".to_string(), Vec::new())
            .await
            .unwrap();

        let store = app_state.store.lock().await;
        let state = store.state();
        let last = state.find_chat(chat_id).unwrap().messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.analysis.is_none());
        assert!(last.content.contains("fact-checking service is down"));
        assert!(state.current_analysis.is_none());
        assert!(!state.is_analyzing);
    }

    #[tokio::test]
    async fn cancelled_analysis_still_clears_the_flag() {
        let app_state = test_state(Arc::new(MockAnalyzer::new()));
        let chat_id = active_chat(&app_state).await;
        app_state.store.lock().await.set_is_analyzing(true);

        let handle = spawn_analysis(app_state.clone(), chat_id, "contenu".to_string(), Vec::new());
        app_state.tasks.cancel_chat(chat_id);
        handle.await.unwrap();

        let store = app_state.store.lock().await;
        assert!(!store.state().is_analyzing);
        assert_eq!(store.state().find_chat(chat_id).unwrap().messages.len(), 1);
    }
}
