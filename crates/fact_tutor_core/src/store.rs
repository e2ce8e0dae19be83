//! crates/fact_tutor_core/src/store.rs
//!
//! The single source of truth for session, UI and chat state.
//!
//! `ChatStore` owns a `StoreState`, funnels every mutation through the reducer,
//! and broadcasts the resulting `StoreEvent`s to subscribers. Reads are
//! synchronous borrows or cloned snapshots.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{
    AnalysisResult, Chat, ChatCategory, Message, NewMessage, SettingsPatch, User, UserMode,
    UserSettings,
};
use crate::progress::{calculate_progress, LearningProgress};
use crate::reducer::{self, Action, StoreEvent};
use crate::search::{filter_chats, CategoryFilter};
use crate::stats::{calculate_statistics, Statistics};

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

//=========================================================================================
// StoreState
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    /// Newest chats first.
    pub chats: Vec<Chat>,
    pub active_chat: Option<Uuid>,
    pub user_settings: UserSettings,
    pub sidebar_open: bool,
    pub dual_view_open: bool,
    pub current_analysis: Option<AnalysisResult>,
    pub is_analyzing: bool,
    pub user: User,
    pub is_authenticated: bool,
    /// Bumped by every transition that changes the chat list or its messages.
    #[serde(skip)]
    pub chats_revision: u64,
}

impl StoreState {
    /// The first-launch state: one empty general chat, active, and the anonymous student.
    pub fn initial() -> Self {
        let chat = Chat::new(ChatCategory::General);
        Self {
            active_chat: Some(chat.id),
            chats: vec![chat],
            user_settings: UserSettings::default(),
            sidebar_open: true,
            dual_view_open: false,
            current_analysis: None,
            is_analyzing: false,
            user: User::anonymous_student(),
            is_authenticated: true,
            chats_revision: 0,
        }
    }

    pub fn find_chat(&self, chat_id: Uuid) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id == chat_id)
    }

    pub fn current_chat(&self) -> Option<&Chat> {
        self.active_chat.and_then(|id| self.find_chat(id))
    }

    pub fn find_message(&self, chat_id: Uuid, message_id: Uuid) -> Option<&Message> {
        self.find_chat(chat_id)
            .and_then(|chat| chat.find_message(message_id))
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::initial()
    }
}

//=========================================================================================
// ChatStore
//=========================================================================================

pub struct ChatStore {
    state: StoreState,
    events: broadcast::Sender<StoreEvent>,
    stats_cache: Option<(u64, Statistics)>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a store whose subscribers may lag by at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            state: StoreState::initial(),
            events,
            stats_cache: None,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.clone()
    }

    /// Applies an action and notifies subscribers of every resulting change.
    pub fn dispatch(&mut self, action: Action) {
        let events = reducer::reduce(&mut self.state, action);
        self.publish(events);
    }

    fn publish(&self, events: Vec<StoreEvent>) {
        for event in events {
            // A send error only means nobody is listening right now.
            let _ = self.events.send(event);
        }
    }

    // --- Chats ---

    pub fn create_chat(&mut self, category: ChatCategory) -> Uuid {
        let (chat_id, events) = reducer::create_chat(&mut self.state, category);
        self.publish(events);
        chat_id
    }

    pub fn delete_chat(&mut self, chat_id: Uuid) {
        self.dispatch(Action::DeleteChat { chat_id });
    }

    pub fn set_active_chat(&mut self, chat_id: Option<Uuid>) {
        self.dispatch(Action::SetActiveChat { chat_id });
    }

    pub fn add_message(&mut self, chat_id: Uuid, message: NewMessage) {
        self.dispatch(Action::AddMessage { chat_id, message });
    }

    // --- Settings and UI toggles ---

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.dispatch(Action::UpdateSettings(patch));
    }

    pub fn set_user_mode(&mut self, mode: UserMode) {
        self.dispatch(Action::SetUserMode(mode));
    }

    pub fn toggle_sidebar(&mut self) {
        self.dispatch(Action::ToggleSidebar);
    }

    pub fn toggle_dual_view(&mut self) {
        self.dispatch(Action::ToggleDualView);
    }

    pub fn set_current_analysis(&mut self, analysis: Option<AnalysisResult>) {
        self.dispatch(Action::SetCurrentAnalysis(analysis));
    }

    pub fn set_is_analyzing(&mut self, analyzing: bool) {
        self.dispatch(Action::SetIsAnalyzing(analyzing));
    }

    // --- Session ---

    /// Mock authentication: always succeeds and keeps the existing chats.
    pub fn login(&mut self, email: &str, password: &str, role: UserMode) -> bool {
        self.dispatch(Action::Login {
            email: email.to_string(),
            password: password.to_string(),
            role,
        });
        true
    }

    /// Resets the session to the anonymous student and discards every chat.
    pub fn logout(&mut self) {
        self.dispatch(Action::Logout);
    }

    // --- Derived views ---

    /// Statistics over all chats, recomputed only when the chat list changed.
    pub fn statistics(&mut self) -> Statistics {
        let revision = self.state.chats_revision;
        match &self.stats_cache {
            Some((cached_revision, stats)) if *cached_revision == revision => stats.clone(),
            _ => {
                let stats = calculate_statistics(&self.state.chats);
                self.stats_cache = Some((revision, stats.clone()));
                stats
            }
        }
    }

    pub fn progress(&self) -> LearningProgress {
        calculate_progress(&self.state.chats)
    }

    pub fn search_chats(&self, query: &str, category: CategoryFilter) -> Vec<&Chat> {
        filter_chats(&self.state.chats, query, category)
    }
}

impl Default for ChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_CHAT_TITLE;
    use crate::mock_analysis::generate_mock_analysis;

    #[test]
    fn create_chat_twice_reuses_the_empty_chat() {
        let mut store = ChatStore::new();
        let first = store.create_chat(ChatCategory::General);
        let second = store.create_chat(ChatCategory::Privacy);
        assert_eq!(first, second);
        assert_eq!(store.state().chats.len(), 1);
        assert_eq!(store.state().active_chat, Some(first));
    }

    #[test]
    fn create_chat_prepends_once_every_chat_has_user_messages() {
        let mut store = ChatStore::new();
        let first = store.state().active_chat.unwrap();
        store.add_message(first, NewMessage::user("Bonjour"));

        let second = store.create_chat(ChatCategory::Cybersecurity);
        assert_ne!(first, second);
        assert_eq!(store.state().chats[0].id, second);
        assert_eq!(store.state().chats[0].category, ChatCategory::Cybersecurity);
        assert_eq!(store.state().active_chat, Some(second));
    }

    #[test]
    fn first_user_message_titles_the_chat_once() {
        let mut store = ChatStore::new();
        let chat_id = store.create_chat(ChatCategory::General);
        assert_eq!(store.state().find_chat(chat_id).unwrap().title, DEFAULT_CHAT_TITLE);

        store.add_message(chat_id, NewMessage::user("Hello world this is a test"));
        store.add_message(chat_id, NewMessage::user("A different follow-up question"));

        let chat = store.state().find_chat(chat_id).unwrap();
        assert_eq!(chat.title, "Hello world this is a test");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[1].content, "A different follow-up question");
    }

    #[test]
    fn long_first_message_is_truncated_with_ellipsis() {
        let mut store = ChatStore::new();
        let chat_id = store.create_chat(ChatCategory::General);
        let content = "This message is definitely longer than forty characters in total";
        store.add_message(chat_id, NewMessage::user(content));

        let title = &store.state().find_chat(chat_id).unwrap().title;
        assert_eq!(title, &format!("{}...", &content[..40]));
    }

    #[test]
    fn deleting_the_only_chat_clears_the_active_pointer() {
        let mut store = ChatStore::new();
        let only = store.state().active_chat.unwrap();
        store.delete_chat(only);
        assert!(store.state().chats.is_empty());
        assert_eq!(store.state().active_chat, None);
    }

    #[test]
    fn deleting_the_active_chat_activates_the_first_remaining() {
        let mut store = ChatStore::new();
        let oldest = store.state().active_chat.unwrap();
        store.add_message(oldest, NewMessage::user("un"));
        let middle = store.create_chat(ChatCategory::General);
        store.add_message(middle, NewMessage::user("deux"));
        let newest = store.create_chat(ChatCategory::General);

        store.delete_chat(newest);
        assert_eq!(store.state().active_chat, Some(middle));

        store.set_active_chat(Some(oldest));
        store.delete_chat(middle);
        assert_eq!(store.state().active_chat, Some(oldest));
    }

    #[test]
    fn add_message_to_unknown_chat_is_a_no_op() {
        let mut store = ChatStore::new();
        let before = store.snapshot();
        store.add_message(Uuid::new_v4(), NewMessage::assistant("trop tard"));
        assert_eq!(store.state().chats.len(), before.chats.len());
        assert!(store.state().chats[0].messages.is_empty());
    }

    #[test]
    fn set_active_chat_ignores_unknown_ids() {
        let mut store = ChatStore::new();
        let active = store.state().active_chat;
        store.set_active_chat(Some(Uuid::new_v4()));
        assert_eq!(store.state().active_chat, active);

        store.set_active_chat(None);
        assert_eq!(store.state().active_chat, None);
    }

    #[test]
    fn current_analysis_drives_dual_view() {
        let mut store = ChatStore::new();
        store.set_current_analysis(Some(generate_mock_analysis()));
        assert!(store.state().dual_view_open);
        assert!(store.state().current_analysis.is_some());

        store.set_current_analysis(None);
        assert!(!store.state().dual_view_open);
        assert!(store.state().current_analysis.is_none());
    }

    #[test]
    fn login_keeps_chats_and_resets_mode() {
        let mut store = ChatStore::new();
        let chat_id = store.state().active_chat.unwrap();
        store.add_message(chat_id, NewMessage::user("garde-moi"));

        assert!(store.login("prof@nird.com", "secret", UserMode::Teacher));
        let state = store.state();
        assert_eq!(state.user.email, "prof@nird.com");
        assert_eq!(state.user.name, "Enseignant");
        assert_eq!(state.user_settings.mode, UserMode::Teacher);
        assert_eq!(state.chats[0].messages.len(), 1);
    }

    #[test]
    fn logout_then_login_issues_a_fresh_user_id() {
        let mut store = ChatStore::new();
        store.login("a@nird.com", "x", UserMode::Student);
        let first_id = store.state().user.id.clone();

        store.logout();
        assert_eq!(store.state().user.id, User::DEFAULT_ID);
        assert!(store.state().is_authenticated);

        store.login("a@nird.com", "x", UserMode::Student);
        assert!(store.state().is_authenticated);
        assert_ne!(store.state().user.id, first_id);
        assert_ne!(store.state().user.id, User::DEFAULT_ID);
    }

    #[test]
    fn logout_discards_chat_history() {
        let mut store = ChatStore::new();
        let chat_id = store.state().active_chat.unwrap();
        store.add_message(chat_id, NewMessage::user("historique"));
        store.create_chat(ChatCategory::Privacy);
        store.set_user_mode(UserMode::Teacher);

        store.logout();
        let state = store.state();
        assert_eq!(state.chats.len(), 1);
        assert!(state.chats[0].messages.is_empty());
        assert_eq!(state.active_chat, Some(state.chats[0].id));
        assert_eq!(state.user_settings, UserSettings::default());
    }

    #[test]
    fn subscribers_see_each_change() {
        let mut store = ChatStore::new();
        let mut events = store.subscribe();
        let chat_id = store.state().active_chat.unwrap();

        store.add_message(chat_id, NewMessage::user("Salut"));
        store.toggle_sidebar();

        match events.try_recv().unwrap() {
            StoreEvent::MessageAdded { chat_id: id, message } => {
                assert_eq!(id, chat_id);
                assert_eq!(message.content, "Salut");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            events.try_recv().unwrap(),
            StoreEvent::ChatRetitled { ref title, .. } if title == "Salut"
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            StoreEvent::SidebarToggled { open: false }
        ));
    }

    #[test]
    fn statistics_are_recomputed_only_after_chat_changes() {
        let mut store = ChatStore::new();
        let chat_id = store.state().active_chat.unwrap();
        store.add_message(chat_id, NewMessage::user("piratage informatique"));
        let first = store.statistics();
        assert_eq!(first.word_cloud.len(), 2);

        store.toggle_dual_view();
        assert_eq!(store.statistics(), first);

        store.add_message(
            chat_id,
            NewMessage::assistant("analyse").with_analysis(generate_mock_analysis()),
        );
        let second = store.statistics();
        assert_eq!(second.timeline.len(), 1);
    }
}
