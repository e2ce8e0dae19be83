//! crates/fact_tutor_core/src/reducer.rs
//!
//! State transitions for the chat store. Every mutation is an `Action` applied
//! to a `StoreState`; each transition reports what changed as `StoreEvent`s so
//! the owning store can notify its subscribers.
//!
//! All transitions are total: unknown ids are ignored rather than rejected.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{
    display_name_for, AnalysisResult, Chat, ChatCategory, Message, NewMessage, Role,
    SettingsPatch, User, UserMode, UserSettings,
};
use crate::store::StoreState;

/// Maximum number of characters kept when a chat is titled from its first user message.
pub const TITLE_MAX_CHARS: usize = 40;

//=========================================================================================
// Actions and Events
//=========================================================================================

#[derive(Debug, Clone)]
pub enum Action {
    CreateChat { category: ChatCategory },
    DeleteChat { chat_id: Uuid },
    SetActiveChat { chat_id: Option<Uuid> },
    AddMessage { chat_id: Uuid, message: NewMessage },
    UpdateSettings(SettingsPatch),
    SetUserMode(UserMode),
    ToggleSidebar,
    ToggleDualView,
    SetCurrentAnalysis(Option<AnalysisResult>),
    SetIsAnalyzing(bool),
    Login { email: String, password: String, role: UserMode },
    Logout,
}

/// A change notification broadcast to store subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    ChatCreated { chat: Chat },
    ChatDeleted { chat_id: Uuid },
    ActiveChatChanged { chat_id: Option<Uuid> },
    MessageAdded { chat_id: Uuid, message: Message },
    ChatRetitled { chat_id: Uuid, title: String },
    SettingsUpdated { settings: UserSettings },
    SidebarToggled { open: bool },
    DualViewToggled { open: bool },
    CurrentAnalysisChanged { analysis: Option<AnalysisResult>, dual_view_open: bool },
    AnalyzingChanged { analyzing: bool },
    SessionChanged { user: User, is_authenticated: bool },
    /// The chat list was replaced wholesale (on logout).
    ChatsReset { chats: Vec<Chat>, active_chat: Option<Uuid> },
}

//=========================================================================================
// Reducer
//=========================================================================================

/// Applies an action to the state and returns the resulting change events.
pub fn reduce(state: &mut StoreState, action: Action) -> Vec<StoreEvent> {
    match action {
        Action::CreateChat { category } => create_chat(state, category).1,
        Action::DeleteChat { chat_id } => delete_chat(state, chat_id),
        Action::SetActiveChat { chat_id } => set_active_chat(state, chat_id),
        Action::AddMessage { chat_id, message } => add_message(state, chat_id, message),
        Action::UpdateSettings(patch) => {
            if let Some(mode) = patch.mode {
                state.user_settings.mode = mode;
            }
            if let Some(accessibility) = patch.accessibility {
                state.user_settings.accessibility = accessibility;
            }
            if let Some(display) = patch.display {
                state.user_settings.display = display;
            }
            vec![StoreEvent::SettingsUpdated { settings: state.user_settings }]
        }
        Action::SetUserMode(mode) => {
            state.user_settings.mode = mode;
            vec![StoreEvent::SettingsUpdated { settings: state.user_settings }]
        }
        Action::ToggleSidebar => {
            state.sidebar_open = !state.sidebar_open;
            vec![StoreEvent::SidebarToggled { open: state.sidebar_open }]
        }
        Action::ToggleDualView => {
            state.dual_view_open = !state.dual_view_open;
            vec![StoreEvent::DualViewToggled { open: state.dual_view_open }]
        }
        Action::SetCurrentAnalysis(analysis) => {
            state.dual_view_open = analysis.is_some();
            state.current_analysis = analysis;
            vec![StoreEvent::CurrentAnalysisChanged {
                analysis: state.current_analysis.clone(),
                dual_view_open: state.dual_view_open,
            }]
        }
        Action::SetIsAnalyzing(analyzing) => {
            state.is_analyzing = analyzing;
            vec![StoreEvent::AnalyzingChanged { analyzing }]
        }
        Action::Login { email, password: _, role } => login(state, email, role),
        Action::Logout => logout(state),
    }
}

/// Reuses the first chat without a user-authored message, or prepends a new one.
/// Returns the id of the chat that became active.
pub fn create_chat(state: &mut StoreState, category: ChatCategory) -> (Uuid, Vec<StoreEvent>) {
    if let Some(existing) = state.chats.iter().find(|chat| chat.has_no_user_message()) {
        let chat_id = existing.id;
        debug!(%chat_id, "Reusing empty chat instead of creating a new one");
        state.active_chat = Some(chat_id);
        return (chat_id, vec![StoreEvent::ActiveChatChanged { chat_id: Some(chat_id) }]);
    }

    let chat = Chat::new(category);
    let chat_id = chat.id;
    state.chats.insert(0, chat.clone());
    state.active_chat = Some(chat_id);
    state.chats_revision += 1;
    (
        chat_id,
        vec![
            StoreEvent::ChatCreated { chat },
            StoreEvent::ActiveChatChanged { chat_id: Some(chat_id) },
        ],
    )
}

fn delete_chat(state: &mut StoreState, chat_id: Uuid) -> Vec<StoreEvent> {
    let before = state.chats.len();
    state.chats.retain(|chat| chat.id != chat_id);
    if state.chats.len() == before {
        debug!(%chat_id, "Delete requested for unknown chat, ignoring");
        return Vec::new();
    }
    state.chats_revision += 1;

    let mut events = vec![StoreEvent::ChatDeleted { chat_id }];
    if state.active_chat == Some(chat_id) {
        state.active_chat = state.chats.first().map(|chat| chat.id);
        events.push(StoreEvent::ActiveChatChanged { chat_id: state.active_chat });
    }
    events
}

fn set_active_chat(state: &mut StoreState, chat_id: Option<Uuid>) -> Vec<StoreEvent> {
    if let Some(id) = chat_id {
        if state.find_chat(id).is_none() {
            warn!(chat_id = %id, "Refusing to activate a chat that does not exist");
            return Vec::new();
        }
    }
    state.active_chat = chat_id;
    vec![StoreEvent::ActiveChatChanged { chat_id }]
}

fn add_message(state: &mut StoreState, chat_id: Uuid, message: NewMessage) -> Vec<StoreEvent> {
    let Some(chat) = state.chats.iter_mut().find(|chat| chat.id == chat_id) else {
        warn!(%chat_id, "Dropping message for a chat that no longer exists");
        return Vec::new();
    };

    let retitle = message.role == Role::User && chat.has_no_user_message();
    let now = Utc::now();
    let stored = Message {
        id: Uuid::new_v4(),
        role: message.role,
        content: message.content,
        timestamp: now,
        analysis: message.analysis,
        attachments: message.attachments,
    };

    let mut events = Vec::with_capacity(2);
    if retitle {
        chat.title = truncate_title(&stored.content);
        events.push(StoreEvent::ChatRetitled { chat_id, title: chat.title.clone() });
    }
    chat.messages.push(stored.clone());
    chat.updated_at = now;
    state.chats_revision += 1;

    events.insert(0, StoreEvent::MessageAdded { chat_id, message: stored });
    events
}

fn login(state: &mut StoreState, email: String, role: UserMode) -> Vec<StoreEvent> {
    state.user = User {
        id: Uuid::new_v4().to_string(),
        email,
        role,
        name: display_name_for(role).to_string(),
    };
    state.is_authenticated = true;
    state.user_settings = UserSettings {
        mode: role,
        ..UserSettings::default()
    };
    vec![
        StoreEvent::SessionChanged {
            user: state.user.clone(),
            is_authenticated: state.is_authenticated,
        },
        StoreEvent::SettingsUpdated { settings: state.user_settings },
    ]
}

fn logout(state: &mut StoreState) -> Vec<StoreEvent> {
    let initial = Chat::new(ChatCategory::General);
    state.user = User::anonymous_student();
    state.is_authenticated = true;
    state.user_settings = UserSettings::default();
    state.active_chat = Some(initial.id);
    state.chats = vec![initial];
    state.chats_revision += 1;
    vec![
        StoreEvent::SessionChanged {
            user: state.user.clone(),
            is_authenticated: state.is_authenticated,
        },
        StoreEvent::SettingsUpdated { settings: state.user_settings },
        StoreEvent::ChatsReset {
            chats: state.chats.clone(),
            active_chat: state.active_chat,
        },
    ]
}

/// Keeps the first 40 characters of a message, appending `...` when it was longer.
pub fn truncate_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
