pub mod attachments;
pub mod domain;
pub mod mock_analysis;
pub mod ports;
pub mod progress;
pub mod reducer;
pub mod search;
pub mod stats;
pub mod store;
pub mod tutor;

pub use attachments::AttachmentError;
pub use domain::{
    AnalysisResult, Attachment, AttachmentKind, Chat, ChatCategory, Message, NewMessage, Quiz,
    Role, SettingsPatch, User, UserMode, UserSettings,
};
pub use mock_analysis::MockAnalyzer;
pub use ports::{ContentAnalyzer, PortError, PortResult};
pub use reducer::{Action, StoreEvent};
pub use search::CategoryFilter;
pub use stats::Statistics;
pub use store::{ChatStore, StoreState};
