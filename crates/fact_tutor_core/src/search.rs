//! crates/fact_tutor_core/src/search.rs
//!
//! Sidebar filtering: chats whose title contains the query and whose category
//! matches the selected filter.

use serde::{Deserialize, Serialize};

use crate::domain::{Chat, ChatCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "category")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ChatCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: ChatCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl From<Option<ChatCategory>> for CategoryFilter {
    fn from(category: Option<ChatCategory>) -> Self {
        category.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}

/// Case-insensitive title match combined with the category filter, preserving order.
pub fn filter_chats<'a>(chats: &'a [Chat], query: &str, category: CategoryFilter) -> Vec<&'a Chat> {
    let needle = query.to_lowercase();
    chats
        .iter()
        .filter(|chat| chat.title.to_lowercase().contains(&needle))
        .filter(|chat| category.matches(chat.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(title: &str, category: ChatCategory) -> Chat {
        let mut chat = Chat::new(category);
        chat.title = title.to_string();
        chat
    }

    #[test]
    fn empty_query_and_all_filter_return_everything() {
        let chats = vec![
            chat("Linux et virus", ChatCategory::FakeNewsLinux),
            chat("Mots de passe", ChatCategory::Privacy),
        ];
        assert_eq!(filter_chats(&chats, "", CategoryFilter::All).len(), 2);
    }

    #[test]
    fn query_is_case_insensitive_and_combines_with_category() {
        let chats = vec![
            chat("Linux et virus", ChatCategory::FakeNewsLinux),
            chat("Virus sur Android", ChatCategory::Cybersecurity),
            chat("Mots de passe", ChatCategory::Privacy),
        ];

        let hits = filter_chats(&chats, "VIRUS", CategoryFilter::All);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Linux et virus");

        let hits = filter_chats(&chats, "virus", CategoryFilter::Only(ChatCategory::Cybersecurity));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Virus sur Android");
    }

    #[test]
    fn optional_category_converts_to_filter() {
        assert_eq!(CategoryFilter::from(None), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from(Some(ChatCategory::Privacy)),
            CategoryFilter::Only(ChatCategory::Privacy)
        );
    }
}
