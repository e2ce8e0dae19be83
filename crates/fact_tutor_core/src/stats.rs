//! crates/fact_tutor_core/src/stats.rs
//!
//! Aggregate statistics over every chat: a word cloud, a monthly score
//! timeline and a source reliability breakdown. Computed in a single pass and
//! recomputed from scratch whenever the chat list changes.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{Chat, Reliability, Source, SourceType};

pub const WORD_CLOUD_SIZE: usize = 20;
pub const TIMELINE_MONTHS: usize = 6;
const MIN_WORD_LEN: usize = 4;
const WEIGHT_PER_OCCURRENCE: u32 = 5;
const MAX_WEIGHT: u32 = 100;

pub const PROBLEMATIC_WORDS: [&str; 8] = [
    "virus", "dangereux", "piratage", "hacker", "fake", "arnaque", "danger", "menace",
];

/// Matches anything outside ASCII word characters.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordWeight {
    pub word: String,
    pub count: u32,
    pub weight: u32,
    pub problematic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyScore {
    /// Year and month, formatted `YYYY-MM`.
    pub date: String,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceBucket {
    Official,
    Media,
    Community,
    Social,
}

impl SourceBucket {
    pub const ORDER: [SourceBucket; 4] = [
        SourceBucket::Official,
        SourceBucket::Media,
        SourceBucket::Community,
        SourceBucket::Social,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SourceBucket::Official => "Sources officielles",
            SourceBucket::Media => "Médias",
            SourceBucket::Community => "Forums",
            SourceBucket::Social => "Réseaux sociaux",
        }
    }

    /// Official and community types win; anything else with low reliability is
    /// treated as social media, the rest as media.
    pub fn classify(source: &Source) -> Self {
        match (source.kind, source.reliability) {
            (SourceType::Official, _) => SourceBucket::Official,
            (SourceType::Community, _) => SourceBucket::Community,
            (_, Reliability::Low) => SourceBucket::Social,
            _ => SourceBucket::Media,
        }
    }

    fn index(&self) -> usize {
        match self {
            SourceBucket::Official => 0,
            SourceBucket::Media => 1,
            SourceBucket::Community => 2,
            SourceBucket::Social => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceComparison {
    pub bucket: SourceBucket,
    pub name: String,
    pub reliable: u32,
    pub unreliable: u32,
}

impl SourceComparison {
    /// Share of reliable sources, or `None` when the bucket is empty.
    pub fn reliable_ratio(&self) -> Option<f64> {
        let total = self.reliable + self.unreliable;
        (total > 0).then(|| f64::from(self.reliable) / f64::from(total))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub word_cloud: Vec<WordWeight>,
    pub timeline: Vec<MonthlyScore>,
    pub source_comparison: Vec<SourceComparison>,
}

/// Scans every message of every chat once and builds the three aggregate views.
pub fn calculate_statistics(chats: &[Chat]) -> Statistics {
    let mut word_counts: HashMap<String, u32> = HashMap::new();
    let mut monthly_scores: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut source_counts = [(0u32, 0u32); 4];

    for message in chats.iter().flat_map(|chat| chat.messages.iter()) {
        if let Some(analysis) = &message.analysis {
            let month = message.timestamp.format("%Y-%m").to_string();
            monthly_scores.entry(month).or_default().push(analysis.score);

            for source in &analysis.sources {
                let counts = &mut source_counts[SourceBucket::classify(source).index()];
                if source.reliability == Reliability::High {
                    counts.0 += 1;
                } else {
                    counts.1 += 1;
                }
            }
        }

        for token in tokenize(&message.content) {
            *word_counts.entry(token).or_insert(0) += 1;
        }
    }

    Statistics {
        word_cloud: build_word_cloud(word_counts),
        timeline: build_timeline(monthly_scores),
        source_comparison: SourceBucket::ORDER
            .iter()
            .map(|bucket| {
                let (reliable, unreliable) = source_counts[bucket.index()];
                SourceComparison {
                    bucket: *bucket,
                    name: bucket.label().to_string(),
                    reliable,
                    unreliable,
                }
            })
            .collect(),
    }
}

/// Lower-cases, splits on whitespace, strips everything outside `[A-Za-z0-9_]`
/// and drops tokens of three characters or fewer.
pub fn tokenize(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .split_whitespace()
        .map(|raw| NON_WORD.replace_all(&raw.to_lowercase(), "").into_owned())
        .filter(|word| word.chars().count() >= MIN_WORD_LEN)
}

fn build_word_cloud(word_counts: HashMap<String, u32>) -> Vec<WordWeight> {
    let mut entries: Vec<(String, u32)> = word_counts.into_iter().collect();
    // Ties are broken alphabetically so the cloud is stable between runs.
    entries.sort_by(|(wa, ca), (wb, cb)| cb.cmp(ca).then_with(|| wa.cmp(wb)));

    entries
        .into_iter()
        .take(WORD_CLOUD_SIZE)
        .map(|(word, count)| WordWeight {
            problematic: PROBLEMATIC_WORDS.contains(&word.as_str()),
            weight: (count * WEIGHT_PER_OCCURRENCE).min(MAX_WEIGHT),
            word,
            count,
        })
        .collect()
}

fn build_timeline(monthly_scores: BTreeMap<String, Vec<u8>>) -> Vec<MonthlyScore> {
    let skip = monthly_scores.len().saturating_sub(TIMELINE_MONTHS);
    monthly_scores
        .into_iter()
        .skip(skip)
        .map(|(date, scores)| {
            let total: u32 = scores.iter().map(|s| u32::from(*s)).sum();
            let average = f64::from(total) / scores.len() as f64;
            MonthlyScore {
                date,
                score: average.round() as u8,
            }
        })
        .collect()
}
