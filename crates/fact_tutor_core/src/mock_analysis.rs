//! crates/fact_tutor_core/src/mock_analysis.rs
//!
//! A placeholder `ContentAnalyzer` that ignores its input and returns a canned
//! analysis. Only the score and verdict are randomised.

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

use crate::domain::{
    AnalysisResult, Attachment, Difficulty, Exercise, FactElement, FactStatus, Quiz, Reliability,
    Source, SourceType, Verdict,
};
use crate::ports::{ContentAnalyzer, PortResult};

/// Inclusive bounds of the randomised score.
pub const MOCK_SCORE_MIN: u8 = 60;
pub const MOCK_SCORE_MAX: u8 = 99;

#[derive(Debug, Clone, Copy, Default)]
pub struct MockAnalyzer;

impl MockAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentAnalyzer for MockAnalyzer {
    async fn analyze(&self, content: &str, attachments: &[Attachment]) -> PortResult<AnalysisResult> {
        debug!(
            content_len = content.len(),
            attachments = attachments.len(),
            "Generating mock analysis"
        );
        Ok(generate_mock_analysis())
    }
}

/// Builds the canned analysis with a random score in [60, 99] and a coin-flip verdict.
pub fn generate_mock_analysis() -> AnalysisResult {
    let mut rng = rand::thread_rng();
    let score = rng.gen_range(MOCK_SCORE_MIN..=MOCK_SCORE_MAX);
    let verdict = if rng.gen_bool(0.5) {
        Verdict::Suspicious
    } else {
        Verdict::Verified
    };

    AnalysisResult {
        score,
        verdict,
        factual_elements: vec![
            fact(
                "Linux est un système d'exploitation créé par Linus Torvalds",
                FactStatus::True,
                "Confirmé par de nombreuses sources officielles et académiques.",
            ),
            fact(
                "Linux est vulnérable aux virus comme Windows",
                FactStatus::PartiallyTrue,
                "Linux peut être affecté par des malwares, mais sa structure le rend plus résistant.",
            ),
            fact(
                "L'open-source est moins sécurisé car le code est visible",
                FactStatus::False,
                "Au contraire, la transparence permet une meilleure détection des failles.",
            ),
        ],
        sources: vec![
            source(
                "Linux Foundation - Official Documentation",
                "https://www.linuxfoundation.org/",
                Reliability::High,
                SourceType::Official,
            ),
            source(
                "Wikipedia - Linux Security",
                "https://en.wikipedia.org/wiki/Linux_security",
                Reliability::Medium,
                SourceType::Community,
            ),
            source(
                "CVE Details - Linux Vulnerabilities",
                "https://www.cvedetails.com/",
                Reliability::High,
                SourceType::Official,
            ),
        ],
        pedagogical_explanation: "Cette affirmation contient des éléments partiellement vrais mélangés à des idées reçues. \
Il est important de distinguer les faits vérifiables des opinions ou généralisations. \
Linux, comme tout système, n'est pas parfait, mais sa nature open-source lui confère des avantages \
en termes de sécurité et de transparence."
            .to_string(),
        critical_thinking_steps: strings(&[
            "Identifier la source originale de l'information",
            "Vérifier si des experts du domaine confirment ces affirmations",
            "Rechercher des études ou statistiques officielles",
            "Comparer avec d'autres sources indépendantes",
            "Distinguer les faits des opinions",
        ]),
        exercise: Some(Exercise {
            question: "Comment vérifierais-tu l'affirmation \"Linux n'a jamais eu de faille de sécurité\" ?"
                .to_string(),
            hints: strings(&[
                "Consulte les bases de données de vulnérabilités",
                "Cherche des articles de sécurité informatique",
            ]),
            expected_approach:
                "Rechercher dans les bases CVE et consulter les bulletins de sécurité officiels."
                    .to_string(),
        }),
        suggested_quizzes: Some(vec![
            Quiz {
                id: "1".to_string(),
                question: "Quelle est la principale raison pour laquelle Linux est considéré plus sécurisé ?"
                    .to_string(),
                options: strings(&[
                    "Il n'a jamais eu de virus",
                    "Son code source est ouvert et peut être audité par tous",
                    "Il est utilisé par moins de personnes",
                    "Il bloque automatiquement tous les malwares",
                ]),
                correct_answer: 1,
                explanation: "La transparence du code open-source permet à une communauté mondiale d'experts \
de détecter et corriger rapidement les failles de sécurité."
                    .to_string(),
                difficulty: Difficulty::Medium,
            },
            Quiz {
                id: "2".to_string(),
                question: "Comment peut-on vérifier la fiabilité d'une information sur la sécurité informatique ?"
                    .to_string(),
                options: strings(&[
                    "Croire la première source trouvée",
                    "Consulter uniquement les réseaux sociaux",
                    "Croiser plusieurs sources officielles et académiques",
                    "Se fier à son intuition",
                ]),
                correct_answer: 2,
                explanation: "La vérification croisée de sources fiables (officielles, académiques, experts reconnus) \
est essentielle pour confirmer une information."
                    .to_string(),
                difficulty: Difficulty::Easy,
            },
            Quiz {
                id: "3".to_string(),
                question: "Qu'est-ce qu'une base de données CVE ?".to_string(),
                options: strings(&[
                    "Un système d'exploitation",
                    "Une liste de vulnérabilités de sécurité connues",
                    "Un antivirus pour Linux",
                    "Un langage de programmation",
                ]),
                correct_answer: 1,
                explanation: "CVE (Common Vulnerabilities and Exposures) est une base de données publique \
qui répertorie les vulnérabilités de sécurité connues dans les logiciels."
                    .to_string(),
                difficulty: Difficulty::Hard,
            },
        ]),
    }
}

fn fact(claim: &str, status: FactStatus, explanation: &str) -> FactElement {
    FactElement {
        claim: claim.to_string(),
        status,
        explanation: explanation.to_string(),
    }
}

fn source(title: &str, url: &str, reliability: Reliability, kind: SourceType) -> Source {
    Source {
        title: title.to_string(),
        url: url.to_string(),
        reliability,
        kind,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
