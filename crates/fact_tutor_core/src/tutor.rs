//! crates/fact_tutor_core/src/tutor.rs
//!
//! The tutor's canned replies and quiz grading.

use serde::Serialize;

use crate::domain::{Quiz, UserMode};

/// Number of characters of the question quoted back in a tutor reply.
const QUOTE_MAX_CHARS: usize = 50;

pub const ANALYSIS_COMPLETE_MESSAGE: &str = "J'ai analysé le contenu que vous avez soumis. \
Voici mon évaluation basée sur la méthode NIRD de vérification des faits.";

/// Content of the user message recorded when an analysis is requested.
pub fn analysis_request_content(content: &str) -> String {
    format!("🔍 Analyse demandée: {}", content)
}

/// Terminal assistant message for an analysis the analyzer could not complete.
pub fn analysis_failed_message(reason: &str) -> String {
    format!(
        "⚠️ L'analyse a échoué : {}. Vous pouvez réessayer dans quelques instants.",
        reason
    )
}

/// Builds the reply to a plain question: a lesson plan for teachers, a
/// verification exercise for students.
pub fn compose_reply(mode: UserMode, content: &str) -> String {
    let quoted: String = content.chars().take(QUOTE_MAX_CHARS).collect();
    match mode {
        UserMode::Teacher => format!(
            "🎓 **Analyse pédagogique** - Question élève : \"{quoted}...\"

**Objectif d'apprentissage :** Développer l'esprit critique et la vérification des sources

**Approche pédagogique suggérée :**
1. **Questionnement initial** : Faire reformuler l'affirmation par les élèves
2. **Recherche documentaire** : Identifier les sources fiables
3. **Analyse comparative** : Comparer différentes perspectives
4. **Synthèse critique** : Tirer des conclusions argumentées

**Activité proposée :** Demandez aux élèves de trouver 3 sources différentes sur ce sujet et d'évaluer leur fiabilité."
        ),
        UserMode::Student => format!(
            "🧠 **Exercice d'analyse critique** - Votre question : \"{quoted}...\"

**Méthodologie de vérification :**
1. **Identifier la source** : Qui produit cette information ?
2. **Vérifier la date** : L'information est-elle récente et contextualisée ?
3. **Croiser les sources** : Plusieurs sources indépendantes confirment-elles ?
4. **Évaluer la logique** : L'argumentation est-elle cohérente ?

**Votre défi :** Essayez d'appliquer cette méthode à votre question. Quelles sources allez-vous consulter en premier ?"
        ),
    }
}

//=========================================================================================
// Quiz grading
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub quiz_id: String,
    pub correct: bool,
    pub selected: usize,
    pub correct_answer: usize,
    pub explanation: String,
}

impl Quiz {
    /// Grades a selected option. Out-of-range selections are simply wrong.
    pub fn grade(&self, selected: usize) -> QuizOutcome {
        QuizOutcome {
            quiz_id: self.id.clone(),
            correct: selected == self.correct_answer,
            selected,
            correct_answer: self.correct_answer,
            explanation: self.explanation.clone(),
        }
    }
}
