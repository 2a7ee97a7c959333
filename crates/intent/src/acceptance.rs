//! Scheduling acceptance detection
//!
//! Decides whether a user utterance accepts a pending scheduling offer.
//! Evaluation order is fixed and first-match-wins: the direct phrase list
//! is checked before the pattern set, exactly in the order below.

use once_cell::sync::Lazy;
use regex::Regex;

/// Direct acceptance phrases, matched by containment on lowercased text
const DIRECT_ACCEPTANCE: &[&str] = &[
    "sim",
    "quero",
    "aceito",
    "ok",
    "perfeito",
    "ótimo",
    "vamos",
    "pode ser",
    "claro",
    "com certeza",
    "pode",
    "pode sim",
    "quero sim",
    "sim quero",
    "sim por favor",
    "quero agendar",
    "quero marcar",
    "sim quero agendar",
    "sim quero marcar",
    "quero sim agendar",
    "quero sim marcar",
    "pode agendar",
    "pode marcar",
    "vamos agendar",
    "vamos marcar",
    "aceito agendar",
    "aceito marcar",
    "tudo bem",
    "tá bom",
    "está bem",
    "pode ser sim",
    "quero isso",
    "quero sim isso",
];

/// Pattern fallbacks: a leading acceptance word, or an acceptance word and
/// a scheduling word anywhere in the sentence (either order)
static ACCEPTANCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(sim|quero|aceito|ok|perfeito|ótimo|vamos|claro|pode).*$",
        r"(?i).*(quero|aceito|vamos).*(agendar|marcar|consulta|reunião).*",
        r"(?i).*(sim|ok|perfeito|ótimo).*(agendar|marcar|consulta|reunião).*",
        r"(?i).*(agendar|marcar|consulta|reunião).*(sim|quero|aceito|ok).*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Classify a user utterance as acceptance of a pending offer
///
/// Pure classification; the caller is responsible for only invoking this
/// while an offer is actually pending.
pub fn detects_scheduling_acceptance(text: &str) -> bool {
    let lower = text.to_lowercase();
    let lower = lower.trim();
    if lower.is_empty() {
        return false;
    }

    if DIRECT_ACCEPTANCE.iter().any(|phrase| lower.contains(phrase)) {
        tracing::trace!(utterance = %lower, "acceptance matched by direct phrase");
        return true;
    }

    if ACCEPTANCE_PATTERNS.iter().any(|p| p.is_match(text)) {
        tracing::trace!(utterance = %lower, "acceptance matched by pattern");
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_phrases() {
        for phrase in DIRECT_ACCEPTANCE {
            assert!(
                detects_scheduling_acceptance(phrase),
                "expected acceptance for {phrase:?}"
            );
        }
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert!(detects_scheduling_acceptance("  SIM, quero agendar  "));
        assert!(detects_scheduling_acceptance("Pode Ser"));
    }

    #[test]
    fn test_combined_acceptance() {
        assert!(detects_scheduling_acceptance("sim, quero agendar"));
        assert!(detects_scheduling_acceptance(
            "a consulta pode ficar para amanhã, aceito"
        ));
    }

    #[test]
    fn test_greetings_are_not_acceptance() {
        assert!(!detects_scheduling_acceptance("oi"));
        assert!(!detects_scheduling_acceptance("bom dia"));
        assert!(!detects_scheduling_acceptance("boa tarde"));
    }

    #[test]
    fn test_substantive_statement_is_not_acceptance() {
        assert!(!detects_scheduling_acceptance(
            "meu contrato de trabalho foi rescindido sem aviso"
        ));
        assert!(!detects_scheduling_acceptance(""));
    }
}
