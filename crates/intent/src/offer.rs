//! Scheduling offer detection
//!
//! Decides whether an agent utterance is an offer to schedule a
//! consultation. Deliberately conservative: under-triggering is preferred
//! to hijacking a conversation that was not actually at the scheduling
//! point.

use once_cell::sync::Lazy;
use regex::Regex;

/// Offer verbs the agent uses when proposing a consultation
static OFFER_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(posso|deseja|gostaria|quer|podemos|desejo|ofereço|sugiro|recomendo)")
        .expect("valid regex")
});

/// Scheduling vocabulary
static SCHEDULING_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(agendar|agendamento|marcar|consulta|reunião|horário|especialista)")
        .expect("valid regex")
});

/// High-confidence offer shapes: offer verb followed by scheduling noun,
/// or consultation/specialist pairings in either order
static CLEAR_OFFER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)posso.*agendar.*(consulta|reunião|especialista)",
        r"(?i)deseja.*agendar.*(consulta|reunião|especialista)",
        r"(?i)gostaria.*agendar.*(consulta|reunião|especialista)",
        r"(?i)quer.*agendar.*(consulta|reunião|especialista)",
        r"(?i)podemos.*agendar.*(consulta|reunião|especialista)",
        r"(?i)agendar.*(consulta|reunião).*especialista",
        r"(?i)marcar.*(consulta|reunião).*especialista",
        r"(?i)(consulta|reunião).*especialista.*agendar",
        r"(?i)(consulta|reunião).*especialista.*marcar",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// First-person openers that mark a user-style question about scheduling
/// rather than an offer by the agent
static FIRST_PERSON_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(eu|minha|meu|estou|sou|tenho|preciso)").expect("valid regex"));

/// Classify an agent utterance as a scheduling offer
///
/// Utterances opening in the first person are never offers, regardless of
/// contained keywords. Otherwise positive when a clear offer pattern
/// matches, or when the text carries both an offer word and a scheduling
/// word.
pub fn detects_scheduling_offer(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || FIRST_PERSON_OPENER.is_match(trimmed) {
        return false;
    }

    if CLEAR_OFFER_PATTERNS.iter().any(|p| p.is_match(text)) {
        return true;
    }

    OFFER_WORD.is_match(text) && SCHEDULING_WORD.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_offer() {
        assert!(detects_scheduling_offer(
            "Posso agendar uma consulta com nosso especialista?"
        ));
        assert!(detects_scheduling_offer(
            "Gostaria de agendar uma reunião com o especialista?"
        ));
    }

    #[test]
    fn test_offer_and_scheduling_words() {
        assert!(detects_scheduling_offer(
            "Sugiro marcarmos um horário para avançar no seu caso."
        ));
    }

    #[test]
    fn test_first_person_is_not_offer() {
        // Keyword-rich but reads as the user asking, not the agent offering
        assert!(!detects_scheduling_offer(
            "Eu quero agendar uma consulta com o especialista"
        ));
        assert!(!detects_scheduling_offer(
            "Preciso marcar uma reunião com urgência"
        ));
    }

    #[test]
    fn test_plain_conversation_is_not_offer() {
        assert!(!detects_scheduling_offer(
            "Entendo a sua situação com o contrato de aluguel."
        ));
        assert!(!detects_scheduling_offer(""));
    }

    #[test]
    fn test_first_person_guard_overrides_clear_patterns() {
        // Matches a clear pattern shape but opens in the first person
        assert!(!detects_scheduling_offer(
            "Tenho que agendar uma consulta com especialista?"
        ));
        assert!(detects_scheduling_offer(
            "Podemos agendar uma consulta com nosso especialista ainda hoje?"
        ));
    }
}
