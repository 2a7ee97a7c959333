//! Deterministic local description template
//!
//! Terminal recovery path for description synthesis. Must never fail: the
//! scheduling hand-off depends on it when the generation provider is
//! unconfigured or down.

use crate::prompt::PromptTemplate;

/// Build the fixed-template case description
///
/// Header + capitalized, period-terminated issue (or a generic placeholder
/// when the issue is empty) + fixed footer.
pub fn basic_description(template: &PromptTemplate, issue: &str) -> String {
    let mut description = template.header();
    description.push_str("\n\n");

    let issue = issue.trim();
    if issue.is_empty() {
        description.push_str(
            "Problema/Dúvida do Cliente:\nCliente buscou orientação jurídica através do \
             assistente virtual.\n\n",
        );
    } else {
        let formatted = capitalize_sentence(issue);
        description.push_str(&format!("Problema/Dúvida do Cliente:\n{formatted}\n\n"));
    }

    description.push_str(
        "Este agendamento foi realizado após triagem inicial realizada pelo assistente virtual.",
    );
    description
}

/// Uppercase the first character and ensure terminal punctuation
fn capitalize_sentence(text: &str) -> String {
    let mut chars = text.chars();
    let mut out = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => return String::new(),
    };

    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}
