//! Prompt templates for case summary generation

/// Fixed system/user prompt pair for the intake summary
///
/// Instructs formal Brazilian Portuguese, a 300 word cap, no markup and the
/// fixed structural sections the booking form expects.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Assistant display name
    pub assistant_name: String,
    /// Law firm name
    pub firm_name: String,
}

impl PromptTemplate {
    pub fn new(assistant_name: impl Into<String>, firm_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            firm_name: firm_name.into(),
        }
    }

    /// System prompt for the generation request
    pub fn system_prompt(&self) -> String {
        "Você é um assistente jurídico profissional que formata descrições de \
         consultas de forma clara e objetiva."
            .to_string()
    }

    /// User prompt embedding the client's issue
    pub fn user_prompt(&self, issue: &str) -> String {
        let issue = if issue.trim().is_empty() {
            "Cliente buscou orientação jurídica através do assistente virtual."
        } else {
            issue
        };

        format!(
            "Você é um assistente jurídico profissional. Com base na seguinte \
             dúvida/problema do cliente, crie uma descrição profissional e clara \
             para ser enviada ao especialista em um agendamento.\n\n\
             Dúvida/Problema do cliente:\n{issue}\n\n\
             Crie uma descrição profissional, objetiva e clara que:\n\
             1. Seja formal e respeitosa\n\
             2. Resuma o problema/dúvida do cliente de forma clara\n\
             3. Seja útil para o especialista se preparar para a consulta\n\
             4. Tenha no máximo 300 palavras\n\
             5. Use português brasileiro formal\n\n\
             Formato da resposta (sem markdown, apenas texto puro):\n\
             Consulta agendada através do assistente virtual {assistant} ({firm}).\n\n\
             Problema/Dúvida do Cliente:\n\
             [descrição formatada aqui]\n\n\
             Este agendamento foi realizado após triagem inicial realizada pelo \
             assistente virtual.",
            issue = issue,
            assistant = self.assistant_name,
            firm = self.firm_name,
        )
    }

    /// Fixed header line shared by the generated and fallback formats
    pub fn header(&self) -> String {
        format!(
            "Consulta agendada através do assistente virtual {} ({}).",
            self.assistant_name, self.firm_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_issue() {
        let t = PromptTemplate::new("Sonia", "Machado e Costa Advocacia");
        let p = t.user_prompt("problema com contrato de aluguel");
        assert!(p.contains("problema com contrato de aluguel"));
        assert!(p.contains("Sonia"));
        assert!(p.contains("Machado e Costa Advocacia"));
    }

    #[test]
    fn test_empty_issue_uses_placeholder() {
        let t = PromptTemplate::new("Sonia", "Machado e Costa Advocacia");
        let p = t.user_prompt("   ");
        assert!(p.contains("Cliente buscou orientação jurídica"));
    }
}
