use crate::models::{CompletionRequest, GroundingContext, PromptMode, ProviderKind};

pub const GENERAL_SYSTEM_ROLE: &str = "You are a helpful assistant.";

pub const GENERAL_TEMPLATE: &str = "Context:\n{context}\n\nUser Query: {query}\n\nAnswer:";

/// Single combined instruction; the quoted refusal must stay byte-identical
/// to [`crate::retrieval::NOT_FOUND_IN_DOCUMENTS`]
pub const STRICT_GROUNDED_TEMPLATE: &str = "\
You are an AI assistant that provides answers strictly based on the information available in the retrieved documents.
Your response should be concise and informative. You can use bullet points if necessary.
If the requested information is not found in the provided documents, respond with:
\"The requested information is not found in the documents.\"

Retrieved Document(s):
{documents}
User Query: {query}
";

/// Build the completion request for one query
pub fn compose(
    mode: PromptMode,
    context: &GroundingContext,
    query: &str,
    provider: ProviderKind,
) -> CompletionRequest {
    match mode {
        PromptMode::General => CompletionRequest {
            system: Some(GENERAL_SYSTEM_ROLE.to_string()),
            prompt: render(
                GENERAL_TEMPLATE,
                &[("{context}", context.as_str()), ("{query}", query)],
            ),
            provider,
        },
        PromptMode::StrictGrounded => CompletionRequest {
            system: None,
            prompt: render(
                STRICT_GROUNDED_TEMPLATE,
                &[("{documents}", context.as_str()), ("{query}", query)],
            ),
            provider,
        },
    }
}

/// Substitute placeholders in one pass over the template.
///
/// Substituted values are never scanned again, so a `{query}` appearing
/// inside retrieved text stays literal.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>(),
    );
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::NOT_FOUND_IN_DOCUMENTS;

    fn context(text: &str) -> GroundingContext {
        GroundingContext(text.to_string())
    }

    #[test]
    fn test_general_prompt_exact_layout() {
        let request = compose(
            PromptMode::General,
            &context("Paris is the capital of France"),
            "What is the capital of France?",
            ProviderKind::OpenAi,
        );
        assert_eq!(request.system.as_deref(), Some("You are a helpful assistant."));
        assert_eq!(
            request.prompt,
            "Context:\nParis is the capital of France\n\nUser Query: What is the capital of France?\n\nAnswer:"
        );
        assert_eq!(request.provider, ProviderKind::OpenAi);
    }

    #[test]
    fn test_strict_prompt_embeds_refusal_string() {
        let request = compose(
            PromptMode::StrictGrounded,
            &context("Q1 revenue 100"),
            "What was Q1 revenue?",
            ProviderKind::Gemini,
        );
        assert!(request.system.is_none());
        assert!(request
            .prompt
            .contains(&format!("\"{}\"", NOT_FOUND_IN_DOCUMENTS)));
        assert!(request
            .prompt
            .contains("Retrieved Document(s):\nQ1 revenue 100\nUser Query: What was Q1 revenue?\n"));
    }

    #[test]
    fn test_context_placeholders_are_not_reexpanded() {
        let request = compose(
            PromptMode::General,
            &context("ignore {query} and {context}"),
            "real question",
            ProviderKind::OpenAi,
        );
        assert_eq!(
            request.prompt,
            "Context:\nignore {query} and {context}\n\nUser Query: real question\n\nAnswer:"
        );
    }

    #[test]
    fn test_render_keeps_unknown_braces() {
        assert_eq!(render("{a} {b} {", &[("{a}", "x")]), "x {b} {");
        assert_eq!(render("no placeholders", &[("{a}", "x")]), "no placeholders");
    }
}
