//! Prompt template with named context and question slots.

use crate::error::{AskdocsError, Result};

/// Slot replaced with the concatenated retrieved texts.
pub const CONTEXT_SLOT: &str = "{context_str}";

/// Slot replaced with the raw user question.
pub const QUERY_SLOT: &str = "{query_str}";

/// Default question-answering template.
pub const DEFAULT_QA_TEMPLATE: &str = "\
You are an expert offline survival assistant. Use the provided context information
to answer the user's question accurately and concisely based on the context.
Prioritize the information provided in the context above all else.

# Context:
{context_str}

# User Question: {query_str}

# Answer:
";

/// A text pattern with `{context_str}` and `{query_str}` placeholders,
/// rendered before each model call.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template, validating that both slots are present.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();

        if !template.contains(CONTEXT_SLOT) {
            return Err(AskdocsError::InvalidTemplate { slot: CONTEXT_SLOT });
        }
        if !template.contains(QUERY_SLOT) {
            return Err(AskdocsError::InvalidTemplate { slot: QUERY_SLOT });
        }

        Ok(Self { template })
    }

    /// Substitute the context and question into the template.
    pub fn render(&self, context: &str, question: &str) -> String {
        self.template
            .replace(CONTEXT_SLOT, context)
            .replace(QUERY_SLOT, question)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        // DEFAULT_QA_TEMPLATE carries both slots.
        Self {
            template: DEFAULT_QA_TEMPLATE.to_string(),
        }
    }
}
