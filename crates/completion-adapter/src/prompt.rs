//! Prompt templates.

use quota_generator::{BatchRequest, ExclusionContext};

/// A prompt with `{batch_size}`, `{attempt}`, `{existing_count}` and
/// `{exclusions}` placeholders.
///
/// Unknown placeholders are left as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, request: &BatchRequest) -> String {
        self.template
            .replace("{batch_size}", &request.batch_size.to_string())
            .replace("{attempt}", &request.attempt.to_string())
            .replace(
                "{existing_count}",
                &request.exclusions.existing_count.to_string(),
            )
            .replace("{exclusions}", &render_exclusions(&request.exclusions))
    }
}

/// One `- field: v1, v2` line per field that has claimed values, or `none`.
pub fn render_exclusions(exclusions: &ExclusionContext) -> String {
    let lines: Vec<String> = exclusions
        .fields
        .iter()
        .filter(|f| !f.values.is_empty())
        .map(|f| format!("- {}: {}", f.field, f.values.join(", ")))
        .collect();

    if lines.is_empty() {
        "none".to_string()
    } else {
        lines.join("\n")
    }
}
