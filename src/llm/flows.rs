//! Repository analysis flows: overview, code explanation, file summary and
//! improvement suggestions.
//!
//! Each flow validates its input, renders a prompt template and parses the
//! model's answer. Structured flows ask for JSON and tolerate fenced output.

use super::LlmClient;
use crate::error::{StudioError, StudioResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SUMMARY_CHARS: usize = 50_000;
pub const MAX_SUGGESTION_CHARS: usize = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOverview {
    pub overview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExplanation {
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub summary: String,
    #[serde(default)]
    pub key_components: Vec<String>,
    pub purpose: String,
    pub complexity: Complexity,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    Performance,
    Readability,
    Security,
    BestPractice,
    TypeSafety,
    Maintainability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quality {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

macro_rules! display_as {
    ($ty:ty { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $label),+
                })
            }
        }
    };
}

display_as!(Complexity { Low => "low", Medium => "medium", High => "high" });
display_as!(Priority { Low => "low", Medium => "medium", High => "high" });
display_as!(SuggestionKind {
    Performance => "performance",
    Readability => "readability",
    Security => "security",
    BestPractice => "best-practice",
    TypeSafety => "type-safety",
    Maintainability => "maintainability",
});
display_as!(Quality {
    Excellent => "excellent",
    Good => "good",
    Fair => "fair",
    NeedsImprovement => "needs-improvement",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSuggestions {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
    pub overall_quality: Quality,
    pub summary: String,
}

/// High-level architecture overview of a repository.
pub async fn project_overview(
    client: &LlmClient,
    repo_url: &str,
    structure: Option<&str>,
) -> StudioResult<ProjectOverview> {
    require_non_empty(repo_url, "Repository URL")?;
    let mut prompt = format!(
        "You are an AI expert in software architecture. You are given the URL of a public \
GitHub repository. Provide a high-level overview of the project's architecture, key \
components, and data flow.\n\nGitHub Repository URL: {repo_url}\n"
    );
    if let Some(structure) = structure.filter(|s| !s.is_empty()) {
        prompt.push_str(&format!("\nFile structure:\n{structure}\n"));
    }
    let overview = client.complete(&prompt).await?;
    Ok(ProjectOverview { overview: overview.trim().to_string() })
}

/// Plain-language explanation of a code block within its project.
pub async fn explain_code(
    client: &LlmClient,
    code: &str,
    file_path: &str,
    project_structure: &str,
) -> StudioResult<CodeExplanation> {
    require_non_empty(code, "Code")?;
    let prompt = format!(
        "You are an expert software developer. Explain the following code block in plain \
language, taking into account the surrounding code and project structure.\n\n\
Code Block:\n```\n{code}\n```\n\nFile Path: {file_path}\n\n\
Project Structure:\n{project_structure}\n\nExplanation:"
    );
    let explanation = client.complete(&prompt).await?;
    Ok(CodeExplanation { explanation: explanation.trim().to_string() })
}

pub async fn file_summary(
    client: &LlmClient,
    file_name: &str,
    file_path: &str,
    content: &str,
    project_context: Option<&str>,
) -> StudioResult<FileSummary> {
    require_non_empty(content, "File content")?;
    require_non_empty(file_name, "File name")?;
    require_max_len(content, MAX_SUMMARY_CHARS, "File content")?;

    let context = project_context
        .filter(|c| !c.is_empty())
        .map(|c| format!("**Project Context:** {c}\n"))
        .unwrap_or_default();
    let prompt = format!(
        "You are an expert code analyst. Analyze the provided file and generate a concise, \
helpful summary.\n\n**File:** {file_name}\n**Path:** {file_path}\n{context}\n\
**File Content:**\n```\n{content}\n```\n\n\
Respond with only a JSON object with these fields:\n\
- \"summary\": a 2-3 sentence overview of what this file does and its role in the project\n\
- \"keyComponents\": the main functions, classes, components or exports (at most 10)\n\
- \"purpose\": the primary responsibility of this file in one sentence\n\
- \"complexity\": \"low\", \"medium\" or \"high\"\n\
- \"tags\": 3-5 short tags such as \"component\", \"utility\", \"config\", \"api\", \"test\"\n"
    );
    let answer = client.complete(&prompt).await?;
    let mut summary: FileSummary = parse_json_answer(&answer)?;
    summary.key_components.truncate(10);
    Ok(summary)
}

pub async fn code_suggestions(
    client: &LlmClient,
    code: &str,
    file_path: &str,
    language: Option<&str>,
    context: Option<&str>,
) -> StudioResult<CodeSuggestions> {
    require_non_empty(code, "Code")?;
    require_non_empty(file_path, "File path")?;
    require_max_len(code, MAX_SUGGESTION_CHARS, "Code")?;

    let mut header = format!("**File:** {file_path}\n");
    if let Some(language) = language.filter(|l| !l.is_empty()) {
        header.push_str(&format!("**Language:** {language}\n"));
    }
    if let Some(context) = context.filter(|c| !c.is_empty()) {
        header.push_str(&format!("**Context:** {context}\n"));
    }
    let prompt = format!(
        "You are an expert code reviewer and software architect. Analyze the provided code and \
offer specific, actionable improvement suggestions.\n\n{header}\n\
**Code to Analyze:**\n```\n{code}\n```\n\n\
Consider performance, readability, security, best practices, type safety and \
maintainability. Respond with only a JSON object:\n\
{{\"suggestions\": [{{\"type\": \"performance|readability|security|best-practice|type-safety|maintainability\", \
\"priority\": \"low|medium|high\", \"title\": \"...\", \"description\": \"...\", \"example\": \"optional code\"}}], \
\"overallQuality\": \"excellent|good|fair|needs-improvement\", \"summary\": \"...\"}}\n"
    );
    let answer = client.complete(&prompt).await?;
    let mut parsed: CodeSuggestions = parse_json_answer(&answer)?;
    parsed.suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));
    Ok(parsed)
}

/// The span from the first `{` to the last `}`, if any.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_json_answer<T: DeserializeOwned>(answer: &str) -> StudioResult<T> {
    let json = extract_json(answer).ok_or_else(|| {
        StudioError::Unknown("model answer did not contain a JSON object".to_string())
    })?;
    serde_json::from_str(json)
        .map_err(|e| StudioError::Unknown(format!("could not parse model answer: {e}")))
}

fn require_non_empty(value: &str, what: &str) -> StudioResult<()> {
    if value.trim().is_empty() {
        return Err(StudioError::InvalidInput(format!("{what} cannot be empty")));
    }
    Ok(())
}

fn require_max_len(value: &str, max: usize, what: &str) -> StudioResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(StudioError::InvalidInput(format!(
            "{what} is too long ({len} characters, maximum {max})"
        )));
    }
    Ok(())
}
