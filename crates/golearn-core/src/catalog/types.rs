//! Catalog records as served to the client

use serde::{Deserialize, Serialize};

/// A chapter with the ordered summaries of its lessons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub lessons: Vec<LessonSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
}

/// Full lesson body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// `"<chapter>-<n>"`, e.g. `"1-1"`
    pub id: String,
    pub chapter_id: u32,
    pub title: String,
    pub content: String,
    pub code_examples: Vec<CodeExample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeExample {
    pub title: String,
    pub code: String,
}

/// Hands-on task; `starter_code` is loaded into the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"), deny_unknown_fields)]
pub struct Exercise {
    pub title: String,
    pub description: String,
    pub starter_code: String,
}

/// Questions attached to a single lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub lesson_id: String,
    pub questions: Vec<Question>,
}

/// A multiple-choice question; `answer` indexes into `options`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub answer: usize,
    pub explanation: String,
}
