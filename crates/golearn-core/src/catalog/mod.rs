//! Lesson catalog — chapters, lessons, and quizzes, built once at startup
//!
//! Content lives in `content/chapterNN.toml`, compiled into the binary with
//! `include_str!` and parsed by [`Catalog::builtin`]. The resulting value is
//! never mutated; share it behind an `Arc`.

pub mod types;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

pub use types::{Chapter, CodeExample, Exercise, Lesson, LessonSummary, Question, Quiz};

const BUILT_IN_CHAPTERS: &[&str] = &[
    include_str!("content/chapter01.toml"),
    include_str!("content/chapter02.toml"),
    include_str!("content/chapter03.toml"),
    include_str!("content/chapter04.toml"),
    include_str!("content/chapter05.toml"),
    include_str!("content/chapter06.toml"),
    include_str!("content/chapter07.toml"),
    include_str!("content/chapter08.toml"),
    include_str!("content/chapter09.toml"),
    include_str!("content/chapter10.toml"),
];

/// One chapter file as authored
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChapterSource {
    id: u32,
    title: String,
    description: String,
    #[serde(default)]
    lessons: Vec<LessonSource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LessonSource {
    id: String,
    title: String,
    content: String,
    #[serde(default)]
    code_examples: Vec<CodeExample>,
    #[serde(default)]
    notes: Vec<String>,
    exercise: Option<Exercise>,
    /// Quiz questions; a lesson without any has no quiz
    #[serde(default)]
    questions: Vec<Question>,
}

/// Read-only index over all chapters, lessons, and quizzes
#[derive(Debug, Default)]
pub struct Catalog {
    chapters: Vec<Chapter>,
    lessons: HashMap<String, Lesson>,
    quizzes: HashMap<String, Quiz>,
}

impl Catalog {
    /// Build the catalog from the content compiled into this crate
    pub fn builtin() -> Result<Self> {
        Self::from_chapter_sources(BUILT_IN_CHAPTERS)
    }

    /// Build a catalog from chapter TOML documents
    pub fn from_chapter_sources(sources: &[&str]) -> Result<Self> {
        let mut catalog = Self::default();
        for (index, source) in sources.iter().enumerate() {
            let chapter: ChapterSource = toml::from_str(source)
                .with_context(|| format!("Failed to parse chapter source #{}", index + 1))?;
            let chapter_id = chapter.id;
            catalog
                .add_chapter(chapter)
                .with_context(|| format!("Invalid content in chapter {}", chapter_id))?;
        }
        catalog.chapters.sort_by_key(|c| c.id);

        info!(
            "Catalog loaded: {} chapters, {} lessons, {} quizzes",
            catalog.chapters.len(),
            catalog.lessons.len(),
            catalog.quizzes.len()
        );
        Ok(catalog)
    }

    fn add_chapter(&mut self, source: ChapterSource) -> Result<()> {
        if self.chapters.iter().any(|c| c.id == source.id) {
            bail!("Duplicate chapter id {}", source.id);
        }

        let mut summaries = Vec::with_capacity(source.lessons.len());
        for lesson in source.lessons {
            if lesson.id.trim().is_empty() {
                bail!("Lesson with empty id");
            }
            if self.lessons.contains_key(&lesson.id) {
                bail!("Duplicate lesson id '{}'", lesson.id);
            }
            validate_questions(&lesson.id, &lesson.questions)?;
            if let Some(exercise) = &lesson.exercise
                && exercise.starter_code.trim().is_empty()
            {
                bail!("Exercise in lesson '{}' has no starter code", lesson.id);
            }

            summaries.push(LessonSummary {
                id: lesson.id.clone(),
                title: lesson.title.clone(),
            });

            if !lesson.questions.is_empty() {
                self.quizzes.insert(
                    lesson.id.clone(),
                    Quiz {
                        lesson_id: lesson.id.clone(),
                        questions: lesson.questions,
                    },
                );
            }

            self.lessons.insert(
                lesson.id.clone(),
                Lesson {
                    id: lesson.id,
                    chapter_id: source.id,
                    title: lesson.title,
                    content: lesson.content,
                    code_examples: lesson.code_examples,
                    notes: lesson.notes,
                    exercise: lesson.exercise,
                },
            );
        }

        self.chapters.push(Chapter {
            id: source.id,
            title: source.title,
            description: source.description,
            lessons: summaries,
        });
        Ok(())
    }

    /// All chapters in id order, each with its lesson summaries
    pub fn list_chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn get_lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.get(id)
    }

    pub fn get_quiz(&self, lesson_id: &str) -> Option<&Quiz> {
        self.quizzes.get(lesson_id)
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    pub fn quiz_count(&self) -> usize {
        self.quizzes.len()
    }
}

fn validate_questions(lesson_id: &str, questions: &[Question]) -> Result<()> {
    let mut seen = HashSet::new();
    for question in questions {
        if !seen.insert(question.id.as_str()) {
            bail!(
                "Duplicate question id '{}' in lesson '{}'",
                question.id,
                lesson_id
            );
        }
        if question.options.len() < 2 {
            bail!("Question '{}' needs at least two options", question.id);
        }
        if question.answer >= question.options.len() {
            bail!(
                "Question '{}' answer index {} is out of range ({} options)",
                question.id,
                question.answer,
                question.options.len()
            );
        }
    }
    Ok(())
}
