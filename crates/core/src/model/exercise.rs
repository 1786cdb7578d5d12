use serde::{Deserialize, Serialize};

use crate::model::course::Resource;
use crate::model::ids::{ExerciseId, LessonId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Javascript,
    Typescript,
    Python,
}

/// Index of the correct option, or all correct indices for multi-select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    Single(usize),
    Multiple(Vec<usize>),
}

impl CorrectAnswer {
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        match self {
            CorrectAnswer::Single(index) => vec![*index],
            CorrectAnswer::Multiple(indices) => indices.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub multiple_choice: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaygroundExample {
    pub input: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

/// Type-specific payload of an exercise.
///
/// Tagged by `type` on the wire so catalog files stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExerciseContent {
    #[serde(rename_all = "camelCase")]
    Code {
        prompt: String,
        starter_code: String,
        language: CodeLanguage,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_output: Option<String>,
    },
    Quiz {
        questions: Vec<QuizQuestion>,
    },
    #[serde(rename_all = "camelCase")]
    Project {
        requirements: Vec<String>,
        deliverables: Vec<String>,
        evaluation_criteria: Vec<String>,
        #[serde(default)]
        resources: Vec<Resource>,
    },
    #[serde(rename_all = "camelCase")]
    Playground {
        prompt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        system_prompt: Option<String>,
        #[serde(default)]
        examples: Vec<PlaygroundExample>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        evaluation_prompt: Option<String>,
    },
}

impl ExerciseContent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ExerciseContent::Code { .. } => "code",
            ExerciseContent::Quiz { .. } => "quiz",
            ExerciseContent::Project { .. } => "project",
            ExerciseContent::Playground { .. } => "playground",
        }
    }

    /// Short instruction line shown before the learner starts.
    #[must_use]
    pub fn headline(&self) -> String {
        match self {
            ExerciseContent::Code { prompt, .. } | ExerciseContent::Playground { prompt, .. } => {
                prompt.clone()
            }
            ExerciseContent::Quiz { questions } => format!("{} question(s)", questions.len()),
            ExerciseContent::Project { requirements, .. } => {
                format!("{} requirement(s)", requirements.len())
            }
        }
    }
}

/// Optional practice attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: ExerciseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_id: Option<LessonId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: ExerciseDifficulty,
    pub points: u32,
    pub content: ExerciseContent,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_content_parses_single_and_multiple_answers() {
        let json = r#"{
            "type": "quiz",
            "questions": [
                {"id": "q1", "question": "?", "options": ["a", "b"], "correctAnswer": 1},
                {"id": "q2", "question": "?", "options": ["a", "b", "c"], "correctAnswer": [0, 2], "multipleChoice": true}
            ]
        }"#;
        let content: ExerciseContent = serde_json::from_str(json).unwrap();
        let ExerciseContent::Quiz { questions } = &content else {
            panic!("expected quiz content");
        };
        assert_eq!(questions[0].correct_answer.indices(), vec![1]);
        assert_eq!(questions[1].correct_answer.indices(), vec![0, 2]);
        assert_eq!(content.kind(), "quiz");
        assert_eq!(content.headline(), "2 question(s)");
    }

    #[test]
    fn code_content_uses_camel_case_fields() {
        let json = r#"{
            "type": "code",
            "prompt": "Implement attention",
            "starterCode": "def f(): pass",
            "language": "python"
        }"#;
        let content: ExerciseContent = serde_json::from_str(json).unwrap();
        assert_eq!(
            content,
            ExerciseContent::Code {
                prompt: "Implement attention".into(),
                starter_code: "def f(): pass".into(),
                language: CodeLanguage::Python,
                expected_output: None,
            }
        );
    }

    #[test]
    fn unknown_exercise_type_is_rejected() {
        let json = r#"{"type": "essay", "prompt": "x"}"#;
        assert!(serde_json::from_str::<ExerciseContent>(json).is_err());
    }
}
