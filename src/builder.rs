// src/builder.rs

//! Quiz authoring state machine.
//!
//! A `QuizDraft` is the explicit state object behind the multi-step quiz
//! form: metadata first, then up to five questions edited one at a time.
//! Operations that would leave the draft out of bounds are silent no-ops,
//! matching the form's behavior of simply not offering the action.

use crate::error::AppError;
use crate::models::quiz::{
    CreateQuizRequest, MAX_OPTIONS, MAX_QUESTIONS, OptionContent, OptionType, Question, Quiz,
    QuizType, TimerSetting,
};
use crate::store::QuizStore;

/// Path segment of the public share link.
pub const SHARE_BASE_PATH: &str = "ShareLink";

/// Builds the public play URL for a quiz.
pub fn share_link(base_url: &str, quiz_id: i64) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), SHARE_BASE_PATH, quiz_id)
}

/// A single option field assignment, as the form edits one input at a time.
#[derive(Debug, Clone)]
pub enum OptionField {
    Value(String),
    Text(String),
    ImageUrl(String),
}

/// Authoring state for one quiz, from metadata draft to saved record.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    quiz_id: Option<i64>,
    quiz_name: String,
    quiz_type: QuizType,
    user_id: i64,
    questions: Vec<Question>,
    active: usize,
    edit: bool,
}

/// Result of a successful save.
#[derive(Debug)]
pub struct SavedQuiz {
    pub quiz: Quiz,
    pub share_link: String,
}

impl QuizDraft {
    /// Start a new draft from the metadata step. The draft opens on a single
    /// blank placeholder question.
    pub fn start(
        quiz_name: impl Into<String>,
        quiz_type: QuizType,
        user_id: i64,
    ) -> Result<Self, AppError> {
        let quiz_name = quiz_name.into();
        if quiz_name.trim().is_empty() {
            return Err(AppError::Validation("Quiz name is required".to_string()));
        }
        if user_id <= 0 {
            return Err(AppError::Validation("Owner id is required".to_string()));
        }
        Ok(Self {
            quiz_id: None,
            quiz_name,
            quiz_type,
            user_id,
            questions: vec![Question::blank()],
            active: 0,
            edit: false,
        })
    }

    /// Open an existing quiz for editing. Structural operations (adding or
    /// removing questions and options, changing types) are disabled; only
    /// text and option content may change.
    pub fn edit(quiz: Quiz) -> Self {
        Self {
            quiz_id: Some(quiz.id),
            quiz_name: quiz.quiz_name,
            quiz_type: quiz.quiz_type,
            user_id: quiz.user_id,
            questions: quiz.questions,
            active: 0,
            edit: true,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.edit
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_question(&self) -> &Question {
        &self.questions[self.active]
    }

    fn active_question_mut(&mut self) -> &mut Question {
        &mut self.questions[self.active]
    }

    /// Append a blank question and make it active. No-op at the five-question
    /// cap or in edit mode.
    pub fn add_question(&mut self) {
        if self.questions.len() < MAX_QUESTIONS && !self.edit {
            self.questions.push(Question::blank());
            self.active = self.questions.len() - 1;
        }
    }

    /// Remove the question at `index`. No-op when only one question remains,
    /// in edit mode, or for an unknown index. An active index at or after the
    /// removed position slides down one, floored at zero.
    pub fn remove_question(&mut self, index: usize) {
        if self.questions.len() > 1 && !self.edit && index < self.questions.len() {
            self.questions.remove(index);
            if self.active >= index {
                self.active = self.active.saturating_sub(1);
            }
        }
    }

    /// Switch which question the form is editing.
    pub fn select_question(&mut self, index: usize) {
        if index < self.questions.len() {
            self.active = index;
        }
    }

    pub fn set_question_text(&mut self, text: impl Into<String>) {
        self.active_question_mut().question_text = text.into();
    }

    /// Change the active question's option rendering type, re-shaping the
    /// existing option contents to match. Disallowed in edit mode.
    pub fn set_option_type(&mut self, option_type: OptionType) {
        if self.edit {
            return;
        }
        let question = self.active_question_mut();
        question.option_type = option_type;
        for option in std::mem::take(&mut question.options) {
            question.options.push(option.coerce(option_type));
        }
    }

    pub fn set_timer(&mut self, timer: TimerSetting) {
        self.active_question_mut().timer = timer;
    }

    /// Append a blank option to the active question. No-op at the four-option
    /// cap or in edit mode.
    pub fn add_option(&mut self) {
        if self.edit {
            return;
        }
        let question = self.active_question_mut();
        if question.options.len() < MAX_OPTIONS {
            let blank = OptionContent::blank(question.option_type);
            question.options.push(blank);
        }
    }

    /// Remove the option at `index` from the active question. The first
    /// option cannot be removed, and the correct-option marker is re-indexed
    /// so it never dangles.
    pub fn remove_option(&mut self, index: usize) {
        if self.edit || index == 0 {
            return;
        }
        let question = self.active_question_mut();
        if question.options.len() > 1 && index < question.options.len() {
            question.options.remove(index);
            match question.correct_option {
                Some(correct) if correct == index => question.correct_option = None,
                Some(correct) if correct > index => {
                    question.correct_option = Some(correct - 1);
                }
                _ => {}
            }
        }
    }

    /// Assign one field of the option at `index`. Unknown indexes are
    /// ignored.
    pub fn set_option(&mut self, index: usize, field: OptionField) {
        let Some(option) = self.active_question_mut().options.get_mut(index) else {
            return;
        };
        match field {
            OptionField::Value(value) => *option = OptionContent::Single { value },
            OptionField::Text(text) => match option {
                OptionContent::TextAndImage { text: t, .. } => *t = text,
                OptionContent::Single { .. } => {
                    *option = OptionContent::TextAndImage {
                        text,
                        image_url: String::new(),
                    };
                }
            },
            OptionField::ImageUrl(url) => match option {
                OptionContent::TextAndImage { image_url, .. } => *image_url = url,
                OptionContent::Single { .. } => {
                    *option = OptionContent::TextAndImage {
                        text: String::new(),
                        image_url: url,
                    };
                }
            },
        }
    }

    /// Mark the correct option of the active question. Q&A only; polls have
    /// no correctness concept.
    pub fn set_correct_option(&mut self, index: usize) {
        if self.quiz_type != QuizType::Qa {
            return;
        }
        let question = self.active_question_mut();
        if index < question.options.len() {
            question.correct_option = Some(index);
        }
    }

    /// Persist the draft: create on first save, wholesale question update on
    /// subsequent saves. Returns the stored quiz and its share link.
    pub async fn save(
        &mut self,
        store: &dyn QuizStore,
        base_url: &str,
    ) -> Result<SavedQuiz, AppError> {
        let payload = CreateQuizRequest {
            quiz_name: self.quiz_name.clone(),
            quiz_type: self.quiz_type,
            user_id: self.user_id,
            questions: self.questions.clone(),
        };
        validator::Validate::validate(&payload)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let quiz = match self.quiz_id {
            Some(id) => store.update_quiz(id, payload.questions).await?,
            None => {
                let quiz = store.create_quiz(payload).await?;
                self.quiz_id = Some(quiz.id);
                quiz
            }
        };

        Ok(SavedQuiz {
            share_link: share_link(base_url, quiz.id),
            quiz,
        })
    }
}
