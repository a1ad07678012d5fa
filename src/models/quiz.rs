// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

/// A quiz can carry at most this many questions.
pub const MAX_QUESTIONS: usize = 5;
/// Each question can carry at most this many options.
pub const MAX_OPTIONS: usize = 4;

/// Quiz flavor: scored question/answer or vote-tallying poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizType {
    #[serde(rename = "Q&A")]
    Qa,
    Poll,
}

impl QuizType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizType::Qa => "Q&A",
            QuizType::Poll => "Poll",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Q&A" => Some(QuizType::Qa),
            "Poll" => Some(QuizType::Poll),
            _ => None,
        }
    }
}

/// How a question's options are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Text,
    Image,
    #[serde(rename = "text-image")]
    TextAndImage,
}

/// Per-question countdown setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerSetting {
    #[default]
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "5sec")]
    FiveSec,
    #[serde(rename = "10sec")]
    TenSec,
}

impl TimerSetting {
    /// Countdown duration, or `None` when the timer is off.
    pub fn seconds(&self) -> Option<u32> {
        match self {
            TimerSetting::Off => None,
            TimerSetting::FiveSec => Some(5),
            TimerSetting::TenSec => Some(10),
        }
    }
}

/// Content of a single answer option.
///
/// Text and Image questions carry one `value` field (text or image URL);
/// text-image questions carry both. The wire objects are shape-discriminated,
/// with the discriminant living on the question's `optionType`, hence the
/// untagged representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionContent {
    TextAndImage {
        text: String,
        #[serde(rename = "imageUrl")]
        image_url: String,
    },
    Single {
        value: String,
    },
}

impl OptionContent {
    /// An empty option of the shape the given option type expects.
    pub fn blank(option_type: OptionType) -> Self {
        match option_type {
            OptionType::Text | OptionType::Image => OptionContent::Single {
                value: String::new(),
            },
            OptionType::TextAndImage => OptionContent::TextAndImage {
                text: String::new(),
                image_url: String::new(),
            },
        }
    }

    /// Re-shape the content to match the given option type, keeping the text
    /// part where one exists.
    pub fn coerce(self, option_type: OptionType) -> Self {
        match (option_type, self) {
            (OptionType::TextAndImage, OptionContent::Single { value }) => {
                OptionContent::TextAndImage {
                    text: value,
                    image_url: String::new(),
                }
            }
            (OptionType::TextAndImage, keep @ OptionContent::TextAndImage { .. }) => keep,
            (_, OptionContent::TextAndImage { text, .. }) => OptionContent::Single { value: text },
            (_, keep @ OptionContent::Single { .. }) => keep,
        }
    }
}

/// One question of a quiz, counters included.
///
/// `attempted_count`/`correct_count`/`incorrect_count` carry Q&A statistics,
/// `option_counts` carries Poll votes (one slot per option).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,
    pub option_type: OptionType,
    pub options: Vec<OptionContent>,
    #[serde(default)]
    pub correct_option: Option<usize>,
    #[serde(default)]
    pub timer: TimerSetting,
    #[serde(default)]
    pub attempted_count: i64,
    #[serde(default)]
    pub correct_count: i64,
    #[serde(default)]
    pub incorrect_count: i64,
    #[serde(default)]
    pub option_counts: Vec<i64>,
}

impl Question {
    /// A fresh drafting placeholder: empty text, one empty text option, no
    /// correct option, timer off.
    pub fn blank() -> Self {
        Self {
            question_text: String::new(),
            option_type: OptionType::Text,
            options: vec![OptionContent::blank(OptionType::Text)],
            correct_option: None,
            timer: TimerSetting::default(),
            attempted_count: 0,
            correct_count: 0,
            incorrect_count: 0,
            option_counts: Vec::new(),
        }
    }

    /// Coerce option contents to the question's option type and size the vote
    /// counter list to the option list.
    pub fn normalize(&mut self) {
        for option in std::mem::take(&mut self.options) {
            self.options.push(option.coerce(self.option_type));
        }
        self.option_counts.resize(self.options.len(), 0);
    }
}

/// A persisted quiz record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: i64,
    pub quiz_name: String,
    pub quiz_type: QuizType,
    pub user_id: i64,
    pub questions: Vec<Question>,
    pub created_on: DateTime<Utc>,
    pub views: i64,
}

/// DTO for creating a new quiz.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 100, message = "Quiz name is required."))]
    pub quiz_name: String,
    pub quiz_type: QuizType,
    #[validate(range(min = 1, message = "Owner id is required."))]
    pub user_id: i64,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,
}

impl CreateQuizRequest {
    /// Bring a client payload into storable shape: coerce option contents,
    /// zero all counters and drop `correct_option` for polls.
    pub fn normalize(&mut self) {
        for question in &mut self.questions {
            question.normalize();
            question.attempted_count = 0;
            question.correct_count = 0;
            question.incorrect_count = 0;
            question.option_counts = vec![0; question.options.len()];
            if self.quiz_type == QuizType::Poll {
                question.correct_option = None;
            }
        }
    }
}

/// DTO for the wholesale question overwrite on edit.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,
}

/// DTO for the metadata step that precedes the question form.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrepareQuizRequest {
    #[validate(length(min = 1, max = 100, message = "Quiz name is required."))]
    pub quiz_name: String,
    pub quiz_type: QuizType,
    #[validate(range(min = 1, message = "Owner id is required."))]
    pub user_id: i64,
}

/// DTO for a per-selection statistics update during play.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswerRequest {
    pub selected_option: usize,
}

/// One entry of a completed play session, by question index. `answer` is
/// absent when the question was skipped (e.g. the timer ran out).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question: usize,
    pub answer: Option<usize>,
}

/// DTO for the final answer-list submission.
#[derive(Debug, Deserialize, Serialize)]
pub struct SubmitAnswersRequest {
    pub answers: Vec<SubmittedAnswer>,
}

/// Analysis payload for the owner's per-question statistics view.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnalysis {
    pub quiz_name: String,
    pub quiz_type: QuizType,
    pub created_on: DateTime<Utc>,
    pub views: i64,
    pub questions: Vec<Question>,
}

/// Validates the structural invariants of a question list: 1-5 questions,
/// 1-4 options each, `correctOption` in range, image URLs well-formed.
fn validate_questions(questions: &[Question]) -> Result<(), validator::ValidationError> {
    if questions.is_empty() || questions.len() > MAX_QUESTIONS {
        return Err(validator::ValidationError::new("question_count_out_of_range"));
    }
    for question in questions {
        if question.options.is_empty() || question.options.len() > MAX_OPTIONS {
            return Err(validator::ValidationError::new("option_count_out_of_range"));
        }
        if let Some(correct) = question.correct_option {
            if correct >= question.options.len() {
                return Err(validator::ValidationError::new("correct_option_out_of_range"));
            }
        }
        for option in &question.options {
            validate_option_urls(question.option_type, option)?;
        }
    }
    Ok(())
}

/// Non-empty image URLs must parse as URLs.
fn validate_option_urls(
    option_type: OptionType,
    option: &OptionContent,
) -> Result<(), validator::ValidationError> {
    let image_url = match (option_type, option) {
        (OptionType::Image, OptionContent::Single { value }) => value,
        (OptionType::TextAndImage, OptionContent::TextAndImage { image_url, .. }) => image_url,
        _ => return Ok(()),
    };
    if !image_url.is_empty() && Url::parse(image_url).is_err() {
        return Err(validator::ValidationError::new("invalid_image_url"));
    }
    Ok(())
}
