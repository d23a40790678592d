//! The question/answer reference table that structured submissions are
//! resolved against: question id maps to a category, answer id to a
//! bucket value. The web layer only ever sends ids.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mappings::Category;
use crate::query::{AnswerChoice, DONT_CARE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub category: Category,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: i64,
    pub question_id: i64,
    pub value: String,
}

/// One raw answer as submitted by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserAnswer {
    pub question_id: i64,
    pub answer_id: i64,
}

/// Static lookup table for questions and their answer options.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    answers: Vec<AnswerOption>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>, answers: Vec<AnswerOption>) -> Self {
        Self { questions, answers }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers_for(&self, question_id: i64) -> impl Iterator<Item = &AnswerOption> {
        self.answers.iter().filter(move |a| a.question_id == question_id)
    }

    fn question(&self, id: i64) -> Result<&Question> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| Error::NotFound(format!("question id {id}")))
    }

    fn answer(&self, id: i64) -> Result<&AnswerOption> {
        self.answers
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("answer id {id}")))
    }

    /// Resolve raw id pairs into answered categories. "Don't care"
    /// answers are dropped here; an unknown id is an error, since it
    /// means the submission refers to a questionnaire we do not have.
    pub fn resolve(&self, user_answers: &[UserAnswer]) -> Result<Vec<AnswerChoice>> {
        let mut choices = Vec::new();
        for ua in user_answers {
            let question = self.question(ua.question_id)?;
            let answer = self.answer(ua.answer_id)?;
            if answer.question_id != question.id {
                return Err(Error::Operation(format!(
                    "answer {} does not belong to question {}",
                    answer.id, question.id
                )));
            }
            if answer.value != DONT_CARE {
                choices
                    .push(AnswerChoice { category: question.category, value: answer.value.clone() });
            }
        }
        Ok(choices)
    }
}

impl Default for QuestionBank {
    /// The built-in five-question bank covering the describable plant
    /// attributes. Answer values are bucket-level, matching the corpus
    /// namespaces.
    fn default() -> Self {
        let mut questions = Vec::new();
        let mut answers = Vec::new();
        let mut answer_id = 0;
        let specs: [(Category, &str, &[&str]); 5] = [
            (Category::Growth, "How fast should your plant grow?", &["slow", "moderate", "fast"]),
            (
                Category::Soil,
                "What kind of soil can you offer?",
                &["drained", "sandy", "moist", "loamy", "acidic"],
            ),
            (
                Category::Watering,
                "How much watering can you commit to?",
                &["low", "moderate", "high"],
            ),
            (
                Category::Sunlight,
                "How much sunlight does your spot get?",
                &["full", "indirect", "partial"],
            ),
            (Category::Fertilization, "Are you willing to fertilize?", &["yes", "no"]),
        ];

        for (idx, (category, text, values)) in specs.into_iter().enumerate() {
            let question_id = idx as i64 + 1;
            questions.push(Question { id: question_id, category, text: text.to_string() });
            for value in values.iter().chain(std::iter::once(&DONT_CARE)) {
                answer_id += 1;
                answers.push(AnswerOption {
                    id: answer_id,
                    question_id,
                    value: (*value).to_string(),
                });
            }
        }

        Self::new(questions, answers)
    }
}
