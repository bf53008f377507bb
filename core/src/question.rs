use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub type QuestionId = u32;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion", into = "RawQuestion")]
pub struct Question {
    id: QuestionId,
    text: String,
    options: [String; OPTION_COUNT],
    correct_index: usize,
    level: QuestionLevel,
}

impl Question {
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
        level: QuestionLevel,
    ) -> Result<Self> {
        let options: [String; OPTION_COUNT] = options
            .try_into()
            .map_err(|options: Vec<String>| QuestionFault::OptionCount(options.len()))?;
        if correct_index >= OPTION_COUNT {
            return Err(QuestionFault::CorrectIndex(correct_index).into());
        }
        Ok(Self {
            id,
            text: text.into(),
            options,
            correct_index,
            level,
        })
    }

    /// Stand-in used when the bank has nothing to draw: an easy question that is always right.
    pub(crate) fn placeholder() -> Self {
        Self {
            id: 0,
            text: String::new(),
            options: Default::default(),
            correct_index: 0,
            level: QuestionLevel::Easy,
        }
    }

    pub fn id(&self) -> QuestionId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn level(&self) -> QuestionLevel {
        self.level
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }
}

/// Unvalidated wire form of a question.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawQuestion {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_index: usize,
    level: QuestionLevel,
}

impl TryFrom<RawQuestion> for Question {
    type Error = GameError;

    fn try_from(raw: RawQuestion) -> Result<Self> {
        Question::new(raw.id, raw.text, raw.options, raw.correct_index, raw.level)
    }
}

impl From<Question> for RawQuestion {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            text: question.text,
            options: question.options.into(),
            correct_index: question.correct_index,
            level: question.level,
        }
    }
}

/// Anything that can hand out questions during a match.
pub trait QuestionSource {
    fn draw_random_question(&mut self) -> Option<Question>;
}

/// Question catalog with a shuffled, without-replacement draw deck.
///
/// The deck holds ids; once it runs dry it is refilled from the whole catalog and reshuffled.
#[derive(Clone, Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
    deck: Vec<QuestionId>,
    min_questions: usize,
    rng: SmallRng,
}

impl QuestionBank {
    pub fn new(seed: u64) -> Self {
        Self {
            questions: Vec::new(),
            deck: Vec::new(),
            min_questions: 0,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn with_questions(seed: u64, questions: Vec<Question>) -> Result<Self> {
        let mut bank = Self::new(seed);
        for question in questions {
            bank.add_question(question)?;
        }
        Ok(bank)
    }

    /// Refuse deletions that would leave fewer than `min_questions` questions.
    pub fn with_min_questions(mut self, min_questions: usize) -> Self {
        self.min_questions = min_questions;
        self
    }

    pub fn from_json_str(seed: u64, json: &str) -> Result<Self> {
        let questions: Vec<Question> = serde_json::from_str(json).map_err(|err| {
            log::warn!("Rejected question catalog: {err}");
            GameError::MalformedCatalog
        })?;
        Self::with_questions(seed, questions)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.questions).map_err(|_| GameError::MalformedCatalog)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// One past the largest id in the catalog.
    pub fn next_question_id(&self) -> QuestionId {
        self.questions
            .iter()
            .map(|question| question.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    pub fn add_question(&mut self, question: Question) -> Result<()> {
        if self.question(question.id).is_some() {
            return Err(GameError::DuplicateQuestionId(question.id));
        }
        self.questions.push(question);
        Ok(())
    }

    pub fn delete_question(&mut self, id: QuestionId) -> bool {
        if self.questions.len() <= self.min_questions {
            log::debug!(
                "Refusing to delete question {id}, catalog at minimum of {}",
                self.min_questions
            );
            return false;
        }
        let Some(index) = self.questions.iter().position(|question| question.id == id) else {
            return false;
        };
        self.questions.remove(index);
        self.deck.retain(|&deck_id| deck_id != id);
        true
    }

    /// Replaces the question stored under `old_id`. The updated question may carry a new id as
    /// long as it does not collide with another entry.
    pub fn replace_question(&mut self, old_id: QuestionId, updated: Question) -> bool {
        if updated.id != old_id && self.question(updated.id).is_some() {
            return false;
        }
        let Some(slot) = self.questions.iter_mut().find(|question| question.id == old_id) else {
            return false;
        };
        let new_id = updated.id;
        *slot = updated;
        for deck_id in &mut self.deck {
            if *deck_id == old_id {
                *deck_id = new_id;
            }
        }
        true
    }

    fn reshuffle(&mut self) {
        self.deck = self.questions.iter().map(|question| question.id).collect();
        self.deck.shuffle(&mut self.rng);
        log::debug!("Reshuffled question deck of {}", self.deck.len());
    }
}

impl QuestionSource for QuestionBank {
    fn draw_random_question(&mut self) -> Option<Question> {
        if self.questions.is_empty() {
            return None;
        }
        if self.deck.is_empty() {
            self.reshuffle();
        }
        let id = self.deck.pop()?;
        self.question(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn options() -> Vec<String> {
        ["a", "b", "c", "d"].map(String::from).to_vec()
    }

    fn question(id: QuestionId) -> Question {
        Question::new(id, format!("q{id}"), options(), 1, QuestionLevel::Medium).unwrap()
    }

    #[test]
    fn rejects_wrong_option_count() {
        let result = Question::new(1, "q", options()[..3].to_vec(), 0, QuestionLevel::Easy);
        assert_eq!(
            result,
            Err(GameError::InvalidQuestion(QuestionFault::OptionCount(3)))
        );
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let result = Question::new(1, "q", options(), 4, QuestionLevel::Easy);
        assert_eq!(
            result,
            Err(GameError::InvalidQuestion(QuestionFault::CorrectIndex(4)))
        );
    }

    #[test]
    fn draws_without_replacement() {
        let mut bank = QuestionBank::with_questions(11, vec![question(1), question(2), question(3)])
            .unwrap();

        let drawn: BTreeSet<_> = (0..3)
            .map(|_| bank.draw_random_question().unwrap().id())
            .collect();

        assert_eq!(drawn, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn deck_reshuffles_when_exhausted() {
        let mut bank = QuestionBank::with_questions(5, vec![question(1), question(2)]).unwrap();

        for _ in 0..7 {
            assert!(bank.draw_random_question().is_some());
        }
    }

    #[test]
    fn empty_bank_draws_nothing() {
        let mut bank = QuestionBank::new(0);
        assert_eq!(bank.draw_random_question(), None);
        assert_eq!(bank.next_question_id(), 1);
    }

    #[test]
    fn next_id_is_max_plus_one() {
        let bank = QuestionBank::with_questions(0, vec![question(4), question(9), question(2)])
            .unwrap();
        assert_eq!(bank.next_question_id(), 10);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut bank = QuestionBank::with_questions(0, vec![question(1)]).unwrap();
        assert_eq!(
            bank.add_question(question(1)),
            Err(GameError::DuplicateQuestionId(1))
        );
    }

    #[test]
    fn delete_respects_floor() {
        let mut bank = QuestionBank::with_questions(0, vec![question(1), question(2)])
            .unwrap()
            .with_min_questions(1);

        assert!(bank.delete_question(1));
        assert!(!bank.delete_question(2));
        assert!(!bank.delete_question(42));
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn deleted_question_is_never_drawn() {
        let mut bank = QuestionBank::with_questions(3, vec![question(1), question(2)]).unwrap();
        bank.draw_random_question();
        bank.delete_question(1);
        bank.delete_question(2);
        bank.add_question(question(3)).unwrap();

        assert_eq!(bank.draw_random_question().map(|q| q.id()), Some(3));
    }

    #[test]
    fn replace_updates_in_place() {
        let mut bank = QuestionBank::with_questions(0, vec![question(1), question(2)]).unwrap();

        assert!(bank.replace_question(1, question(5)));
        assert!(!bank.replace_question(2, question(5)));
        assert!(!bank.replace_question(9, question(9)));
        assert!(bank.question(1).is_none());
        assert!(bank.question(5).is_some());
    }

    #[test]
    fn json_catalog_is_validated() {
        let bank = QuestionBank::with_questions(0, vec![question(1)]).unwrap();
        let json = bank.to_json_string().unwrap();
        let restored = QuestionBank::from_json_str(0, &json).unwrap();
        assert_eq!(restored.questions(), bank.questions());

        let bad = r#"[{"id":1,"text":"q","options":["a"],"correct_index":0,"level":"Easy"}]"#;
        assert_eq!(
            QuestionBank::from_json_str(0, bad).err(),
            Some(GameError::MalformedCatalog)
        );
    }
}
