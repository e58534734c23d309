//! Play screen state machine.
//!
//! CategorySelection → IndexSelection → QuestionAnswer, with back navigation
//! one step at a time. A correct answer arms the roulette trigger.

use crate::domain::error::PlayError;
use crate::domain::models::{Category, Question, CHOICE_COUNT, QUESTIONS_PER_CATEGORY};
use crate::domain::question_store;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStep {
    CategorySelection,
    IndexSelection { category: Category },
    QuestionAnswer { category: Category, index: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
}

pub struct PlayFlow {
    bank: Vec<Question>,
    step: PlayStep,
    armed: bool,
}

impl PlayFlow {
    pub fn new(bank: Vec<Question>) -> Self {
        Self {
            bank,
            step: PlayStep::CategorySelection,
            armed: false,
        }
    }

    pub fn step(&self) -> PlayStep {
        self.step
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Swap in a freshly loaded bank and start over
    pub fn reload(&mut self, bank: Vec<Question>) {
        self.bank = bank;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.step = PlayStep::CategorySelection;
        self.armed = false;
    }

    pub fn select_category(&mut self, category: Category) -> Result<(), PlayError> {
        if self.step != PlayStep::CategorySelection {
            return Err(PlayError::WrongStep);
        }
        self.step = PlayStep::IndexSelection { category };
        Ok(())
    }

    pub fn select_index(&mut self, index: u8) -> Result<(), PlayError> {
        let PlayStep::IndexSelection { category } = self.step else {
            return Err(PlayError::WrongStep);
        };
        if !(1..=QUESTIONS_PER_CATEGORY).contains(&index) {
            return Err(PlayError::IndexOutOfRange(index));
        }
        if question_store::find(&self.bank, category, index).is_none() {
            return Err(PlayError::MissingQuestion(Question::make_id(category, index)));
        }

        self.step = PlayStep::QuestionAnswer { category, index };
        self.armed = false;
        Ok(())
    }

    /// The question on screen, if any
    pub fn current_question(&self) -> Option<&Question> {
        match self.step {
            PlayStep::QuestionAnswer { category, index } => {
                question_store::find(&self.bank, category, index)
            }
            _ => None,
        }
    }

    pub fn answer(&mut self, choice: usize) -> Result<AnswerOutcome, PlayError> {
        let PlayStep::QuestionAnswer { category, .. } = self.step else {
            return Err(PlayError::WrongStep);
        };
        let question = self.current_question().ok_or(PlayError::WrongStep)?;
        if !question.enabled {
            return Err(PlayError::QuestionDisabled);
        }
        if choice >= CHOICE_COUNT {
            return Err(PlayError::ChoiceOutOfRange(choice));
        }

        if question.is_correct(choice) {
            debug!("Correct answer for {}", question.id);
            self.armed = true;
            Ok(AnswerOutcome::Correct)
        } else {
            debug!("Wrong answer for {}", question.id);
            self.armed = false;
            self.step = PlayStep::IndexSelection { category };
            Ok(AnswerOutcome::Incorrect)
        }
    }

    pub fn back(&mut self) {
        self.armed = false;
        self.step = match self.step {
            PlayStep::QuestionAnswer { category, .. } => PlayStep::IndexSelection { category },
            PlayStep::IndexSelection { .. } | PlayStep::CategorySelection => {
                PlayStep::CategorySelection
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::question_store::default_bank;

    fn flow_at(category: Category, index: u8) -> PlayFlow {
        let mut flow = PlayFlow::new(default_bank());
        flow.select_category(category).unwrap();
        flow.select_index(index).unwrap();
        flow
    }

    #[test]
    fn test_correct_answer_arms_trigger() {
        let mut flow = flow_at(Category::Canva, 3);
        let q = flow.current_question().unwrap();
        assert_eq!(q.id, "캔바-3");
        assert_eq!(q.answer, 0);

        assert_eq!(flow.answer(0), Ok(AnswerOutcome::Correct));
        assert!(flow.is_armed());
        assert_eq!(
            flow.step(),
            PlayStep::QuestionAnswer {
                category: Category::Canva,
                index: 3
            }
        );
    }

    #[test]
    fn test_wrong_answer_disarms_and_returns_to_index() {
        let mut flow = flow_at(Category::Canva, 3);
        assert_eq!(flow.answer(1), Ok(AnswerOutcome::Incorrect));
        assert!(!flow.is_armed());
        assert_eq!(
            flow.step(),
            PlayStep::IndexSelection {
                category: Category::Canva
            }
        );
        assert_eq!(flow.answer(0), Err(PlayError::WrongStep));
    }

    #[test]
    fn test_disabled_question_blocks_answers() {
        let mut bank = default_bank();
        bank.iter_mut()
            .find(|q| q.id == "학자시-2")
            .unwrap()
            .enabled = false;
        let mut flow = PlayFlow::new(bank);
        flow.select_category(Category::Hakjasi).unwrap();
        flow.select_index(2).unwrap();

        assert_eq!(flow.answer(0), Err(PlayError::QuestionDisabled));
        assert!(!flow.is_armed());
    }

    #[test]
    fn test_out_of_range_inputs() {
        let mut flow = PlayFlow::new(default_bank());
        assert_eq!(flow.select_index(1), Err(PlayError::WrongStep));
        flow.select_category(Category::Totissaem).unwrap();
        assert_eq!(flow.select_index(0), Err(PlayError::IndexOutOfRange(0)));
        assert_eq!(flow.select_index(6), Err(PlayError::IndexOutOfRange(6)));
        flow.select_index(5).unwrap();
        assert_eq!(flow.answer(4), Err(PlayError::ChoiceOutOfRange(4)));
    }

    #[test]
    fn test_back_navigation() {
        let mut flow = flow_at(Category::Totissaem, 1);
        flow.answer(0).unwrap();
        flow.back();
        assert!(!flow.is_armed());
        assert_eq!(
            flow.step(),
            PlayStep::IndexSelection {
                category: Category::Totissaem
            }
        );
        flow.back();
        assert_eq!(flow.step(), PlayStep::CategorySelection);
        flow.back();
        assert_eq!(flow.step(), PlayStep::CategorySelection);
    }

    #[test]
    fn test_reload_starts_over() {
        let mut flow = flow_at(Category::Canva, 1);
        flow.answer(0).unwrap();
        flow.reload(default_bank());
        assert_eq!(flow.step(), PlayStep::CategorySelection);
        assert!(!flow.is_armed());
    }
}
