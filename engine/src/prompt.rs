//! Operator-facing collaborator.
//!
//! Implementations own re-prompting: a value handed back from
//! [`Prompt::ask_number`] is always inside the requested bounds. The only way
//! out of a question without an answer is [`ExitToMenu`], which the turn
//! procedures propagate untouched back to whoever drives the menu.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operator returned to the menu")]
pub struct ExitToMenu;

pub type Reply<T> = Result<T, ExitToMenu>;

pub trait Prompt {
    fn ask_yes_no(&mut self, question: &str, default_yes: bool) -> Reply<bool>;

    /// Inclusive bounds.
    fn ask_number(&mut self, question: &str, min: i32, max: i32) -> Reply<i32>;

    /// Trimmed, upper-cased free text; may be empty.
    fn ask_text(&mut self, question: &str) -> Reply<String>;

    fn announce(&mut self, message: &str);
}
