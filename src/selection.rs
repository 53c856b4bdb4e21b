//! Interactive prompt abstraction.
//!
//! The pull and remove flows need a multi-select and yes/no confirmations.
//! Wrapping them in a trait keeps the handlers testable without a terminal.

use anyhow::Result;
use inquire::{Confirm, MultiSelect};
use std::cell::RefCell;

/// Trait for providing interactive prompt functionality.
pub trait SelectionProvider {
    /// Present a multi-select menu and return the chosen options.
    ///
    /// # Errors
    /// Returns an error if the prompt fails or the user cancels.
    fn multi_select(&self, prompt: &str, options: Vec<String>) -> Result<Vec<String>>;

    /// Ask a yes/no question.
    ///
    /// # Errors
    /// Returns an error if the prompt fails or the user cancels.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Real implementation using inquire for production use.
pub struct RealSelectionProvider;

impl SelectionProvider for RealSelectionProvider {
    fn multi_select(&self, prompt: &str, options: Vec<String>) -> Result<Vec<String>> {
        let selection = MultiSelect::new(prompt, options)
            .with_page_size(10)
            .with_vim_mode(true)
            .prompt()?;
        Ok(selection)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::new(prompt).with_default(default).prompt()?;
        Ok(answer)
    }
}

/// Mock implementation for testing with scripted answers.
pub struct MockSelectionProvider {
    selections: Vec<String>,
    confirms: RefCell<Vec<bool>>,
}

impl MockSelectionProvider {
    /// Scripts the multi-select answer and a queue of confirm answers
    /// (consumed front to back).
    pub fn new(selections: &[&str], confirms: &[bool]) -> Self {
        Self {
            selections: selections.iter().map(ToString::to_string).collect(),
            confirms: RefCell::new(confirms.to_vec()),
        }
    }
}

impl SelectionProvider for MockSelectionProvider {
    fn multi_select(&self, _prompt: &str, options: Vec<String>) -> Result<Vec<String>> {
        for choice in &self.selections {
            if !options.contains(choice) {
                anyhow::bail!("Mock selection '{}' not found in options", choice);
            }
        }
        Ok(self.selections.clone())
    }

    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        let mut queue = self.confirms.borrow_mut();
        if queue.is_empty() {
            anyhow::bail!("Mock confirm queue exhausted");
        }
        Ok(queue.remove(0))
    }
}
