//! Interactive user input built on `dialoguer`.
//!
//! [`UserPrompt`] remembers the last question it asked and the answer it got,
//! so callers can read the value back after the prompt returns.
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input, Select};

use crate::kernel::error::{Error, Result};

/// Lists longer than this switch from a plain select to a fuzzy search.
const FUZZY_THRESHOLD: usize = 10;

#[derive(Debug, Default, Clone)]
pub struct UserPrompt {
    question: Option<String>,
    value: Option<String>,
}

impl UserPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks for free text and returns the answer.
    pub fn input(&mut self, question: &str) -> Result<String> {
        self.question = Some(question.to_string());
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?;
        self.value = Some(answer.clone());
        Ok(answer)
    }

    /// Lets the user pick one of `options` and returns the chosen entry.
    pub fn multi_choice<S: AsRef<str>>(&mut self, question: &str, options: &[S]) -> Result<String> {
        if options.is_empty() {
            return Err(Error::validation(
                "options",
                "[]",
                "At least one option is required",
            ));
        }
        self.question = Some(question.to_string());
        let items: Vec<&str> = options.iter().map(AsRef::as_ref).collect();
        let theme = ColorfulTheme::default();
        let index = if items.len() > FUZZY_THRESHOLD {
            FuzzySelect::with_theme(&theme)
                .with_prompt(question)
                .items(&items)
                .default(0)
                .interact()?
        } else {
            Select::with_theme(&theme)
                .with_prompt(question)
                .items(&items)
                .default(0)
                .interact()?
        };
        let answer = items[index].to_string();
        self.value = Some(answer.clone());
        Ok(answer)
    }

    /// Yes/no question, defaulting to "no".
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        self.question = Some(question.to_string());
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(false)
            .interact()?;
        self.value = Some(answer.to_string());
        Ok(answer)
    }

    /// The last question asked
    pub fn question(&self) -> Option<&str> {
        self.question.as_deref()
    }

    /// The last answer received
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Prints the last answer, dimmed, the way the menu echoes selections.
    pub fn echo(&self) {
        if let Some(value) = &self.value {
            println!("  {} {}", style("→").dim(), style(value).cyan());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prompt_is_empty() {
        let prompt = UserPrompt::new();
        assert!(prompt.question().is_none());
        assert!(prompt.value().is_none());
    }

    #[test]
    fn test_multi_choice_rejects_empty_options() {
        let mut prompt = UserPrompt::new();
        let options: [&str; 0] = [];
        let err = prompt.multi_choice("Pick one", &options).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(prompt.question().is_none());
    }
}
