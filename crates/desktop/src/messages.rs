//! User-facing wording for domain errors.

use tally_core::DomainError;

/// Which screen the message is shown on; a few errors read differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Register,
    Grades,
}

/// Sentence to show in the status label for `err`.
pub fn user_message(screen: Screen, err: &DomainError) -> String {
    match err {
        DomainError::InvalidInput { .. } => match screen {
            Screen::Register => "Please only input real, positive integers.".to_string(),
            Screen::Grades => "Please only input real, valid integers.".to_string(),
        },
        DomainError::NegativeQuantity { .. } => "Please only input positive integers.".to_string(),
        DomainError::UnknownItem(name) => format!("{name} is not on the menu."),
        DomainError::UnknownClass(_) => {
            "Class grades were not found. Please make sure that you have selected everything correctly."
                .to_string()
        }
        DomainError::IndexOutOfRange { .. } => {
            "Please select a grade from the list and try again.".to_string()
        }
        DomainError::EmptyClass(_) => "Please input one or more grade.".to_string(),
        DomainError::DivisionByZero => {
            "A grade has a maximum score of 0. Please fix it before calculating.".to_string()
        }
        DomainError::Overflow => "That amount is too large to record.".to_string(),
        DomainError::InvalidCatalog(msg) | DomainError::InvalidConfiguration(msg) => {
            format!("The application is misconfigured: {msg}")
        }
    }
}
