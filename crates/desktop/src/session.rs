//! The per-process session: one sales ledger and one grade book.
//!
//! The GUI (or the console front end) owns a `Session` and calls exactly one
//! method per user action. Nothing here is global.

use serde::Serialize;

use tally_catalog::Catalog;
use tally_core::{AggregateId, AggregateRoot, DomainError, DomainResult, Money, parse_int, screen_edit};
use tally_grades::{Grade, GradeBook, GradeBookId, GradeSummary};
use tally_sales::{LedgerSnapshot, SalesLedger, SalesLedgerId};

use crate::config::SessionConfig;

/// Grades of one class plus its summary, when one can be computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSnapshot {
    pub name: String,
    pub grades: Vec<Grade>,
    pub summary: Option<GradeSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub ledger: LedgerSnapshot,
    pub classes: Vec<ClassSnapshot>,
}

#[derive(Debug, Clone)]
pub struct Session {
    ledger: SalesLedger,
    grades: GradeBook,
    field_max_len: usize,
}

impl Session {
    /// Build a session from configuration; call [`Session::init`] before use.
    pub fn new(config: &SessionConfig) -> DomainResult<Self> {
        let ledger = SalesLedger::new(
            SalesLedgerId::new(AggregateId::new()),
            Catalog::standard(),
            config.tax,
        );
        let grades = GradeBook::new(GradeBookId::new(AggregateId::new()), config.classes.clone())?;

        Ok(Self {
            ledger,
            grades,
            field_max_len: config.field_max_len,
        })
    }

    /// Put both screens into their starting state.
    pub fn init(&mut self) {
        self.ledger.reset();
        self.grades.clear_all();
        tracing::info!(
            ledger_id = %self.ledger.id_typed(),
            grade_book_id = %self.grades.id_typed(),
            tax = %self.ledger.tax_rate(),
            "session initialized"
        );
    }

    pub fn ledger(&self) -> &SalesLedger {
        &self.ledger
    }

    pub fn grade_book(&self) -> &GradeBook {
        &self.grades
    }

    /// Text a numeric field keeps after the user edits it.
    pub fn screen_field<'a>(&self, previous: &'a str, proposed: &'a str) -> &'a str {
        screen_edit(previous, proposed, self.field_max_len)
    }

    // Register screen.

    pub fn record_sale<I, K, V>(&mut self, fields: I) -> DomainResult<Money>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        match self.ledger.record_sale(fields) {
            Ok(price) => {
                tracing::info!(
                    price = %price,
                    total_profit = %self.ledger.total_profit(),
                    version = self.ledger.version(),
                    "sale recorded"
                );
                Ok(price)
            }
            Err(err) => {
                tracing::warn!(code = err.code(), "sale rejected: {err}");
                Err(err)
            }
        }
    }

    pub fn quote<I, K, V>(&self, fields: I) -> DomainResult<Money>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.ledger.quote(fields)
    }

    pub fn reset_sales(&mut self) {
        self.ledger.reset();
        tracing::info!("sales ledger reset");
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    // Grades screen.

    pub fn class_names(&self) -> Vec<String> {
        self.grades.class_names().map(str::to_string).collect()
    }

    pub fn grades_for(&self, class: &str) -> DomainResult<Vec<Grade>> {
        self.grades.grades_for(class).map(<[Grade]>::to_vec)
    }

    /// Append the placeholder grade to `class`; returns its index.
    pub fn new_grade(&mut self, class: &str) -> DomainResult<usize> {
        let index = self.grades.add_sample_grade(class)?;
        tracing::debug!(class, index, "grade added");
        Ok(index)
    }

    pub fn add_grade(&mut self, class: &str, grade: Grade) -> DomainResult<usize> {
        let index = self.grades.add_grade(class, grade)?;
        tracing::debug!(class, index, "grade added");
        Ok(index)
    }

    /// Update from raw field text; both numbers are parsed before anything changes.
    pub fn update_grade(
        &mut self,
        class: &str,
        index: Option<usize>,
        label: &str,
        score_text: &str,
        max_score_text: &str,
    ) -> DomainResult<()> {
        let index = index.ok_or_else(|| self.no_selection(class))?;
        let score = parse_int("score", score_text)?;
        let max_score = parse_int("max score", max_score_text)?;

        self.grades
            .update_grade(class, index, label, score, max_score)
            .inspect(|_| tracing::debug!(class, index, "grade updated"))
            .inspect_err(|err| tracing::warn!(code = err.code(), "grade update rejected: {err}"))
    }

    pub fn delete_grade(&mut self, class: &str, index: Option<usize>) -> DomainResult<Grade> {
        let index = index.ok_or_else(|| self.no_selection(class))?;
        let removed = self.grades.delete_grade(class, index)?;
        tracing::debug!(class, index, "grade deleted");
        Ok(removed)
    }

    pub fn clear_grades(&mut self) {
        self.grades.clear_all();
        tracing::info!("grade book cleared");
    }

    pub fn summary(&self, class: &str) -> DomainResult<GradeSummary> {
        self.grades.summary(class)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            ledger: self.ledger.snapshot(),
            classes: self
                .grades
                .class_names()
                .map(|name| ClassSnapshot {
                    name: name.to_string(),
                    grades: self.grades_for(name).unwrap_or_default(),
                    summary: self.grades.summary(name).ok(),
                })
                .collect(),
        }
    }

    /// Error for an action that needs a selected grade when none is selected.
    fn no_selection(&self, class: &str) -> DomainError {
        match self.grades.grades_for(class) {
            Ok(grades) => DomainError::index_out_of_range(grades.len(), grades.len()),
            Err(err) => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut session = Session::new(&SessionConfig::default()).unwrap();
        session.init();
        session
    }

    #[test]
    fn init_starts_from_zero() {
        let session = session();
        let snapshot = session.snapshot();

        assert!(snapshot.ledger.counts.iter().all(|c| c.count == 0));
        assert_eq!(snapshot.ledger.total_profit, Money::ZERO);
        assert_eq!(snapshot.classes.len(), 5);
        assert!(snapshot.classes.iter().all(|c| c.grades.is_empty() && c.summary.is_none()));
    }

    #[test]
    fn rejects_invalid_class_configuration() {
        let config = SessionConfig {
            classes: vec!["Art".into(), "Art".into()],
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(&config),
            Err(DomainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn update_with_bad_score_text_changes_nothing() {
        let mut session = session();
        session.new_grade("Math").unwrap();

        let err = session
            .update_grade("Math", Some(0), "Quiz", "nine", "10")
            .unwrap_err();

        assert_eq!(err, DomainError::invalid_input("score", "nine"));
        assert_eq!(session.grades_for("Math").unwrap(), vec![Grade::sample()]);
    }

    #[test]
    fn update_and_delete_need_a_selection() {
        let mut session = session();
        session.new_grade("Art").unwrap();

        assert_eq!(
            session.update_grade("Art", None, "x", "1", "2").unwrap_err(),
            DomainError::index_out_of_range(1, 1)
        );
        assert_eq!(
            session.delete_grade("Art", None).unwrap_err(),
            DomainError::index_out_of_range(1, 1)
        );
        assert_eq!(
            session.delete_grade("Gym", None).unwrap_err(),
            DomainError::unknown_class("Gym")
        );
    }

    #[test]
    fn screen_field_uses_configured_length() {
        let config = SessionConfig {
            field_max_len: 2,
            ..SessionConfig::default()
        };
        let session = Session::new(&config).unwrap();

        assert_eq!(session.screen_field("12", "123"), "12");
        assert_eq!(session.screen_field("1", "12"), "12");
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let mut session = session();
        session.add_grade("Math", Grade::new("HW", 9, 10)).unwrap();

        let json = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(json["classes"][3]["name"], "Math");
        assert_eq!(json["classes"][3]["grades"][0]["score"], 9);
        assert_eq!(json["ledger"]["total_profit"], 0);
    }
}
