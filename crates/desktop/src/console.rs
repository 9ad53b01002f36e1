//! Line-oriented front end: one command per line, rendered views back.
//!
//! This stands in for the GUI so both screens can be driven from a terminal
//! (and from tests) through the same session API.

use tally_core::DomainError;

use crate::messages::{Screen, user_message};
use crate::session::Session;
use crate::views;

const HELP: &[&str] = &[
    "sale <n>...                              record a sale, one count per menu item",
    "quote <n>...                             price a sale without recording it",
    "reset                                    zero the running totals",
    "totals                                   show the running totals",
    "classes                                  list classes",
    "grades <class>                           list grades of a class",
    "add <class>                              add a sample grade",
    "update <class> <index> <score> <max> <label...>",
    "delete <class> <index>                   delete a grade",
    "summary <class>                          average, high and low",
    "clear                                    remove every grade",
    "json                                     dump the session as JSON",
    "quit                                     leave",
];

/// Result of one console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Reply::Lines(vec![text.into()])
    }
}

pub struct Console {
    session: Session,
}

impl Console {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Reply::Lines(Vec::new());
        };
        let args: Vec<&str> = words.collect();

        tracing::debug!(command, args = args.len(), "console command");

        match command {
            "help" => Reply::Lines(HELP.iter().map(|l| l.to_string()).collect()),
            "quit" | "exit" => Reply::Quit,
            "sale" => self.sale(&args),
            "quote" => self.quote(&args),
            "reset" => {
                self.session.reset_sales();
                let mut lines = vec![views::price_label(tally_core::Money::ZERO)];
                lines.extend(views::ledger_lines(&self.session.ledger_snapshot()));
                Reply::Lines(lines)
            }
            "totals" => Reply::Lines(views::ledger_lines(&self.session.ledger_snapshot())),
            "classes" => Reply::Lines(self.session.class_names()),
            "grades" => self.with_class(&args, "grades <class>", |console, class| {
                console.grade_list(class)
            }),
            "add" => self.with_class(&args, "add <class>", |console, class| {
                console.session.new_grade(class)?;
                console.grade_list(class)
            }),
            "update" => self.update(&args),
            "delete" => self.with_class(&args, "delete <class> <index>", |console, class| {
                let index = args.get(1).and_then(|raw| raw.parse::<usize>().ok());
                console.session.delete_grade(class, index)?;
                console.grade_list(class)
            }),
            "summary" => self.with_class(&args, "summary <class>", |console, class| {
                let summary = console.session.summary(class)?;
                Ok(views::class_info(class, &summary)
                    .lines()
                    .map(str::to_string)
                    .collect())
            }),
            "clear" => {
                self.session.clear_grades();
                Reply::line("All grades cleared.")
            }
            "json" => match serde_json::to_string_pretty(&self.session.snapshot()) {
                Ok(json) => Reply::Lines(json.lines().map(str::to_string).collect()),
                Err(err) => {
                    tracing::error!("failed to serialize session: {err}");
                    Reply::line("Could not produce the session snapshot.")
                }
            },
            other => Reply::line(format!("Unknown command `{other}`. Type `help` for a list.")),
        }
    }

    fn item_fields(&self, args: &[&str]) -> Result<Vec<(String, String)>, Reply> {
        let names: Vec<String> = self
            .session
            .ledger()
            .catalog()
            .item_names()
            .map(str::to_string)
            .collect();
        if args.len() > names.len() {
            return Err(Reply::line(format!(
                "Expected at most {} counts ({}).",
                names.len(),
                names.join(", ")
            )));
        }
        Ok(names
            .into_iter()
            .zip(args.iter().map(|a| a.to_string()).chain(std::iter::repeat(String::new())))
            .collect())
    }

    fn sale(&mut self, args: &[&str]) -> Reply {
        let fields = match self.item_fields(args) {
            Ok(fields) => fields,
            Err(reply) => return reply,
        };
        match self.session.record_sale(fields) {
            Ok(price) => {
                let mut lines = vec![views::price_label(price)];
                lines.extend(views::ledger_lines(&self.session.ledger_snapshot()));
                Reply::Lines(lines)
            }
            Err(err) => Reply::line(user_message(Screen::Register, &err)),
        }
    }

    fn quote(&self, args: &[&str]) -> Reply {
        let fields = match self.item_fields(args) {
            Ok(fields) => fields,
            Err(reply) => return reply,
        };
        match self.session.quote(fields) {
            Ok(price) => Reply::line(views::price_label(price)),
            Err(err) => Reply::line(user_message(Screen::Register, &err)),
        }
    }

    fn update(&mut self, args: &[&str]) -> Reply {
        let [class, index, score, max_score, label @ ..] = args else {
            return Reply::line("Usage: update <class> <index> <score> <max> <label...>");
        };
        let index = index.parse::<usize>().ok();
        let label = label.join(" ");

        match self
            .session
            .update_grade(class, index, &label, score, max_score)
            .and_then(|()| self.grade_list(class))
        {
            Ok(lines) => Reply::Lines(lines),
            Err(err) => Reply::line(user_message(Screen::Grades, &err)),
        }
    }

    fn grade_list(&self, class: &str) -> Result<Vec<String>, DomainError> {
        let grades = self.session.grades_for(class)?;
        Ok(views::grade_lines(&grades)
            .into_iter()
            .enumerate()
            .map(|(i, line)| format!("[{i}] {line}"))
            .collect())
    }

    fn with_class<F>(&mut self, args: &[&str], usage: &str, f: F) -> Reply
    where
        F: FnOnce(&mut Self, &str) -> Result<Vec<String>, DomainError>,
    {
        let Some(class) = args.first() else {
            return Reply::line(format!("Usage: {usage}"));
        };
        match f(self, *class) {
            Ok(lines) => Reply::Lines(lines),
            Err(err) => Reply::line(user_message(Screen::Grades, &err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;

    fn console() -> Console {
        let mut session = Session::new(&SessionConfig::default()).unwrap();
        session.init();
        Console::new(session)
    }

    fn lines(reply: Reply) -> Vec<String> {
        match reply {
            Reply::Lines(lines) => lines,
            Reply::Quit => panic!("Expected lines, got Quit"),
        }
    }

    #[test]
    fn sale_prints_price_and_totals() {
        let mut console = console();

        let out = lines(console.handle_line("sale 2 0 0 0 0 0"));

        assert_eq!(out[0], "Price: $5.00");
        assert_eq!(out[1], "Hot Dog: 2");
        assert_eq!(out.last().unwrap(), "Total Profit: $5.00");
    }

    #[test]
    fn short_sale_reports_invalid_input() {
        let mut console = console();

        let out = lines(console.handle_line("sale 1 2"));

        assert_eq!(out, vec!["Please only input real, positive integers."]);
        assert_eq!(console.session().ledger_snapshot().count_of("Hot Dog"), Some(0));
    }

    #[test]
    fn negative_sale_reports_negative_number() {
        let mut console = console();
        let out = lines(console.handle_line("sale 1 -2 0 0 0 0"));
        assert_eq!(out, vec!["Please only input positive integers."]);
    }

    #[test]
    fn too_many_counts_is_a_usage_error() {
        let mut console = console();
        let out = lines(console.handle_line("sale 1 1 1 1 1 1 1"));
        assert!(out[0].starts_with("Expected at most 6 counts"));
    }

    #[test]
    fn grade_workflow() {
        let mut console = console();

        assert_eq!(lines(console.handle_line("add Math")), vec!["[0] Sample - 0 / 0"]);
        assert_eq!(
            lines(console.handle_line("update Math 0 8 10 Homework 1")),
            vec!["[0] Homework 1 - 8 / 10"]
        );
        console.handle_line("add Math");
        console.handle_line("update Math 1 10 10 Homework 2");

        assert_eq!(
            lines(console.handle_line("summary Math")),
            vec!["Class: Math", "Average: 90%", "High: 100%", "Low: 80%"]
        );

        assert_eq!(
            lines(console.handle_line("delete Math 0")),
            vec!["[0] Homework 2 - 10 / 10"]
        );
    }

    #[test]
    fn grade_errors_are_worded_for_the_grades_screen() {
        let mut console = console();

        assert_eq!(
            lines(console.handle_line("summary Art")),
            vec!["Please input one or more grade."]
        );
        assert_eq!(
            lines(console.handle_line("grades Gym"))[0],
            "Class grades were not found. Please make sure that you have selected everything correctly."
        );
        console.handle_line("add Art");
        assert_eq!(
            lines(console.handle_line("update Art 0 x 10 Sketch")),
            vec!["Please only input real, valid integers."]
        );
        assert_eq!(
            lines(console.handle_line("delete Art")),
            vec!["Please select a grade from the list and try again."]
        );
    }

    #[test]
    fn misc_commands() {
        let mut console = console();

        assert_eq!(console.handle_line("quit"), Reply::Quit);
        assert_eq!(lines(console.handle_line("   ")), Vec::<String>::new());
        assert!(lines(console.handle_line("frobnicate"))[0].starts_with("Unknown command"));
        assert_eq!(lines(console.handle_line("classes")).len(), 5);
        assert_eq!(lines(console.handle_line("update Art")).len(), 1);
        assert!(lines(console.handle_line("json"))
            .iter()
            .any(|l| l.contains("\"total_profit\"")));
    }
}
