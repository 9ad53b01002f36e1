//! Rendering of snapshots into the strings the widgets display.

use tally_core::Money;
use tally_grades::{Grade, GradeSummary};
use tally_sales::LedgerSnapshot;

/// Lines of the running-total list: one per item, then the profit.
pub fn ledger_lines(snapshot: &LedgerSnapshot) -> Vec<String> {
    snapshot
        .counts
        .iter()
        .map(|c| format!("{}: {}", c.name, c.count))
        .chain(std::iter::once(format!(
            "Total Profit: {}",
            snapshot.total_profit
        )))
        .collect()
}

pub fn price_label(price: Money) -> String {
    format!("Price: {price}")
}

pub fn grade_lines(grades: &[Grade]) -> Vec<String> {
    grades.iter().map(Grade::to_string).collect()
}

/// The class information block shown after "calculate".
pub fn class_info(class: &str, summary: &GradeSummary) -> String {
    format!(
        "Class: {class}\nAverage: {}%\nHigh: {}%\nLow: {}%",
        summary.average_percent(),
        format_percent(summary.high_percent()),
        format_percent(summary.low_percent()),
    )
}

/// One decimal at most, and none for whole numbers ("80", "66.7").
fn format_percent(value: f64) -> String {
    let tenths = (value * 10.0).round() / 10.0;
    if tenths.fract() == 0.0 {
        format!("{tenths:.0}")
    } else {
        format!("{tenths:.1}")
    }
}
