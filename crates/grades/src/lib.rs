//! Grade book domain module.
//!
//! Classes, their ordered grade lists and the statistics the grade tracker
//! shows, implemented purely as deterministic domain logic (no IO, no GUI).

pub mod book;
pub mod grade;

pub use book::{
    AddGrade, ClearAll, DeleteGrade, GradeAdded, GradeBook, GradeBookCleared, GradeBookCommand,
    GradeBookEvent, GradeBookId, GradeDeleted, GradeSummary, GradeUpdated, STANDARD_CLASSES,
    UpdateGrade,
};
pub use grade::Grade;
