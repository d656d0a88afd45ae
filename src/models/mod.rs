pub mod book;
pub mod selection;

pub use book::{BookRecord, ProcessOutcome, ProcessStats};
pub use selection::{SelectionError, SelectionSpec};
