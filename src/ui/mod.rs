//! Text console: prompting and report rendering.

pub mod prompt;
pub mod report;
