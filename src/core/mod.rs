//! Core subsystems: generation orchestration, prompt construction,
//! PDF rendering, and logging.

pub mod llm;
pub mod logging;
pub mod pdf;
pub mod prompt;
pub mod proposal;
