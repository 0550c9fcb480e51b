// Library target holds the game core so the binary, integration tests and
// criterion benchmarks share one module tree. Terminal presentation lives in
// the binary (main.rs, app.rs, event.rs, ui/).

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod store;

pub use catalog::{Answer, Difficulty, Operation, Problem, ProblemCatalog};
pub use error::GameError;
