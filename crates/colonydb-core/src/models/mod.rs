//! Domain models for the colony database.

mod animal;
mod experiment;
mod history;
mod treatment;
mod weight;

pub use animal::*;
pub use experiment::*;
pub use history::*;
pub use treatment::*;
pub use weight::*;
