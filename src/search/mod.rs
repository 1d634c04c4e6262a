//! Time-bounded search over route solutions.
//!
//! - [`SearchDriver`]: iterated local search keeping best-overall and best-feasible
//! - [`descend`]: tabu-guided inner loop, pure in its inputs
//! - [`TabuList`]: bounded FIFO memory of forbidden moves

mod driver;
mod tabu;

pub use driver::{
    descend, Deadline, LocalSearchOutcome, SearchConfig, SearchDriver, SearchOutcome, Termination,
};
pub use tabu::TabuList;
