//! Starting solutions for the search.
//!
//! - [`random_solution`]: every service stop on a random vehicle, random order, O(S)
//! - [`urgency_first`]: deadline-ordered greedy with refill insertion, O(D log D + D·V)

mod random;
mod urgency_first;

pub use random::random_solution;
pub use urgency_first::urgency_first;
