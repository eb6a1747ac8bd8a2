//! Game rules for the liquid-sort puzzle.
//!
//! Pure functions over tubes and counters. The session rule evaluator
//! composes them; nothing here mutates a session.

pub mod budget;
pub mod stars;
pub mod win;

pub use budget::{spend_move, spend_time};
pub use stars::{efficiency_ratio, star_rating, stars_for_ratio};
pub use win::is_solved;
