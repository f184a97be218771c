//! Local board state and the pure ordering functions applied to it.

pub mod ordering;
pub mod store;

pub use ordering::{move_within, reassign_and_position};
pub use store::BoardStore;
