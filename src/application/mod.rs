//! Application layer: session stores, the engines that mutate them, and
//! the shell state the terminal UI works against.

pub mod app;
pub mod connections;
pub mod queue;
pub mod requests;
pub mod review;
pub mod state;
pub mod swipe;

#[cfg(test)]
pub(crate) mod testing;

pub use app::*;
pub use connections::*;
pub use queue::*;
pub use requests::*;
pub use review::*;
pub use state::*;
pub use swipe::*;
