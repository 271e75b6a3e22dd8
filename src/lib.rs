//! matchdeck - client core for a swipe-and-connect matching service.
//!
//! Keeps a queue of candidate profiles resolved one swipe at a time, and a
//! paginated review workflow for incoming connection requests, both backed
//! by a remote REST gateway.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
