//! Presentation layer handling terminal UI and user input.
//!
//! Renders the feed, requests and connections screens with ratatui and maps
//! key presses to engine commands.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
