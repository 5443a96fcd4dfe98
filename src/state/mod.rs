//! State module for tracking harvest progress
//!
//! `ItemState` tracks each input URL from the rate gate through extraction,
//! image download and record assembly.

mod item_state;

pub use item_state::ItemState;
