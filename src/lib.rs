//! First-fit heap allocator simulator.
//!
//! A fixed-size arena is handed out in segments with a
//! first-fit search over an address-ordered free list.
//! Released segments go back into the list and are merged
//! with their free neighbours.

pub mod config;
pub mod core;
pub mod display;
pub mod driver;
pub mod error;

pub use crate::core::allocator::{Allocator, Handle, Segment, Stats};
pub use crate::error::AllocError;
