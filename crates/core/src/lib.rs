//! Domain types and pure logic for the designflow client.
//!
//! Everything in this crate is synchronous and free of I/O: the
//! generation hierarchy store, the tree layout transformer, request
//! validation and the optimistic action flags. The HTTP client and the
//! polling controller live in `designflow-client`.

pub mod actions;
pub mod error;
pub mod generation;
pub mod hierarchy;
pub mod image;
pub mod job;
pub mod layout;
pub mod types;
