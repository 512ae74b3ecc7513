//! Backend REST client and job polling for designflow.
//!
//! Provides the typed wire messages, an HTTP wrapper around the design
//! backend, the [`DesignBackend`](backend::DesignBackend) seam, and the
//! polling controller that resolves a generation job and merges its
//! images into the shared hierarchy store.

pub mod api;
pub mod backend;
pub mod messages;
pub mod outcome;
pub mod poller;
