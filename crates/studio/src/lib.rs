//! Design session, configuration and rendering for the `designflow` binary.
//!
//! [`session::DesignSession`] owns the image hierarchy and drives the
//! generation poller; [`config`] and [`cli`] build its inputs and
//! [`render`] turns its snapshots into text or JSON.

pub mod cli;
pub mod config;
pub mod render;
pub mod session;
