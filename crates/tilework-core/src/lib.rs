#![forbid(unsafe_code)]

//! Core: geometry and logging shared by the tilework crates.
//!
//! # Role in tilework
//! `tilework-core` holds the host-agnostic primitives. The tile engine
//! (`tilework-tile`) expresses every region it asks a host toolkit for in
//! terms of [`geometry::Rect`], and reports size hints as
//! [`geometry::Size`].
//!
//! Logging goes through `tracing`. Hosts that want a ready-made subscriber
//! enable the `tracing-json` feature and call [`logging::init`].

pub mod geometry;
pub mod logging;

pub use geometry::{Rect, Sides, Size};
