//! Core types for the medipipe batch pipeline.
//!
//! This crate holds the pure configuration and profile types shared by the
//! pipeline, storage, and CLI crates. It performs no I/O.

pub mod config;
pub mod profiles;

pub use config::{PipelineConfig, PostProcessPolicy};
pub use profiles::{OutputProfile, UnknownCodec, VideoCodec};
