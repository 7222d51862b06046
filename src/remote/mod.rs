// ABOUTME: Remote pipeline API module
// ABOUTME: Typed client and wire models for the privacy pipeline service

pub mod client;
pub mod models;

pub use client::{ApiContext, PipelineApi, RemoteClient};
