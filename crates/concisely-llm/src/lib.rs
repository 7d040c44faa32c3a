//! OpenRouter client for concisely.
//!
//! Implements [`concisely_core::LlmPort`] over the OpenRouter Responses API:
//! plain completions for summaries and multimodal requests for describing
//! images, video notes and voice notes.

#![deny(unsafe_code)]

mod client;
mod config;
mod error;
mod http;
mod wire;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{DefaultOpenRouterClient, OpenRouterClient};

// Configuration
pub use config::OpenRouterConfig;
