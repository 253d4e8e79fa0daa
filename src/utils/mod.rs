//! Shared helpers.
//!
//! This module provides:
//! - String sanitization for logged error messages
//! - CSS selector parsing utilities
//! - Text helpers for walking scraper element trees

pub mod sanitize;
mod selector;
mod text;

pub use selector::{parse_selector_unsafe, parse_selector_with_fallback};
pub use text::{collapse_whitespace, non_empty_text_nodes, own_text};
