// ABOUTME: Library root for minibot — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod api;
pub mod app;
pub mod commands;
pub mod config;
pub mod summary;
pub mod tui;
