//! Terminal client for a math concept service: analyze a question into
//! related concepts, generate a test from them, and practise it.

pub mod analyzer;
pub mod app;
pub mod config;
pub mod event;
pub mod logging;
pub mod practice;
pub mod service;
pub mod ui;
