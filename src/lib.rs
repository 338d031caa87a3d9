//! Terminal editor for the metrics attached to an incident playbook

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod editor;
pub mod logging;
pub mod modules;
pub mod store;
pub mod ui;
