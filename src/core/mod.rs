//! # Core Application Logic
//!
//! This module contains the panel's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • TableView, Notifier  │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                   ┌────────────┴────────────┐
//!                   ▼                         ▼
//!            ┌────────────┐            ┌────────────┐
//!            │    TUI     │            │    API     │
//!            │  Adapter   │            │  (reqwest) │
//!            │ (ratatui)  │            │            │
//!            └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`request`]: Backend calls as values, and the runner that performs them
//! - [`table`]: Search, sort, pagination and column visibility over rows
//! - [`notifier`]: The loading/success/error/confirm overlay state machine
//! - [`config`], [`session`]: Files under `~/.painel/`
//! - [`masks`]: Text helpers for form input and dates

pub mod action;
pub mod config;
pub mod masks;
pub mod notifier;
pub mod request;
pub mod session;
pub mod state;
pub mod table;
