//! # Core Application Logic
//!
//! This module contains infiwiki's business logic.
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
//!                    │  • History + its store  │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │  Fetch     │
//!     │  Adapter   │                          │  tasks     │
//!     │ (ratatui)  │                          │ (tokio)    │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`history`]: Visited topics and the cursor into them
//! - [`store`]: Loads and saves the history as JSON
//! - [`lifecycle`]: Generation-tagged, cancellable definition and art fetches
//! - [`random`]: Picks a random topic different from the current one
//! - [`fallback`]: Boxed-label art used when generation fails
//! - [`config`]: Config file, env vars and CLI flags collapsed into one struct

pub mod action;
pub mod config;
pub mod fallback;
pub mod history;
pub mod lifecycle;
pub mod random;
pub mod state;
pub mod store;
