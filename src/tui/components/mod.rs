//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as props:
//! - `StatusBar`: Bottom line with attribution, timing and key hints
//! - `ArtDisplay`: Centered text-art above the definition
//! - `LoadingSkeleton`: Placeholder bars while waiting for text
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that manage local state and emit events:
//! - `SearchBar`: Topic field plus back/forward/random buttons
//! - `ContentView`: Word-selectable definition with a layout cache
//! - `HistoryPanel`: Visited topics, clickable, with a Clear button
//!
//! Stateful components keep what they learned during the last render
//! (button rectangles, word positions, row offsets) so mouse clicks can be
//! mapped back to what was on screen.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── search_bar.rs     (Topic field and navigation buttons)
//! ├── content_view.rs   (Definition text with clickable words)
//! ├── art_display.rs    (Text-art header)
//! ├── history_panel.rs  (Side list of visited topics)
//! ├── skeleton.rs       (Loading placeholder)
//! └── status_bar.rs     (Bottom line)
//! ```

pub mod art_display;
pub mod content_view;
pub mod history_panel;
pub mod search_bar;
pub mod skeleton;
pub mod status_bar;

pub use art_display::ArtDisplay;
pub use content_view::{ContentEvent, ContentView, ContentViewState};
pub use history_panel::{HistoryHit, HistoryPanel, HistoryPanelState};
pub use search_bar::{SearchBar, SearchButton, SearchEvent};
pub use skeleton::LoadingSkeleton;
pub use status_bar::StatusBar;
