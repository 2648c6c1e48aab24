//! # Inkpost
//!
//! A terminal client for the Inkpost blogging platform.
//!
//! ## Architecture
//!
//! ```text
//! Session → Route guards / Policy → Commands & TUI → API client
//!                                        ↓
//!                            Reaction engine (optimistic)
//! ```
//!
//! - [`authz`]: who may open which view and act on which post
//! - [`reaction`]: optimistic reactions reconciled with the server
//! - [`api`]: REST client for the blogging backend
//! - [`tui`]: Terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # Sign in
//! inkpost login ana
//!
//! # Browse and react
//! inkpost posts --search rust
//! inkpost react borrowing-lifetimes love
//!
//! # Dashboard
//! inkpost blogs
//! inkpost blog publish 12
//!
//! # Launch TUI
//! inkpost tui
//! ```

/// REST client and request/response payloads.
///
/// - [`ReactionApi`](api::ReactionApi): the seam the reaction engine submits through
/// - [`HttpApiClient`](api::HttpApiClient): reqwest-based implementation of every endpoint
pub mod api;

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together configuration,
/// the API client, the session and the token store.
pub mod app;

/// Role and ownership policy, and route guards built on it.
pub mod authz;

/// Command-line interface using clap.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/inkpost/config.toml`, supporting:
/// - API and site URLs
/// - Login and landing routes
/// - Custom colors (named or hex)
/// - Custom keybindings
pub mod config;

/// Core domain models.
///
/// - [`User`](domain::User) and [`Role`](domain::Role)
/// - [`Post`](domain::Post), [`Comment`](domain::Comment), [`Term`](domain::Term)
/// - [`ReactionState`](domain::ReactionState) and its counts
/// - [`Page`](domain::Page) and the [`Pager`](domain::Pager) that walks it
pub mod domain;

/// Optimistic reaction handling.
///
/// - [`ReactionEngine`](reaction::ReactionEngine): one item's state machine
/// - [`ReactionBoard`](reaction::ReactionBoard): engines for everything on screen,
///   settled through a channel
pub mod reaction;

/// The viewer's session and the file that keeps its tokens.
pub mod session;

/// Terminal user interface.
///
/// Two panes built with ratatui:
/// - Posts pane (35% height)
/// - Preview pane with the reaction bar (remaining)
///
/// Keybindings: j/k navigate, n/p change page, Enter loads the post,
/// 1-6 react, o opens in browser, R refreshes, q quits.
pub mod tui;
