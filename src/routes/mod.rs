//! Router Module Index
//!
//! Splits the portal's routes by how access is decided. Guarded views are mounted
//! behind the guard middleware as a whole, so no view can be exposed without
//! its guard.

/// Routes open to everyone: health check, the login landing page and the
/// local-only role picker.
pub mod public;

/// JSON endpoints the front-end calls to render menus and pre-check navigation.
/// They answer for whatever session the request carries, including none.
pub mod api;

/// One route per entry of the guard table, each wrapped by the guard middleware.
pub mod guarded;
