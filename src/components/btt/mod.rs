//! Client for the BetterTouchTool web server.
//!
//! Requests are fire-and-forget: they are queued on an actor which sends them in order and logs
//! failures. See <https://docs.bettertouchtool.net/docs/webserver.html> for the endpoints.

mod actor;
pub mod encoding;
mod handle;

pub use handle::BttHandle;
