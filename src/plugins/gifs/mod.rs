//! GIF search proxy.
//!
//! `server` exposes `GET /api/gifs?q=` and forwards to Tenor through `tenor`, keeping the
//! API key server-side. `client` is the caller side used by the session, which always
//! ends with a displayable URL.

pub mod client;
pub mod errors;
pub mod server;
pub mod tenor;
pub mod types;

pub use client::{GifClient, FALLBACK_GIF_URL};
pub use errors::GifError;
pub use server::{router, serve};
pub use tenor::TenorClient;
