//! Wire message types for the WebSocket protocol (spec §6). Defines the
//! shapes; the session gateway (`dg-gateway`) owns the encode/decode and
//! visibility policy, the same split the teacher keeps between
//! `rbp-dto`/`gameroom::message` and `gameroom::protocol`.
mod client;
mod error_code;
mod server;

pub use client::ClientMessage;
pub use error_code::ErrorCode;
pub use server::InitialRollEntry;
pub use server::ServerMessage;
pub use server::Standing;
