//! Connect Four - networked four-in-a-row
//!
//! This library provides the relay server, the client agent and the local
//! front ends built on top of [`connect_four_engine`].
//!
//! # Architecture
//!
//! - **Protocol**: big-endian `i32` codes and moves on a raw TCP stream
//! - **Session**: first-come-first-served pairing and the per-game relay
//! - **Server**: accept loop spawning one task per session
//! - **Client**: agent that mirrors the board and reports events to a UI
//! - **Console**: local play for two humans or against the computer
//!
//! # Example
//!
//! ```no_run
//! use connect_four::{ClientSessionAgent, serve};
//! use tokio::net::TcpListener;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let listener = TcpListener::bind("127.0.0.1:8000").await?;
//! tokio::spawn(serve(listener, None, std::future::pending::<()>()));
//!
//! let agent = ClientSessionAgent::connect("127.0.0.1:8000").await?;
//! println!("Playing as the {}", agent.role());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod protocol;
mod server;
mod session;

pub mod console;

// Crate-level exports - Configuration
pub use config::{AppConfig, ClientConfig, ConfigError, DEFAULT_CONFIG_FILE, DEFAULT_PORT, ServerConfig};

// Crate-level exports - Errors
pub use error::NetError;

// Crate-level exports - Wire protocol
pub use protocol::{
    Outcome, Role, START_SIGNAL, WireMove, read_code, read_move, write_code, write_move,
};

// Crate-level exports - Server
pub use server::serve;
pub use session::{
    AbortReason, Lobby, SessionCoordinator, SessionEnd, SessionId, SessionPhase, SessionReport,
};

// Crate-level exports - Client
pub use client::{ClientEvent, ClientSessionAgent, Verdict};
