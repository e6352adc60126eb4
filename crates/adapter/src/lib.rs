//! Adapter module - scoresheet control via TCP socket with JSON protocol
//!
//! This module lets lane consoles, score displays and scripts drive a scoresheet
//! through a TCP socket connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Every applied command is followed by a full snapshot
//! 5. **Commanding**: Controller sends commands that record or edit deliveries
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `record`, `record_at`, `miss`, `reset_frame` or `reset_game`
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with role and server capabilities
//! - **observation**: Full scoresheet snapshot (frames, lines, running scores, splits)
//! - **ack**: Command applied; a frame reset also returns the cleared leaves
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `TENPIN_HOST`: Bind address (default: "127.0.0.1")
//! - `TENPIN_PORT`: Port number (default: 7878)
//! - `TENPIN_MAX_PENDING`: Bounded command queue length (default: 10)
//! - `TENPIN_DISABLED`: Set to "1" or "true" to disable adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"lane-7","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"frames":[...],"current_frame":1,"total_score":0,...}
//! Client -> Server: {"type":"command","seq":2,"ts":1234567892,"action":"record","leave":[7,10]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok"}
//! Server -> Client: {"type":"observation","seq":2,"ts":1234567892,"frames":[...],"current_frame":1,...}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking; the scoresheet itself stays on one thread
//! - Multiple clients can connect (only one controller at a time)
//! - See [`protocol`] for message structure definitions
//! - See [`server`] for TCP server implementation
//! - See [`session`] for the command loop that owns the scoresheet

pub mod protocol;
pub mod runtime;
pub mod server;
pub mod session;

pub use tenpin_core as core;
pub use tenpin_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{
    build_observation, check_tcp_listen_available, map_command, run_server, ServerConfig,
    ServerState, PROTOCOL_VERSION,
};
pub use session::Session;
