//! TCP server for scoresheet clients
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::Scoresheet;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Version spoken by this server; clients must share the major version
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// 64-bit FNV-1a hasher for `state_hash`.
///
/// Only fed explicit little-endian bytes, so the digest does not depend on the
/// platform or on `DefaultHasher`.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Create from `TENPIN_HOST`, `TENPIN_PORT` and `TENPIN_MAX_PENDING`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from an arbitrary variable source; unset or unparsable values fall back
    /// to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("TENPIN_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = lookup("TENPIN_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = lookup("TENPIN_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
        }
    }
}

/// Fail fast if `host:port` cannot be bound, before any runtime is started.
///
/// Port 0 always succeeds.
pub fn check_tcp_listen_available(host: &str, port: u16) -> std::io::Result<()> {
    std::net::TcpListener::bind((host, port)).map(drop)
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    /// Check if the adapter is disabled via `TENPIN_DISABLED`
    pub fn is_disabled() -> bool {
        disabled_flag(std::env::var("TENPIN_DISABLED").ok().as_deref())
    }
}

fn disabled_flag(value: Option<&str>) -> bool {
    value
        .map(|v| {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true")
        })
        .unwrap_or(false)
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Handshake and sequencing gate shared by command and control messages.
async fn admit(state: &ServerState, client_id: usize, seq: u64, kind: &str) -> Result<(), ErrorMessage> {
    if !is_handshaken(state, client_id).await {
        return Err(create_error(
            seq,
            ErrorCode::HandshakeRequired,
            &format!("Send hello before {}", kind),
        ));
    }
    if !check_and_update_seq(state, client_id, seq).await {
        return Err(create_error(
            seq,
            ErrorCode::InvalidCommand,
            "seq must be strictly increasing",
        ));
    }
    Ok(())
}

async fn is_controller(state: &ServerState, client_id: usize) -> bool {
    *state.controller.read().await == Some(client_id)
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Line(String),
    Ack(AckMessage),
    Error(ErrorMessage),
    Welcome(WelcomeMessage),
}

/// Start the TCP server
///
/// Commands that pass the handshake, sequencing and controller checks are forwarded on
/// `command_tx`; replies produced by the session arrive on `out_rx`. When `ready_tx` is
/// given it receives the bound address (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let clients = state.clients.read().await;
                match msg {
                    OutboundMessage::ToClient { client_id, line } => {
                        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
                            let _ = c.tx.send(ClientOutbound::Line(line));
                        }
                    }
                    OutboundMessage::Broadcast { line } => {
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Line(line.clone()));
                        }
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Line(line) => {
                    buf.extend_from_slice(line.as_bytes());
                    Ok(())
                }
                ClientOutbound::Ack(ack) => serde_json::to_writer(&mut buf, ack),
                ClientOutbound::Error(err) => serde_json::to_writer(&mut buf, err),
                ClientOutbound::Welcome(welcome) => serde_json::to_writer(&mut buf, welcome),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line = String::new();
    let mut read_error = None;

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            // Cleanup below must still run, so the error is reported afterwards.
            Err(e) => {
                read_error = Some(e);
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(client_id, line = trimmed, "inbound");

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, hello.seq).await
                {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                if !hello.protocol_version.starts_with("1.") {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    break;
                }

                // First client to hello becomes controller
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    if controller.is_none() {
                        *controller = Some(client_id);
                        info!(client_id, client = %hello.client.name, "client is now controller");
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, (*controller).map(|id| id as u64))
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if let Err(error) = admit(&state, client_id, cmd.seq, "command").await {
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                if !is_controller(&state, client_id).await {
                    let error = create_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "Only controller may send commands",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        let error = create_error(cmd.seq, code, &message);
                        let _ = tx.send(ClientOutbound::Error(error));
                        continue;
                    }
                };

                // Ack is sent by the session after the command is applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    let error =
                        create_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                    let _ = tx.send(ClientOutbound::Error(error));
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if let Err(error) = admit(&state, client_id, ctrl.seq, "control").await {
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let mut controller = state.controller.write().await;
                let reply = match ctrl.action {
                    ControlAction::Claim if controller.is_none() => {
                        *controller = Some(client_id);
                        info!(client_id, "controller claimed");
                        ClientOutbound::Ack(create_ack(ctrl.seq, None))
                    }
                    ControlAction::Claim => ClientOutbound::Error(create_error(
                        ctrl.seq,
                        ErrorCode::ControllerActive,
                        "Controller already assigned",
                    )),
                    ControlAction::Release if *controller == Some(client_id) => {
                        *controller = None;
                        info!(client_id, "controller released");
                        ClientOutbound::Ack(create_ack(ctrl.seq, None))
                    }
                    ControlAction::Release => ClientOutbound::Error(create_error(
                        ctrl.seq,
                        ErrorCode::NotController,
                        "Only controller may release",
                    )),
                };
                let _ = tx.send(reply);
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, unknown.seq).await
                {
                    let error = create_error(
                        unknown.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }
                let error =
                    create_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
                let _ = tx.send(ClientOutbound::Error(error));
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                let error = create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
                let _ = tx.send(ClientOutbound::Error(error));
            }
        }
    }

    // Clean up: remove client and promote the next controller if needed.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        clients.retain(|c| c.id != client_id);

        if *controller == Some(client_id) {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => info!(client_id = new_id, "controller promoted"),
                None => info!(client_id, "controller released on disconnect"),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;

    match read_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Map a protocol command into a scoresheet command.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    fn missing(action: CommandAction, field: &str) -> (ErrorCode, String) {
        (
            ErrorCode::InvalidCommand,
            format!("{} requires `{}`", action.as_str(), field),
        )
    }

    let leave = || {
        cmd.leave
            .map(|l| l.0)
            .ok_or_else(|| missing(cmd.action, "leave"))
    };

    match cmd.action {
        CommandAction::Record => Ok(ClientCommand::Record(leave()?)),
        CommandAction::RecordAt => {
            let frame = cmd.frame.ok_or_else(|| missing(cmd.action, "frame"))?;
            let slot = cmd.slot.ok_or_else(|| missing(cmd.action, "slot"))?;
            Ok(ClientCommand::RecordAt {
                frame,
                slot,
                leave: leave()?,
            })
        }
        CommandAction::Miss => Ok(ClientCommand::Miss),
        CommandAction::ResetFrame => Ok(ClientCommand::ResetFrame(cmd.frame)),
        CommandAction::ResetGame => Ok(ClientCommand::ResetGame(cmd.to_frame.unwrap_or(1))),
    }
}

/// Digest of every frame's leaves and running score plus the cursor.
///
/// Per frame: a ball-count byte, each leave's bits, then the running score; the
/// cursor closes the stream as one byte (0 once the game is finished).
fn state_hash(sheet: &Scoresheet) -> StateHash {
    use std::hash::Hasher;

    let mut hasher = Fnv1aHasher::new();
    for frame in sheet.frames() {
        let leaves = frame.leaves();
        hasher.write_u8(leaves.len() as u8);
        for leave in &leaves {
            hasher.write(&leave.bits().to_le_bytes());
        }
        hasher.write(&frame.running_score().to_le_bytes());
    }
    hasher.write_u8(sheet.current_number().unwrap_or(0));
    StateHash(hasher.finish())
}

/// Build observation message from a scored sheet
///
/// Running scores are read as cached; rescore the sheet first.
pub fn build_observation(sheet: &Scoresheet, seq: u64) -> ObservationMessage {
    let state_hash = state_hash(sheet);

    let frames = sheet
        .frames()
        .iter()
        .map(|frame| FrameSnapshot {
            number: frame.number(),
            line: frame.line(),
            running_score: frame.running_score(),
            leaves: frame.leaves().into_iter().map(PinList).collect(),
            is_strike: frame.is_strike(),
            is_spare: frame.is_spare(),
            is_double: frame.is_double(),
            is_triple: frame.is_triple(),
            is_complete: frame.is_complete(),
            is_split: frame.is_split(),
            selectable: sheet.is_frame_selectable(frame.number()),
        })
        .collect();

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        frames,
        current_frame: sheet.current_number(),
        total_score: sheet.total_score(),
        is_complete: sheet.is_complete(),
        state_hash,
    }
}
