//! Session - the single owner of the scoresheet behind the adapter
//!
//! The session applies commands in arrival order, rescoring after every successful
//! command so observations never carry a stale running score.

use tracing::debug;

use crate::core::{FrameLeaves, Scoresheet, ScoresheetResult};
use crate::protocol::{create_ack, create_error, ErrorCode, ObservationMessage, PinList};
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::server::build_observation;

#[derive(Debug, Default)]
pub struct Session {
    sheet: Scoresheet,
    obs_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self) -> &Scoresheet {
        &self.sheet
    }

    /// Apply one command and rescore.
    ///
    /// Returns the leaves cleared by a frame reset; empty for every other command.
    pub fn apply(&mut self, command: ClientCommand) -> ScoresheetResult<FrameLeaves> {
        let returned = match command {
            ClientCommand::Record(leave) => self.sheet.record_delivery(leave).map(|_| FrameLeaves::new()),
            ClientCommand::RecordAt { frame, slot, leave } => self
                .sheet
                .record_delivery_at(frame, slot, leave)
                .map(|_| FrameLeaves::new()),
            ClientCommand::Miss => self.sheet.record_miss().map(|_| FrameLeaves::new()),
            ClientCommand::ResetFrame(frame) => self.sheet.reset_frame(frame),
            ClientCommand::ResetGame(to_frame) => {
                self.sheet.reset_game(to_frame).map(|_| FrameLeaves::new())
            }
        }?;

        self.sheet.update_running_score();
        debug!(
            ?command,
            current_frame = ?self.sheet.current_number(),
            total = self.sheet.total_score(),
            "command applied"
        );
        Ok(returned)
    }

    /// Snapshot the sheet under the next observation sequence number
    pub fn observation(&mut self) -> ObservationMessage {
        self.obs_seq += 1;
        build_observation(&self.sheet, self.obs_seq)
    }

    /// Handle one inbound message, producing the replies to deliver.
    ///
    /// A successful command is acked to its sender and followed by an observation
    /// broadcast; a rejected one gets an error carrying the matching code.
    pub fn handle(&mut self, inbound: InboundCommand) -> Vec<OutboundMessage> {
        let client_id = inbound.client_id;
        let mut out = Vec::with_capacity(2);

        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                if let Some(line) = to_line(&self.observation()) {
                    out.push(OutboundMessage::ToClient { client_id, line });
                }
            }
            InboundPayload::Command(command) => match self.apply(command) {
                Ok(returned) => {
                    let returned_leaves = matches!(command, ClientCommand::ResetFrame(_))
                        .then(|| returned.into_iter().map(PinList).collect());
                    if let Some(line) = to_line(&create_ack(inbound.seq, returned_leaves)) {
                        out.push(OutboundMessage::ToClient { client_id, line });
                    }
                    if let Some(line) = to_line(&self.observation()) {
                        out.push(OutboundMessage::Broadcast { line });
                    }
                }
                Err(err) => {
                    debug!(?command, error = %err, "command rejected");
                    let error = create_error(inbound.seq, ErrorCode::from(err), &err.to_string());
                    if let Some(line) = to_line(&error) {
                        out.push(OutboundMessage::ToClient { client_id, line });
                    }
                }
            },
        }

        out
    }
}

fn to_line<T: serde::Serialize>(msg: &T) -> Option<String> {
    serde_json::to_string(msg).ok()
}
