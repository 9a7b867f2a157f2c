//! State-sync messages exchanged between participants.
//!
//! Messages travel as JSON objects tagged by `action`:
//!
//! ```json
//! {"action":"updateTime","segment":0,"night":4}
//! {"action":"updateNight","night":2}
//! ```
//!
//! [`LocalBus`] is an in-process broadcast channel used by the terminal clock and the
//! tests. Each participant joins with a [`BusSender`] for emitting and a receiver for its
//! inbox.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use crate::constants::{CHANNEL_NAME, SEGMENT_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ClockMessage {
    /// Segment and night after a clock step.
    UpdateTime { segment: u8, night: u32 },
    /// Manual edit of the night counter.
    UpdateNight { night: u32 },
}

impl ClockMessage {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to encode clock message")
    }

    /// Decode and check a message received from the channel.
    pub fn from_json(raw: &str) -> Result<Self> {
        let message: ClockMessage =
            serde_json::from_str(raw).with_context(|| format!("Invalid clock message: {raw}"))?;

        if let ClockMessage::UpdateTime { segment, .. } = message
            && usize::from(segment) >= SEGMENT_COUNT
        {
            anyhow::bail!(
                "Invalid clock message: segment {} is outside 0-{}",
                segment,
                SEGMENT_COUNT - 1
            );
        }
        Ok(message)
    }
}

/// Outbound half of the network channel.
#[cfg_attr(test, mockall::automock)]
pub trait Channel {
    /// Broadcast `message` to the other participants.
    fn emit(&mut self, message: &ClockMessage) -> Result<()>;
}

#[derive(Debug)]
struct Member {
    id: usize,
    echo: bool,
    inbox: Sender<String>,
}

#[derive(Debug, Default)]
struct BusState {
    next_id: usize,
    members: Vec<Member>,
}

/// In-process broadcast bus carrying JSON-encoded messages.
#[derive(Debug, Clone, Default)]
pub struct LocalBus {
    state: Arc<Mutex<BusState>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the bus. With `echo` set, the member also receives its own messages.
    pub fn join(&self, echo: bool) -> (BusSender, Receiver<String>) {
        let (inbox, receiver) = mpsc::channel();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let id = state.next_id;
        state.next_id += 1;
        state.members.push(Member { id, echo, inbox });

        let sender = BusSender {
            id,
            bus: self.clone(),
        };
        (sender, receiver)
    }

    pub fn member_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .members
            .len()
    }

    /// Deliver `raw` to every member except `from` (unless it asked for echoes).
    ///
    /// Members whose inbox was dropped leave the bus. Returns the number of deliveries.
    fn publish(&self, from: usize, raw: &str) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        state.members.retain(|member| {
            if member.id == from && !member.echo {
                return true;
            }
            match member.inbox.send(raw.to_string()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }
}

/// A member's handle for broadcasting on a [`LocalBus`].
#[derive(Debug)]
pub struct BusSender {
    id: usize,
    bus: LocalBus,
}

impl Channel for BusSender {
    fn emit(&mut self, message: &ClockMessage) -> Result<()> {
        let raw = message.to_json()?;
        let delivered = self.bus.publish(self.id, &raw);
        log_debug!(
            "Broadcast {} on {} to {} participant(s)",
            raw,
            CHANNEL_NAME,
            delivered
        );
        Ok(())
    }
}
