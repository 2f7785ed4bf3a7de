//! Downlink command protocol
//!
//! Frames sent from the network server back to the node. The first byte selects
//! the message class, the rest is class specific:
//!
//! | Frame | Meaning |
//! |-------|---------|
//! | `02 01` | reset |
//! | `02 02` | force an immediate reading |
//! | `01 01 HH MM LL` | set reporting interval to the 24-bit big-endian seconds value |
//!
//! Decoding is lenient: anything unrecognised becomes [`DownlinkCommand::Unknown`]
//! carrying the reason, never an error. Encoding something that cannot be sent
//! yields an empty frame, which callers treat as "nothing to transmit".

use crate::constants::*;
use crate::logging::log_warn;
use nom::number::complete::{be_u24, be_u8};
use nom::IResult;
use serde::{Deserialize, Serialize};

/// Message class carried in the first byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Config,
    Command,
    Other(u8),
}

impl From<u8> for MessageClass {
    fn from(byte: u8) -> Self {
        match byte {
            DOWNLINK_CLASS_CONFIG => MessageClass::Config,
            DOWNLINK_CLASS_COMMAND => MessageClass::Command,
            other => MessageClass::Other(other),
        }
    }
}

impl MessageClass {
    pub fn name(&self) -> &'static str {
        match self {
            MessageClass::Config => "config",
            MessageClass::Command => "command",
            MessageClass::Other(_) => "unknown",
        }
    }
}

/// A decoded or to-be-encoded downlink command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownlinkCommand {
    Reset,
    ForceRead,
    /// New reporting interval in seconds, below 2^24
    SetInterval(u32),
    /// Frame that did not match any known command
    Unknown {
        class: Option<u8>,
        opcode: Option<u8>,
        reason: String,
    },
}

impl DownlinkCommand {
    /// Symbolic action name
    pub fn name(&self) -> &'static str {
        match self {
            DownlinkCommand::Reset => "reset",
            DownlinkCommand::ForceRead => "force_read",
            DownlinkCommand::SetInterval(_) => "set_interval",
            DownlinkCommand::Unknown { .. } => "unknown",
        }
    }

    pub fn class(&self) -> MessageClass {
        match self {
            DownlinkCommand::Reset | DownlinkCommand::ForceRead => MessageClass::Command,
            DownlinkCommand::SetInterval(_) => MessageClass::Config,
            DownlinkCommand::Unknown { class: Some(c), .. } => MessageClass::from(*c),
            DownlinkCommand::Unknown { class: None, .. } => MessageClass::Other(0),
        }
    }

    /// Build a command from its symbolic name. Unrecognised names, and
    /// `set_interval` without a value that fits 24 bits, give `None`.
    pub fn from_symbolic(command: &str, value: Option<i64>) -> Option<Self> {
        match command {
            "reset" => Some(DownlinkCommand::Reset),
            "force_read" => Some(DownlinkCommand::ForceRead),
            "set_interval" => value
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v <= MAX_INTERVAL_SECS)
                .map(DownlinkCommand::SetInterval),
            _ => None,
        }
    }

    /// Serialisable summary: `{type, action, value?}`
    pub fn describe(&self) -> DecodedDownlink {
        DecodedDownlink {
            kind: self.class().name(),
            action: self.name(),
            value: match self {
                DownlinkCommand::SetInterval(secs) => Some(*secs),
                _ => None,
            },
            reason: match self {
                DownlinkCommand::Unknown { reason, .. } => Some(reason.clone()),
                _ => None,
            },
        }
    }

    fn unknown(class: Option<u8>, opcode: Option<u8>, reason: impl Into<String>) -> Self {
        DownlinkCommand::Unknown {
            class,
            opcode,
            reason: reason.into(),
        }
    }
}

/// JSON view of a decoded downlink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedDownlink {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Symbolic encode input, e.g. `{"command": "set_interval", "value": 600}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

impl EncodeRequest {
    pub fn new(command: impl Into<String>, value: Option<i64>) -> Self {
        Self {
            command: command.into(),
            value,
        }
    }
}

/// Encoded frame and the port to send it on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedDownlink {
    pub bytes: Vec<u8>,
    #[serde(rename = "fPort")]
    pub port: u8,
}

impl EncodedDownlink {
    /// Empty frames mean "do not transmit"
    pub fn should_send(&self) -> bool {
        !self.bytes.is_empty()
    }
}

fn parse_interval(input: &[u8]) -> IResult<&[u8], (u8, u32)> {
    let (input, sub_type) = be_u8(input)?;
    let (input, secs) = be_u24(input)?;
    Ok((input, (sub_type, secs)))
}

/// Stateless downlink encoder/decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct DownlinkCodec;

impl DownlinkCodec {
    /// Decode a downlink frame. Never fails; see [`DownlinkCommand::Unknown`].
    pub fn decode(buf: &[u8]) -> DownlinkCommand {
        let Ok((rest, class_byte)) = be_u8::<_, nom::error::Error<&[u8]>>(buf) else {
            return DownlinkCommand::unknown(None, None, "empty frame");
        };

        let command = match MessageClass::from(class_byte) {
            MessageClass::Command => match be_u8::<_, nom::error::Error<&[u8]>>(rest) {
                Ok((_, COMMAND_RESET)) => DownlinkCommand::Reset,
                Ok((_, COMMAND_FORCE_READ)) => DownlinkCommand::ForceRead,
                Ok((_, opcode)) => DownlinkCommand::unknown(
                    Some(class_byte),
                    Some(opcode),
                    format!("unknown command opcode 0x{opcode:02X}"),
                ),
                Err(_) => DownlinkCommand::unknown(
                    Some(class_byte),
                    None,
                    "command frame without opcode",
                ),
            },
            // the sub-type byte is not checked; interval is the only config message
            MessageClass::Config => match parse_interval(rest) {
                Ok((_, (_, secs))) => DownlinkCommand::SetInterval(secs),
                Err(_) => DownlinkCommand::unknown(
                    Some(class_byte),
                    rest.first().copied(),
                    format!(
                        "config frame needs {} bytes, got {}",
                        CONFIG_FRAME_LEN,
                        buf.len()
                    ),
                ),
            },
            MessageClass::Other(class) => DownlinkCommand::unknown(
                Some(class),
                rest.first().copied(),
                format!("unknown message class 0x{class:02X}"),
            ),
        };

        log::debug!("decoded downlink {:02x?} as {}", buf, command.name());
        command
    }

    /// Encode a command; unknown commands and out-of-range intervals give an empty frame
    pub fn encode(command: &DownlinkCommand) -> Vec<u8> {
        match command {
            DownlinkCommand::Reset => vec![DOWNLINK_CLASS_COMMAND, COMMAND_RESET],
            DownlinkCommand::ForceRead => vec![DOWNLINK_CLASS_COMMAND, COMMAND_FORCE_READ],
            DownlinkCommand::SetInterval(secs) if *secs <= MAX_INTERVAL_SECS => {
                let [_, hi, mid, lo] = secs.to_be_bytes();
                vec![DOWNLINK_CLASS_CONFIG, CONFIG_SET_INTERVAL, hi, mid, lo]
            }
            DownlinkCommand::SetInterval(secs) => {
                log_warn(&format!(
                    "interval {secs}s does not fit 24 bits, nothing to send"
                ));
                Vec::new()
            }
            DownlinkCommand::Unknown { .. } => Vec::new(),
        }
    }

    /// Encode a symbolic request onto the downlink port
    pub fn encode_request(request: &EncodeRequest) -> EncodedDownlink {
        let bytes = match DownlinkCommand::from_symbolic(&request.command, request.value) {
            Some(command) => Self::encode(&command),
            None => {
                log::debug!(
                    "downlink request {:?} not encodable, nothing to send",
                    request.command
                );
                Vec::new()
            }
        };
        EncodedDownlink {
            bytes,
            port: DOWNLINK_PORT,
        }
    }
}
