//! Discrete command writes for mechanical parts.

use std::fmt;

use crate::event::{Event, FlapMode, Payload, RetroMode, TrunkMode, WindowMode};

/// Command byte understood by the playback firmware on closure channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    Idle = 0,
    Open = 64,
    Dance = 128,
    Close = 192,
    /// Reserved; no current mode emits it.
    Stop = 255,
}

impl Command {
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Command::Idle),
            64 => Some(Command::Open),
            128 => Some(Command::Dance),
            192 => Some(Command::Close),
            255 => Some(Command::Stop),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Idle => "IDLE",
            Command::Open => "OPEN",
            Command::Dance => "DANCE",
            Command::Close => "CLOSE",
            Command::Stop => "STOP",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Write `command` to `channel` over `[start_ms, end_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub channel: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub command: Command,
}

/// Expands a closure event into its command directives.
///
/// Non-closure and unknown parts resolve to nothing. Frames outside every
/// directive stay `Idle`, so no directive ever returns a part to rest.
pub fn resolve(event: &Event) -> Vec<Directive> {
    let Some(channel) = event.part.spec().and_then(|spec| spec.channels.first().copied()) else {
        return Vec::new();
    };
    let span = |start_ms, end_ms, command| Directive {
        channel,
        start_ms,
        end_ms,
        command,
    };
    let (start, end) = (event.start_ms, event.end_ms);

    match event.payload() {
        Some(Payload::Retro(RetroMode::Open)) => vec![span(start, end, Command::Open)],
        Some(Payload::Retro(RetroMode::Close)) => vec![span(start, end, Command::Close)],
        Some(Payload::Retro(RetroMode::RoundTrip)) => {
            let mid = start + event.duration_ms() / 2;
            vec![span(start, mid, Command::Close), span(mid, end, Command::Open)]
        }
        // The firmware drives the oscillation itself.
        Some(Payload::Window(WindowMode::Dance)) => vec![span(start, end, Command::Dance)],
        Some(Payload::Trunk(mode)) => {
            let command = match mode {
                TrunkMode::Open => Command::Open,
                TrunkMode::Close => Command::Close,
                TrunkMode::Dance => Command::Dance,
            };
            vec![span(start, end, command)]
        }
        Some(Payload::Flap(mode)) => {
            let command = match mode {
                FlapMode::Open => Command::Open,
                FlapMode::Close => Command::Close,
                FlapMode::Rainbow => Command::Dance,
            };
            vec![span(start, end, command)]
        }
        Some(Payload::Light(_)) | None => Vec::new(),
    }
}
