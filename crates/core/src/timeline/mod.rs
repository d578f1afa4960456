//! Frame compiler: steps through the show in fixed increments and writes every
//! event's contribution into a frame × channel byte matrix.

use std::collections::BTreeSet;
use std::ops::Range;

use crate::{
    closure::{self, Directive},
    event::Event,
    intensity::{intensity_with, to_byte},
    mapping::{ChannelKind, Part},
    Result, ShowError,
};

/// Time between two frames.
pub const STEP_MS: u64 = 20;
/// Channels carried by every frame.
pub const CHANNEL_COUNT: usize = 48;

/// Number of frames needed to cover `duration_ms`.
pub fn frame_count_for(duration_ms: u64) -> usize {
    duration_ms.div_ceil(STEP_MS) as usize
}

/// Show time of the first sample in `frame`.
pub fn frame_time_ms(frame: usize) -> u64 {
    frame as u64 * STEP_MS
}

/// Row-major `frame_count × CHANNEL_COUNT` channel values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMatrix {
    frame_count: usize,
    data: Vec<u8>,
}

/// A change of value on one channel between consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub frame: usize,
    pub time_ms: u64,
    pub from: u8,
    pub to: u8,
}

impl FrameMatrix {
    /// All-zero matrix; every closure channel starts `Idle`.
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            data: vec![0; frame_count * CHANNEL_COUNT],
        }
    }

    pub(crate) fn from_raw(frame_count: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), frame_count * CHANNEL_COUNT);
        Self { frame_count, data }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn channel_count(&self) -> usize {
        CHANNEL_COUNT
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, frame: usize, channel: usize) -> u8 {
        self.data[frame * CHANNEL_COUNT + channel]
    }

    /// Values of one channel, frame by frame.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = u8> + '_ {
        self.data
            .chunks_exact(CHANNEL_COUNT)
            .map(move |frame| frame[channel])
    }

    /// Every value change on `channel`, starting from an implicit zero.
    pub fn transitions(&self, channel: usize) -> Vec<Transition> {
        let mut previous = 0;
        let mut transitions = Vec::new();
        for (frame, value) in self.channel(channel).enumerate() {
            if value != previous {
                transitions.push(Transition {
                    frame,
                    time_ms: frame_time_ms(frame),
                    from: previous,
                    to: value,
                });
                previous = value;
            }
        }
        transitions
    }

    /// Channels that hold non-zero data although no event targets them.
    pub fn stray_channels(&self, events: &[Event]) -> Vec<usize> {
        let expected: BTreeSet<usize> = events
            .iter()
            .filter_map(|event| event.part.spec())
            .flat_map(|spec| spec.channels.iter().copied())
            .collect();
        self.active_outside(&expected)
    }

    /// Channels that hold non-zero data although no part in the catalog
    /// drives them.
    pub fn unmapped_channels(&self) -> Vec<usize> {
        let mapped: BTreeSet<usize> = Part::ALL
            .into_iter()
            .flat_map(|part| part.spec().channels.iter().copied())
            .collect();
        self.active_outside(&mapped)
    }

    fn active_outside(&self, expected: &BTreeSet<usize>) -> Vec<usize> {
        (0..CHANNEL_COUNT)
            .filter(|channel| !expected.contains(channel))
            .filter(|&channel| self.channel(channel).any(|value| value != 0))
            .collect()
    }

    fn raise(&mut self, frame: usize, channel: usize, value: u8) {
        let slot = &mut self.data[frame * CHANNEL_COUNT + channel];
        *slot = (*slot).max(value);
    }

    fn fill(&mut self, channel: usize, frames: Range<usize>, value: u8) {
        for frame in frames {
            self.data[frame * CHANNEL_COUNT + channel] = value;
        }
    }

    fn apply_directive(&mut self, directive: &Directive) {
        let first = (directive.start_ms / STEP_MS) as usize;
        let last = ((directive.end_ms / STEP_MS) as usize).min(self.frame_count);
        if first < last {
            self.fill(directive.channel, first..last, directive.command.byte());
        }
    }
}

/// Compiles `events` into a channel matrix covering `duration_ms`.
///
/// Brightness events sharing a channel combine by maximum. Closure directives
/// overwrite unconditionally in input order, so a later event wins where two
/// overlap. Events on unknown parts are skipped.
pub fn compile(events: &[Event], duration_ms: u64) -> Result<FrameMatrix> {
    if duration_ms == 0 {
        return Err(ShowError::InvalidDuration { duration_ms });
    }

    // The header stores the frame count in four bytes.
    let frame_count = duration_ms.div_ceil(STEP_MS);
    if frame_count > u64::from(u32::MAX) {
        return Err(ShowError::DurationTooLong {
            duration_ms,
            frame_count,
        });
    }
    let frame_count = frame_count as usize;
    if frame_count.checked_mul(CHANNEL_COUNT).is_none() {
        return Err(ShowError::DurationTooLong {
            duration_ms,
            frame_count: frame_count as u64,
        });
    }
    let mut matrix = FrameMatrix::new(frame_count);

    let mut brightness = 0usize;
    let mut commands = Vec::new();
    let mut skipped = 0usize;
    for event in events {
        match event.part.spec().map(|spec| spec.kind) {
            Some(ChannelKind::Brightness) => {
                write_brightness(&mut matrix, event);
                brightness += 1;
            }
            Some(ChannelKind::Command) => commands.extend(closure::resolve(event)),
            None => skipped += 1,
        }
    }

    for directive in &commands {
        matrix.apply_directive(directive);
    }

    tracing::debug!(
        frame_count,
        brightness_events = brightness,
        directives = commands.len(),
        skipped,
        "compiled frame matrix"
    );
    Ok(matrix)
}

/// Samples one brightness event at every frame it covers.
fn write_brightness(matrix: &mut FrameMatrix, event: &Event) {
    let (Some(params), Some(spec)) = (event.light_params(), event.part.spec()) else {
        return;
    };

    // Frame f samples t = f * STEP_MS, so the covered frames are
    // ceil(start / STEP_MS)..ceil(end / STEP_MS).
    let first = event.start_ms.div_ceil(STEP_MS) as usize;
    let last = (event.end_ms.div_ceil(STEP_MS) as usize).min(matrix.frame_count);

    for frame in first..last {
        let value = to_byte(intensity_with(event, &params, frame_time_ms(frame)));
        if value == 0 {
            continue;
        }
        for &channel in spec.channels {
            matrix.raise(frame, channel, value);
        }
    }
}
