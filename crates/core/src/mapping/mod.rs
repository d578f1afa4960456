//! Static routing table from vehicle parts to output channels.
//!
//! Every part in the closed catalog has exactly one [`PartSpec`] entry that
//! carries its category, the channels it drives, and whether those channels
//! take continuous brightness or discrete command bytes. The table is built at
//! compile time and never mutated.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ShowError;

/// Interactive vehicle part that can be placed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    WindowLeftFront,
    WindowRightFront,
    WindowLeftBack,
    WindowRightBack,
    RetroLeft,
    RetroRight,
    Flap,
    Trunk,
    LightLeftFront,
    LightRightFront,
    LightLeftBack,
    LightRightBack,
    BlinkFrontLeft,
    BlinkFrontRight,
    BlinkBackLeft,
    BlinkBackRight,
}

impl Part {
    /// Every part, in table order.
    pub const ALL: [Part; 16] = [
        Part::WindowLeftFront,
        Part::WindowRightFront,
        Part::WindowLeftBack,
        Part::WindowRightBack,
        Part::RetroLeft,
        Part::RetroRight,
        Part::Flap,
        Part::Trunk,
        Part::LightLeftFront,
        Part::LightRightFront,
        Part::LightLeftBack,
        Part::LightRightBack,
        Part::BlinkFrontLeft,
        Part::BlinkFrontRight,
        Part::BlinkBackLeft,
        Part::BlinkBackRight,
    ];

    /// Identifier used in event documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Part::WindowLeftFront => "window_left_front",
            Part::WindowRightFront => "window_right_front",
            Part::WindowLeftBack => "window_left_back",
            Part::WindowRightBack => "window_right_back",
            Part::RetroLeft => "retro_left",
            Part::RetroRight => "retro_right",
            Part::Flap => "flap",
            Part::Trunk => "trunk",
            Part::LightLeftFront => "light_left_front",
            Part::LightRightFront => "light_right_front",
            Part::LightLeftBack => "light_left_back",
            Part::LightRightBack => "light_right_back",
            Part::BlinkFrontLeft => "blink_front_left",
            Part::BlinkFrontRight => "blink_front_right",
            Part::BlinkBackLeft => "blink_back_left",
            Part::BlinkBackRight => "blink_back_right",
        }
    }

    pub fn spec(self) -> &'static PartSpec {
        &PART_SPECS[self as usize]
    }

    pub fn category(self) -> Category {
        self.spec().category
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Part {
    type Err = ShowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Part::ALL
            .into_iter()
            .find(|part| part.as_str() == s)
            .ok_or_else(|| ShowError::msg(format!("unknown part `{s}`")))
    }
}

/// Behavioural family of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Light,
    Blinker,
    RetroMirror,
    Window,
    Trunk,
    ChargeFlap,
}

impl Category {
    /// Mechanical parts driven by discrete commands rather than brightness.
    pub fn is_closure(self) -> bool {
        matches!(
            self,
            Category::RetroMirror | Category::Window | Category::Trunk | Category::ChargeFlap
        )
    }
}

/// Value semantics of the channels a part drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// 0..=255 intensity, combined by maximum.
    Brightness,
    /// One of the five closure command bytes, last write wins.
    Command,
}

/// Static description of a single part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartSpec {
    pub part: Part,
    pub category: Category,
    pub kind: ChannelKind,
    pub channels: &'static [usize],
    /// Hardware-imposed maximum number of commands per show, closures only.
    pub command_limit: Option<u32>,
}

const fn brightness(part: Part, category: Category, channels: &'static [usize]) -> PartSpec {
    PartSpec {
        part,
        category,
        kind: ChannelKind::Brightness,
        channels,
        command_limit: None,
    }
}

const fn command(
    part: Part,
    category: Category,
    channels: &'static [usize],
    limit: u32,
) -> PartSpec {
    PartSpec {
        part,
        category,
        kind: ChannelKind::Command,
        channels,
        command_limit: Some(limit),
    }
}

/// Indexed by `Part as usize`.
static PART_SPECS: [PartSpec; 16] = [
    command(Part::WindowLeftFront, Category::Window, &[36], 6),
    command(Part::WindowRightFront, Category::Window, &[38], 6),
    command(Part::WindowLeftBack, Category::Window, &[37], 6),
    command(Part::WindowRightBack, Category::Window, &[39], 6),
    command(Part::RetroLeft, Category::RetroMirror, &[34], 20),
    command(Part::RetroRight, Category::RetroMirror, &[35], 20),
    command(Part::Flap, Category::ChargeFlap, &[45], 3),
    command(Part::Trunk, Category::Trunk, &[40], 6),
    brightness(Part::LightLeftFront, Category::Light, &[0, 2, 4, 6, 8, 10]),
    brightness(Part::LightRightFront, Category::Light, &[1, 3, 5, 7, 9, 11]),
    brightness(Part::LightLeftBack, Category::Light, &[25]),
    brightness(Part::LightRightBack, Category::Light, &[26]),
    brightness(Part::BlinkFrontLeft, Category::Blinker, &[12]),
    brightness(Part::BlinkFrontRight, Category::Blinker, &[13]),
    brightness(Part::BlinkBackLeft, Category::Blinker, &[22]),
    brightness(Part::BlinkBackRight, Category::Blinker, &[23]),
];

/// Part reference as it appears in an event document.
///
/// Identifiers outside the catalog are preserved rather than rejected so that
/// event lists written by other app versions still load; the compiler simply
/// skips them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartKey {
    Known(Part),
    Unknown(String),
}

impl PartKey {
    pub fn part(&self) -> Option<Part> {
        match self {
            PartKey::Known(part) => Some(*part),
            PartKey::Unknown(_) => None,
        }
    }

    pub fn spec(&self) -> Option<&'static PartSpec> {
        self.part().map(Part::spec)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PartKey::Known(part) => part.as_str(),
            PartKey::Unknown(raw) => raw,
        }
    }
}

impl From<Part> for PartKey {
    fn from(value: Part) -> Self {
        PartKey::Known(value)
    }
}

impl From<String> for PartKey {
    fn from(value: String) -> Self {
        match value.parse::<Part>() {
            Ok(part) => PartKey::Known(part),
            Err(_) => PartKey::Unknown(value),
        }
    }
}

impl From<PartKey> for String {
    fn from(value: PartKey) -> Self {
        match value {
            PartKey::Known(part) => part.as_str().to_string(),
            PartKey::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
