//! Timeline events as produced by the editor.
//!
//! The serialized shape is flat: every option lives next to the timing fields
//! and only the options that matter for the part's category are read back.
//! Missing options fall back to the editor defaults.

use serde::{Deserialize, Serialize};

use crate::mapping::{Category, Part, PartKey};

pub const DEFAULT_POWER: u32 = 100;
pub const DEFAULT_LIGHT_DURATION_MS: u64 = 500;
pub const DEFAULT_WINDOW_DURATION_MS: u64 = 5_000;

/// A single placed action on one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub part: PartKey,
    pub start_ms: u64,
    pub end_ms: u64,
    #[serde(flatten)]
    pub options: EventOptions,
}

/// Raw per-event options. Which ones apply depends on the part's category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blink_speed: Option<usize>,
    #[serde(skip_serializing_if = "is_false")]
    pub ease_in: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub ease_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retro_mode: Option<RetroMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_mode: Option<WindowMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_mode: Option<TrunkMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flap_mode: Option<FlapMode>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Solid,
    Blink,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetroMode {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "close")]
    Close,
    /// Fold in, then back out.
    #[default]
    #[serde(rename = "roundtrip")]
    RoundTrip,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowMode {
    #[default]
    #[serde(rename = "window_dance")]
    Dance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrunkMode {
    #[default]
    #[serde(rename = "trunk_open")]
    Open,
    #[serde(rename = "trunk_close")]
    Close,
    /// Only meaningful after an `Open` segment; not checked here.
    #[serde(rename = "trunk_dance")]
    Dance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlapMode {
    #[default]
    #[serde(rename = "flap_open")]
    Open,
    #[serde(rename = "flap_close")]
    Close,
    /// Drives the port's LED ring.
    #[serde(rename = "flap_rainbow")]
    Rainbow,
}

/// Brightness parameters of a light or blinker event with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightParams {
    pub effect: Effect,
    /// Nominally 1..=100.
    pub power: u32,
    pub blink_speed: usize,
    pub ease_in: bool,
    pub ease_out: bool,
}

/// Category-specific view of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Light(LightParams),
    Retro(RetroMode),
    Window(WindowMode),
    Trunk(TrunkMode),
    Flap(FlapMode),
}

impl Payload {
    /// Length the editor gives a freshly placed event of this kind.
    pub fn default_duration_ms(&self) -> u64 {
        match self {
            Payload::Light(_) => DEFAULT_LIGHT_DURATION_MS,
            Payload::Retro(RetroMode::Open | RetroMode::Close) => 2_000,
            Payload::Retro(RetroMode::RoundTrip) => 4_000,
            Payload::Window(WindowMode::Dance) => DEFAULT_WINDOW_DURATION_MS,
            Payload::Trunk(TrunkMode::Open | TrunkMode::Close) => 13_000,
            Payload::Trunk(TrunkMode::Dance) => 5_000,
            Payload::Flap(FlapMode::Open | FlapMode::Close) => 2_000,
            Payload::Flap(FlapMode::Rainbow) => 5_000,
        }
    }
}

impl Event {
    pub fn new(part: impl Into<PartKey>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            part: part.into(),
            start_ms,
            end_ms,
            options: EventOptions::default(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.options.effect = Some(effect);
        self
    }

    pub fn with_power(mut self, power: u32) -> Self {
        self.options.power = Some(power);
        self
    }

    pub fn with_blink_speed(mut self, index: usize) -> Self {
        self.options.blink_speed = Some(index);
        self
    }

    pub fn with_ease(mut self, ease_in: bool, ease_out: bool) -> Self {
        self.options.ease_in = ease_in;
        self.options.ease_out = ease_out;
        self
    }

    pub fn with_retro_mode(mut self, mode: RetroMode) -> Self {
        self.options.retro_mode = Some(mode);
        self
    }

    pub fn with_trunk_mode(mut self, mode: TrunkMode) -> Self {
        self.options.trunk_mode = Some(mode);
        self
    }

    pub fn with_flap_mode(mut self, mode: FlapMode) -> Self {
        self.options.flap_mode = Some(mode);
        self
    }

    pub fn known_part(&self) -> Option<Part> {
        self.part.part()
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Half-open `[start, end)` membership test.
    pub fn is_active_at(&self, t_ms: u64) -> bool {
        t_ms >= self.start_ms && t_ms < self.end_ms
    }

    /// Resolves the typed payload for this event's part, or `None` when the
    /// part is not in the catalog.
    pub fn payload(&self) -> Option<Payload> {
        let part = self.known_part()?;
        let options = &self.options;
        let payload = match part.category() {
            Category::Light | Category::Blinker => Payload::Light(LightParams {
                effect: options.effect.unwrap_or_default(),
                power: options.power.unwrap_or(DEFAULT_POWER),
                blink_speed: options.blink_speed.unwrap_or_default(),
                ease_in: options.ease_in,
                ease_out: options.ease_out,
            }),
            Category::RetroMirror => Payload::Retro(options.retro_mode.unwrap_or_default()),
            Category::Window => Payload::Window(options.window_mode.unwrap_or_default()),
            Category::Trunk => Payload::Trunk(options.trunk_mode.unwrap_or_default()),
            Category::ChargeFlap => Payload::Flap(options.flap_mode.unwrap_or_default()),
        };
        Some(payload)
    }

    pub fn light_params(&self) -> Option<LightParams> {
        match self.payload()? {
            Payload::Light(params) => Some(params),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_editor_documents() {
        let raw = r#"{
            "id": "abc",
            "part": "light_left_back",
            "startMs": 30000,
            "endMs": 35000,
            "effect": "blink",
            "power": 40,
            "blinkSpeed": 2,
            "easeIn": true,
            "easeOut": false
        }"#;
        let event: Event = serde_json::from_str(raw).unwrap();
        assert_eq!(event.known_part(), Some(Part::LightLeftBack));
        assert_eq!(event.duration_ms(), 5_000);
        assert_eq!(
            event.light_params(),
            Some(LightParams {
                effect: Effect::Blink,
                power: 40,
                blink_speed: 2,
                ease_in: true,
                ease_out: false,
            })
        );
    }

    #[test]
    fn missing_options_take_editor_defaults() {
        let event: Event =
            serde_json::from_str(r#"{"part":"retro_left","startMs":0,"endMs":4000}"#).unwrap();
        assert_eq!(event.payload(), Some(Payload::Retro(RetroMode::RoundTrip)));

        let event = Event::new(Part::LightRightFront, 0, 10);
        let params = event.light_params().unwrap();
        assert_eq!(params.power, DEFAULT_POWER);
        assert_eq!(params.effect, Effect::Solid);
    }

    #[test]
    fn payload_follows_part_not_options() {
        let event = Event::new(Part::Trunk, 0, 100).with_retro_mode(RetroMode::Close);
        assert_eq!(event.payload(), Some(Payload::Trunk(TrunkMode::Open)));
    }

    #[test]
    fn unknown_parts_have_no_payload() {
        let event: Event =
            serde_json::from_str(r#"{"part":"frunk","startMs":0,"endMs":10}"#).unwrap();
        assert!(event.payload().is_none());
    }

    #[test]
    fn serializes_only_set_options() {
        let event = Event::new(Part::Flap, 5_000, 8_000).with_flap_mode(FlapMode::Rainbow);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "part": "flap",
                "startMs": 5000,
                "endMs": 8000,
                "flapMode": "flap_rainbow"
            })
        );
    }

    #[test]
    fn active_window_is_half_open() {
        let event = Event::new(Part::Flap, 100, 200);
        assert!(!event.is_active_at(99));
        assert!(event.is_active_at(100));
        assert!(event.is_active_at(199));
        assert!(!event.is_active_at(200));
    }

    #[test]
    fn default_durations_match_editor() {
        assert_eq!(Payload::Retro(RetroMode::RoundTrip).default_duration_ms(), 4_000);
        assert_eq!(Payload::Trunk(TrunkMode::Open).default_duration_ms(), 13_000);
        assert_eq!(Payload::Flap(FlapMode::Rainbow).default_duration_ms(), 5_000);
    }
}
