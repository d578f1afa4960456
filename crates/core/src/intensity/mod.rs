//! Brightness of light and blinker events at a point in show time.

use crate::event::{Effect, Event, LightParams};

/// Upper bound on the ease ramp length.
pub const EASE_CAP_MS: f64 = 300.0;
/// Share of the event duration spent ramping when easing is enabled.
pub const EASE_FRACTION: f64 = 0.3;

/// Full on+off blink cycle per speed index.
pub const BLINK_PERIODS_MS: [u32; 3] = [80, 50, 30];

/// Blink period for a speed index. Out-of-range indices use the slowest speed.
pub fn blink_period_ms(index: usize) -> u32 {
    BLINK_PERIODS_MS
        .get(index)
        .copied()
        .unwrap_or(BLINK_PERIODS_MS[0])
}

/// Length of the ease-in/ease-out ramp for an event of the given duration.
pub fn ease_duration_ms(duration_ms: u64) -> f64 {
    (duration_ms as f64 * EASE_FRACTION).min(EASE_CAP_MS)
}

/// Brightness in `[0, 1]` of a light or blinker event at `t_ms`.
///
/// Returns 0 outside `[start, end)` and for events whose part does not carry
/// brightness.
pub fn intensity(event: &Event, t_ms: u64) -> f64 {
    match event.light_params() {
        Some(params) => intensity_with(event, &params, t_ms),
        None => 0.0,
    }
}

pub(crate) fn intensity_with(event: &Event, params: &LightParams, t_ms: u64) -> f64 {
    if !event.is_active_at(t_ms) {
        return 0.0;
    }

    let elapsed = (t_ms - event.start_ms) as f64;
    let remaining = (event.end_ms - t_ms) as f64;
    let ease = ease_duration_ms(event.duration_ms());

    let mut value = params.power as f64 / 100.0;
    if ease > 0.0 {
        if params.ease_in && elapsed < ease {
            value *= elapsed / ease;
        }
        if params.ease_out && remaining < ease {
            value *= remaining / ease;
        }
    }

    if params.effect == Effect::Blink {
        let half_period = blink_period_ms(params.blink_speed) as f64 / 2.0;
        if (elapsed / half_period).floor() as u64 % 2 == 1 {
            return 0.0;
        }
    }

    value
}

/// Converts a unit intensity to a channel byte, rounding half up.
pub fn to_byte(intensity: f64) -> u8 {
    (intensity * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Effect;
    use crate::mapping::Part;

    fn solid(power: u32, start: u64, end: u64) -> Event {
        Event::new(Part::LightLeftFront, start, end).with_power(power)
    }

    #[test]
    fn solid_is_flat_inside_and_zero_outside() {
        let event = solid(60, 100, 300);
        assert_eq!(intensity(&event, 99), 0.0);
        for t in 100..300 {
            assert!((intensity(&event, t) - 0.6).abs() < 1e-12);
        }
        assert_eq!(intensity(&event, 300), 0.0);
    }

    #[test]
    fn ease_in_ramps_up_to_full_value() {
        let event = solid(100, 0, 5_000).with_ease(true, false);
        let ease = ease_duration_ms(event.duration_ms());
        assert_eq!(ease, EASE_CAP_MS);

        let mut previous = 0.0;
        for t in 0..=ease as u64 {
            let value = intensity(&event, t);
            assert!(value >= previous);
            previous = value;
        }
        assert_eq!(intensity(&event, 0), 0.0);
        assert_eq!(intensity(&event, ease as u64), 1.0);
    }

    #[test]
    fn ease_out_ramps_down_at_tail() {
        let event = solid(100, 0, 1_000).with_ease(false, true);
        let ease = ease_duration_ms(event.duration_ms());
        let tail_start = 1_000 - ease as u64;
        assert_eq!(intensity(&event, tail_start), 1.0);

        let mut previous = 1.0;
        for t in tail_start..1_000 {
            let value = intensity(&event, t);
            assert!(value <= previous);
            previous = value;
        }
        assert!(intensity(&event, 999) < 0.01);
    }

    #[test]
    fn short_events_scale_ease_with_duration() {
        assert_eq!(ease_duration_ms(100), 30.0);
        assert_eq!(ease_duration_ms(0), 0.0);
    }

    #[test]
    fn blink_alternates_every_half_period() {
        let event = solid(100, 1_000, 2_000)
            .with_effect(Effect::Blink)
            .with_blink_speed(1);
        let half = blink_period_ms(1) as u64 / 2;
        assert_eq!(intensity(&event, 1_000), 1.0);
        assert_eq!(intensity(&event, 1_000 + half - 1), 1.0);
        assert_eq!(intensity(&event, 1_000 + half), 0.0);
        assert_eq!(intensity(&event, 1_000 + 2 * half), 1.0);
    }

    #[test]
    fn blink_off_phase_overrides_easing() {
        let event = solid(100, 0, 1_000)
            .with_effect(Effect::Blink)
            .with_ease(true, true);
        assert_eq!(intensity(&event, 50), 0.0);
        let on = intensity(&event, 90);
        assert!(on > 0.0 && on < 1.0);
    }

    #[test]
    fn unknown_blink_speed_uses_slowest() {
        assert_eq!(blink_period_ms(9), 80);
    }

    #[test]
    fn closure_parts_have_no_brightness() {
        let event = Event::new(Part::Trunk, 0, 1_000);
        assert_eq!(intensity(&event, 10), 0.0);
    }

    #[test]
    fn byte_conversion_rounds_half_up() {
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(0.5), 128);
        assert_eq!(to_byte(0.8), 204);
        assert_eq!(to_byte(0.0), 0);
    }
}
