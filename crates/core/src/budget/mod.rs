//! Advisory command budget per closure part.
//!
//! The vehicle caps how many closure commands a show may issue per part. This
//! module only counts; deciding whether to block an export belongs to the
//! caller.

use std::collections::BTreeMap;

use crate::{
    event::{Event, Payload, RetroMode},
    mapping::Part,
};

/// Window dances longer than this risk thermal protection on the motors.
pub const WINDOW_DANCE_ADVISORY_MS: u64 = 30_000;

/// Commands an event consumes from its part's budget.
///
/// A mirror round-trip issues both a close and an open; every other closure
/// event costs one. Lights and unknown parts cost nothing.
pub fn command_cost(event: &Event) -> u32 {
    match event.payload() {
        Some(Payload::Retro(RetroMode::RoundTrip)) => 2,
        Some(Payload::Light(_)) | None => 0,
        Some(_) => 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartUsage {
    pub part: Part,
    pub used: u32,
    pub limit: u32,
}

impl PartUsage {
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.used)
    }

    pub fn is_over_limit(&self) -> bool {
        self.used > self.limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongDance {
    pub part: Part,
    pub start_ms: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetReport {
    /// One entry per closure part with at least one event, in catalog order.
    pub usage: Vec<PartUsage>,
    pub long_dances: Vec<LongDance>,
}

impl BudgetReport {
    pub fn tally(events: &[Event]) -> Self {
        let mut used: BTreeMap<Part, u32> = BTreeMap::new();
        let mut long_dances = Vec::new();

        for event in events {
            let cost = command_cost(event);
            let Some(part) = event.known_part().filter(|_| cost > 0) else {
                continue;
            };
            *used.entry(part).or_default() += cost;

            if matches!(event.payload(), Some(Payload::Window(_)))
                && event.duration_ms() > WINDOW_DANCE_ADVISORY_MS
            {
                long_dances.push(LongDance {
                    part,
                    start_ms: event.start_ms,
                    duration_ms: event.duration_ms(),
                });
            }
        }

        let usage = used
            .into_iter()
            .filter_map(|(part, used)| {
                let limit = part.spec().command_limit?;
                Some(PartUsage { part, used, limit })
            })
            .collect::<Vec<_>>();

        for entry in usage.iter().filter(|entry| entry.is_over_limit()) {
            tracing::warn!(
                part = %entry.part,
                used = entry.used,
                limit = entry.limit,
                "closure command budget exceeded"
            );
        }
        for dance in &long_dances {
            tracing::warn!(
                part = %dance.part,
                start_ms = dance.start_ms,
                duration_ms = dance.duration_ms,
                "window dance exceeds recommended length"
            );
        }

        Self { usage, long_dances }
    }

    pub fn usage_for(&self, part: Part) -> Option<&PartUsage> {
        self.usage.iter().find(|entry| entry.part == part)
    }

    pub fn over_limit(&self) -> impl Iterator<Item = &PartUsage> {
        self.usage.iter().filter(|entry| entry.is_over_limit())
    }

    pub fn is_within_limits(&self) -> bool {
        self.over_limit().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FlapMode;

    #[test]
    fn round_trip_costs_two() {
        let events = [
            Event::new(Part::RetroLeft, 0, 4_000),
            Event::new(Part::RetroLeft, 5_000, 7_000).with_retro_mode(RetroMode::Open),
        ];
        let report = BudgetReport::tally(&events);
        let usage = report.usage_for(Part::RetroLeft).unwrap();
        assert_eq!(usage.used, 3);
        assert_eq!(usage.limit, 20);
        assert_eq!(usage.remaining(), 17);
    }

    #[test]
    fn lights_do_not_count() {
        let events = [Event::new(Part::LightLeftFront, 0, 100)];
        let report = BudgetReport::tally(&events);
        assert!(report.usage.is_empty());
        assert!(report.is_within_limits());
    }

    #[test]
    fn flags_parts_over_their_limit() {
        let events: Vec<Event> = (0..4)
            .map(|i| Event::new(Part::Flap, i * 3_000, i * 3_000 + 2_000).with_flap_mode(FlapMode::Open))
            .collect();
        let report = BudgetReport::tally(&events);
        let over: Vec<_> = report.over_limit().collect();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].part, Part::Flap);
        assert_eq!(over[0].used, 4);
        assert_eq!(over[0].remaining(), 0);
    }

    #[test]
    fn reports_long_window_dances() {
        let events = [
            Event::new(Part::WindowLeftFront, 0, 30_000),
            Event::new(Part::WindowLeftBack, 0, 30_001),
        ];
        let report = BudgetReport::tally(&events);
        assert_eq!(report.long_dances.len(), 1);
        assert_eq!(report.long_dances[0].part, Part::WindowLeftBack);
    }
}
