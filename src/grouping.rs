use std::collections::HashMap;

use serde::Serialize;

use crate::models::Event;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayGroup {
    pub day: String,
    pub venues: Vec<VenueGroup>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VenueGroup {
    pub venue: String,
    pub events: Vec<Event>,
}

/// Splits events into day tabs and, per day, venue tabs.
///
/// Days and venues appear in first-seen order and events keep their input
/// order, so the upstream sort survives grouping.
pub fn group_events(events: &[Event]) -> Vec<DayGroup> {
    let mut days: Vec<DayGroup> = Vec::new();
    let mut day_index: HashMap<&str, usize> = HashMap::new();
    let mut venue_index: HashMap<(usize, &str), usize> = HashMap::new();

    for event in events {
        let d = *day_index.entry(event.day.as_str()).or_insert_with(|| {
            days.push(DayGroup {
                day: event.day.clone(),
                venues: Vec::new(),
            });
            days.len() - 1
        });
        let venues = &mut days[d].venues;
        let v = *venue_index
            .entry((d, event.local.as_str()))
            .or_insert_with(|| {
                venues.push(VenueGroup {
                    venue: event.local.clone(),
                    events: Vec::new(),
                });
                venues.len() - 1
            });
        venues[v].events.push(event.clone());
    }

    days
}

/// Distinct venues of `day`, first-seen order.
pub fn venues_for_day(events: &[Event], day: &str) -> Vec<String> {
    let mut venues: Vec<String> = Vec::new();
    for event in events.iter().filter(|event| event.day == day) {
        if !venues.iter().any(|venue| venue == &event.local) {
            venues.push(event.local.clone());
        }
    }
    venues
}
