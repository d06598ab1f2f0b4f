// Rolling statistics over the attack buffer
//
// Groups buffered events by source country, destination country and
// attack type. Rankings are ordered by count (descending); ties keep the
// order in which each group first appears in the buffer.
//
// Two equivalent paths produce a StatsSnapshot:
// - `compute` recomputes everything from the buffer contents
// - `StatsAccumulator` is updated on every append/eviction
// Both must yield identical output for the same buffer contents.

pub mod buffer;

pub use buffer::RollingBuffer;

use crate::feed::{AttackEvent, TodayStats};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// Group label used when a country or attack type is missing
pub const UNKNOWN_GROUP: &str = "Unknown";

/// A ranked group and its event count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub label: String,
    pub count: u64,
}

/// Derived statistics for the current session
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Number of events in the buffer
    pub total: usize,
    /// Events per minute since the observation start (0 on clock skew)
    pub events_per_minute: f64,
    pub top_source_countries: Vec<GroupCount>,
    pub top_destination_countries: Vec<GroupCount>,
    pub attack_types: Vec<GroupCount>,
    /// Daily aggregate supplied by the event source, if any
    pub today: Option<TodayStats>,
}

impl StatsSnapshot {
    /// Attach (or replace) the daily overlay
    pub fn with_today(mut self, today: Option<TodayStats>) -> Self {
        self.today = today;
        self
    }

    /// Country ranking to display: the daily overlay replaces the
    /// session-derived source countries when present
    pub fn country_ranking(&self) -> Vec<GroupCount> {
        match &self.today {
            Some(today) => today
                .countries
                .iter()
                .map(|c| GroupCount {
                    label: c.country.clone(),
                    count: c.count,
                })
                .collect(),
            None => self.top_source_countries.clone(),
        }
    }
}

fn source_country(event: &AttackEvent) -> &str {
    event.src.country.as_deref().unwrap_or(UNKNOWN_GROUP)
}

fn destination_country(event: &AttackEvent) -> &str {
    event.dst.country.as_deref().unwrap_or(UNKNOWN_GROUP)
}

fn attack_type(event: &AttackEvent) -> &str {
    event.attack_type.as_deref().unwrap_or(UNKNOWN_GROUP)
}

/// Events per minute elapsed since `start`, 0 when no time has elapsed
pub fn events_per_minute(count: usize, start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed_ms = now.signed_duration_since(start).num_milliseconds();
    if elapsed_ms <= 0 {
        return 0.0;
    }
    count as f64 / (elapsed_ms as f64 / 60_000.0)
}

/// Recompute statistics from the buffer contents (oldest first)
pub fn compute<'a, I>(events: I, observation_start: DateTime<Utc>, now: DateTime<Utc>) -> StatsSnapshot
where
    I: IntoIterator<Item = &'a AttackEvent>,
{
    let mut total = 0;
    let mut sources = FirstSeenCounter::default();
    let mut destinations = FirstSeenCounter::default();
    let mut types = FirstSeenCounter::default();

    for event in events {
        total += 1;
        sources.add(source_country(event));
        destinations.add(destination_country(event));
        types.add(attack_type(event));
    }

    StatsSnapshot {
        total,
        events_per_minute: events_per_minute(total, observation_start, now),
        top_source_countries: sources.ranked(),
        top_destination_countries: destinations.ranked(),
        attack_types: types.ranked(),
        today: None,
    }
}

/// Counts groups in first-seen order (used by the full recompute)
#[derive(Default)]
struct FirstSeenCounter<'a> {
    index: HashMap<&'a str, usize>,
    groups: Vec<GroupCount>,
}

impl<'a> FirstSeenCounter<'a> {
    fn add(&mut self, label: &'a str) {
        match self.index.get(label) {
            Some(&i) => self.groups[i].count += 1,
            None => {
                self.index.insert(label, self.groups.len());
                self.groups.push(GroupCount {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    fn ranked(mut self) -> Vec<GroupCount> {
        // Stable sort keeps first-seen order among equal counts
        self.groups.sort_by(|a, b| b.count.cmp(&a.count));
        self.groups
    }
}

/// Per-group sequence numbers of the buffered events, oldest first
///
/// The buffer evicts in FIFO order, so the event leaving a group is
/// always that group's oldest one.
#[derive(Debug, Clone, Default)]
struct GroupTracker {
    groups: HashMap<String, VecDeque<u64>>,
}

impl GroupTracker {
    fn record(&mut self, label: &str, seq: u64) {
        self.groups.entry(label.to_string()).or_default().push_back(seq);
    }

    fn evict(&mut self, label: &str) {
        if let Some(seqs) = self.groups.get_mut(label) {
            seqs.pop_front();
            if seqs.is_empty() {
                self.groups.remove(label);
            }
        }
    }

    fn ranked(&self) -> Vec<GroupCount> {
        let mut entries: Vec<(&String, u64, u64)> = self
            .groups
            .iter()
            .filter_map(|(label, seqs)| seqs.front().map(|first| (label, seqs.len() as u64, *first)))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        entries
            .into_iter()
            .map(|(label, count, _)| GroupCount {
                label: label.clone(),
                count,
            })
            .collect()
    }
}

/// Incrementally maintained statistics
///
/// Every event appended to the buffer must be recorded, and every
/// evicted event must be evicted here, in the same order.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    next_seq: u64,
    total: usize,
    sources: GroupTracker,
    destinations: GroupTracker,
    types: GroupTracker,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: &AttackEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.total += 1;
        self.sources.record(source_country(event), seq);
        self.destinations.record(destination_country(event), seq);
        self.types.record(attack_type(event), seq);
    }

    pub fn evict(&mut self, event: &AttackEvent) {
        self.total = self.total.saturating_sub(1);
        self.sources.evict(source_country(event));
        self.destinations.evict(destination_country(event));
        self.types.evict(attack_type(event));
    }

    pub fn snapshot(&self, observation_start: DateTime<Utc>, now: DateTime<Utc>) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total,
            events_per_minute: events_per_minute(self.total, observation_start, now),
            top_source_countries: self.sources.ranked(),
            top_destination_countries: self.destinations.ranked(),
            attack_types: self.types.ranked(),
            today: None,
        }
    }
}
