//! Chronological package event log.

use std::fmt;

use serde::Serialize;

use crate::models::{Address, PackageId, Time, TruckId};

/// What happened to a package.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Left the hub.
    Departed { truck: TruckId },
    /// The listed address was replaced.
    AddressCorrected { address: Address },
    /// Handed over at its address.
    Delivered { truck: TruckId },
    /// Delivered after its effective deadline.
    DeadlineMissed { deadline: Time },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Departed { truck } => write!(f, "departed on truck {truck}"),
            Self::AddressCorrected { address } => write!(f, "address corrected to {address}"),
            Self::Delivered { truck } => write!(f, "delivered by truck {truck}"),
            Self::DeadlineMissed { deadline } => write!(f, "missed deadline {deadline}"),
        }
    }
}

/// A timestamped package event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageEvent {
    package: PackageId,
    at: Time,
    #[serde(flatten)]
    kind: EventKind,
}

impl PackageEvent {
    /// Creates an event.
    pub fn new(package: PackageId, at: Time, kind: EventKind) -> Self {
        Self { package, at, kind }
    }

    /// Package the event belongs to.
    pub fn package(&self) -> PackageId {
        self.package
    }

    /// When it happened.
    pub fn at(&self) -> Time {
        self.at
    }

    /// What happened.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }
}

impl fmt::Display for PackageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} package {} {}", self.at, self.package, self.kind)
    }
}

/// Package events ordered by time. Events with equal times keep their
/// recording order.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Time;
/// use u_dispatch::simulation::{EventKind, EventLog, PackageEvent};
///
/// let mut log = EventLog::new();
/// log.record(PackageEvent::new(4, Time::hm(9, 10), EventKind::Delivered { truck: 2 }));
/// log.record(PackageEvent::new(4, Time::hm(9, 5), EventKind::Departed { truck: 2 }));
///
/// let latest = log.latest_at(4, Time::hm(9, 7)).unwrap();
/// assert_eq!(latest.kind(), &EventKind::Departed { truck: 2 });
/// assert_eq!(log.history(4).count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventLog {
    events: Vec<PackageEvent>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `event` after every event at or before its time.
    pub fn record(&mut self, event: PackageEvent) {
        let at = self.events.partition_point(|e| e.at <= event.at);
        self.events.insert(at, event);
    }

    /// All events in time order.
    pub fn events(&self) -> &[PackageEvent] {
        &self.events
    }

    /// Events of one package in time order.
    pub fn history(&self, package: PackageId) -> impl Iterator<Item = &PackageEvent> + '_ {
        self.events.iter().filter(move |e| e.package == package)
    }

    /// The last event of `package` at or before `time`.
    pub fn latest_at(&self, package: PackageId, time: Time) -> Option<&PackageEvent> {
        self.history(package).take_while(|e| e.at <= time).last()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
