//! Truck descriptors and departure rules.

use serde::{Deserialize, Serialize};

use super::Time;

/// Truck identifier.
pub type TruckId = u32;

/// When a truck may leave the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureRule {
    /// Leaves at a fixed time of day.
    Fixed(Time),
    /// Leaves once another truck is back at the hub, plus an extra delay.
    ///
    /// The departure is also held until every package on board is
    /// available and has a valid address.
    AfterTruck {
        /// Truck whose return frees a driver.
        truck: TruckId,
        /// Minutes to wait after that truck returns.
        #[serde(default)]
        extra_delay: f64,
    },
}

impl DepartureRule {
    /// The departure time if it is known before any route is simulated.
    pub fn fixed_time(&self) -> Option<Time> {
        match self {
            DepartureRule::Fixed(t) => Some(*t),
            DepartureRule::AfterTruck { .. } => None,
        }
    }

    /// The truck this departure waits for, if any.
    pub fn dependency(&self) -> Option<TruckId> {
        match self {
            DepartureRule::Fixed(_) => None,
            DepartureRule::AfterTruck { truck, .. } => Some(*truck),
        }
    }

    /// Returns `true` if a truck under this rule can wait until `time`.
    ///
    /// Fixed departures only qualify when they are not earlier than `time`.
    pub fn can_leave_at_or_after(&self, time: Time) -> bool {
        self.fixed_time().map_or(true, |t| t >= time)
    }
}

/// A truck in the fleet.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{DepartureRule, Time, TruckSpec};
///
/// let t1 = TruckSpec::fixed(1, 16, Time::hm(8, 0));
/// let t3 = TruckSpec::after(3, 16, 1, 0.0);
/// assert_eq!(t1.departure().fixed_time(), Some(Time::hm(8, 0)));
/// assert_eq!(t3.departure().dependency(), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckSpec {
    id: TruckId,
    capacity: usize,
    departure: DepartureRule,
}

impl TruckSpec {
    /// Creates a truck with the given id, capacity and departure rule.
    pub fn new(id: TruckId, capacity: usize, departure: DepartureRule) -> Self {
        Self {
            id,
            capacity,
            departure,
        }
    }

    /// A truck leaving at a fixed time.
    pub fn fixed(id: TruckId, capacity: usize, at: Time) -> Self {
        Self::new(id, capacity, DepartureRule::Fixed(at))
    }

    /// A truck leaving `extra_delay` minutes after `truck` returns.
    pub fn after(id: TruckId, capacity: usize, truck: TruckId, extra_delay: f64) -> Self {
        Self::new(id, capacity, DepartureRule::AfterTruck { truck, extra_delay })
    }

    /// Truck id.
    pub fn id(&self) -> TruckId {
        self.id
    }

    /// Maximum packages per trip.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Departure rule.
    pub fn departure(&self) -> &DepartureRule {
        &self.departure
    }
}
