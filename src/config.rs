//! Fleet configuration.
//!
//! A [`FleetConfig`] describes the trucks of a delivery day, their departure
//! rules, the average driving speed and how the simulator treats packages
//! whose address is not yet corrected. Validation orders the trucks for
//! dispatch: fixed departures by time (then id), followed by dependent trucks
//! once the truck they wait for is ordered.
//!
//! ```
//! use u_dispatch::config::FleetConfig;
//!
//! let config = FleetConfig::from_json(r#"{
//!     "speed_mph": 18,
//!     "mileage_limit": 140,
//!     "trucks": [
//!         {"id": 3, "capacity": 16, "departure": {"after_truck": {"truck": 1}}},
//!         {"id": 2, "capacity": 16, "departure": {"fixed": "09:05"}},
//!         {"id": 1, "capacity": 16, "departure": {"fixed": "08:00"}}
//!     ]
//! }"#).unwrap();
//!
//! let order: Vec<u32> = config.trucks().iter().map(|t| t.id()).collect();
//! assert_eq!(order, vec![1, 2, 3]);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{DepartureRule, Time, TruckId, TruckSpec};

/// Average truck speed of the standard day, in miles per hour.
pub const DEFAULT_SPEED_MPH: f64 = 18.0;

/// Packages per truck in the standard day.
pub const DEFAULT_CAPACITY: usize = 16;

/// Fleet mileage target of the standard day.
pub const DEFAULT_MILEAGE_LIMIT: f64 = 140.0;

/// What a truck does when only packages with a not-yet-corrected address
/// remain on board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionPolicy {
    /// Idle in place until the earliest correction takes effect.
    #[default]
    Wait,
    /// Abort the truck's run with `UnresolvableAddressState`.
    Fail,
}

/// Validated fleet configuration, trucks in dispatch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FleetConfigFile")]
pub struct FleetConfig {
    speed_mph: f64,
    correction_policy: CorrectionPolicy,
    mileage_limit: Option<f64>,
    trucks: Vec<TruckSpec>,
}

#[derive(Deserialize)]
struct FleetConfigFile {
    #[serde(default = "default_speed")]
    speed_mph: f64,
    #[serde(default)]
    correction_policy: CorrectionPolicy,
    #[serde(default)]
    mileage_limit: Option<f64>,
    trucks: Vec<TruckSpec>,
}

fn default_speed() -> f64 {
    DEFAULT_SPEED_MPH
}

impl TryFrom<FleetConfigFile> for FleetConfig {
    type Error = ConfigError;

    fn try_from(file: FleetConfigFile) -> Result<Self, Self::Error> {
        let mut config = FleetConfig::new(file.trucks, file.speed_mph)?
            .with_correction_policy(file.correction_policy);
        if let Some(limit) = file.mileage_limit {
            config = config.with_mileage_limit(limit)?;
        }
        Ok(config)
    }
}

impl FleetConfig {
    /// Validates `trucks` and orders them for dispatch.
    pub fn new(trucks: Vec<TruckSpec>, speed_mph: f64) -> Result<Self, ConfigError> {
        if !speed_mph.is_finite() || speed_mph <= 0.0 {
            return Err(ConfigError::InvalidSpeed(speed_mph));
        }
        Ok(Self {
            speed_mph,
            correction_policy: CorrectionPolicy::default(),
            mileage_limit: None,
            trucks: dispatch_order(trucks)?,
        })
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: FleetConfigFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    /// Sets the correction policy.
    pub fn with_correction_policy(mut self, policy: CorrectionPolicy) -> Self {
        self.correction_policy = policy;
        self
    }

    /// Sets the fleet mileage target reported against.
    pub fn with_mileage_limit(mut self, miles: f64) -> Result<Self, ConfigError> {
        if !miles.is_finite() || miles < 0.0 {
            return Err(ConfigError::InvalidMileageLimit(miles));
        }
        self.mileage_limit = Some(miles);
        Ok(self)
    }

    /// Average driving speed in miles per hour.
    pub fn speed_mph(&self) -> f64 {
        self.speed_mph
    }

    /// Correction policy.
    pub fn correction_policy(&self) -> CorrectionPolicy {
        self.correction_policy
    }

    /// Fleet mileage target, if any.
    pub fn mileage_limit(&self) -> Option<f64> {
        self.mileage_limit
    }

    /// Trucks in dispatch order.
    pub fn trucks(&self) -> &[TruckSpec] {
        &self.trucks
    }

    /// The truck with `id`.
    pub fn truck(&self, id: TruckId) -> Option<&TruckSpec> {
        self.trucks.iter().find(|t| t.id() == id)
    }

    /// Earliest time truck `id` could leave the hub.
    ///
    /// A fixed truck leaves at its time. A dependent truck cannot leave
    /// before the truck it waits for, plus its extra delay; the driving time
    /// of that truck is not known until its route is simulated, so this is a
    /// lower bound.
    pub fn earliest_departure(&self, id: TruckId) -> Option<Time> {
        let mut delay = 0.0;
        let mut truck = self.truck(id)?;
        for _ in 0..self.trucks.len() {
            match *truck.departure() {
                DepartureRule::Fixed(at) => return Some(at.plus_minutes(delay)),
                DepartureRule::AfterTruck {
                    truck: reference,
                    extra_delay,
                } => {
                    delay += extra_delay;
                    truck = self.truck(reference)?;
                }
            }
        }
        None
    }
}

impl Default for FleetConfig {
    /// Three trucks of 16 packages at 18 mph: truck 1 leaves at 08:00, truck 2
    /// at 09:05 when the delayed flight lands, truck 3 once truck 1's driver is
    /// back. Mileage target 140 miles.
    fn default() -> Self {
        Self {
            speed_mph: DEFAULT_SPEED_MPH,
            correction_policy: CorrectionPolicy::Wait,
            mileage_limit: Some(DEFAULT_MILEAGE_LIMIT),
            trucks: vec![
                TruckSpec::fixed(1, DEFAULT_CAPACITY, Time::hm(8, 0)),
                TruckSpec::fixed(2, DEFAULT_CAPACITY, Time::hm(9, 5)),
                TruckSpec::after(3, DEFAULT_CAPACITY, 1, 0.0),
            ],
        }
    }
}

fn dispatch_order(trucks: Vec<TruckSpec>) -> Result<Vec<TruckSpec>, ConfigError> {
    if trucks.is_empty() {
        return Err(ConfigError::NoTrucks);
    }
    let mut ids = HashSet::new();
    for truck in &trucks {
        if !ids.insert(truck.id()) {
            return Err(ConfigError::DuplicateTruck(truck.id()));
        }
        if truck.capacity() == 0 {
            return Err(ConfigError::ZeroCapacity(truck.id()));
        }
    }
    for truck in &trucks {
        if let DepartureRule::AfterTruck { truck: reference, extra_delay } =
            truck.departure()
        {
            if !ids.contains(reference) {
                return Err(ConfigError::UnknownTruck {
                    truck: truck.id(),
                    reference: *reference,
                });
            }
            if *reference == truck.id() {
                return Err(ConfigError::CyclicDeparture(truck.id()));
            }
            if !extra_delay.is_finite() || *extra_delay < 0.0 {
                return Err(ConfigError::InvalidDelay {
                    truck: truck.id(),
                    minutes: *extra_delay,
                });
            }
        }
    }

    let (mut ordered, mut pending): (Vec<TruckSpec>, Vec<TruckSpec>) = trucks
        .into_iter()
        .partition(|t| t.departure().fixed_time().is_some());
    ordered.sort_by(|a, b| {
        let (ta, tb) = (a.departure().fixed_time(), b.departure().fixed_time());
        ta.zip(tb)
            .map_or(std::cmp::Ordering::Equal, |(ta, tb)| ta.total_cmp(&tb))
            .then(a.id().cmp(&b.id()))
    });
    pending.sort_by_key(TruckSpec::id);

    while !pending.is_empty() {
        let ready = pending.iter().position(|t| {
            t.departure()
                .dependency()
                .is_some_and(|dep| ordered.iter().any(|o| o.id() == dep))
        });
        match ready {
            Some(i) => ordered.push(pending.remove(i)),
            None => return Err(ConfigError::CyclicDeparture(pending[0].id())),
        }
    }
    Ok(ordered)
}
