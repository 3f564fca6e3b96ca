//! Error types for every stage of a delivery-day simulation.
//!
//! Store, assignment and configuration errors are fatal for the whole run.
//! Routing errors abort only the truck they occur on and are collected in the
//! [`DeliveryReport`](crate::simulation::DeliveryReport). Deadline misses are
//! not errors at all; they are reported as
//! [`DeadlineViolation`](crate::simulation::DeadlineViolation)s.

use thiserror::Error;

use crate::models::{Constraint, PackageId, Time, TruckId};

/// Failures of the package hash table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A record with this id is already stored.
    #[error("package {0} is already stored")]
    DuplicateKey(PackageId),
    /// No record with this id exists.
    #[error("package {0} not found")]
    NotFound(PackageId),
}

/// Fatal failures while partitioning packages across trucks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssignmentError {
    /// Two members of one linked unit require different trucks.
    #[error(
        "package {package} requires truck {second} but its linked group is already pinned to truck {first}"
    )]
    ConflictingTruckRequirement {
        /// Member whose requirement conflicts.
        package: PackageId,
        /// Truck required by an earlier member.
        first: TruckId,
        /// Truck required by `package`.
        second: TruckId,
    },
    /// A linked group cannot travel together.
    #[error("linked group containing package {package} cannot be placed: {reason}")]
    UnsatisfiableLinkage {
        /// Lowest member id of the group.
        package: PackageId,
        /// Human-readable cause.
        reason: String,
    },
    /// A package fits on no truck without breaking capacity or a constraint.
    #[error("package {package} cannot be assigned{}: {reason}", .truck.map(|t| format!(" to truck {t}")).unwrap_or_default())]
    UnsatisfiableAssignment {
        /// Package that could not be placed.
        package: PackageId,
        /// Truck involved, if the failure concerns a specific one.
        truck: Option<TruckId>,
        /// Constraint that could not be honored, if any.
        constraint: Option<Constraint>,
        /// Human-readable cause.
        reason: String,
    },
    /// The store rejected a lookup or update.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures while simulating one truck's route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// A delivery address is missing from the distance graph.
    #[error("truck {truck}: address {address:?} of package {package} is not in the distance graph")]
    AddressNotFound {
        /// Truck carrying the package.
        truck: TruckId,
        /// Package with the unknown address.
        package: PackageId,
        /// The address as written on the record.
        address: String,
    },
    /// Only packages with a not-yet-valid address remain on the truck.
    #[error("truck {truck}: package {package} has no valid address until {valid_from}")]
    UnresolvableAddressState {
        /// Truck carrying the package.
        truck: TruckId,
        /// Package whose address is not yet corrected.
        package: PackageId,
        /// Time at which the correction takes effect.
        valid_from: Time,
    },
    /// The truck this one departs after did not complete its run.
    #[error("truck {truck} cannot depart: truck {dependency} did not return")]
    DependencyFailed {
        /// Dependent truck.
        truck: TruckId,
        /// Truck it waits for.
        dependency: TruckId,
    },
    /// A package lifecycle update arrived out of order.
    #[error("package {package}: {reason}")]
    InvalidTransition {
        /// Package being updated.
        package: PackageId,
        /// What was wrong with the update.
        reason: &'static str,
    },
    /// The store rejected a lookup or update.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Invalid distance matrix input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// No addresses were supplied.
    #[error("distance graph has no addresses")]
    Empty,
    /// A row does not have one entry per address.
    #[error("row {row} has {found} distances, expected {expected}")]
    RowLength {
        /// Row index.
        row: usize,
        /// Entries found.
        found: usize,
        /// Entries expected.
        expected: usize,
    },
    /// A distance is negative, NaN or infinite.
    #[error("distance from {from:?} to {to:?} is not a finite non-negative number: {value}")]
    InvalidDistance {
        /// Origin address.
        from: String,
        /// Destination address.
        to: String,
        /// Offending value.
        value: f64,
    },
    /// A distance is missing in both directions.
    #[error("no distance between {from:?} and {to:?}")]
    MissingDistance {
        /// Origin address.
        from: String,
        /// Destination address.
        to: String,
    },
    /// An address is not at distance zero from itself.
    #[error("address {0:?} is not at distance zero from itself")]
    NonZeroDiagonal(String),
    /// `distance(a, b) != distance(b, a)`.
    #[error("distance between {a:?} and {b:?} is not symmetric")]
    Asymmetric {
        /// First address.
        a: String,
        /// Second address.
        b: String,
    },
    /// Two addresses normalize to the same key.
    #[error("address {0:?} appears more than once")]
    DuplicateAddress(String),
}

/// Invalid fleet configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for this schema.
    #[error("failed to parse fleet configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The fleet has no trucks.
    #[error("fleet has no trucks")]
    NoTrucks,
    /// Two trucks share an id.
    #[error("truck {0} is defined more than once")]
    DuplicateTruck(TruckId),
    /// A truck cannot carry anything.
    #[error("truck {0} has zero capacity")]
    ZeroCapacity(TruckId),
    /// Average speed must be finite and positive.
    #[error("average speed {0} mph is not a positive number")]
    InvalidSpeed(f64),
    /// A departure delay must be finite and non-negative.
    #[error("truck {truck} has an invalid extra departure delay of {minutes} minutes")]
    InvalidDelay {
        /// Truck with the bad rule.
        truck: TruckId,
        /// Offending value.
        minutes: f64,
    },
    /// The mileage limit must be finite and non-negative.
    #[error("mileage limit {0} is not a non-negative number")]
    InvalidMileageLimit(f64),
    /// A departure rule references a truck that does not exist.
    #[error("truck {truck} departs after unknown truck {reference}")]
    UnknownTruck {
        /// Truck with the bad rule.
        truck: TruckId,
        /// Missing reference.
        reference: TruckId,
    },
    /// Departure rules form a cycle.
    #[error("departure of truck {0} depends on itself")]
    CyclicDeparture(TruckId),
}

/// A time-of-day string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time of day {input:?}")]
pub struct TimeParseError {
    input: String,
}

impl TimeParseError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Any failure surfaced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`StoreError`].
    #[error(transparent)]
    Store(#[from] StoreError),
    /// See [`AssignmentError`].
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    /// See [`RoutingError`].
    #[error(transparent)]
    Routing(#[from] RoutingError),
    /// See [`GraphError`].
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`TimeParseError`].
    #[error(transparent)]
    Time(#[from] TimeParseError),
}
