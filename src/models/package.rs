//! Package records and delivery status.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Constraint, Deadline, Time, TruckId};
use crate::error::RoutingError;

/// Stable package identifier.
pub type PackageId = u32;

/// A street address.
///
/// Only `street` is used to look up distances; the other fields are carried
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street line, the key into the distance graph.
    pub street: String,
    /// City.
    pub city: String,
    /// State or region.
    pub state: String,
    /// Postal code.
    pub zip: String,
}

impl Address {
    /// Creates a full address.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    /// Creates an address with only a street line.
    pub fn street(street: impl Into<String>) -> Self {
        Self::new(street, "", "", "")
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.street)?;
        if !self.city.is_empty() {
            write!(f, ", {}", self.city)?;
        }
        if !self.state.is_empty() {
            write!(f, ", {}", self.state)?;
        }
        if !self.zip.is_empty() {
            write!(f, " {}", self.zip)?;
        }
        Ok(())
    }
}

/// Where a package is in its delivery lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    /// Waiting at the hub.
    AtHub,
    /// Loaded on a truck that has departed.
    EnRoute,
    /// Handed over at its address.
    Delivered,
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PackageStatus::AtHub => "at the hub",
            PackageStatus::EnRoute => "en route",
            PackageStatus::Delivered => "delivered",
        })
    }
}

/// A package and its mutable delivery state.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Address, Constraint, Deadline, Package, PackageStatus, Time};
///
/// let p = Package::new(6, Address::street("3060 Lester St"), Deadline::At(Time::hm(10, 30)), 88)
///     .with_notes("Delayed on flight---will not arrive to depot until 9:05 am")
///     .with_constraint(Constraint::MinDelay(Time::hm(9, 5)));
///
/// assert_eq!(p.min_delay(), Some(Time::hm(9, 5)));
/// assert_eq!(p.status_at(Time::hm(12, 0)), PackageStatus::AtHub);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    id: PackageId,
    address: Address,
    deadline: Deadline,
    weight: u32,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    constraints: Vec<Constraint>,
    #[serde(skip)]
    truck: Option<TruckId>,
    #[serde(skip)]
    departure: Option<Time>,
    #[serde(skip)]
    delivery: Option<Time>,
    #[serde(skip)]
    deadline_missed: bool,
}

impl Package {
    /// Creates an unassigned package at the hub.
    pub fn new(id: PackageId, address: Address, deadline: Deadline, weight: u32) -> Self {
        Self {
            id,
            address,
            deadline,
            weight,
            notes: String::new(),
            constraints: Vec::new(),
            truck: None,
            departure: None,
            delivery: None,
            deadline_missed: false,
        }
    }

    /// Sets the free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Adds a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Package id.
    pub fn id(&self) -> PackageId {
        self.id
    }

    /// Address as listed on the record.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Declared deadline.
    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Weight in kilograms.
    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Free-text notes.
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Typed constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Truck this package was assigned to.
    pub fn truck(&self) -> Option<TruckId> {
        self.truck
    }

    /// When the carrying truck left the hub.
    pub fn departure(&self) -> Option<Time> {
        self.departure
    }

    /// When the package was delivered.
    pub fn delivery(&self) -> Option<Time> {
        self.delivery
    }

    /// `true` if the package was delivered after its effective deadline.
    pub fn deadline_missed(&self) -> bool {
        self.deadline_missed
    }

    /// Final status once the simulation has run.
    pub fn status(&self) -> PackageStatus {
        if self.delivery.is_some() {
            PackageStatus::Delivered
        } else if self.departure.is_some() {
            PackageStatus::EnRoute
        } else {
            PackageStatus::AtHub
        }
    }

    /// Status at simulated time `time`.
    pub fn status_at(&self, time: Time) -> PackageStatus {
        match (self.departure, self.delivery) {
            (None, _) => PackageStatus::AtHub,
            (Some(departed), _) if time < departed => PackageStatus::AtHub,
            (Some(_), Some(delivered)) if time >= delivered => PackageStatus::Delivered,
            (Some(_), _) => PackageStatus::EnRoute,
        }
    }

    /// The earlier of the declared deadline and any `Deadline` constraint.
    pub fn effective_deadline(&self) -> Option<Time> {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::Deadline(t) => Some(*t),
                _ => None,
            })
            .chain(self.deadline.time())
            .reduce(Time::min)
    }

    /// Latest `MinDelay` constraint, if any.
    pub fn min_delay(&self) -> Option<Time> {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::MinDelay(t) => Some(*t),
                _ => None,
            })
            .reduce(Time::max)
    }

    /// Trucks named by `RequiresTruck` constraints.
    pub fn required_trucks(&self) -> impl Iterator<Item = TruckId> + '_ {
        self.constraints.iter().filter_map(|c| match c {
            Constraint::RequiresTruck(id) => Some(*id),
            _ => None,
        })
    }

    /// Packages named by `LinkedWith` constraints.
    pub fn linked(&self) -> impl Iterator<Item = PackageId> + '_ {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::LinkedWith(ids) => Some(ids.iter().copied()),
                _ => None,
            })
            .flatten()
    }

    /// The address correction, if any. With several, the latest one wins.
    pub fn correction(&self) -> Option<(Time, &Address)> {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::AddressCorrection { at, address } => Some((*at, address)),
                _ => None,
            })
            .reduce(|a, b| if b.0 >= a.0 { b } else { a })
    }

    /// Address known to be valid at `time`.
    ///
    /// Before a correction takes effect this is the listed address, even
    /// though it is known to be wrong.
    pub fn address_at(&self, time: Time) -> &Address {
        match self.correction() {
            Some((at, corrected)) if time >= at => corrected,
            _ => &self.address,
        }
    }

    pub(crate) fn assign(&mut self, truck: TruckId) {
        self.truck = Some(truck);
    }

    pub(crate) fn depart(&mut self, truck: TruckId, at: Time) -> Result<(), RoutingError> {
        if self.departure.is_some() {
            return Err(RoutingError::InvalidTransition {
                package: self.id,
                reason: "already departed",
            });
        }
        self.truck = Some(truck);
        self.departure = Some(at);
        Ok(())
    }

    pub(crate) fn deliver(&mut self, at: Time) -> Result<(), RoutingError> {
        let departed = self.departure.ok_or(RoutingError::InvalidTransition {
            package: self.id,
            reason: "delivered before departing",
        })?;
        if self.delivery.is_some() {
            return Err(RoutingError::InvalidTransition {
                package: self.id,
                reason: "already delivered",
            });
        }
        if at < departed {
            return Err(RoutingError::InvalidTransition {
                package: self.id,
                reason: "delivery time precedes departure",
            });
        }
        self.delivery = Some(at);
        Ok(())
    }

    pub(crate) fn flag_deadline_missed(&mut self) {
        self.deadline_missed = true;
    }
}
