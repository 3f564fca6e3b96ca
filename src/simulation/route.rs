//! Nearest-neighbor route simulation for a single truck.
//!
//! # Algorithm
//!
//! Starting at the hub, repeatedly drive to the closest address among the
//! packages that are deliverable right now, and deliver every deliverable
//! package at that address on arrival. Ties between equally close addresses go
//! to the one holding the lowest package id. After the last delivery the truck
//! drives back to the hub.
//!
//! A package with an address correction is deliverable only once the
//! correction has taken effect, and only to the corrected address. If nothing
//! else is left on board, the [`CorrectionPolicy`] decides whether the truck
//! waits for the correction or gives up.
//!
//! # Complexity
//!
//! O(n²) for n packages on board.

use log::debug;
use serde::Serialize;

use crate::config::{CorrectionPolicy, FleetConfig};
use crate::distance::{DistanceGraph, HUB};
use crate::error::{ConfigError, RoutingError};
use crate::models::{Address, PackageId, Time, TruckId, MINUTES_PER_HOUR};
use crate::store::PackageStore;

use super::trace::MileageTrace;

/// A delivery stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    location: usize,
    address: String,
    arrival: Time,
    miles: f64,
    packages: Vec<PackageId>,
}

impl Stop {
    /// Graph index of the stop.
    pub fn location(&self) -> usize {
        self.location
    }

    /// Graph address of the stop.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Arrival time, which is also the delivery time of every package here.
    pub fn arrival(&self) -> Time {
        self.arrival
    }

    /// Cumulative miles on arrival.
    pub fn miles(&self) -> f64 {
        self.miles
    }

    /// Packages delivered here, ascending.
    pub fn packages(&self) -> &[PackageId] {
        &self.packages
    }
}

/// A package delivered after its effective deadline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeadlineViolation {
    package: PackageId,
    truck: TruckId,
    deadline: Time,
    delivered: Time,
}

impl DeadlineViolation {
    /// Late package.
    pub fn package(&self) -> PackageId {
        self.package
    }

    /// Truck that delivered it.
    pub fn truck(&self) -> TruckId {
        self.truck
    }

    /// Effective deadline.
    pub fn deadline(&self) -> Time {
        self.deadline
    }

    /// Actual delivery time.
    pub fn delivered(&self) -> Time {
        self.delivered
    }

    /// Minutes past the deadline.
    pub fn lateness(&self) -> f64 {
        self.deadline.minutes_until(self.delivered)
    }
}

/// The planned or completed trip of one truck.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TruckRun {
    truck: TruckId,
    departure: Time,
    return_time: Time,
    mileage: f64,
    stops: Vec<Stop>,
    trace: MileageTrace,
    violations: Vec<DeadlineViolation>,
}

impl TruckRun {
    /// Truck id.
    pub fn truck(&self) -> TruckId {
        self.truck
    }

    /// Departure from the hub.
    pub fn departure(&self) -> Time {
        self.departure
    }

    /// Arrival back at the hub.
    pub fn return_time(&self) -> Time {
        self.return_time
    }

    /// Miles driven, including the return leg.
    pub fn mileage(&self) -> f64 {
        self.mileage
    }

    /// Stops in visiting order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Odometer readings.
    pub fn trace(&self) -> &MileageTrace {
        &self.trace
    }

    /// Late deliveries.
    pub fn violations(&self) -> &[DeadlineViolation] {
        &self.violations
    }

    /// Every `(package, delivery time)` in delivery order.
    pub fn deliveries(&self) -> impl Iterator<Item = (PackageId, Time)> + '_ {
        self.stops
            .iter()
            .flat_map(|s| s.packages.iter().map(move |&id| (id, s.arrival)))
    }

    /// Number of packages delivered.
    pub fn delivered(&self) -> usize {
        self.stops.iter().map(|s| s.packages.len()).sum()
    }

    /// Writes departure and delivery timestamps and deadline flags to `store`.
    ///
    /// Every package is checked before the first write, so a rejected commit
    /// leaves the store unchanged.
    pub fn commit(&self, store: &mut PackageStore) -> Result<(), RoutingError> {
        for (id, _) in self.deliveries() {
            if store.get(id)?.departure().is_some() {
                return Err(RoutingError::InvalidTransition {
                    package: id,
                    reason: "already departed",
                });
            }
        }
        for (id, at) in self.deliveries() {
            let package = store.get_mut(id)?;
            package.depart(self.truck, self.departure)?;
            package.deliver(at)?;
        }
        for violation in &self.violations {
            store.get_mut(violation.package)?.flag_deadline_missed();
        }
        Ok(())
    }
}

struct Cargo {
    id: PackageId,
    location: usize,
    valid_from: Option<Time>,
    deadline: Option<Time>,
}

impl Cargo {
    fn ready(&self, clock: Time) -> bool {
        self.valid_from.map_or(true, |t| t <= clock)
    }
}

/// Simulates truck routes over a [`DistanceGraph`].
///
/// # Examples
///
/// ```
/// use u_dispatch::config::CorrectionPolicy;
/// use u_dispatch::distance::DistanceGraph;
/// use u_dispatch::models::{Address, Deadline, Package, Time};
/// use u_dispatch::simulation::RouteSimulator;
/// use u_dispatch::store::PackageStore;
///
/// let graph = DistanceGraph::from_matrix(
///     vec!["Hub".into(), "1 Elm St".into(), "9 Oak Ave".into()],
///     vec![vec![0.0, 3.0, 6.0], vec![3.0, 0.0, 4.0], vec![6.0, 4.0, 0.0]],
/// ).unwrap();
/// let mut store = PackageStore::from_packages([
///     Package::new(1, Address::street("9 Oak Ave"), Deadline::EndOfDay, 5),
///     Package::new(2, Address::street("1 Elm St"), Deadline::EndOfDay, 5),
/// ]).unwrap();
///
/// let simulator = RouteSimulator::new(&graph, 60.0, CorrectionPolicy::Wait).unwrap();
/// let run = simulator.run(1, &[1, 2], &mut store, Time::hm(8, 0)).unwrap();
///
/// assert_eq!(run.stops()[0].packages(), &[2]);
/// assert_eq!(run.mileage(), 13.0);
/// assert_eq!(run.return_time(), Time::hm(8, 13));
/// assert_eq!(store.get(1).unwrap().delivery(), Some(Time::hm(8, 7)));
/// ```
pub struct RouteSimulator<'a> {
    graph: &'a DistanceGraph,
    speed_mph: f64,
    policy: CorrectionPolicy,
}

impl<'a> RouteSimulator<'a> {
    /// Creates a simulator driving at `speed_mph`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidSpeed`] if the speed is not a positive, finite
    /// number of miles per hour.
    pub fn new(
        graph: &'a DistanceGraph,
        speed_mph: f64,
        policy: CorrectionPolicy,
    ) -> Result<Self, ConfigError> {
        if !speed_mph.is_finite() || speed_mph <= 0.0 {
            return Err(ConfigError::InvalidSpeed(speed_mph));
        }
        Ok(Self {
            graph,
            speed_mph,
            policy,
        })
    }

    /// Creates a simulator with the speed and correction policy of `config`.
    ///
    /// A [`FleetConfig`] only holds a validated speed.
    pub fn from_config(graph: &'a DistanceGraph, config: &FleetConfig) -> Self {
        Self {
            graph,
            speed_mph: config.speed_mph(),
            policy: config.correction_policy(),
        }
    }

    /// Minutes needed to drive `miles`.
    pub fn travel_minutes(&self, miles: f64) -> f64 {
        miles * MINUTES_PER_HOUR / self.speed_mph
    }

    /// Graph index of `address`: the full address first, then the street alone.
    pub fn locate(&self, address: &Address) -> Option<usize> {
        self.graph
            .locate(&address.to_string())
            .or_else(|| self.graph.locate(&address.street))
    }

    /// Plans the trip of `truck` carrying `packages`, leaving the hub at
    /// `start`. The store is only read.
    pub fn plan(
        &self,
        truck: TruckId,
        packages: &[PackageId],
        store: &PackageStore,
        start: Time,
    ) -> Result<TruckRun, RoutingError> {
        let mut pending = self.load(truck, packages, store)?;

        let mut clock = start;
        let mut miles = 0.0;
        let mut here = HUB;
        let mut trace = MileageTrace::starting_at(start, HUB);
        let mut stops = Vec::new();
        let mut violations = Vec::new();

        while !pending.is_empty() {
            let mut candidates: Vec<usize> = Vec::new();
            for cargo in pending.iter().filter(|c| c.ready(clock)) {
                if !candidates.contains(&cargo.location) {
                    candidates.push(cargo.location);
                }
            }

            let Some(next) = self.graph.matrix().nearest_neighbor(here, &candidates) else {
                let held = pending
                    .iter()
                    .filter_map(|c| c.valid_from.map(|t| (t, c.id)))
                    .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                let Some((valid_from, package)) = held else {
                    break;
                };
                match self.policy {
                    CorrectionPolicy::Fail => {
                        return Err(RoutingError::UnresolvableAddressState {
                            truck,
                            package,
                            valid_from,
                        });
                    }
                    CorrectionPolicy::Wait => {
                        debug!("truck {truck} waits until {valid_from} for package {package}");
                        clock = valid_from;
                        trace.record(clock, miles, here);
                        continue;
                    }
                }
            };

            let leg = self.graph.distance(here, next);
            miles += leg;
            clock = clock.plus_minutes(self.travel_minutes(leg));
            here = next;
            trace.record(clock, miles, here);

            let (dropped, kept): (Vec<Cargo>, Vec<Cargo>) = pending
                .into_iter()
                .partition(|c| c.location == next && c.ready(clock));
            pending = kept;

            for cargo in &dropped {
                if let Some(deadline) = cargo.deadline.filter(|&d| clock > d) {
                    violations.push(DeadlineViolation {
                        package: cargo.id,
                        truck,
                        deadline,
                        delivered: clock,
                    });
                }
            }
            let delivered: Vec<PackageId> = dropped.iter().map(|c| c.id).collect();
            debug!(
                "truck {truck} delivers {:?} at {} ({clock})",
                delivered,
                self.graph.address(next)
            );
            stops.push(Stop {
                location: next,
                address: self.graph.address(next).to_string(),
                arrival: clock,
                miles,
                packages: delivered,
            });
        }

        let back = self.graph.distance(here, HUB);
        if here != HUB || back > 0.0 {
            miles += back;
            clock = clock.plus_minutes(self.travel_minutes(back));
            trace.record(clock, miles, HUB);
        }

        Ok(TruckRun {
            truck,
            departure: start,
            return_time: clock,
            mileage: miles,
            stops,
            trace,
            violations,
        })
    }

    /// Plans the trip and commits it to `store`.
    pub fn run(
        &self,
        truck: TruckId,
        packages: &[PackageId],
        store: &mut PackageStore,
        start: Time,
    ) -> Result<TruckRun, RoutingError> {
        let run = self.plan(truck, packages, store, start)?;
        run.commit(store)?;
        Ok(run)
    }

    fn load(
        &self,
        truck: TruckId,
        packages: &[PackageId],
        store: &PackageStore,
    ) -> Result<Vec<Cargo>, RoutingError> {
        let mut ids = packages.to_vec();
        ids.sort_unstable();
        ids.dedup();

        ids.into_iter()
            .map(|id| {
                let package = store.get(id)?;
                let (address, valid_from) = match package.correction() {
                    Some((at, corrected)) => (corrected, Some(at)),
                    None => (package.address(), None),
                };
                let location =
                    self.locate(address)
                        .ok_or_else(|| RoutingError::AddressNotFound {
                            truck,
                            package: id,
                            address: address.to_string(),
                        })?;
                Ok(Cargo {
                    id,
                    location,
                    valid_from,
                    deadline: package.effective_deadline(),
                })
            })
            .collect()
    }
}
