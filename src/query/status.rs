//! Point-in-time package status and mileage.

use std::fmt;

use serde::Serialize;

use crate::error::StoreError;
use crate::models::{Address, Deadline, PackageId, PackageStatus, Time, TruckId};
use crate::simulation::{DeliveryReport, TruckRun};
use crate::store::PackageStore;

/// A package as it looked at one moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageSnapshot {
    id: PackageId,
    address: Address,
    deadline: Deadline,
    weight: u32,
    truck: Option<TruckId>,
    status: PackageStatus,
    departed: Option<Time>,
    delivered: Option<Time>,
}

impl PackageSnapshot {
    /// Package id.
    pub fn id(&self) -> PackageId {
        self.id
    }

    /// Address known at the snapshot time.
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

    /// Truck the package is assigned to, if any.
    pub fn truck(&self) -> Option<TruckId> {
        self.truck
    }

    /// Status at the snapshot time.
    pub fn status(&self) -> PackageStatus {
        self.status
    }

    /// Departure time, once it has happened.
    pub fn departed(&self) -> Option<Time> {
        self.departed
    }

    /// Delivery time, once it has happened.
    pub fn delivered(&self) -> Option<Time> {
        self.delivered
    }
}

impl fmt::Display for PackageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3} | {:<40} | {:>5} | {:>3}kg | ",
            self.id,
            self.address.to_string(),
            self.deadline.to_string(),
            self.weight
        )?;
        match self.truck {
            Some(truck) => write!(f, "truck {truck} | ")?,
            None => f.write_str("truck - | ")?,
        }
        write!(f, "{}", self.status)?;
        if let Some(at) = self.delivered {
            write!(f, " at {at}")?;
        }
        Ok(())
    }
}

/// Read-only questions about the simulated day.
///
/// Answers are computed from recorded timestamps and mileage traces, so any
/// time of day can be asked about, in any order, before or after the fact.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::FleetConfig;
/// use u_dispatch::distance::DistanceGraph;
/// use u_dispatch::models::{Address, Deadline, Package, PackageStatus, Time, TruckSpec};
/// use u_dispatch::query::StatusQuery;
/// use u_dispatch::simulation::FleetScheduler;
/// use u_dispatch::store::PackageStore;
///
/// let graph = DistanceGraph::from_matrix(
///     vec!["Hub".into(), "1 Elm St".into()],
///     vec![vec![0.0, 6.0], vec![6.0, 0.0]],
/// ).unwrap();
/// let config = FleetConfig::new(vec![TruckSpec::fixed(1, 16, Time::hm(8, 0))], 18.0).unwrap();
/// let mut store = PackageStore::from_packages([
///     Package::new(1, Address::street("1 Elm St"), Deadline::EndOfDay, 2),
/// ]).unwrap();
/// let report = FleetScheduler::new(&config, &graph).run(&mut store).unwrap();
///
/// let query = StatusQuery::from_report(&store, &report);
/// assert_eq!(query.status_at(1, Time::hm(7, 59)).unwrap(), PackageStatus::AtHub);
/// assert_eq!(query.status_at(1, Time::hm(8, 10)).unwrap(), PackageStatus::EnRoute);
/// assert_eq!(query.status_at(1, Time::hm(8, 20)).unwrap(), PackageStatus::Delivered);
/// assert_eq!(query.mileage_at(Time::hm(8, 10)), 3.0);
/// assert_eq!(query.mileage_at(Time::hm(12, 0)), 12.0);
/// ```
pub struct StatusQuery<'a> {
    store: &'a PackageStore,
    runs: &'a [TruckRun],
}

impl<'a> StatusQuery<'a> {
    /// Queries `store` with the mileage of `runs`.
    pub fn new(store: &'a PackageStore, runs: &'a [TruckRun]) -> Self {
        Self { store, runs }
    }

    /// Queries `store` with the runs of `report`.
    pub fn from_report(store: &'a PackageStore, report: &'a DeliveryReport) -> Self {
        Self::new(store, report.runs())
    }

    /// Status of `id` at `time`.
    pub fn status_at(&self, id: PackageId, time: Time) -> Result<PackageStatus, StoreError> {
        Ok(self.store.get(id)?.status_at(time))
    }

    /// Full view of `id` at `time`.
    pub fn snapshot_at(&self, id: PackageId, time: Time) -> Result<PackageSnapshot, StoreError> {
        let package = self.store.get(id)?;
        let status = package.status_at(time);
        let departed = package.departure().filter(|_| status != PackageStatus::AtHub);
        let delivered = package
            .delivery()
            .filter(|_| status == PackageStatus::Delivered);
        Ok(PackageSnapshot {
            id,
            address: package.address_at(time).clone(),
            deadline: package.deadline(),
            weight: package.weight(),
            truck: package.truck(),
            status,
            departed,
            delivered,
        })
    }

    /// `(id, status)` of every package at `time`, in store order.
    pub fn all_statuses_at(&self, time: Time) -> Vec<(PackageId, PackageStatus)> {
        self.store
            .all()
            .map(|p| (p.id(), p.status_at(time)))
            .collect()
    }

    /// Snapshot of every package at `time`, in store order.
    pub fn all_snapshots_at(&self, time: Time) -> Result<Vec<PackageSnapshot>, StoreError> {
        self.store
            .ids()
            .map(|id| self.snapshot_at(id, time))
            .collect()
    }

    /// Fleet odometer at `time`.
    pub fn mileage_at(&self, time: Time) -> f64 {
        self.runs.iter().map(|r| r.trace().mileage_at(time)).sum()
    }

    /// Odometer of each truck that ran, at `time`.
    pub fn mileage_by_truck_at(&self, time: Time) -> Vec<(TruckId, f64)> {
        self.runs
            .iter()
            .map(|r| (r.truck(), r.trace().mileage_at(time)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{assert_close, line_graph, sample_config, sample_store};
    use crate::simulation::FleetScheduler;

    fn day() -> (PackageStore, DeliveryReport) {
        let graph = line_graph();
        let config = sample_config();
        let mut store = sample_store();
        let report = FleetScheduler::new(&config, &graph)
            .run(&mut store)
            .expect("feasible");
        (store, report)
    }

    #[test]
    fn test_delayed_package_lifecycle() {
        let (store, report) = day();
        let query = StatusQuery::from_report(&store, &report);
        assert_eq!(query.status_at(4, Time::hm(8, 0)), Ok(PackageStatus::AtHub));
        assert_eq!(query.status_at(4, Time::hm(9, 4)), Ok(PackageStatus::AtHub));
        assert_eq!(query.status_at(4, Time::hm(9, 5)), Ok(PackageStatus::EnRoute));
        assert_eq!(query.status_at(4, Time::hm(9, 7)), Ok(PackageStatus::EnRoute));
        assert_eq!(query.status_at(4, Time::hm(9, 10)), Ok(PackageStatus::Delivered));
    }

    #[test]
    fn test_unknown_package() {
        let (store, report) = day();
        let query = StatusQuery::from_report(&store, &report);
        assert_eq!(
            query.status_at(99, Time::hm(9, 0)),
            Err(StoreError::NotFound(99))
        );
        assert!(query.snapshot_at(99, Time::hm(9, 0)).is_err());
    }

    #[test]
    fn test_fleet_mileage() {
        let (store, report) = day();
        let query = StatusQuery::from_report(&store, &report);
        assert_close(query.mileage_at(Time::hm(7, 0)), 0.0);
        assert_close(query.mileage_at(Time::hm(8, 3)), 3.0);
        assert_close(query.mileage_at(Time::hm(9, 6)), 7.0);
        assert_close(query.mileage_at(Time::hm(12, 0)), 26.0);
        assert_close(query.mileage_at(Time::hm(12, 0)), report.total_mileage());

        let by_truck = query.mileage_by_truck_at(Time::hm(9, 6));
        assert_eq!(by_truck.len(), 3);
        assert_close(by_truck[0].1, 6.0);
        assert_close(by_truck[1].1, 1.0);
        assert_close(by_truck[2].1, 0.0);
    }

    #[test]
    fn test_snapshot_address_follows_correction() {
        let (store, report) = day();
        let query = StatusQuery::from_report(&store, &report);

        let before = query.snapshot_at(6, Time::hm(9, 0)).expect("known");
        assert_eq!(before.address().street, "Wrong Rd");
        assert_eq!(before.status(), PackageStatus::AtHub);
        assert_eq!(before.departed(), None);

        let after = query.snapshot_at(6, Time::hm(10, 26)).expect("known");
        assert_eq!(after.address().street, "D St");
        assert_eq!(after.truck(), Some(3));
        assert_eq!(after.delivered(), Some(Time::hm(10, 25)));
        assert!(after.to_string().ends_with("delivered at 10:25"));
    }

    #[test]
    fn test_all_statuses_in_store_order() {
        let (store, report) = day();
        let query = StatusQuery::from_report(&store, &report);
        let statuses = query.all_statuses_at(Time::hm(9, 7));
        let ids: Vec<PackageId> = statuses.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, store.ids().collect::<Vec<_>>());
        assert_eq!(statuses[0], (1, PackageStatus::Delivered));
        assert_eq!(statuses[3], (4, PackageStatus::EnRoute));
        assert_eq!(statuses[5], (6, PackageStatus::AtHub));

        let snapshots = query.all_snapshots_at(Time::hm(9, 7)).expect("known");
        assert_eq!(snapshots.len(), store.len());
    }

    #[test]
    fn test_partial_state_queries() {
        let store = sample_store();
        let query = StatusQuery::new(&store, &[]);
        assert_eq!(query.status_at(1, Time::hm(17, 0)), Ok(PackageStatus::AtHub));
        assert_eq!(query.mileage_at(Time::hm(17, 0)), 0.0);
    }
}
