//! Linked-package units.
//!
//! `LinkedWith` constraints are merged with a union-find over package ids, so
//! linkage is symmetric and transitively closed no matter which side declares
//! it. Each resulting unit carries the union of its members' constraints.

use std::collections::HashMap;

use crate::error::AssignmentError;
use crate::models::{PackageId, Time, TruckId};
use crate::store::PackageStore;

/// Packages that must ride together, with their merged constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedUnit {
    members: Vec<PackageId>,
    required_truck: Option<TruckId>,
    min_delay: Option<Time>,
    correction_at: Option<Time>,
    deadline: Option<Time>,
}

impl LinkedUnit {
    /// Member ids, ascending.
    pub fn members(&self) -> &[PackageId] {
        &self.members
    }

    /// Lowest member id.
    pub fn anchor(&self) -> PackageId {
        self.members[0]
    }

    /// Number of packages in the unit.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`: a unit has at least one member.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Truck every member must ride on.
    pub fn required_truck(&self) -> Option<TruckId> {
        self.required_truck
    }

    /// Latest `MinDelay` of any member.
    pub fn min_delay(&self) -> Option<Time> {
        self.min_delay
    }

    /// Latest address correction time of any member.
    pub fn correction_at(&self) -> Option<Time> {
        self.correction_at
    }

    /// Earliest effective deadline of any member.
    pub fn deadline(&self) -> Option<Time> {
        self.deadline
    }
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Keep the lower index as root so units are discovered in store order.
            let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[child] = root;
        }
    }
}

/// Groups every package in `store` into linked units.
///
/// Units are returned ordered by anchor (lowest member id).
pub fn build_units(store: &PackageStore) -> Result<Vec<LinkedUnit>, AssignmentError> {
    let ids: Vec<PackageId> = store.ids().collect();
    let position: HashMap<PackageId, usize> =
        ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let mut sets = DisjointSet::new(ids.len());
    for package in store.all() {
        let i = position[&package.id()];
        for linked in package.linked() {
            let j = *position
                .get(&linked)
                .ok_or_else(|| AssignmentError::UnsatisfiableLinkage {
                    package: package.id(),
                    reason: format!("linked package {linked} does not exist"),
                })?;
            sets.union(i, j);
        }
    }

    let mut groups: Vec<Vec<PackageId>> = Vec::new();
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    for (i, &id) in ids.iter().enumerate() {
        let root = sets.find(i);
        let group = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group].push(id);
    }

    let mut units = groups
        .into_iter()
        .map(|mut members| {
            members.sort_unstable();
            merge(store, members)
        })
        .collect::<Result<Vec<_>, _>>()?;
    units.sort_by_key(LinkedUnit::anchor);
    Ok(units)
}

fn merge(store: &PackageStore, members: Vec<PackageId>) -> Result<LinkedUnit, AssignmentError> {
    let mut required_truck: Option<TruckId> = None;
    let mut min_delay: Option<Time> = None;
    let mut correction_at: Option<Time> = None;
    let mut deadline: Option<Time> = None;

    for &id in &members {
        let package = store.get(id)?;
        for truck in package.required_trucks() {
            match required_truck {
                Some(first) if first != truck => {
                    return Err(AssignmentError::ConflictingTruckRequirement {
                        package: id,
                        first,
                        second: truck,
                    });
                }
                _ => required_truck = Some(truck),
            }
        }
        min_delay = later(min_delay, package.min_delay());
        correction_at = later(correction_at, package.correction().map(|(at, _)| at));
        deadline = match (deadline, package.effective_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    Ok(LinkedUnit {
        members,
        required_truck,
        min_delay,
        correction_at,
        deadline,
    })
}

fn later(a: Option<Time>, b: Option<Time>) -> Option<Time> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}
