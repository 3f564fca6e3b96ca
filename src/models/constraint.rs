//! Typed delivery constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Address, PackageId, Time, TruckId};

/// A hard or soft requirement attached to a package.
///
/// Constraints are built by whoever reads the package notes; the core never
/// inspects free text.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Constraint, Time};
///
/// let delayed = Constraint::MinDelay(Time::hm(9, 5));
/// assert_eq!(delayed.to_string(), "not at hub before 09:05");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Not available at the hub before this time.
    MinDelay(Time),
    /// Must ride on this truck.
    RequiresTruck(TruckId),
    /// Must ride with these packages.
    LinkedWith(Vec<PackageId>),
    /// The listed address is wrong until `at`, then `address` applies.
    AddressCorrection {
        /// When the corrected address becomes known.
        at: Time,
        /// The corrected address.
        address: Address,
    },
    /// Must be delivered no later than this time.
    Deadline(Time),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::MinDelay(t) => write!(f, "not at hub before {t}"),
            Constraint::RequiresTruck(id) => write!(f, "requires truck {id}"),
            Constraint::LinkedWith(ids) => {
                let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                write!(f, "linked with {}", ids.join(", "))
            }
            Constraint::AddressCorrection { at, address } => {
                write!(f, "address corrected to {address} at {at}")
            }
            Constraint::Deadline(t) => write!(f, "deliver by {t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Constraint::RequiresTruck(2).to_string(), "requires truck 2");
        assert_eq!(
            Constraint::LinkedWith(vec![13, 15]).to_string(),
            "linked with 13, 15"
        );
        let fix = Constraint::AddressCorrection {
            at: Time::hm(10, 20),
            address: Address::new("410 S State St", "Salt Lake City", "UT", "84111"),
        };
        assert_eq!(
            fix.to_string(),
            "address corrected to 410 S State St, Salt Lake City, UT 84111 at 10:20"
        );
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Constraint::RequiresTruck(2)).expect("serialize");
        assert_eq!(json, r#"{"requires_truck":2}"#);
        let back: Constraint = serde_json::from_str(r#"{"min_delay":"09:05"}"#).expect("parse");
        assert_eq!(back, Constraint::MinDelay(Time::hm(9, 5)));
    }
}
