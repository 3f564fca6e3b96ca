//! Odometer readings over simulated time.

use serde::Serialize;

use crate::models::Time;

/// One odometer reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TracePoint {
    time: Time,
    miles: f64,
    location: usize,
}

impl TracePoint {
    /// When the reading was taken.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Cumulative miles since departure.
    pub fn miles(&self) -> f64 {
        self.miles
    }

    /// Graph index of the truck's position.
    pub fn location(&self) -> usize {
        self.location
    }
}

/// Time-ordered odometer readings of one truck run.
///
/// Between two readings the truck is assumed to drive at constant speed, so
/// [`mileage_at`](Self::mileage_at) interpolates linearly. A wait is two
/// readings with equal miles.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::Time;
/// use u_dispatch::simulation::MileageTrace;
///
/// let mut trace = MileageTrace::starting_at(Time::hm(8, 0), 0);
/// trace.record(Time::hm(8, 10), 3.0, 4);
/// trace.record(Time::hm(8, 20), 6.0, 0);
///
/// assert_eq!(trace.mileage_at(Time::hm(7, 0)), 0.0);
/// assert_eq!(trace.mileage_at(Time::hm(8, 5)), 1.5);
/// assert_eq!(trace.mileage_at(Time::hm(9, 0)), 6.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageTrace {
    points: Vec<TracePoint>,
}

impl MileageTrace {
    /// Creates a trace with a zero reading at `time`.
    pub fn starting_at(time: Time, location: usize) -> Self {
        Self {
            points: vec![TracePoint {
                time,
                miles: 0.0,
                location,
            }],
        }
    }

    /// Appends a reading. Readings must not go back in time.
    pub fn record(&mut self, time: Time, miles: f64, location: usize) {
        debug_assert!(self.end() <= time, "trace readings must be time-ordered");
        self.points.push(TracePoint {
            time,
            miles,
            location,
        });
    }

    /// All readings in time order.
    pub fn points(&self) -> &[TracePoint] {
        &self.points
    }

    /// Time of the first reading.
    pub fn departure(&self) -> Time {
        self.points[0].time
    }

    /// Time of the last reading.
    pub fn end(&self) -> Time {
        self.points[self.points.len() - 1].time
    }

    /// Miles at the last reading.
    pub fn total(&self) -> f64 {
        self.points[self.points.len() - 1].miles
    }

    /// Odometer at `time`: zero before the first reading, the total after the
    /// last one.
    pub fn mileage_at(&self, time: Time) -> f64 {
        let after = self.points.partition_point(|p| p.time <= time);
        if after == 0 {
            return 0.0;
        }
        if after == self.points.len() {
            return self.total();
        }
        let (a, b) = (&self.points[after - 1], &self.points[after]);
        let span = a.time.minutes_until(b.time);
        a.miles + (b.miles - a.miles) * a.time.minutes_until(time) / span
    }
}
