//! # Route Progress Tracker
//!
//! Stateful tracking of a navigation session along a multi-leg route.
//!
//! ## Overview
//!
//! A [`Route`] is a sequence of [`Leg`]s, each a sequence of [`Step`]s whose
//! geometry arrives as an encoded polyline. A [`RouteProgressTracker`] borrows
//! the route for the lifetime of the session, holds the current `(leg, step)`
//! cursor, and turns each raw position sample into a [`ProgressUpdate`]:
//!
//! | Signal | Meaning |
//! |--------|---------|
//! | `snapped_point` | Position pulled onto the step line, or the raw fix when too far to snap |
//! | `distance_remaining_on_step` | Along-line distance left on the step the sample arrived on |
//! | `distance_to_maneuver` | Along-line distance to the next maneuver, after any advance |
//! | `is_off_route` | Fix is farther from the step line than the reroute threshold |
//! | `step_advanced` | This sample completed the current step |
//! | `alert` | Approach notifications for the upcoming maneuver |
//!
//! Decoded step geometry is cached per `(leg, step)` inside the tracker, so
//! repeated samples on the same step decode the polyline once. The tracker is
//! single-writer by construction (`update` takes `&mut self`); wrap it in a
//! `Mutex` if samples arrive from multiple threads.
//!
//! The tracker never advances itself past the last step of a leg: crossing
//! into the next leg, and finishing the session, is an arrival decision left
//! to the caller via [`RouteProgressTracker::advance`].

use std::collections::HashMap;

use crate::geo_utils::{bearing_diff, convert, distance, line_distance, DistanceUnit};
use crate::projection::{line_slice, point_on_line};
use crate::{EncodedPolyline, Error, GeoPoint, Result};

// ============================================================================
// Route Data Model
// ============================================================================

/// One maneuver-to-maneuver stretch of a leg.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// Step geometry as delivered by the directions provider.
    pub geometry: EncodedPolyline,
    /// Step length in meters, as reported by the provider.
    pub distance_m: f64,
    /// Expected travel time in seconds.
    pub duration_s: f64,
    /// Expected travel bearing while on this step, in degrees clockwise
    /// from north. The tracker compares it against the reported heading
    /// before completing the step. `None` when the provider omits it, in
    /// which case heading never blocks completion.
    pub maneuver_bearing_after: Option<f64>,
}

/// A stretch of route between two waypoints.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub steps: Vec<Step>,
}

/// A full navigable route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub legs: Vec<Leg>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Navigation thresholds. All distances are expressed in [`unit`](Self::unit).
///
/// The defaults reproduce common turn-by-turn tuning: reroute at 150 ft off
/// the line, snap within 50 ft, complete a step within 50 ft of its end
/// (10 ft for very short steps), and announce maneuvers at 1 mile and 150 ft.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerConfig {
    /// Unit every threshold below, and every distance in a
    /// [`ProgressUpdate`], is expressed in. Default: meters.
    pub unit: DistanceUnit,
    /// Beyond this distance from the step line the fix is off-route.
    /// Default: 45.72 (150 ft).
    pub max_reroute_distance: f64,
    /// Beyond this distance the snapped point is not trusted and the raw
    /// fix is reported instead. Default: 15.24 (50 ft).
    pub max_snap_distance: f64,
    /// Remaining distance under which a step counts as completed.
    /// Default: 15.24 (50 ft).
    pub completion_distance: f64,
    /// Completion threshold used instead when the whole step is shorter
    /// than [`completion_distance`](Self::completion_distance).
    /// Default: 3.048 (10 ft).
    pub short_completion_distance: f64,
    /// Maximum divergence between the reported heading and the current
    /// step's expected bearing for the step to complete, in degrees.
    /// Default: 30.
    pub bearing_tolerance: f64,
    /// Early-warning distance for the upcoming maneuver.
    /// Default: 1609.34 (1 mile).
    pub alert_low_distance: f64,
    /// Imminent-warning distance for the upcoming maneuver.
    /// Default: 45.72 (150 ft).
    pub alert_high_distance: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            unit: DistanceUnit::Meters,
            max_reroute_distance: 45.72,
            max_snap_distance: 15.24,
            completion_distance: 15.24,
            short_completion_distance: 3.048,
            bearing_tolerance: 30.0,
            alert_low_distance: 1609.34,
            alert_high_distance: 45.72,
        }
    }
}

// ============================================================================
// Progress Output
// ============================================================================

/// Approach notifications for the upcoming maneuver.
///
/// The two flags are independent: near a maneuver on a long step both are
/// set. Each flag only fires when the step is longer than its trigger
/// distance, so short connector steps do not spam announcements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertLevel {
    /// Within the early-warning distance of the maneuver.
    pub low: bool,
    /// Within the imminent-warning distance of the maneuver.
    pub high: bool,
}

/// Everything derived from one position sample. Distances are in the
/// configured unit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressUpdate {
    /// The fix snapped onto the step line, or the raw fix when it was
    /// farther than the snap threshold.
    pub snapped_point: GeoPoint,
    /// Along-line distance left on the step the sample arrived on.
    pub distance_remaining_on_step: f64,
    /// Along-line distance to the next maneuver. Equal to
    /// [`distance_remaining_on_step`](Self::distance_remaining_on_step)
    /// unless this sample advanced the step, in which case it is recomputed
    /// on the new current step.
    pub distance_to_maneuver: f64,
    /// The fix is farther from the step line than the reroute threshold.
    pub is_off_route: bool,
    /// This sample completed the previous step.
    pub step_advanced: bool,
    pub alert: AlertLevel,
}

// ============================================================================
// Tracker
// ============================================================================

/// Per-session progress state over a borrowed [`Route`].
///
/// See the [module docs](self) for the overall model and the
/// [crate docs](crate) for a runnable quick-start.
#[derive(Debug)]
pub struct RouteProgressTracker<'r> {
    route: &'r Route,
    config: TrackerConfig,
    leg_index: usize,
    step_index: usize,
    complete: bool,
    last_snap: Option<GeoPoint>,
    geometry_cache: HashMap<(usize, usize), Vec<GeoPoint>>,
}

impl<'r> RouteProgressTracker<'r> {
    /// Start a session at the first step of the first leg.
    ///
    /// Fails with [`Error::InvalidRoute`] when the route has no legs or any
    /// leg has no steps. Step geometry is validated lazily, when the cursor
    /// first reaches the step.
    pub fn new(route: &'r Route, config: TrackerConfig) -> Result<Self> {
        if route.legs.is_empty() {
            return Err(Error::InvalidRoute("route has no legs"));
        }
        if route.legs.iter().any(|leg| leg.steps.is_empty()) {
            return Err(Error::InvalidRoute("leg has no steps"));
        }
        Ok(Self {
            route,
            config,
            leg_index: 0,
            step_index: 0,
            complete: false,
            last_snap: None,
            geometry_cache: HashMap::new(),
        })
    }

    /// Index of the leg the session is currently on.
    pub fn leg_index(&self) -> usize {
        self.leg_index
    }

    /// Index of the current step within the current leg.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// True once [`advance`](Self::advance) has been called on the final
    /// step of the final leg.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The snapped point reported by the most recent
    /// [`update`](Self::update), if any.
    pub fn last_snap(&self) -> Option<GeoPoint> {
        self.last_snap
    }

    /// Process one position sample.
    ///
    /// `heading` is the agent's travel bearing in degrees clockwise from
    /// north, when the location provider supplies one; without it, heading
    /// never blocks a step advance.
    pub fn update(&mut self, position: GeoPoint, heading: Option<f64>) -> Result<ProgressUpdate> {
        if self.complete {
            return Err(Error::SessionComplete);
        }
        let (leg, step) = (self.leg_index, self.step_index);
        let unit = self.config.unit;
        let entry_step = &self.route.legs[leg].steps[step];
        let step_length = convert(entry_step.distance_m, DistanceUnit::Meters, unit);

        self.ensure_decoded(leg, step)?;
        let (snap_point, snap_distance, remaining) = {
            let coords = &self.geometry_cache[&(leg, step)];
            let snap = point_on_line(&position, coords)
                .ok_or(Error::InvalidRoute("step geometry decodes to zero points"))?;
            let snap_distance = distance(&position, &snap.point, unit);
            let remaining = if coords.len() < 2 {
                snap_distance
            } else {
                let tail = line_slice(&position, &coords[coords.len() - 1], coords);
                line_distance(&tail.points, unit)
            };
            (snap.point, snap_distance, remaining)
        };

        let is_off_route = snap_distance > self.config.max_reroute_distance;
        let snapped_point = if snap_distance > self.config.max_snap_distance {
            position
        } else {
            snap_point
        };

        // A step shorter than the normal completion window completes on the
        // tighter one, otherwise it would count as done on entry.
        let completion = if step_length < self.config.completion_distance {
            self.config.short_completion_distance
        } else {
            self.config.completion_distance
        };
        let steps = &self.route.legs[leg].steps;
        let bearing_ok = match (heading, entry_step.maneuver_bearing_after) {
            (Some(h), Some(b)) => bearing_diff(h, b) <= self.config.bearing_tolerance,
            _ => true,
        };
        let step_advanced = bearing_ok && step + 1 < steps.len() && remaining < completion;

        log::trace!(
            "leg {leg} step {step}: snap {snap_distance:.1}, remaining {remaining:.1}, \
             off_route {is_off_route}, advance {step_advanced}"
        );

        if step_advanced {
            self.step_index += 1;
            log::debug!("advanced to step {} of leg {}", self.step_index, self.leg_index);
        }

        let distance_to_maneuver = if step_advanced {
            self.remaining_on_step(self.leg_index, self.step_index, &snapped_point)?
        } else {
            remaining
        };

        let alert = AlertLevel {
            low: remaining < self.config.alert_low_distance
                && step_length > self.config.alert_low_distance,
            high: remaining < self.config.alert_high_distance
                && step_length > self.config.alert_high_distance,
        };

        self.last_snap = Some(snapped_point);
        Ok(ProgressUpdate {
            snapped_point,
            distance_remaining_on_step: remaining,
            distance_to_maneuver,
            is_off_route,
            step_advanced,
            alert,
        })
    }

    /// Move the cursor to the next step, rolling into the next leg at a leg
    /// boundary and marking the session complete after the final step.
    ///
    /// Returns `false` (and does nothing) when the session was already
    /// complete. This is the arrival decision [`update`](Self::update)
    /// deliberately leaves to the caller.
    pub fn advance(&mut self) -> bool {
        if self.complete {
            return false;
        }
        if self.step_index + 1 < self.route.legs[self.leg_index].steps.len() {
            self.step_index += 1;
        } else if self.leg_index + 1 < self.route.legs.len() {
            self.leg_index += 1;
            self.step_index = 0;
            log::debug!("entered leg {}", self.leg_index);
        } else {
            self.complete = true;
            log::debug!("session complete");
        }
        true
    }

    /// Straight-line distance from `position` to its snap on the given step
    /// of the current leg, in the configured unit.
    pub fn distance_to_step(&mut self, position: &GeoPoint, step_index: usize) -> Result<f64> {
        if step_index >= self.route.legs[self.leg_index].steps.len() {
            return Err(Error::InvalidRoute("step index out of range"));
        }
        let leg = self.leg_index;
        self.ensure_decoded(leg, step_index)?;
        let coords = &self.geometry_cache[&(leg, step_index)];
        let snap = point_on_line(position, coords)
            .ok_or(Error::InvalidRoute("step geometry decodes to zero points"))?;
        Ok(distance(position, &snap.point, self.config.unit))
    }

    /// The step of the current leg nearest to `position`; ties go to the
    /// earlier step.
    pub fn closest_step(&mut self, position: &GeoPoint) -> Result<usize> {
        let mut best = (0usize, f64::INFINITY);
        for i in 0..self.route.legs[self.leg_index].steps.len() {
            let d = self.distance_to_step(position, i)?;
            if d < best.1 {
                best = (i, d);
            }
        }
        Ok(best.0)
    }

    /// Whether `position` is beyond the reroute threshold from every step of
    /// the current leg, not just the current step.
    pub fn is_off_route_leg(&mut self, position: &GeoPoint) -> Result<bool> {
        let closest = self.closest_step(position)?;
        let d = self.distance_to_step(position, closest)?;
        Ok(d > self.config.max_reroute_distance)
    }

    /// Along-line distance from `position` to the end of the given step.
    /// A single-point step reads as the straight distance to that point.
    fn remaining_on_step(&mut self, leg: usize, step: usize, position: &GeoPoint) -> Result<f64> {
        self.ensure_decoded(leg, step)?;
        let coords = &self.geometry_cache[&(leg, step)];
        if coords.len() < 2 {
            return Ok(distance(position, &coords[0], self.config.unit));
        }
        let tail = line_slice(position, &coords[coords.len() - 1], coords);
        Ok(line_distance(&tail.points, self.config.unit))
    }

    fn ensure_decoded(&mut self, leg: usize, step: usize) -> Result<()> {
        if self.geometry_cache.contains_key(&(leg, step)) {
            return Ok(());
        }
        let coords = self.route.legs[leg].steps[step].geometry.decode()?;
        if coords.is_empty() {
            return Err(Error::InvalidRoute("step geometry decodes to zero points"));
        }
        self.geometry_cache.insert((leg, step), coords);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
