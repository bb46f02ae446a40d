//! Single-shot lifecycle: Idle -> Launched -> InFlight -> Resolved -> Idle
//!
//! Every timer a shot schedules carries its `ShotId`. Handlers ignore ids that
//! aren't the live shot in the expected phase, so a sample, arrival or reset
//! left over from a resolved or aborted shot is a no-op.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{ArenaLayout, Rect};
use super::timers::{Scheduler, TimerId};
use super::trajectory::{ShotPath, TrajectoryPlanner};
use crate::config::GameConfig;

/// Per-shot cancellation token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShotId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotPhase {
    /// Ball at its origin, ready for a gesture
    Idle,
    /// Gesture accepted, path being chosen
    Launched,
    /// Ball travelling
    InFlight,
    /// Outcome decided, waiting to return the ball
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShotOutcome {
    Hit { position: Vec2 },
    Miss,
    OutOfBounds,
}

/// A release the session turned into a shot request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub target: Vec2,
    pub power: f32,
}

/// Timers a shot schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotTimer {
    Sample(ShotId),
    Arrive(ShotId),
    Reset(ShotId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub shot: ShotId,
    pub outcome: ShotOutcome,
    /// Ball center when the outcome was decided
    pub position: Vec2,
    pub power: f32,
}

/// What a resolver step produced, in order
#[derive(Debug, Clone, PartialEq)]
pub enum ShotUpdate {
    Launched { shot: ShotId, path: ShotPath, power: f32 },
    BallMoved(Vec2),
    Resolved(Resolution),
    BallReset(Vec2),
}

/// Geometry as of the moment a handler runs
#[derive(Debug, Clone, Copy)]
pub struct ShotContext<'a> {
    pub arena: &'a ArenaLayout,
    /// Hoop box including the current basket offset
    pub hoop: Rect,
    pub level: u8,
}

/// Rim test: x strictly inside the hoop, y within `tolerance_fraction` of
/// the hoop height above or below its top edge
pub fn hits_hoop(center: Vec2, hoop: Rect, tolerance_fraction: f32) -> bool {
    if center.x < hoop.left() || center.x > hoop.right() {
        return false;
    }
    let tolerance = hoop.height() * tolerance_fraction;
    center.y >= hoop.top() - tolerance && center.y <= hoop.top() + tolerance
}

#[derive(Debug, Clone)]
struct ActiveShot {
    id: ShotId,
    path: ShotPath,
    power: f32,
    launched_at: u64,
    sampler: Option<TimerId>,
    arrival: Option<TimerId>,
}

#[derive(Debug, Clone)]
pub struct ShotResolver {
    phase: ShotPhase,
    active: Option<ActiveShot>,
    next_id: u64,
    planner: TrajectoryPlanner,
    sample_ms: u64,
    out_of_bounds_margin: f32,
    hit_tolerance_fraction: f32,
    direct_drop_ms: u64,
    hit_settle_ms: u64,
    miss_settle_ms: u64,
    direct_drop_settle_ms: u64,
    out_of_bounds_settle_ms: u64,
}

impl ShotResolver {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            phase: ShotPhase::Idle,
            active: None,
            next_id: 1,
            planner: TrajectoryPlanner::new(config),
            sample_ms: config.boundary_sample_ms,
            out_of_bounds_margin: config.out_of_bounds_margin,
            hit_tolerance_fraction: config.hit_tolerance_fraction,
            direct_drop_ms: config.direct_drop_ms,
            hit_settle_ms: config.hit_settle_ms,
            miss_settle_ms: config.miss_settle_ms,
            direct_drop_settle_ms: config.direct_drop_settle_ms,
            out_of_bounds_settle_ms: config.out_of_bounds_settle_ms,
        }
    }

    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == ShotPhase::Idle
    }

    pub fn current_shot(&self) -> Option<ShotId> {
        self.active.as_ref().map(|s| s.id)
    }

    /// Live shot with this id, if it's in `phase`
    fn live(&self, shot: ShotId, phase: ShotPhase) -> bool {
        self.phase == phase && self.active.as_ref().is_some_and(|s| s.id == shot)
    }

    /// Start a shot. Returns None while another shot still owns the ball.
    pub fn launch<E>(
        &mut self,
        launch: Launch,
        ctx: ShotContext<'_>,
        timers: &mut Scheduler<E>,
    ) -> Option<Vec<ShotUpdate>>
    where
        E: Clone + From<ShotTimer>,
    {
        if !self.is_idle() {
            log::debug!("Launch rejected: shot already {:?}", self.phase);
            return None;
        }

        let id = ShotId(self.next_id);
        self.next_id += 1;
        self.phase = ShotPhase::Launched;

        let start = ctx.arena.ball_origin;
        let target = launch.target;
        let mut updates = Vec::with_capacity(2);

        if !self
            .planner
            .is_within_range(target, ctx.hoop.center(), ctx.level)
        {
            if !ctx.arena.bounds().contains(target) {
                log::debug!("Shot {:?}: out-of-range target {} off the court", id, target);
                self.active = Some(ActiveShot {
                    id,
                    path: ShotPath::Drop {
                        from: start,
                        to: target,
                        duration_ms: 0,
                    },
                    power: launch.power,
                    launched_at: timers.now(),
                    sampler: None,
                    arrival: None,
                });
                updates.extend(self.resolve(ShotOutcome::OutOfBounds, target, timers));
                return Some(updates);
            }

            let path = ShotPath::Drop {
                from: start,
                to: Vec2::new(target.x, ctx.arena.floor_y),
                duration_ms: self.direct_drop_ms,
            };
            log::debug!("Shot {:?}: out of range, direct drop", id);
            let arrival = timers.once(self.direct_drop_ms, ShotTimer::Arrive(id).into());
            self.active = Some(ActiveShot {
                id,
                path,
                power: launch.power,
                launched_at: timers.now(),
                sampler: None,
                arrival: Some(arrival),
            });
            self.phase = ShotPhase::InFlight;
            updates.push(ShotUpdate::Launched {
                shot: id,
                path,
                power: launch.power,
            });
            return Some(updates);
        }

        let trajectory =
            self.planner
                .plan_trajectory(start, target, launch.power, start.distance(target));
        let path = ShotPath::Arc {
            start,
            target,
            trajectory,
        };
        log::debug!(
            "Shot {:?}: arc to {} ({:.0} ms, peak {:.0})",
            id,
            target,
            trajectory.flight_time_ms,
            trajectory.peak_height
        );

        let sampler = timers.every(self.sample_ms, ShotTimer::Sample(id).into());
        let arrival = timers.once(path.duration_ms(), ShotTimer::Arrive(id).into());
        self.active = Some(ActiveShot {
            id,
            path,
            power: launch.power,
            launched_at: timers.now(),
            sampler: Some(sampler),
            arrival: Some(arrival),
        });
        self.phase = ShotPhase::InFlight;
        updates.push(ShotUpdate::Launched {
            shot: id,
            path,
            power: launch.power,
        });
        Some(updates)
    }

    /// Boundary sample: report the ball and bail out early if it left the court
    pub fn on_sample<E>(
        &mut self,
        shot: ShotId,
        ctx: ShotContext<'_>,
        timers: &mut Scheduler<E>,
    ) -> Vec<ShotUpdate>
    where
        E: Clone + From<ShotTimer>,
    {
        if !self.live(shot, ShotPhase::InFlight) {
            log::trace!("Stale sample for {:?}", shot);
            return Vec::new();
        }
        let Some(active) = self.active.as_ref() else {
            return Vec::new();
        };

        let elapsed = timers.now().saturating_sub(active.launched_at);
        let pos = active.path.position_at(elapsed);
        let mut updates = vec![ShotUpdate::BallMoved(pos)];

        if ctx.arena.is_out_of_bounds(pos, self.out_of_bounds_margin) {
            log::debug!("Shot {:?}: left the court at {} after {} ms", shot, pos, elapsed);
            updates.extend(self.resolve(ShotOutcome::OutOfBounds, pos, timers));
        }
        updates
    }

    /// Flight time elapsed: decide against the hoop where it is right now
    pub fn on_arrive<E>(
        &mut self,
        shot: ShotId,
        ctx: ShotContext<'_>,
        timers: &mut Scheduler<E>,
    ) -> Vec<ShotUpdate>
    where
        E: Clone + From<ShotTimer>,
    {
        if !self.live(shot, ShotPhase::InFlight) {
            log::trace!("Stale arrival for {:?}", shot);
            return Vec::new();
        }
        let Some(active) = self.active.as_ref() else {
            return Vec::new();
        };

        let pos = active.path.end();
        let outcome = match active.path {
            ShotPath::Drop { .. } => ShotOutcome::Miss,
            ShotPath::Arc { .. } => {
                if ctx.arena.is_out_of_bounds(pos, self.out_of_bounds_margin) {
                    ShotOutcome::OutOfBounds
                } else if hits_hoop(pos, ctx.hoop, self.hit_tolerance_fraction) {
                    ShotOutcome::Hit { position: pos }
                } else {
                    ShotOutcome::Miss
                }
            }
        };

        let mut updates = vec![ShotUpdate::BallMoved(pos)];
        updates.extend(self.resolve(outcome, pos, timers));
        updates
    }

    /// Settle delay elapsed: ball back to its origin
    pub fn on_reset(&mut self, shot: ShotId, arena: &ArenaLayout) -> Option<ShotUpdate> {
        if !self.live(shot, ShotPhase::Resolved) {
            log::trace!("Stale reset for {:?}", shot);
            return None;
        }
        self.active = None;
        self.phase = ShotPhase::Idle;
        Some(ShotUpdate::BallReset(arena.ball_origin))
    }

    /// Route a shot timer to its handler
    pub fn dispatch<E>(
        &mut self,
        timer: ShotTimer,
        ctx: ShotContext<'_>,
        timers: &mut Scheduler<E>,
    ) -> Vec<ShotUpdate>
    where
        E: Clone + From<ShotTimer>,
    {
        match timer {
            ShotTimer::Sample(id) => self.on_sample(id, ctx, timers),
            ShotTimer::Arrive(id) => self.on_arrive(id, ctx, timers),
            ShotTimer::Reset(id) => self.on_reset(id, ctx.arena).into_iter().collect(),
        }
    }

    /// Drop the live shot (session end/restart), cancelling its timers
    pub fn abort<E: Clone>(&mut self, timers: &mut Scheduler<E>) {
        if let Some(active) = self.active.take() {
            log::debug!("Shot {:?} aborted in {:?}", active.id, self.phase);
            for id in [active.sampler, active.arrival].into_iter().flatten() {
                timers.cancel(id);
            }
        }
        self.phase = ShotPhase::Idle;
    }

    /// Single exit to Resolved: cancels in-flight timers and arms the reset
    fn resolve<E>(
        &mut self,
        outcome: ShotOutcome,
        position: Vec2,
        timers: &mut Scheduler<E>,
    ) -> Option<ShotUpdate>
    where
        E: Clone + From<ShotTimer>,
    {
        let active = self.active.as_mut()?;
        for id in [active.sampler.take(), active.arrival.take()]
            .into_iter()
            .flatten()
        {
            timers.cancel(id);
        }

        let settle = match (outcome, active.path) {
            (ShotOutcome::Hit { .. }, _) => self.hit_settle_ms,
            (ShotOutcome::OutOfBounds, _) => self.out_of_bounds_settle_ms,
            (ShotOutcome::Miss, ShotPath::Drop { .. }) => self.direct_drop_settle_ms,
            (ShotOutcome::Miss, ShotPath::Arc { .. }) => self.miss_settle_ms,
        };
        timers.once(settle, ShotTimer::Reset(active.id).into());
        self.phase = ShotPhase::Resolved;
        log::debug!("Shot {:?} resolved: {:?}", active.id, outcome);

        Some(ShotUpdate::Resolved(Resolution {
            shot: active.id,
            outcome,
            position,
            power: active.power,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ShotResolver {
        ShotResolver::new(&GameConfig::default())
    }

    fn ctx(arena: &ArenaLayout, offset: f32, level: u8) -> ShotContext<'_> {
        ShotContext {
            arena,
            hoop: arena.hoop_at(offset, 1.0),
            level,
        }
    }

    /// Fire timers up to `until`, collecting every update
    fn run(
        r: &mut ShotResolver,
        timers: &mut Scheduler<ShotTimer>,
        arena: &ArenaLayout,
        level: u8,
        until: u64,
    ) -> Vec<ShotUpdate> {
        let mut out = Vec::new();
        while let Some((_, timer)) = timers.pop_due(until) {
            out.extend(r.dispatch(timer, ctx(arena, 0.0, level), timers));
        }
        timers.settle(until);
        out
    }

    fn outcomes(updates: &[ShotUpdate]) -> Vec<ShotOutcome> {
        updates
            .iter()
            .filter_map(|u| match u {
                ShotUpdate::Resolved(r) => Some(r.outcome),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_hits_hoop_tolerance() {
        let hoop = Rect::new(150.0, 130.0, 100.0, 40.0);
        assert!(hits_hoop(Vec2::new(200.0, 130.0), hoop, 0.2));
        assert!(hits_hoop(Vec2::new(150.0, 122.0), hoop, 0.2));
        assert!(hits_hoop(Vec2::new(250.0, 138.0), hoop, 0.2));
        assert!(!hits_hoop(Vec2::new(200.0, 121.0), hoop, 0.2));
        assert!(!hits_hoop(Vec2::new(200.0, 139.0), hoop, 0.2));
        assert!(!hits_hoop(Vec2::new(149.0, 130.0), hoop, 0.2));
        assert!(!hits_hoop(Vec2::new(251.0, 130.0), hoop, 0.2));
    }

    #[test]
    fn test_clean_hit_then_reset() {
        let arena = ArenaLayout::default();
        let mut r = resolver();
        let mut timers = Scheduler::new();

        let launch = Launch {
            target: Vec2::new(200.0, 130.0),
            power: 72.5,
        };
        let updates = r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).unwrap();
        assert!(matches!(updates[0], ShotUpdate::Launched { path: ShotPath::Arc { .. }, .. }));
        assert_eq!(r.phase(), ShotPhase::InFlight);

        let flight = run(&mut r, &mut timers, &arena, 1, 942);
        assert!(outcomes(&flight).is_empty());
        assert!(flight.iter().all(|u| matches!(u, ShotUpdate::BallMoved(_))));

        let arrival = run(&mut r, &mut timers, &arena, 1, 943);
        assert_eq!(
            outcomes(&arrival),
            vec![ShotOutcome::Hit {
                position: Vec2::new(200.0, 130.0)
            }]
        );
        assert_eq!(r.phase(), ShotPhase::Resolved);

        let settle = run(&mut r, &mut timers, &arena, 1, 943 + 1800);
        assert_eq!(settle, vec![ShotUpdate::BallReset(arena.ball_origin)]);
        assert!(r.is_idle());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_in_range_miss() {
        let arena = ArenaLayout::default();
        let mut r = resolver();
        let mut timers = Scheduler::new();
        let launch = Launch {
            target: Vec2::new(300.0, 300.0),
            power: 0.0,
        };
        r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).unwrap();
        let updates = run(&mut r, &mut timers, &arena, 1, 5_000);
        assert_eq!(outcomes(&updates), vec![ShotOutcome::Miss]);
        assert!(r.is_idle());
    }

    #[test]
    fn test_out_of_range_is_direct_drop_miss() {
        let arena = ArenaLayout::default();
        let mut r = resolver();
        let mut timers = Scheduler::new();
        // 250 px from the hoop center: fine at level 1, too far at level 3
        let launch = Launch {
            target: Vec2::new(200.0, 400.0),
            power: 100.0,
        };
        let updates = r.launch(launch, ctx(&arena, 0.0, 3), &mut timers).unwrap();
        match updates[0] {
            ShotUpdate::Launched {
                path: ShotPath::Drop { to, duration_ms, .. },
                ..
            } => {
                assert_eq!(to, Vec2::new(200.0, arena.floor_y));
                assert_eq!(duration_ms, 800);
            }
            ref other => panic!("expected direct drop, got {:?}", other),
        }

        let drop = run(&mut r, &mut timers, &arena, 3, 800);
        assert_eq!(outcomes(&drop), vec![ShotOutcome::Miss]);
        let settle = run(&mut r, &mut timers, &arena, 3, 1200);
        assert_eq!(settle, vec![ShotUpdate::BallReset(arena.ball_origin)]);
    }

    #[test]
    fn test_out_of_range_off_court_is_out_of_bounds() {
        let arena = ArenaLayout::default();
        let mut r = resolver();
        let mut timers = Scheduler::new();
        let launch = Launch {
            target: Vec2::new(-50.0, 500.0),
            power: 10.0,
        };
        let updates = r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).unwrap();
        assert_eq!(outcomes(&updates), vec![ShotOutcome::OutOfBounds]);
        assert_eq!(r.phase(), ShotPhase::Resolved);

        let settle = run(&mut r, &mut timers, &arena, 1, 200);
        assert_eq!(settle, vec![ShotUpdate::BallReset(arena.ball_origin)]);
    }

    #[test]
    fn test_out_of_bounds_preempts_hit() {
        // Ball starts high so the arc overshoots the top edge
        let arena = ArenaLayout {
            container: Vec2::new(400.0, 600.0),
            ball_origin: Vec2::new(200.0, 100.0),
            hoop: Rect::from_center(Vec2::new(200.0, 80.0), Vec2::new(100.0, 40.0)),
            floor_y: 540.0,
        };
        let target = Vec2::new(200.0, 60.0);
        assert!(hits_hoop(target, arena.hoop, 0.2));

        let mut r = resolver();
        let mut timers = Scheduler::new();
        let launch = Launch { target, power: 100.0 };
        r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).unwrap();

        let updates = run(&mut r, &mut timers, &arena, 1, 10_000);
        assert_eq!(outcomes(&updates), vec![ShotOutcome::OutOfBounds]);
        assert!(r.is_idle());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_single_flight_guard() {
        let arena = ArenaLayout::default();
        let mut r = resolver();
        let mut timers = Scheduler::new();
        let launch = Launch {
            target: Vec2::new(200.0, 130.0),
            power: 50.0,
        };
        assert!(r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).is_some());
        assert!(r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).is_none());

        run(&mut r, &mut timers, &arena, 1, 1_200);
        assert_eq!(r.phase(), ShotPhase::Resolved);
        assert!(r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).is_none());
    }

    #[test]
    fn test_stale_callbacks_are_noops() {
        let arena = ArenaLayout::default();
        let mut r = resolver();
        let mut timers: Scheduler<ShotTimer> = Scheduler::new();
        let launch = Launch {
            target: Vec2::new(200.0, 130.0),
            power: 50.0,
        };
        r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).unwrap();
        let old = r.current_shot().unwrap();

        r.abort(&mut timers);
        assert!(r.is_idle());
        assert!(r.on_sample(old, ctx(&arena, 0.0, 1), &mut timers).is_empty());
        assert!(r.on_arrive(old, ctx(&arena, 0.0, 1), &mut timers).is_empty());
        assert!(r.on_reset(old, &arena).is_none());

        // A new shot doesn't accept the old token either
        r.launch(launch, ctx(&arena, 0.0, 1), &mut timers).unwrap();
        assert_ne!(r.current_shot(), Some(old));
        assert!(r.on_arrive(old, ctx(&arena, 0.0, 1), &mut timers).is_empty());
        assert_eq!(r.phase(), ShotPhase::InFlight);
    }

    #[test]
    fn test_hoop_read_at_arrival() {
        let arena = ArenaLayout::default();
        let mut r = resolver();
        let mut timers: Scheduler<ShotTimer> = Scheduler::new();
        // Near the hoop's left edge while it sits at rest
        let launch = Launch {
            target: Vec2::new(155.0, 130.0),
            power: 50.0,
        };
        r.launch(launch, ctx(&arena, 0.0, 2), &mut timers).unwrap();
        let shot = r.current_shot().unwrap();

        // By arrival the basket has slid 15% of its width to the right
        let updates = r.on_arrive(shot, ctx(&arena, 15.0, 2), &mut timers);
        assert_eq!(outcomes(&updates), vec![ShotOutcome::Miss]);
    }
}
