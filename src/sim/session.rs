//! Session orchestration
//!
//! `GameSession` owns every piece of mutable game state and the one timer
//! queue they share. The host feeds it pointer events and wall-clock time;
//! everything visible comes back out through the `Renderer`.

use glam::Vec2;

use super::basket::BasketMotion;
use super::clock::GameClock;
use super::geometry::ArenaLayout;
use super::score::{ScoreKeeper, ScoreState};
use super::shot::{
    Launch, Resolution, ShotContext, ShotOutcome, ShotPhase, ShotResolver, ShotTimer, ShotUpdate,
};
use super::timers::{Scheduler, TimerId};
use crate::config::GameConfig;
use crate::input::{DragGesture, PointerEvent, Release};
use crate::persistence::TopScoreStore;
use crate::renderer::Renderer;

/// Everything the session schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTimer {
    Clock,
    Basket,
    PowerCharge,
    Shot(ShotTimer),
}

impl From<ShotTimer> for SessionTimer {
    fn from(timer: ShotTimer) -> Self {
        SessionTimer::Shot(timer)
    }
}

/// Geometry for shot handlers, read at call time
fn shot_context<'a>(
    config: &GameConfig,
    arena: &'a ArenaLayout,
    basket: &BasketMotion,
    score: &ScoreKeeper,
) -> ShotContext<'a> {
    let level = score.level();
    ShotContext {
        arena,
        hoop: arena.hoop_at(basket.offset(), config.hoop_scale(level)),
        level,
    }
}

pub struct GameSession<S: TopScoreStore, R: Renderer> {
    config: GameConfig,
    arena: ArenaLayout,
    timers: Scheduler<SessionTimer>,
    clock: GameClock,
    shots: ShotResolver,
    score: ScoreKeeper,
    basket: BasketMotion,
    drag: Option<DragGesture>,
    store: S,
    renderer: R,
    active: bool,
    charge_timer: Option<TimerId>,
}

impl<S: TopScoreStore, R: Renderer> GameSession<S, R> {
    /// Build an idle session; call `start` to begin the countdown
    pub fn new(config: GameConfig, arena: ArenaLayout, store: S, renderer: R) -> Self {
        let top_score = store.load().unwrap_or_else(|e| {
            log::warn!("Top score unavailable ({}), starting from 0", e);
            0
        });

        Self {
            clock: GameClock::new(config.session_seconds),
            shots: ShotResolver::new(&config),
            score: ScoreKeeper::new(&config, top_score),
            basket: BasketMotion::new(),
            timers: Scheduler::new(),
            drag: None,
            config,
            arena,
            store,
            renderer,
            active: false,
            charge_timer: None,
        }
    }

    // === Accessors ===

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn arena(&self) -> &ArenaLayout {
        &self.arena
    }

    pub fn score_state(&self) -> &ScoreState {
        self.score.state()
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn level(&self) -> u8 {
        self.score.level()
    }

    pub fn shot_phase(&self) -> ShotPhase {
        self.shots.phase()
    }

    pub fn basket_offset(&self) -> f32 {
        self.basket.offset()
    }

    pub fn basket_moving(&self) -> bool {
        self.basket.is_running()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Virtual time in ms
    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// New layout measured by the presentation layer (resize)
    pub fn set_layout(&mut self, arena: ArenaLayout) {
        self.arena = arena;
    }

    // === Lifecycle ===

    /// Begin the countdown. No-op while already running; a finished
    /// session is reset first.
    pub fn start(&mut self) {
        if self.active {
            return;
        }
        if self.clock.is_expired() {
            self.reset();
        }
        self.active = true;
        self.timers.every(self.config.clock_tick_ms, SessionTimer::Clock);
        self.renderer.on_time_changed(self.clock.time_left());
        self.notify_level();
        log::info!("Session started ({} s)", self.clock.time_left());
    }

    /// Back to a fresh, inactive session. Nothing scheduled before the
    /// reset can fire afterwards.
    pub fn reset(&mut self) {
        self.halt();
        self.clock.reset();
        self.score.reset();

        self.renderer.on_score_changed(0, 0);
        self.renderer.on_combo_changed(0);
        self.renderer.on_time_changed(self.clock.time_left());
        self.notify_level();
        log::info!("Session reset");
    }

    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Time's up: stop everything, settle the top score
    pub fn end_session(&mut self) {
        if !self.active {
            return;
        }
        self.halt();

        let is_new_record = self.score.update_top_score();
        let final_score = self.score.score();
        if is_new_record {
            if let Err(e) = self.store.save(final_score) {
                log::warn!("Failed to save top score: {}", e);
            }
        }

        log::info!(
            "Session ended: score {} (best {}{})",
            final_score,
            self.score.state().top_score,
            if is_new_record { ", new record" } else { "" }
        );
        self.renderer
            .on_session_ended(final_score, self.score.state().top_score, is_new_record);
    }

    fn notify_level(&mut self) {
        let level = self.score.level();
        self.renderer
            .on_level_changed(level, self.config.hoop_scale(level));
    }

    /// Cancel every timer, drop the shot and drag, park the basket and ball
    fn halt(&mut self) {
        self.active = false;
        self.shots.abort(&mut self.timers);
        self.timers.clear();
        self.charge_timer = None;
        self.drag = None;
        self.basket.stop();

        self.renderer.on_basket_moved(0.0);
        self.renderer.on_ball_reset(self.arena.ball_origin);
    }

    // === Input boundary ===

    /// Pointer down on the ball. Ignored when the session is over or the
    /// previous shot hasn't returned the ball yet.
    pub fn on_drag_start(&mut self, event: PointerEvent) -> bool {
        if !self.active || self.drag.is_some() || !self.shots.is_idle() {
            log::debug!("Drag ignored (phase {:?})", self.shots.phase());
            return false;
        }
        self.drag = Some(DragGesture::begin(event.position));
        self.charge_timer = Some(
            self.timers
                .every(self.config.power_charge_tick_ms, SessionTimer::PowerCharge),
        );
        self.renderer.on_power_changed(0.0);
        true
    }

    pub fn on_drag_move(&mut self, event: PointerEvent) {
        if let Some(drag) = self.drag.as_mut() {
            let power = drag.update(event.position, &self.config);
            self.renderer.on_power_changed(power);
        }
    }

    /// Pointer up. Returns true if a shot was launched.
    pub fn on_drag_end(&mut self, event: PointerEvent) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if let Some(id) = self.charge_timer.take() {
            self.timers.cancel(id);
        }

        match drag.release(event.position, self.arena.container, &self.config) {
            Release::Cancelled => {
                self.renderer.on_ball_reset(self.arena.ball_origin);
                false
            }
            Release::Shoot { target, power } => self.shoot(target, power),
        }
    }

    /// Launch directly at a container-local target
    pub fn shoot(&mut self, target: Vec2, power: f32) -> bool {
        if !self.active {
            return false;
        }
        let ctx = shot_context(&self.config, &self.arena, &self.basket, &self.score);
        match self
            .shots
            .launch(Launch { target, power }, ctx, &mut self.timers)
        {
            Some(updates) => {
                self.apply(updates);
                true
            }
            None => false,
        }
    }

    // === Time ===

    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.timers.now() + dt_ms;
        self.advance_to(until);
    }

    /// Run every timer due up to `now_ms`, in order
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((_, timer)) = self.timers.pop_due(now_ms) {
            self.dispatch(timer);
        }
        self.timers.settle(now_ms);
    }

    fn dispatch(&mut self, timer: SessionTimer) {
        match timer {
            SessionTimer::Clock => {
                let expired = self.clock.tick();
                self.renderer.on_time_changed(self.clock.time_left());
                if expired {
                    self.end_session();
                }
            }
            SessionTimer::Basket => {
                let offset = self.basket.tick();
                self.renderer.on_basket_moved(offset);
            }
            SessionTimer::PowerCharge => {
                if let Some(drag) = self.drag.as_mut() {
                    let power = drag.charge(&self.config);
                    self.renderer.on_power_changed(power);
                }
            }
            SessionTimer::Shot(timer) => {
                let ctx = shot_context(&self.config, &self.arena, &self.basket, &self.score);
                let updates = self.shots.dispatch(timer, ctx, &mut self.timers);
                self.apply(updates);
            }
        }
    }

    fn apply(&mut self, updates: Vec<ShotUpdate>) {
        for update in updates {
            match update {
                ShotUpdate::Launched { path, power, .. } => {
                    self.renderer.on_shot_launched(&path, power);
                }
                ShotUpdate::BallMoved(pos) => self.renderer.on_ball_position_update(pos),
                ShotUpdate::Resolved(resolution) => self.settle_shot(resolution),
                ShotUpdate::BallReset(origin) => self.renderer.on_ball_reset(origin),
            }
        }
    }

    /// Score one resolved shot
    fn settle_shot(&mut self, resolution: Resolution) {
        self.renderer
            .on_shot_resolved(resolution.outcome, resolution.position);

        match resolution.outcome {
            ShotOutcome::Hit { .. } => {
                let power = self.config.power_scoring.then_some(resolution.power);
                let award = self.score.on_hit(power, self.timers.now());
                self.renderer
                    .on_score_changed(self.score.score(), award.points);
                self.renderer.on_combo_changed(award.combo);

                if let Some(level) = self.score.check_level_up() {
                    self.renderer.on_level_up(level);
                    self.notify_level();
                    if level >= 2 {
                        self.start_basket(level);
                    }
                }
            }
            ShotOutcome::Miss | ShotOutcome::OutOfBounds => {
                let had_combo = self.score.combo() > 0;
                self.score.on_miss();
                if had_combo {
                    self.renderer.on_combo_changed(0);
                }
            }
        }
    }

    fn start_basket(&mut self, level: u8) {
        let (speed, range) = self.config.basket_motion(level);
        if self.basket.start(speed, range) {
            self.timers
                .every(self.config.basket_tick_ms, SessionTimer::Basket);
            log::info!("Basket moving (speed {}, range {})", speed, range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::renderer::{RecordingRenderer, RenderEvent};
    use crate::sim::geometry::Rect;

    type TestSession = GameSession<MemoryStore, RecordingRenderer>;

    fn session_with(config: GameConfig, arena: ArenaLayout) -> TestSession {
        let mut s = GameSession::new(config, arena, MemoryStore::new(), RecordingRenderer::new());
        s.start();
        s
    }

    fn session() -> TestSession {
        session_with(GameConfig::default(), ArenaLayout::default())
    }

    fn drag(s: &mut TestSession, from: Vec2, to: Vec2) -> bool {
        assert!(s.on_drag_start(PointerEvent { position: from }));
        s.on_drag_move(PointerEvent { position: to });
        s.on_drag_end(PointerEvent { position: to })
    }

    /// Straight-up shot that lands on the rim from the default ball origin
    fn swish(s: &mut TestSession) -> bool {
        drag(s, Vec2::new(200.0, 420.0), Vec2::new(200.0, 565.0))
    }

    fn run_until_idle(s: &mut TestSession) {
        for _ in 0..1_000 {
            if s.shot_phase() == ShotPhase::Idle {
                return;
            }
            s.advance(10);
        }
        panic!("shot never settled");
    }

    #[test]
    fn test_gesture_hit_scores() {
        let mut s = session();
        assert!(swish(&mut s));
        assert_eq!(s.shot_phase(), ShotPhase::InFlight);

        s.advance(942);
        assert!(s.renderer().outcomes().is_empty());
        s.advance(1);
        assert_eq!(
            s.renderer().outcomes(),
            vec![ShotOutcome::Hit {
                position: Vec2::new(200.0, 130.0)
            }]
        );
        // floor(72.5 / 8) + 2
        assert_eq!(s.score_state().score, 11);
        assert_eq!(s.score_state().consecutive_hits, 1);
        assert!(s
            .renderer()
            .events
            .contains(&RenderEvent::ScoreChanged { score: 11, points: 11 }));
        assert!(s.renderer().count(|e| matches!(e, RenderEvent::BallMoved(_))) > 20);

        run_until_idle(&mut s);
        assert_eq!(
            s.renderer().events.last(),
            Some(&RenderEvent::BallReset(s.arena().ball_origin))
        );
    }

    #[test]
    fn test_short_drag_returns_ball() {
        let mut s = session();
        assert!(!drag(&mut s, Vec2::new(200.0, 420.0), Vec2::new(210.0, 430.0)));
        assert_eq!(s.shot_phase(), ShotPhase::Idle);
        assert_eq!(
            s.renderer().events.last(),
            Some(&RenderEvent::BallReset(s.arena().ball_origin))
        );
    }

    #[test]
    fn test_drag_rejected_until_ball_returns() {
        let mut s = session();
        assert!(swish(&mut s));
        assert!(!s.on_drag_start(PointerEvent::new(200.0, 420.0)));

        s.advance(1_000);
        assert_eq!(s.shot_phase(), ShotPhase::Resolved);
        assert!(!s.on_drag_start(PointerEvent::new(200.0, 420.0)));

        run_until_idle(&mut s);
        assert!(s.on_drag_start(PointerEvent::new(200.0, 420.0)));
    }

    #[test]
    fn test_power_charges_while_held() {
        let mut s = session();
        s.on_drag_start(PointerEvent::new(200.0, 420.0));
        s.advance(600);
        assert!(s.renderer().events.contains(&RenderEvent::PowerChanged(10.0)));
        s.on_drag_end(PointerEvent::new(200.0, 420.0));
        let pending = s.pending_timers();
        s.advance(600);
        assert!(!s.renderer().events.contains(&RenderEvent::PowerChanged(11.0)));
        assert_eq!(s.pending_timers(), pending);
    }

    #[test]
    fn test_levels_and_basket_motion() {
        let mut s = session();

        // 11 points: still level 1, basket parked
        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert_eq!(s.level(), 1);
        assert!(!s.basket_moving());
        assert_eq!(
            s.renderer()
                .count(|e| matches!(e, RenderEvent::BasketMoved(o) if *o != 0.0)),
            0
        );

        // Combo 2: 11 + 3 = 14, total 25 -> level 2
        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert_eq!(s.score_state().score, 25);
        assert_eq!(s.level(), 2);
        assert!(s.basket_moving());
        assert!(s.basket_offset() != 0.0);

        // Combo 3 at level 2: 11 + 6 + 2 = 19, total 44 -> level 3
        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert_eq!(s.score_state().score, 44);
        assert_eq!(s.level(), 3);

        let level_ups: Vec<_> = s
            .renderer()
            .events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::LevelUp(l) => Some(*l),
                _ => None,
            })
            .collect();
        assert_eq!(level_ups, vec![2, 3]);

        // Still one basket tick per 25 ms after the second start
        let before = s.renderer().count(|e| matches!(e, RenderEvent::BasketMoved(_)));
        s.advance(250);
        let after = s.renderer().count(|e| matches!(e, RenderEvent::BasketMoved(_)));
        assert_eq!(after - before, 10);
    }

    #[test]
    fn test_miss_breaks_combo() {
        let mut s = session();
        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert_eq!(s.score_state().consecutive_hits, 1);

        // Lands well right of the hoop
        assert!(s.shoot(Vec2::new(320.0, 300.0), 10.0));
        run_until_idle(&mut s);
        assert_eq!(s.renderer().outcomes()[1], ShotOutcome::Miss);
        assert_eq!(s.score_state().consecutive_hits, 0);
        assert_eq!(
            s.renderer().events.iter().rev().find(|e| matches!(e, RenderEvent::ComboChanged(_))),
            Some(&RenderEvent::ComboChanged(0))
        );
        assert_eq!(s.score_state().score, 11);
    }

    #[test]
    fn test_out_of_range_never_hits() {
        let mut s = session();
        // Outside even the level 1 radius
        assert!(s.shoot(Vec2::new(200.0, 550.0), 100.0));
        assert!(matches!(
            s.renderer().events.last(),
            Some(RenderEvent::ShotLaunched { path: crate::sim::ShotPath::Drop { .. }, .. })
        ));
        run_until_idle(&mut s);
        assert_eq!(s.renderer().outcomes(), vec![ShotOutcome::Miss]);
        assert_eq!(s.score_state().score, 0);
    }

    #[test]
    fn test_charged_lob_goes_out_of_bounds() {
        let arena = ArenaLayout {
            container: Vec2::new(400.0, 600.0),
            ball_origin: Vec2::new(200.0, 100.0),
            hoop: Rect::from_center(Vec2::new(200.0, 70.0), Vec2::new(100.0, 40.0)),
            floor_y: 540.0,
        };
        let mut s = session_with(GameConfig::default(), arena);

        s.on_drag_start(PointerEvent::new(200.0, 100.0));
        s.advance(6_000);
        assert!(s.on_drag_end(PointerEvent::new(200.0, 125.0)));
        match s.renderer().events.last() {
            Some(RenderEvent::ShotLaunched { path, power }) => {
                assert_eq!(*power, 100.0);
                assert_eq!(path.end(), Vec2::new(200.0, 50.0));
            }
            other => panic!("expected launch, got {:?}", other),
        }

        run_until_idle(&mut s);
        assert_eq!(s.renderer().outcomes(), vec![ShotOutcome::OutOfBounds]);
        assert_eq!(s.score_state().score, 0);
    }

    #[test]
    fn test_clock_expiry_ends_session() {
        let config = GameConfig {
            session_seconds: 3,
            ..Default::default()
        };
        let mut s = session_with(config, ArenaLayout::default());
        assert!(swish(&mut s));
        s.advance(2_000);
        assert_eq!(s.score_state().score, 11);

        s.advance(1_000);
        assert!(!s.is_active());
        assert_eq!(s.time_left(), 0);
        assert!(s.renderer().events.contains(&RenderEvent::SessionEnded {
            final_score: 11,
            top_score: 11,
            is_new_record: true
        }));
        assert_eq!(s.store().load().unwrap(), 11);
        assert_eq!(s.pending_timers(), 0);
        assert!(!s.on_drag_start(PointerEvent::new(200.0, 420.0)));
    }

    #[test]
    fn test_no_record_without_beating_best() {
        let config = GameConfig {
            session_seconds: 1,
            ..Default::default()
        };
        let mut s = GameSession::new(
            config,
            ArenaLayout::default(),
            MemoryStore::with_top_score(30),
            RecordingRenderer::quiet(),
        );
        assert_eq!(s.score_state().top_score, 30);
        s.start();
        s.advance(1_000);
        assert!(s.renderer().events.contains(&RenderEvent::SessionEnded {
            final_score: 0,
            top_score: 30,
            is_new_record: false
        }));
        assert_eq!(s.store().writes, 0);
    }

    #[test]
    fn test_corrupt_store_starts_from_zero() {
        let s = GameSession::new(
            GameConfig::default(),
            ArenaLayout::default(),
            MemoryStore::with_raw("not a number"),
            RecordingRenderer::quiet(),
        );
        assert_eq!(s.score_state().top_score, 0);
    }

    #[test]
    fn test_reset_cancels_pending_shot() {
        let mut s = session();
        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert!(s.basket_moving());

        assert!(swish(&mut s));
        s.advance(300);
        s.reset();

        assert_eq!(s.score_state().score, 0);
        assert_eq!(s.time_left(), 120);
        assert_eq!(s.level(), 1);
        assert!(!s.basket_moving());
        assert_eq!(s.basket_offset(), 0.0);
        assert_eq!(s.shot_phase(), ShotPhase::Idle);
        assert_eq!(s.pending_timers(), 0);

        s.renderer_mut().clear();
        s.advance(10_000);
        assert!(s.renderer().events.is_empty());

        s.restart();
        assert!(s.is_active());
        s.advance(1_000);
        assert_eq!(s.time_left(), 119);
        assert!(s.renderer().outcomes().is_empty());
    }

    fn level_changes(s: &TestSession) -> Vec<u8> {
        s.renderer()
            .events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::LevelChanged { level, .. } => Some(*level),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_start_after_expiry_begins_fresh_session() {
        let config = GameConfig {
            session_seconds: 1,
            ..Default::default()
        };
        let mut s = session_with(config, ArenaLayout::default());
        assert!(swish(&mut s));
        s.advance(1_000);
        assert!(!s.is_active());
        assert_eq!(s.score_state().score, 11);

        s.start();
        assert!(s.is_active());
        assert_eq!(s.time_left(), 1);
        assert_eq!(s.score_state().score, 0);
        assert_eq!(s.score_state().top_score, 11);

        s.advance(60_000);
        assert!(!s.is_active());
        assert_eq!(s.time_left(), 0);
        assert_eq!(
            s.renderer()
                .count(|e| matches!(e, RenderEvent::SessionEnded { .. })),
            2
        );
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn test_restart_reports_level_one() {
        let mut s = session();
        assert_eq!(level_changes(&s), vec![1]);

        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert!(swish(&mut s));
        run_until_idle(&mut s);
        assert_eq!(s.level(), 2);
        assert_eq!(level_changes(&s), vec![1, 2]);

        s.renderer_mut().clear();
        s.restart();
        assert_eq!(s.level(), 1);
        assert!(!level_changes(&s).is_empty());
        assert!(level_changes(&s).iter().all(|&l| l == 1));
        assert!(s.renderer().events.contains(&RenderEvent::LevelChanged {
            level: 1,
            hoop_scale: s.config().hoop_scale(1),
        }));
    }

    #[test]
    fn test_level_one_plays_on_bigger_hoop() {
        // Inside the level 1 rim (140..260) but right of the rest rim (150..250)
        let target = Vec2::new(255.0, 130.0);

        let mut s = session();
        assert!(s.shoot(target, 50.0));
        run_until_idle(&mut s);
        assert_eq!(s.renderer().outcomes(), vec![ShotOutcome::Hit { position: target }]);
        assert_eq!(s.score_state().score, 8);

        let mut config = GameConfig::default();
        config.levels[0].hoop_scale = 1.0;
        let mut s = session_with(config, ArenaLayout::default());
        assert!(s.shoot(target, 50.0));
        run_until_idle(&mut s);
        assert_eq!(s.renderer().outcomes(), vec![ShotOutcome::Miss]);
    }
}
