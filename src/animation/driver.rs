use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::SceneContext;

use super::clock::{Clock, SystemClock};

/// Draws one frame of the scene
pub trait FrameRenderer {
    fn render_frame(&mut self, ctx: &mut SceneContext);
}

/// Blocks until the host wants the next frame
pub trait FrameScheduler {
    /// Returns false once the host will never schedule another frame
    fn wait_for_frame(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Rendered { frame: u64, elapsed: f32 },
    Stopped,
}

/// Stops a driver from outside its loop
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Per-frame loop state machine
///
/// Once started the driver keeps rendering every scheduled frame; nothing in
/// the loop stops it. Elapsed time is measured from the first `start` and is
/// never reset. There is no frame skipping and no delta clamping: a long stall
/// simply produces a large jump in rotation.
pub struct AnimationDriver<C = SystemClock> {
    clock: C,
    state: DriverState,
    started_at: Option<f64>,
    frames_rendered: u64,
    stop: StopHandle,
}

impl AnimationDriver<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for AnimationDriver<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> AnimationDriver<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            state: DriverState::Stopped,
            started_at: None,
            frames_rendered: 0,
            stop: StopHandle::default(),
        }
    }

    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(self.clock.now());
        }
        if self.state == DriverState::Stopped {
            log::info!("Animation started");
        }
        self.stop.clear();
        self.state = DriverState::Running;
    }

    pub fn stop(&mut self) {
        self.stop.stop();
        self.state = DriverState::Stopped;
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running && !self.stop.is_stopped()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Seconds since the driver was first started
    pub fn elapsed(&self) -> f32 {
        match self.started_at {
            Some(start) => (self.clock.now() - start).max(0.0) as f32,
            None => 0.0,
        }
    }

    /// Advances one frame: animate, update controls, render exactly once
    pub fn tick(&mut self, ctx: &mut SceneContext, renderer: &mut impl FrameRenderer) -> TickOutcome {
        if self.stop.is_stopped() {
            self.state = DriverState::Stopped;
        }
        if self.state == DriverState::Stopped {
            return TickOutcome::Stopped;
        }

        let elapsed = self.elapsed();
        ctx.scene.animate(elapsed);
        ctx.camera.update();
        renderer.render_frame(ctx);
        self.frames_rendered += 1;

        TickOutcome::Rendered {
            frame: self.frames_rendered,
            elapsed,
        }
    }

    /// Ticks once per scheduled frame until stopped
    ///
    /// Returns the number of frames rendered by this call.
    pub fn run(
        &mut self,
        ctx: &mut SceneContext,
        renderer: &mut impl FrameRenderer,
        scheduler: &mut impl FrameScheduler,
    ) -> u64 {
        self.start();
        let before = self.frames_rendered;

        while self.is_running() && scheduler.wait_for_frame() {
            if self.tick(ctx, renderer) == TickOutcome::Stopped {
                break;
            }
        }

        if self.stop.is_stopped() {
            self.state = DriverState::Stopped;
            log::info!("Animation stopped after {} frames", self.frames_rendered);
        }
        self.frames_rendered - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animation::ManualClock,
        assets::EnvironmentCatalog,
        config::{SceneConfig, ShowcaseConfig},
        viewport::ViewportState,
    };
    use approx::assert_relative_eq;

    /// Records what each rendered frame saw
    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<Vec<(f32, f32)>>,
        roughness: Vec<f32>,
    }

    impl FrameRenderer for RecordingRenderer {
        fn render_frame(&mut self, ctx: &mut SceneContext) {
            self.frames.push(
                ctx.scene
                    .objects
                    .iter()
                    .map(|o| (o.rotation.0 .0, o.rotation.1 .0))
                    .collect(),
            );
            self.roughness.push(ctx.scene.material.roughness);
        }
    }

    /// Schedules a fixed number of frames, advancing the clock before each
    struct CountingScheduler {
        remaining: u32,
        clock: ManualClock,
        step: f64,
        waits: u32,
        stop_after: Option<(u32, StopHandle)>,
    }

    impl CountingScheduler {
        fn new(frames: u32, clock: ManualClock, step: f64) -> Self {
            Self {
                remaining: frames,
                clock,
                step,
                waits: 0,
                stop_after: None,
            }
        }
    }

    impl FrameScheduler for CountingScheduler {
        fn wait_for_frame(&mut self) -> bool {
            if let Some((after, handle)) = &self.stop_after {
                if self.waits == *after {
                    handle.stop();
                }
            }
            if self.remaining == 0 {
                return false;
            }
            self.remaining -= 1;
            self.waits += 1;
            self.clock.advance(self.step);
            true
        }
    }

    fn context(scene: SceneConfig) -> SceneContext {
        let config = ShowcaseConfig {
            scene,
            ..ShowcaseConfig::default()
        };
        let catalog = EnvironmentCatalog::new(&config.assets_root);
        SceneContext::new(&config, &catalog, ViewportState::new(1200.0, 800.0, 1.0))
    }

    #[test]
    fn renders_exactly_once_per_scheduled_frame() {
        let clock = ManualClock::new();
        let mut driver = AnimationDriver::with_clock(clock.clone());
        let mut ctx = context(SceneConfig::basic());
        let mut renderer = RecordingRenderer::default();
        let mut scheduler = CountingScheduler::new(120, clock, 1.0 / 60.0);

        let rendered = driver.run(&mut ctx, &mut renderer, &mut scheduler);

        assert_eq!(rendered, 120);
        assert_eq!(renderer.frames.len(), 120);
        assert_eq!(scheduler.waits, 120);
        // The host ran out of frames; the driver itself never stops
        assert_eq!(driver.state(), DriverState::Running);
    }

    #[test]
    fn rotation_equals_elapsed_times_rate_each_frame() {
        for preset in [SceneConfig::basic(), SceneConfig::richer()] {
            let clock = ManualClock::new();
            let mut driver = AnimationDriver::with_clock(clock.clone());
            let mut ctx = context(preset.clone());
            let mut renderer = RecordingRenderer::default();
            let mut scheduler = CountingScheduler::new(10, clock, 0.25);

            driver.run(&mut ctx, &mut renderer, &mut scheduler);

            for (i, frame) in renderer.frames.iter().enumerate() {
                let t = 0.25 * (i + 1) as f32;
                for ((x, y), object) in frame.iter().zip(&preset.objects) {
                    assert_relative_eq!(*x, t * object.rotation_rates[0], epsilon = 1e-5);
                    assert_relative_eq!(*y, t * object.rotation_rates[1], epsilon = 1e-5);
                }
            }
        }
    }

    #[test]
    fn tick_while_stopped_does_nothing() {
        let clock = ManualClock::new();
        let mut driver = AnimationDriver::with_clock(clock.clone());
        let mut ctx = context(SceneConfig::basic());
        let mut renderer = RecordingRenderer::default();

        assert_eq!(driver.tick(&mut ctx, &mut renderer), TickOutcome::Stopped);
        assert!(renderer.frames.is_empty());

        driver.start();
        clock.advance(2.0);
        assert_eq!(
            driver.tick(&mut ctx, &mut renderer),
            TickOutcome::Rendered {
                frame: 1,
                elapsed: 2.0
            }
        );

        driver.stop();
        assert_eq!(driver.tick(&mut ctx, &mut renderer), TickOutcome::Stopped);
        assert_eq!(renderer.frames.len(), 1);
    }

    #[test]
    fn stop_handle_ends_the_loop() {
        let clock = ManualClock::new();
        let mut driver = AnimationDriver::with_clock(clock.clone());
        let mut ctx = context(SceneConfig::basic());
        let mut renderer = RecordingRenderer::default();

        driver.start();
        let mut scheduler = CountingScheduler::new(100, clock, 0.1);
        scheduler.stop_after = Some((3, driver.stop_handle()));

        let rendered = driver.run(&mut ctx, &mut renderer, &mut scheduler);
        assert_eq!(rendered, 3);
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn elapsed_is_not_reset_by_restarting() {
        let clock = ManualClock::new();
        let mut driver = AnimationDriver::with_clock(clock.clone());
        driver.start();
        clock.advance(5.0);
        driver.stop();
        driver.start();
        clock.advance(1.0);
        assert_relative_eq!(driver.elapsed(), 6.0);
    }

    #[test]
    fn edits_between_frames_show_in_the_next_frame() {
        use crate::parameters::ParameterEdit;

        let clock = ManualClock::new();
        let mut driver = AnimationDriver::with_clock(clock.clone());
        let mut ctx = context(SceneConfig::basic());
        let mut renderer = RecordingRenderer::default();

        driver.start();
        driver.tick(&mut ctx, &mut renderer);
        ctx.apply_edits(vec![ParameterEdit::Roughness(0.8)]);
        driver.tick(&mut ctx, &mut renderer);

        assert_eq!(renderer.roughness, vec![0.15, 0.8]);
    }
}
