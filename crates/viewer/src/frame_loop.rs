use crate::ViewerContext;
use bakedscene_render::Renderer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared stop flag for the frame loop. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken(Arc<AtomicBool>);

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-frame bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Completed ticks.
    pub ticks: u64,
    /// Time since the loop started, sampled at the last tick.
    pub elapsed: Duration,
    /// Time between the last two ticks.
    pub delta: Duration,
    /// Whether the controls moved the camera on the last tick.
    pub camera_moved: bool,
}

/// Drives ticks: update controls, render once, repeat until cancelled.
#[derive(Debug)]
pub struct FrameLoop {
    token: ShutdownToken,
    started: Instant,
    stats: FrameStats,
}

impl FrameLoop {
    pub fn new(token: ShutdownToken) -> Self {
        Self {
            token,
            started: Instant::now(),
            stats: FrameStats::default(),
        }
    }

    pub fn token(&self) -> &ShutdownToken {
        &self.token
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Run one frame. Returns `None` without rendering once cancelled.
    pub fn tick<R: Renderer>(&mut self, ctx: &mut ViewerContext<R>) -> Option<R::Output> {
        if self.token.is_cancelled() {
            return None;
        }

        let elapsed = self.started.elapsed();
        self.stats.delta = elapsed.saturating_sub(self.stats.elapsed);
        self.stats.elapsed = elapsed;

        self.stats.camera_moved = ctx.controls.update(&mut ctx.camera);
        let output = ctx.renderer.render(&ctx.scene, &ctx.camera);
        self.stats.ticks += 1;

        tracing::trace!(
            "tick {} elapsed={:.3}s moved={}",
            self.stats.ticks,
            elapsed.as_secs_f64(),
            self.stats.camera_moved
        );
        Some(output)
    }

    /// Tick until cancelled or `max_ticks` frames ran, handing each output
    /// to `on_frame`. Returns the number of frames this call rendered.
    pub fn run_with<R: Renderer>(
        &mut self,
        ctx: &mut ViewerContext<R>,
        max_ticks: u64,
        mut on_frame: impl FnMut(R::Output),
    ) -> u64 {
        let mut rendered = 0;
        while rendered < max_ticks {
            let Some(output) = self.tick(ctx) else {
                break;
            };
            on_frame(output);
            rendered += 1;
        }
        tracing::debug!("frame loop ran {rendered} ticks");
        rendered
    }

    pub fn run<R: Renderer>(&mut self, ctx: &mut ViewerContext<R>, max_ticks: u64) -> u64 {
        self.run_with(ctx, max_ticks, |_| {})
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(ShutdownToken::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ViewerConfig;
    use bakedscene_controls::PointerInput;
    use bakedscene_render::DebugTextRenderer;

    fn context() -> ViewerContext<DebugTextRenderer> {
        ViewerContext::new(&ViewerConfig::default(), DebugTextRenderer::default())
    }

    #[test]
    fn each_tick_renders_once() {
        let mut ctx = context();
        let mut frames = FrameLoop::default();
        for n in 1..=3 {
            let output = frames.tick(&mut ctx).unwrap();
            assert!(output.contains(&format!("Frame {n}")));
            assert_eq!(ctx.renderer.frames_rendered(), n);
            assert_eq!(frames.stats().ticks, n);
        }
    }

    #[test]
    fn cancelled_loop_renders_nothing() {
        let mut ctx = context();
        let token = ShutdownToken::new();
        let mut frames = FrameLoop::new(token.clone());
        token.cancel();
        assert!(!frames.is_running());
        assert!(frames.tick(&mut ctx).is_none());
        assert_eq!(frames.run(&mut ctx, 10), 0);
        assert_eq!(ctx.renderer.frames_rendered(), 0);
    }

    #[test]
    fn run_stops_at_bound() {
        let mut ctx = context();
        let mut frames = FrameLoop::default();
        let mut outputs = Vec::new();
        assert_eq!(frames.run_with(&mut ctx, 5, |o| outputs.push(o)), 5);
        assert_eq!(outputs.len(), 5);
        assert_eq!(ctx.renderer.frames_rendered(), 5);
        // not cancelled, so the next tick still runs
        assert!(frames.tick(&mut ctx).is_some());
    }

    #[test]
    fn cancel_mid_run_stops_before_next_render() {
        let mut ctx = context();
        let token = ShutdownToken::new();
        let mut frames = FrameLoop::new(token.clone());
        let ran = frames.run_with(&mut ctx, 100, |_| {
            if !token.is_cancelled() {
                token.cancel();
            }
        });
        assert_eq!(ran, 1);
        assert_eq!(ctx.renderer.frames_rendered(), 1);
    }

    #[test]
    fn elapsed_is_monotonic() {
        let mut ctx = context();
        let mut frames = FrameLoop::default();
        frames.tick(&mut ctx);
        let first = frames.stats().elapsed;
        std::thread::sleep(Duration::from_millis(2));
        frames.tick(&mut ctx);
        let stats = frames.stats();
        assert!(stats.elapsed > first);
        assert_eq!(stats.delta, stats.elapsed - first);
    }

    #[test]
    fn ticks_apply_orbit_drags() {
        let mut ctx = context();
        let mut frames = FrameLoop::default();
        frames.tick(&mut ctx);
        ctx.pointer(PointerInput::Down { x: 0.0, y: 0.0 });
        ctx.pointer(PointerInput::Move { x: 120.0, y: 0.0 });
        ctx.pointer(PointerInput::Up);
        let before = ctx.camera.position;
        frames.tick(&mut ctx);
        assert!(frames.stats().camera_moved);
        assert_ne!(ctx.camera.position, before);
    }
}
