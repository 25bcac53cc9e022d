use std::sync::atomic::{AtomicU64, Ordering};

// Process-wide observability counters. Incremented with relaxed ordering on
// the hot path; read only once rendering is done.
static INTERSECTION_TESTS: AtomicU64 = AtomicU64::new(0);
static RAY_BOUNCES: AtomicU64 = AtomicU64::new(0);

#[inline(always)]
pub fn count_intersection_test() {
    INTERSECTION_TESTS.fetch_add(1, Ordering::Relaxed);
}

#[inline(always)]
pub fn count_bounce() {
    RAY_BOUNCES.fetch_add(1, Ordering::Relaxed);
}

pub fn intersection_tests() -> u64 {
    INTERSECTION_TESTS.load(Ordering::Relaxed)
}

pub fn ray_bounces() -> u64 {
    RAY_BOUNCES.load(Ordering::Relaxed)
}

/// Aggregate statistics collected during the rendering pass for diagnostic
/// output at render end.
pub struct RenderStats {
    pub intersection_tests: u64,
    pub ray_bounces: u64,
    pub elapsed_secs: f64,
    pub width: u32,
    pub height: u32,
    pub spp: u32,
}

impl RenderStats {
    /// Snapshot of the global counters paired with the render parameters.
    pub fn capture(elapsed_secs: f64, width: u32, height: u32, spp: u32) -> Self {
        Self {
            intersection_tests: intersection_tests(),
            ray_bounces: ray_bounces(),
            elapsed_secs,
            width,
            height,
            spp,
        }
    }

    pub fn print_summary(&self) {
        let bar_width = 30;
        let fill = "━".repeat(bar_width);
        eprintln!("  {fill}");
        eprintln!("  Time:       {:.2}s", self.elapsed_secs);
        eprintln!(
            "  Tests:      {:.2}M primitive intersection tests",
            self.intersection_tests as f64 / 1e6
        );
        eprintln!(
            "  Bounces:    {:.2}M rays traced",
            self.ray_bounces as f64 / 1e6
        );
        eprintln!(
            "  Image:      {}×{} @ {} spp",
            self.width, self.height, self.spp
        );
        eprintln!("  {fill}");
    }
}
