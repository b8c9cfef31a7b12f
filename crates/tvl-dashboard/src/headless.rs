#![forbid(unsafe_code)]

//! One-shot rendering without a terminal.
//!
//! Drives a [`TreasuryPage`] through the deterministic simulator: init (which
//! runs the fetch to completion), tick until the values settle, then capture
//! a single frame as plain text.

use std::time::Duration;

use tracing::{debug, warn};
use tvl_runtime::ProgramSimulator;

use crate::page::{FRAME_INTERVAL, TreasuryPage};

/// Give up waiting for the animation after this much simulated time.
pub const SETTLE_LIMIT: Duration = Duration::from_secs(5);

/// Render `page` once its values have settled, `width` columns wide.
///
/// Any exit-after timer on `page` is dropped; the snapshot never quits early.
pub fn render_snapshot(page: TreasuryPage, width: u16) -> String {
    let mut sim = ProgramSimulator::new(page.exit_after(Duration::ZERO));
    sim.init();

    let mut waited = Duration::ZERO;
    while sim.is_running() && sim.model().is_animating() && waited < SETTLE_LIMIT {
        sim.tick(FRAME_INTERVAL);
        waited += FRAME_INTERVAL;
    }
    if sim.model().is_animating() {
        warn!(waited_ms = waited.as_millis() as u64, "snapshot taken before values settled");
    } else {
        debug!(waited_ms = waited.as_millis() as u64, "values settled");
    }

    let height = TreasuryPage::preferred_height(width);
    sim.capture_frame(width, height).to_text()
}
