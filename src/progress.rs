use std::time::Duration;

use indicatif::{ProgressBar,ProgressStyle};

/// Progress reporting for walk batches.  Disabled bars cost nothing.
pub struct WalkProgress {
    pb: Option<ProgressBar>
}

impl WalkProgress {
    pub fn new(total_walks: u64, enabled: bool) -> Self {
        let pb = if enabled {
            let pb = ProgressBar::new(total_walks);
            let style = ProgressStyle::default_bar()
                .template("[walks] {wide_bar} ({per_sec}) {pos:>7}/{len:7} - Elapsed: {elapsed_precise}, Remaining: {eta_precise}");

            // A bad template only costs us the styling
            if let Ok(style) = style {
                pb.set_style(style);
            }

            // Update in separate thread
            pb.enable_steady_tick(Duration::from_millis(200));
            Some(pb)
        } else {
            None
        };

        WalkProgress { pb }
    }

    pub fn inc(&self, walks: u64) {
        if let Some(pb) = &self.pb {
            pb.inc(walks);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish();
        }
    }
}
