use chrono::{DateTime, FixedOffset};

use crate::{model::WeatherSnapshot, retry::RetryPhase};

/// Read-only state handed to the renderer once per tick.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub location: &'a str,
    pub snapshot: Option<&'a WeatherSnapshot>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Bar heights, oldest first.
    pub graph: &'a [u8],
    pub graph_levels: u8,
    pub local_time: DateTime<FixedOffset>,
    pub status: &'a str,
    /// Ticks since startup; the renderer scrolls the status line by this many steps.
    pub status_scroll: usize,
    pub fps: u32,
    /// 1..=999 once the first periodic cycle has run.
    pub update_counter: u16,
    pub time_sync: RetryPhase,
    pub weather: RetryPhase,
}

/// Draws a frame. Called unconditionally at the end of every tick.
pub trait Renderer {
    fn render(&mut self, view: &DashboardView<'_>) -> anyhow::Result<()>;
}

/// Per-tick frame rate and status scroll position.
#[derive(Debug, Clone, Copy)]
pub struct FrameTiming {
    last_frame_ms: u64,
    fps: u32,
    scroll: usize,
}

impl FrameTiming {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_frame_ms: now_ms,
            fps: 0,
            scroll: 0,
        }
    }

    /// Rate from the gap since the previous frame; a zero gap counts as 1 ms.
    pub fn advance(&mut self, now_ms: u64) {
        let gap = now_ms.saturating_sub(self.last_frame_ms).max(1);
        self.fps = u32::try_from(1000 / gap).unwrap_or(u32::MAX);
        self.last_frame_ms = now_ms;
        self.scroll = self.scroll.wrapping_add(1);
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }
}
