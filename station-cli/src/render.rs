use std::io::Write;

use anyhow::Result;
use station_core::{
    DashboardView, Renderer, RetryPhase, WeatherSnapshot,
    model::format_temperature,
};

/// Moves the cursor home and clears the screen.
const CLEAR: &str = "\x1b[H\x1b[2J";

/// Visible width of the status line; longer text scrolls one character per tick.
const STATUS_WIDTH: usize = 48;
const MARQUEE_GAP: &str = "   ";

/// Plain-text dashboard, redrawn in place.
pub struct TerminalRenderer<W: Write> {
    out: W,
    clear: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, clear: true }
    }

    #[cfg(test)]
    fn without_clear(out: W) -> Self {
        Self { out, clear: false }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, view: &DashboardView<'_>) -> Result<()> {
        let mut frame = String::new();
        if self.clear {
            frame.push_str(CLEAR);
        }
        frame.push_str(&format_frame(view));
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

fn format_frame(view: &DashboardView<'_>) -> String {
    let mut lines = Vec::new();

    let unit = view
        .snapshot
        .map(|s| s.units.temperature_symbol())
        .unwrap_or("");
    let opt_temp = |t: Option<f64>| match t {
        Some(t) => format!("{}{unit}", format_temperature(t)),
        None => "--".to_string(),
    };

    lines.push(format!(
        "WEATHER  {}  {}",
        view.local_time.format("%H:%M:%S"),
        view.location
    ));

    match view.snapshot {
        Some(s) => {
            lines.push(format!(
                "{} {}{}  feels like {}{}",
                s.place,
                format_temperature(s.temperature),
                unit,
                format_temperature(s.feels_like),
                unit
            ));
            lines.push(format!(
                "HUMID {:.0}%  PRESS {:.0}hPa  WIND {:.0}{}",
                s.humidity,
                s.pressure,
                s.wind_speed,
                s.units.wind_symbol()
            ));
        }
        None => lines.push("no reading yet".to_string()),
    }

    lines.push(format!(
        "HISTORY  MIN:{}  MAX:{}",
        opt_temp(view.min),
        opt_temp(view.max)
    ));
    lines.extend(graph_rows(view.graph, view.graph_levels));

    let mut flags = Vec::new();
    if view.time_sync != RetryPhase::Idle {
        flags.push(format!("time:{}", phase_label(view.time_sync)));
    }
    if view.weather != RetryPhase::Idle {
        flags.push(format!("weather:{}", phase_label(view.weather)));
    }
    let status = marquee(view.status, view.status_scroll, STATUS_WIDTH);
    lines.push(format!("{status}  {}", flags.join(" ")).trim_end().to_string());
    lines.push(format!("UPDATES: {}  FPS:{}", view.update_counter, view.fps));

    let mut frame = lines.join("\n");
    frame.push('\n');
    frame
}

/// Top row first; a cell is filled when the bar reaches that level.
fn graph_rows(graph: &[u8], levels: u8) -> Vec<String> {
    (1..=levels)
        .rev()
        .map(|level| {
            let row: String = graph
                .iter()
                .map(|&bar| if bar >= level { '#' } else { ' ' })
                .collect();
            format!("|{row}")
        })
        .chain(std::iter::once(format!("+{}", "-".repeat(graph.len()))))
        .collect()
}

/// `width` characters of `text` starting `offset` characters in, wrapping round after a gap.
fn marquee(text: &str, offset: usize, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return text.to_string();
    }

    let cycle = len + MARQUEE_GAP.len();
    text.chars()
        .chain(MARQUEE_GAP.chars())
        .cycle()
        .skip(offset % cycle)
        .take(width)
        .collect()
}

fn phase_label(phase: RetryPhase) -> &'static str {
    match phase {
        RetryPhase::Idle => "ok",
        RetryPhase::PendingRetry => "retrying",
        RetryPhase::Exhausted => "failed",
    }
}

pub fn print_snapshot(out: &mut impl Write, s: &WeatherSnapshot) -> Result<()> {
    let unit = s.units.temperature_symbol();
    writeln!(out, "{}", s.place)?;
    writeln!(out, "  {}", s.condition)?;
    writeln!(
        out,
        "  Temperature: {}{unit} (feels like {}{unit})",
        format_temperature(s.temperature),
        format_temperature(s.feels_like)
    )?;
    writeln!(out, "  Humidity:    {:.0}%", s.humidity)?;
    writeln!(out, "  Pressure:    {:.0} hPa", s.pressure)?;
    writeln!(out, "  Wind:        {:.1} {}", s.wind_speed, s.units.wind_symbol())?;
    writeln!(out, "  Sunrise:     {}", s.sunrise)?;
    writeln!(out, "  Sunset:      {}", s.sunset)?;
    Ok(())
}
