//! Terminal rendering of panel events
//!
//! Draws the spectral chart as horizontal bars in each channel's color,
//! a swatch of the estimated color and the saturation status. Colors are
//! only emitted when writing to a terminal.

use std::io::{self, Write};

use crossterm::style::{style, Color, Stylize};
use crossterm::tty::IsTty;
use palette::Srgb;
use spectrapanel_core::acquisition::ParameterSummary;
use spectrapanel_core::panel::{PanelEvent, ResultSink};
use spectrapanel_core::session::ProcessedReading;
use spectrapanel_core::spectral::{css_rgb, ChannelSet};
use tracing::debug;

/// Full scale of the chart; normalized values top out at 1.0
const CHART_MAX: f64 = 1.2;

/// Width of a full-scale bar in characters
const BAR_WIDTH: usize = 48;

const SWATCH: &str = "      ";

const ALERT: Color = Color::Rgb { r: 255, g: 0, b: 0 };

/// Writes panel events to a terminal
pub struct TerminalSink<W: Write> {
    out: W,
    bar_colors: Vec<Srgb<u8>>,
    show_raw: bool,
    color: bool,
}

impl TerminalSink<io::Stdout> {
    /// Sink on stdout, colored when stdout is a terminal
    pub fn stdout(channel_set: ChannelSet, show_raw: bool) -> Self {
        let out = io::stdout();
        let color = out.is_tty();
        Self::new(out, channel_set, show_raw, color)
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, channel_set: ChannelSet, show_raw: bool, color: bool) -> Self {
        Self {
            out,
            bar_colors: channel_set.bar_colors(),
            show_raw,
            color,
        }
    }

    fn paint(&self, text: &str, fg: Option<Color>, bg: Option<Color>) -> String {
        if !self.color {
            return text.to_string();
        }
        let mut styled = style(text);
        if let Some(fg) = fg {
            styled = styled.with(fg);
        }
        if let Some(bg) = bg {
            styled = styled.on(bg);
        }
        styled.to_string()
    }

    fn write_parameters(&mut self, summary: &ParameterSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "{}  {}  {}",
            summary.time_label(),
            summary.gain_label(),
            summary.current_label()
        )
    }

    fn write_reading(&mut self, processed: &ProcessedReading) -> io::Result<()> {
        if processed.reading.len() != self.bar_colors.len() {
            let set = processed
                .reading
                .labels()
                .last()
                .and_then(|label| label.parse::<ChannelSet>().ok())
                .unwrap_or_default();
            self.bar_colors = set.bar_colors();
        }

        writeln!(self.out)?;
        for (i, (label, value)) in processed
            .reading
            .labels()
            .iter()
            .zip(&processed.display)
            .enumerate()
        {
            let color = self
                .bar_colors
                .get(i)
                .copied()
                .unwrap_or(Srgb::new(255, 255, 255));
            let bar = self.paint(&"█".repeat(bar_length(*value)), Some(term_color(color)), None);
            writeln!(self.out, "{label:>6} {bar} {value:.3}")?;
        }

        let swatch = self.paint(SWATCH, None, Some(term_color(processed.color)));
        writeln!(self.out, "Color: {swatch} {}", css_rgb(processed.color))?;

        let status = if processed.status.is_saturated() {
            self.paint(processed.status.message(), Some(ALERT), None)
        } else {
            processed.status.message().to_string()
        };
        writeln!(self.out, "{status}")?;

        if processed.recalibrated {
            writeln!(self.out, "Normalization curve taken from this reading")?;
        }

        if self.show_raw {
            writeln!(self.out, "{}", processed.raw.to_pretty_json())?;
        }
        Ok(())
    }
}

impl<W: Write> ResultSink for TerminalSink<W> {
    fn render(&mut self, event: &PanelEvent) {
        let result = match event {
            PanelEvent::Parameters { summary, .. } => self.write_parameters(summary),
            PanelEvent::ReadStarted(_) => Ok(()),
            PanelEvent::Reading(processed) => self.write_reading(processed),
            PanelEvent::Error(e) => {
                let heading = self.paint("Exception was thrown", Some(ALERT), None);
                writeln!(self.out, "{heading}").and_then(|_| writeln!(self.out, "{e}"))
            }
            PanelEvent::RepeatChanged(enabled) => writeln!(
                self.out,
                "Repeat {}",
                if *enabled { "on" } else { "off" }
            ),
            PanelEvent::ReferenceChanged(mode) => {
                writeln!(self.out, "Normalization reference: {mode}")
            }
        };
        if let Err(e) = result.and_then(|_| self.out.flush()) {
            debug!("terminal write failed: {e}");
        }
    }
}

/// Terminal color for a palette color
fn term_color(color: Srgb<u8>) -> Color {
    Color::Rgb {
        r: color.red,
        g: color.green,
        b: color.blue,
    }
}

/// Number of block characters for a normalized value
pub fn bar_length(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / CHART_MAX) * BAR_WIDTH as f64).round().min(BAR_WIDTH as f64) as usize
}
