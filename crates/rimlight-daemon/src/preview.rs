//! Terminal strip preview — renders the sample ring as truecolor blocks.
//!
//! Diagnostic consumer for checking the traversal visually without LED
//! hardware attached: each published sequence repaints the terminal with one
//! colored cell per sample, clockwise from the bottom-right corner.

use std::io::Write;

use rimlight_core::Rgb;
use rimlight_sampler::SampleSequence;
use tracing::debug;

use crate::feed::SampleFeedReader;

/// Cells per terminal row.
const CELLS_PER_ROW: usize = 40;

/// Consume the feed until the writer goes away, repainting on every update.
pub async fn run_preview(mut reader: SampleFeedReader) {
    debug!("terminal preview enabled");
    while reader.changed().await {
        let sequence = reader.latest();
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(render(&sequence).as_bytes());
        let _ = stdout.flush();
    }
}

/// Render one sequence as an ANSI repaint (clear, home, colored cells).
fn render(sequence: &SampleSequence) -> String {
    let mut out = String::with_capacity(sequence.len() * 24 + 64);
    out.push_str("\x1b[2J\x1b[H");
    out.push_str(&format!(
        "Border samples (clockwise from bottom-right): {}\n",
        sequence.len()
    ));
    for (i, sample) in sequence.iter().enumerate() {
        out.push_str(&cell(*sample));
        if (i + 1) % CELLS_PER_ROW == 0 {
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

/// One two-column truecolor background cell.
fn cell(color: Rgb) -> String {
    format!("\x1b[48;2;{};{};{}m  \x1b[0m", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_uses_truecolor_background() {
        assert_eq!(cell(Rgb::new(1, 2, 3)), "\x1b[48;2;1;2;3m  \x1b[0m");
    }

    #[test]
    fn render_repaints_and_wraps_rows() {
        let sequence = SampleSequence::from_samples(vec![Rgb::BLACK; CELLS_PER_ROW + 1]);
        let rendered = render(&sequence);

        assert!(rendered.starts_with("\x1b[2J\x1b[H"));
        assert_eq!(rendered.matches("\x1b[48;2;0;0;0m").count(), CELLS_PER_ROW + 1);
        // One wrap after the first full row, plus the trailing newline.
        assert!(rendered.contains("m  \x1b[0m\n\x1b[48;2;"));
    }
}
