//! Frame-indexed animations driven by the runner's tick.

use crate::theme::Glyphs;

/// Cells in the network indicator's bounce track.
pub const BOUNCE_TRACK_WIDTH: usize = 6;

pub fn spinner(glyphs: &Glyphs, frame: usize) -> &'static str {
    match glyphs.spinner.len() {
        0 => "",
        len => glyphs.spinner[frame % len],
    }
}

/// Position of the bouncing block: walks right, then back left.
pub fn bounce_position(frame: usize, track_width: usize) -> usize {
    if track_width <= 1 {
        return 0;
    }
    let period = 2 * (track_width - 1);
    let step = frame % period;
    if step < track_width {
        step
    } else {
        period - step
    }
}

/// The bounce track as text, e.g. `[  ■   ]`.
pub fn bounce_track(glyphs: &Glyphs, frame: usize, track_width: usize) -> String {
    let position = bounce_position(frame, track_width);
    let mut out = String::from("[");
    for cell in 0..track_width {
        out.push_str(if cell == position {
            glyphs.bounce_block
        } else {
            " "
        });
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bounce_walks_back_and_forth() {
        let positions: Vec<usize> = (0..12).map(|frame| bounce_position(frame, 4)).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 2, 1, 0, 1, 2, 3, 2, 1]);
        assert_eq!(bounce_position(7, 1), 0);
    }

    #[test]
    fn track_has_one_block() {
        let glyphs = Glyphs::default();
        assert_eq!(bounce_track(&glyphs, 2, 4), "[  ■ ]");
    }

    #[test]
    fn spinner_cycles() {
        let glyphs = Glyphs::default();
        assert_eq!(spinner(&glyphs, 0), spinner(&glyphs, glyphs.spinner.len()));
        assert_ne!(spinner(&glyphs, 0), spinner(&glyphs, 1));
    }
}
