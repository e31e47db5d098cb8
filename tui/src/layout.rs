//! Fixed row reservations for the two views.

pub const MIN_TERMINAL_WIDTH: u16 = 40;
pub const MIN_TERMINAL_HEIGHT: u16 = 12;
pub const MIN_VIEWPORT_HEIGHT: usize = 3;

pub const HEADER_ROWS: u16 = 2;
pub const INPUT_ROWS: u16 = 1;
pub const STATUS_ROWS: u16 = 1;

pub const DASHBOARD_BROADCAST_TITLE_ROWS: u16 = 1;
pub const DASHBOARD_AGENT_TITLE_ROWS: u16 = 1;
/// Rows used by one mysis on the dashboard: the summary row and its message row.
pub const AGENT_ROW_HEIGHT: usize = 2;

pub const FOCUS_INFO_ROWS: u16 = 4;
pub const FOCUS_TITLE_ROWS: u16 = 1;
pub const FOCUS_RESERVED_ROWS: u16 =
    HEADER_ROWS + FOCUS_INFO_ROWS + FOCUS_TITLE_ROWS + INPUT_ROWS + STATUS_ROWS;

/// Columns taken by the focus log scrollbar.
pub const SCROLLBAR_COLS: u16 = 1;

pub fn is_too_small(width: u16, height: u16) -> bool {
    width < MIN_TERMINAL_WIDTH || height < MIN_TERMINAL_HEIGHT
}

/// Height of the focus log viewport for a terminal `height` rows tall.
pub fn focus_viewport_height(height: u16) -> usize {
    usize::from(height.saturating_sub(FOCUS_RESERVED_ROWS)).max(MIN_VIEWPORT_HEIGHT)
}

/// Width the focus log content is wrapped to.
pub fn focus_content_width(width: u16) -> u16 {
    width.saturating_sub(SCROLLBAR_COLS).max(1)
}

/// Split the dashboard body between the broadcast list and the mysis list. Broadcasts get at
/// most a third of the body and never more rows than they have entries (one row minimum for the
/// empty placeholder).
pub fn dashboard_split(body_rows: usize, broadcast_count: usize, max_broadcasts: usize) -> (usize, usize) {
    let broadcast_rows = broadcast_count
        .clamp(1, max_broadcasts.max(1))
        .min(body_rows / 3)
        .min(body_rows);
    (broadcast_rows, body_rows - broadcast_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn viewport_height_has_a_floor() {
        assert_eq!(focus_viewport_height(40), 31);
        assert_eq!(focus_viewport_height(12), 3);
        assert_eq!(focus_viewport_height(0), MIN_VIEWPORT_HEIGHT);
    }

    #[test]
    fn dashboard_split_favors_agents() {
        assert_eq!(dashboard_split(18, 0, 10), (1, 17));
        assert_eq!(dashboard_split(18, 4, 10), (4, 14));
        assert_eq!(dashboard_split(18, 10, 10), (6, 12));
        assert_eq!(dashboard_split(2, 3, 10), (0, 2));
    }

    #[test]
    fn minimum_size() {
        assert!(is_too_small(39, 30));
        assert!(is_too_small(80, 11));
        assert!(!is_too_small(40, 12));
    }
}
