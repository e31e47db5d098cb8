//! Scroll state for the focus log pane.

use std::ops::Range;

/// Scroll position of a pane showing `height` rows out of `total` content lines.
///
/// `offset` always stays within `0..=total.saturating_sub(height)`. `follow` records whether the
/// pane sat at its bottom before the last content change; such a pane keeps tracking the bottom
/// as lines are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    offset: usize,
    height: usize,
    total: usize,
    follow: bool,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ViewportState {
    pub fn new(height: usize) -> Self {
        Self {
            offset: 0,
            height,
            total: 0,
            follow: true,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.height)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Range of content lines currently visible.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height).min(self.total);
        self.offset.min(end)..end
    }

    /// Replace the content length. A pane that was at the bottom stays at the bottom; otherwise
    /// the position is kept and only clamped.
    pub fn set_content(&mut self, total: usize) {
        self.total = total;
        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.clamp();
        }
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        if self.follow {
            self.offset = self.max_offset();
        } else {
            self.clamp();
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
        self.sync_follow();
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.offset = self.offset.saturating_add(lines);
        self.clamp();
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.height.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height.saturating_sub(1).max(1));
    }

    pub fn goto_top(&mut self) {
        self.offset = 0;
        self.sync_follow();
    }

    /// Explicit jump to the end; resumes auto-follow.
    pub fn goto_bottom(&mut self) {
        self.offset = self.max_offset();
        self.follow = true;
    }

    /// Scrollbar column for the visible rows: `Some(true)` for thumb cells, `Some(false)` for
    /// track cells. `None` when everything fits and no scrollbar is drawn.
    pub fn scrollbar(&self) -> Option<Vec<bool>> {
        if self.height == 0 || self.total <= self.height {
            return None;
        }
        let thumb_len = (self.height * self.height / self.total).clamp(1, self.height);
        let travel = self.height - thumb_len;
        let max_offset = self.max_offset();
        // Round to nearest so the thumb touches both ends exactly at offset 0 and max.
        let thumb_top = (self.offset * travel + max_offset / 2) / max_offset;
        let thumb = thumb_top..thumb_top + thumb_len;
        Some((0..self.height).map(|row| thumb.contains(&row)).collect())
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
        self.sync_follow();
    }

    fn sync_follow(&mut self) {
        self.follow = self.is_at_bottom();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn viewport(height: usize, total: usize) -> ViewportState {
        let mut viewport = ViewportState::new(height);
        viewport.set_content(total);
        viewport
    }

    #[test]
    fn new_content_follows_bottom() {
        let mut viewport = viewport(10, 25);
        assert_eq!(viewport.offset(), 15);
        viewport.set_content(30);
        assert_eq!(viewport.offset(), 20);
        assert_eq!(viewport.visible_range(), 20..30);
    }

    #[test]
    fn scrolled_away_position_is_preserved() {
        let mut viewport = viewport(10, 25);
        viewport.scroll_up(5);
        assert!(!viewport.is_following());
        viewport.set_content(40);
        assert_eq!(viewport.offset(), 10);

        viewport.goto_bottom();
        assert_eq!(viewport.offset(), 30);
        viewport.set_content(41);
        assert_eq!(viewport.offset(), 31);
    }

    #[test]
    fn scrolling_down_to_the_end_resumes_follow() {
        let mut viewport = viewport(10, 25);
        viewport.goto_top();
        assert!(!viewport.is_following());
        viewport.scroll_down(100);
        assert_eq!(viewport.offset(), 15);
        assert!(viewport.is_following());
    }

    #[test]
    fn scroll_up_at_top_is_noop() {
        let mut viewport = viewport(10, 5);
        viewport.scroll_up(3);
        assert_eq!(viewport.offset(), 0);
        viewport.goto_top();
        viewport.scroll_up(1);
        assert_eq!(viewport.offset(), 0);
    }

    #[test]
    fn offset_stays_in_bounds_for_any_sequence() {
        let mut viewport = viewport(7, 50);
        let ops: [fn(&mut ViewportState); 6] = [
            |v| v.scroll_up(3),
            |v| v.scroll_down(11),
            |v| v.page_up(),
            |v| v.page_down(),
            |v| v.set_content(v.total() / 2),
            |v| v.set_height(v.height() + 3),
        ];
        for step in 0..200usize {
            ops[(step * 7 + step / 3) % ops.len()](&mut viewport);
            if step % 13 == 0 {
                viewport.set_content(step % 40);
            }
            assert!(viewport.offset() <= viewport.total().saturating_sub(viewport.height()));
        }
    }

    #[test]
    fn shrinking_content_clamps_offset() {
        let mut viewport = viewport(10, 100);
        viewport.scroll_up(50);
        viewport.set_content(12);
        assert_eq!(viewport.offset(), 2);
    }

    #[test]
    fn scrollbar_is_proportional() {
        let mut viewport = viewport(4, 8);
        viewport.goto_top();
        assert_eq!(viewport.scrollbar(), Some(vec![true, true, false, false]));
        viewport.goto_bottom();
        assert_eq!(viewport.scrollbar(), Some(vec![false, false, true, true]));
        assert_eq!(self::viewport(4, 4).scrollbar(), None);
    }

    #[test]
    fn scrollbar_thumb_is_at_least_one_row() {
        let viewport = viewport(5, 1000);
        let bar = viewport.scrollbar().unwrap_or_default();
        assert_eq!(bar.len(), 5);
        assert_eq!(bar.iter().filter(|cell| **cell).count(), 1);
        assert!(bar[4]);
    }
}
