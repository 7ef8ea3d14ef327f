/// Lines moved by one page-up / page-down
pub const PAGE_STEP: usize = 5;

/// The visible window over a list of display lines
///
/// Invariants, restored by every public method:
/// - `offset <= max(0, line_count - height)`
/// - after [`ScrollWindow::follow`], the cursor line is in `[offset, offset + height)`
///   (for `height > 0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollWindow {
    offset: usize,
    height: usize,
}

impl ScrollWindow {
    pub fn new(height: usize) -> Self {
        Self { offset: 0, height }
    }

    /// First visible line
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of visible lines
    pub fn height(&self) -> usize {
        self.height
    }

    /// Range of visible line indices, limited to `line_count`
    pub fn visible_range(&self, line_count: usize) -> std::ops::Range<usize> {
        let end = (self.offset + self.height).min(line_count);
        self.offset.min(end)..end
    }

    fn max_offset(&self, line_count: usize) -> usize {
        line_count.saturating_sub(self.height)
    }

    fn clamp(&mut self, line_count: usize) {
        self.offset = self.offset.min(self.max_offset(line_count));
    }

    /// Scroll just enough to show `cursor_line`, then clamp.
    ///
    /// Called after every edit, cursor move and resize.
    pub fn follow(&mut self, cursor_line: usize, line_count: usize) {
        if cursor_line < self.offset {
            self.offset = cursor_line;
        }
        if self.height > 0 && cursor_line >= self.offset + self.height {
            self.offset = cursor_line + 1 - self.height;
        }
        self.clamp(line_count);
    }

    /// Change the height and re-establish the cursor invariant
    pub fn resize(&mut self, height: usize, cursor_line: usize, line_count: usize) {
        self.height = height;
        self.follow(cursor_line, line_count);
    }

    /// Shift the window up by `step` without touching the cursor
    pub fn page_up(&mut self, step: usize, line_count: usize) {
        self.offset = self.offset.saturating_sub(step);
        self.clamp(line_count);
    }

    /// Shift the window down by `step` without touching the cursor
    pub fn page_down(&mut self, step: usize, line_count: usize) {
        self.offset = self.offset.saturating_add(step);
        self.clamp(line_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_scrolls_down_and_up() {
        let mut window = ScrollWindow::new(3);
        window.follow(5, 10);
        assert_eq!(window.offset(), 3);
        window.follow(4, 10);
        assert_eq!(window.offset(), 3);
        window.follow(1, 10);
        assert_eq!(window.offset(), 1);
    }

    #[test]
    fn test_offset_clamped_when_content_shrinks() {
        let mut window = ScrollWindow::new(4);
        window.follow(9, 10);
        assert_eq!(window.offset(), 6);
        window.follow(2, 3);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn test_paging_clamps_without_cursor() {
        let mut window = ScrollWindow::new(4);
        window.page_down(PAGE_STEP, 12);
        assert_eq!(window.offset(), 5);
        window.page_down(PAGE_STEP, 12);
        assert_eq!(window.offset(), 8);
        window.page_up(PAGE_STEP, 12);
        assert_eq!(window.offset(), 3);
        window.page_up(PAGE_STEP, 12);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn test_short_content_never_scrolls() {
        let mut window = ScrollWindow::new(10);
        window.page_down(PAGE_STEP, 3);
        assert_eq!(window.offset(), 0);
        assert_eq!(window.visible_range(3), 0..3);
    }

    #[test]
    fn test_resize_keeps_cursor_visible() {
        let mut window = ScrollWindow::new(10);
        window.follow(8, 20);
        assert_eq!(window.offset(), 0);
        window.resize(3, 8, 20);
        assert_eq!(window.offset(), 6);
        assert!(window.visible_range(20).contains(&8));
    }

    #[test]
    fn test_zero_height() {
        let mut window = ScrollWindow::new(0);
        window.follow(3, 5);
        assert_eq!(window.offset(), 0);
        assert!(window.visible_range(5).is_empty());
    }
}
