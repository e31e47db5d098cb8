use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::text_formatting::fit_line;

pub trait Renderable {
    fn render(&self, area: Rect, buf: &mut Buffer);
    fn desired_height(&self, width: u16) -> u16;
    fn cursor_pos(&self, _area: Rect) -> Option<(u16, u16)> {
        None
    }
}

pub type RenderableItem<'a> = Box<dyn Renderable + 'a>;

impl<'a, R> From<R> for Box<dyn Renderable + 'a>
where
    R: Renderable + 'a,
{
    fn from(value: R) -> Self {
        Box::new(value)
    }
}

impl Renderable for Line<'static> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let line = fit_line(self.clone(), usize::from(area.width));
        buf.set_line(area.x, area.y, &line, area.width);
    }
    fn desired_height(&self, _width: u16) -> u16 {
        1
    }
}

impl<R: Renderable> Renderable for Option<R> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if let Some(renderable) = self {
            renderable.render(area, buf);
        }
    }

    fn desired_height(&self, width: u16) -> u16 {
        if let Some(renderable) = self {
            renderable.desired_height(width)
        } else {
            0
        }
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        self.as_ref().and_then(|renderable| renderable.cursor_pos(area))
    }
}

/// A block of pre-rendered lines occupying exactly `height` rows.
///
/// Missing rows render blank; surplus lines are dropped.
#[derive(Debug, Default)]
pub struct FixedLines {
    lines: Vec<Line<'static>>,
    height: u16,
}

impl FixedLines {
    pub fn new(lines: Vec<Line<'static>>, height: u16) -> Self {
        Self { lines, height }
    }

    pub fn fill(lines: Vec<Line<'static>>) -> Self {
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        Self { lines, height }
    }
}

impl Renderable for FixedLines {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let blank = Line::default();
        for row in 0..area.height.min(self.height) {
            let line = self.lines.get(usize::from(row)).unwrap_or(&blank);
            Renderable::render(line, Rect::new(area.x, area.y + row, area.width, 1), buf);
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        self.height
    }
}

/// One line with the terminal cursor at a fixed column.
#[derive(Debug)]
pub struct CursorLine {
    line: Line<'static>,
    cursor: Option<u16>,
}

impl CursorLine {
    pub fn new(line: Line<'static>, cursor: Option<u16>) -> Self {
        Self { line, cursor }
    }
}

impl Renderable for CursorLine {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        Renderable::render(&self.line, area, buf);
    }

    fn desired_height(&self, _width: u16) -> u16 {
        1
    }

    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let column = self.cursor?;
        (!area.is_empty()).then(|| (area.x + column.min(area.width - 1), area.y))
    }
}

pub struct ColumnRenderable<'a> {
    children: Vec<RenderableItem<'a>>,
}

impl Renderable for ColumnRenderable<'_> {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let mut y = area.y;
        for child in &self.children {
            let child_area = Rect::new(area.x, y, area.width, child.desired_height(area.width))
                .intersection(area);
            if !child_area.is_empty() {
                child.render(child_area, buf);
            }
            y += child_area.height;
        }
    }

    fn desired_height(&self, width: u16) -> u16 {
        self.children
            .iter()
            .map(|child| child.desired_height(width))
            .sum()
    }

    /// Returns the cursor position of the first child that has a cursor position, offset by the
    /// child's position in the column.
    ///
    /// It is generally assumed that either zero or one child will have a cursor position.
    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let mut y = area.y;
        for child in &self.children {
            let child_area = Rect::new(area.x, y, area.width, child.desired_height(area.width))
                .intersection(area);
            if !child_area.is_empty()
                && let Some((px, py)) = child.cursor_pos(child_area)
            {
                return Some((px, py));
            }
            y += child_area.height;
        }
        None
    }
}

impl<'a> ColumnRenderable<'a> {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: impl Into<RenderableItem<'a>>) {
        self.children.push(child.into());
    }

    pub fn with<I, T>(children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RenderableItem<'a>>,
    {
        Self {
            children: children.into_iter().map(Into::into).collect(),
        }
    }
}
