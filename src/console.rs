use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Empty,
    HLine,
    VLine,
    Cross,
    Dot(char),
    Text(char),
}

impl Cell {
    /// text wins over lines, lines merge into crosses
    fn update(&mut self, new: Cell) {
        *self = match (*self, new) {
            (Cell::Text(c), _) => Cell::Text(c),
            (Cell::HLine, Cell::VLine) | (Cell::VLine, Cell::HLine) => Cell::Cross,
            (Cell::Cross, Cell::HLine) | (Cell::Cross, Cell::VLine) => Cell::Cross,
            (_, n) => n,
        };
    }

    fn to_char(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::HLine => '-',
            Cell::VLine => '|',
            Cell::Cross => '+',
            Cell::Dot(c) | Cell::Text(c) => c,
        }
    }
}

/// background and faint colors leave the cell empty
fn is_visible(color: &BackendColor) -> bool {
    let (r, g, b) = color.rgb;
    color.alpha > 0.3 && r.min(g).min(b) < 200
}

/// blue-ish and red-ish series get their own glyph, everything else is neutral
fn glyph(color: &BackendColor) -> char {
    let (r, _, b) = color.rgb;
    if b > r.saturating_add(60) {
        '*'
    } else if r > b.saturating_add(60) {
        'x'
    } else {
        '.'
    }
}

fn is_neutral(color: &BackendColor) -> bool {
    glyph(color) == '.'
}

pub struct TextDrawingBackend<W: Write> {
    cols: u32,
    rows: u32,
    cells: Vec<Cell>,
    sink: W,
}

impl<W: Write> TextDrawingBackend<W> {
    pub fn new(sink: W, cols: u32, rows: u32) -> Self {
        TextDrawingBackend {
            cols,
            rows,
            cells: vec![Cell::Empty; (cols * rows) as usize],
            sink,
        }
    }

    fn index(&self, (x, y): BackendCoord) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
            return None;
        }
        Some((y as u32 * self.cols + x as u32) as usize)
    }

    fn put(&mut self, pos: BackendCoord, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i].update(cell);
        }
    }
}

impl<W: Write> DrawingBackend for TextDrawingBackend<W> {
    type ErrorType = std::io::Error;

    fn get_size(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<std::io::Error>> {
        for row in self.cells.chunks(self.cols as usize) {
            let line: String = row.iter().map(|c| c.to_char()).collect();
            writeln!(self.sink, "{}", line.trim_end()).map_err(DrawingErrorKind::DrawingError)?;
        }
        self.sink.flush().map_err(DrawingErrorKind::DrawingError)
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        if is_visible(&color) {
            self.put(point, Cell::Dot(glyph(&color)));
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let color = style.color();
        if !is_visible(&color) {
            return Ok(());
        }
        if is_neutral(&color) && (from.0 == to.0 || from.1 == to.1) {
            let (cell, a, b) = if from.0 == to.0 {
                (Cell::VLine, (from.0, from.1.min(to.1)), (to.0, from.1.max(to.1)))
            } else {
                (Cell::HLine, (from.0.min(to.0), from.1), (from.0.max(to.0), to.1))
            };
            for x in a.0..=b.0 {
                for y in a.1..=b.1 {
                    self.put((x, y), cell);
                }
            }
            return Ok(());
        }
        plotters_backend::rasterizer::draw_line(self, from, to, style)
    }

    fn estimate_text_size<S: BackendTextStyle>(
        &self,
        text: &str,
        _style: &S,
    ) -> Result<(u32, u32), DrawingErrorKind<std::io::Error>> {
        Ok((text.chars().count() as u32, 1))
    }

    fn draw_text<S: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &S,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<std::io::Error>> {
        let (width, height) = self.estimate_text_size(text, style)?;
        let (width, height) = (width as i32, height as i32);
        let dx = match style.anchor().h_pos {
            HPos::Left => 0,
            HPos::Right => -width,
            HPos::Center => -width / 2,
        };
        let dy = match style.anchor().v_pos {
            VPos::Top => 0,
            VPos::Center => -height / 2,
            VPos::Bottom => -height,
        };
        let (x0, y) = (pos.0 + dx, pos.1 + dy);
        for (x, c) in (x0..).zip(text.chars()) {
            self.put((x, y), Cell::Text(c));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotters::prelude::*;
    use plotters_backend::text_anchor::Pos;

    fn rendered<F>(cols: u32, rows: u32, draw: F) -> Vec<String>
    where
        F: FnOnce(&mut TextDrawingBackend<&mut Vec<u8>>),
    {
        let mut out: Vec<u8> = Vec::new();
        {
            let mut backend = TextDrawingBackend::new(&mut out, cols, rows);
            draw(&mut backend);
            backend.present().unwrap();
        }
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn present_writes_one_line_per_row() {
        let lines = rendered(5, 3, |_| {});
        assert_eq!(lines, vec!["", "", ""]);
    }

    #[test]
    fn straight_black_lines_become_box_chars() {
        let lines = rendered(5, 3, |b| {
            b.draw_line((0, 1), (4, 1), &BLACK).unwrap();
            b.draw_line((2, 0), (2, 2), &BLACK).unwrap();
        });
        assert_eq!(lines, vec!["  |", "--+--", "  |"]);
    }

    #[test]
    fn white_fill_stays_blank() {
        let lines = rendered(3, 2, |b| {
            b.draw_rect((0, 0), (2, 1), &WHITE, true).unwrap();
        });
        assert_eq!(lines, vec!["", ""]);
    }

    #[test]
    fn series_colors_get_glyphs() {
        let lines = rendered(3, 1, |b| {
            b.draw_pixel((0, 0), RGBColor(52, 152, 219).to_backend_color())
                .unwrap();
            b.draw_pixel((2, 0), RGBColor(231, 76, 60).to_backend_color())
                .unwrap();
        });
        assert_eq!(lines, vec!["* x"]);
    }

    #[test]
    fn text_is_anchored_and_clipped() {
        let style = TextStyle::from(("sans-serif", 1.).into_font())
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        let lines = rendered(6, 2, |b| {
            b.draw_text("12.34", &style, (1, 1)).unwrap();
        });
        assert_eq!(lines, vec!["2.34", ""]);
    }
}
