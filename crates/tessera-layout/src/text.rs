//! Text measurement in terminal cells.
//!
//! Auto-sized views ask a [`TextMeasure`] for the natural size of their
//! text. The default [`CellMeasure`] counts display cells per grapheme and
//! word-wraps when given a width limit.

use tessera_core::Size;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Natural size of a piece of text.
pub trait TextMeasure {
    /// Measure `text`, wrapping at `max_width` cells when given and positive.
    fn measure(&self, text: &str, max_width: Option<i32>) -> Size;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, Option<i32>) -> Size,
{
    fn measure(&self, text: &str, max_width: Option<i32>) -> Size {
        self(text, max_width)
    }
}

/// Cell-width measurement with word wrapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasure;

impl TextMeasure for CellMeasure {
    fn measure(&self, text: &str, max_width: Option<i32>) -> Size {
        measure_text(text, max_width)
    }
}

/// Measure text the way [`CellMeasure`] does.
///
/// Every `\n` starts a new row. Words wider than the limit are broken
/// between graphemes; whitespace at a wrap point is dropped.
pub fn measure_text(text: &str, max_width: Option<i32>) -> Size {
    if text.is_empty() {
        return Size::default();
    }

    let limit = max_width
        .filter(|&width| width > 0)
        .and_then(|width| usize::try_from(width).ok());

    let mut widest = 0;
    let mut rows = 0;
    for raw_line in text.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let (width, line_rows) = match limit {
            Some(limit) => wrap_line(line, limit),
            None => (segment_width(line), 1),
        };
        widest = widest.max(width);
        rows += line_rows;
    }

    Size::new(to_cells(widest), to_cells(rows))
}

/// Widest row and row count of one hard line wrapped at `limit`.
fn wrap_line(line: &str, limit: usize) -> (usize, usize) {
    let mut rows = RowCounter::default();

    for segment in line.split_word_bounds() {
        let width = segment_width(segment);
        let blank = is_whitespace(segment);

        if rows.current + width > limit {
            if rows.current > 0 {
                rows.break_row();
            }
            if width > limit {
                for grapheme in segment.graphemes(true) {
                    let grapheme_width = grapheme.width();
                    if rows.current + grapheme_width > limit && rows.current > 0 {
                        rows.break_row();
                    }
                    rows.push(grapheme_width, blank);
                }
                continue;
            }
            // Skip leading whitespace on a wrapped row.
            if blank {
                continue;
            }
        }

        rows.push(width, blank);
    }

    rows.finish()
}

#[derive(Default)]
struct RowCounter {
    widest: usize,
    rows: usize,
    current: usize,
    /// Width of the current row without trailing whitespace
    visible: usize,
}

impl RowCounter {
    fn push(&mut self, width: usize, blank: bool) {
        self.current += width;
        if !blank {
            self.visible = self.current;
        }
    }

    fn break_row(&mut self) {
        self.widest = self.widest.max(self.visible);
        self.rows += 1;
        self.current = 0;
        self.visible = 0;
    }

    fn finish(mut self) -> (usize, usize) {
        self.break_row();
        (self.widest, self.rows)
    }
}

fn segment_width(segment: &str) -> usize {
    segment.graphemes(true).map(UnicodeWidthStr::width).sum()
}

fn is_whitespace(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

fn to_cells(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
