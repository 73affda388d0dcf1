use std::{borrow::Cow, fmt::Write};

const COLUMN_GAP: usize = 2;

#[derive(Default)]
pub struct TextTableBuilder<'a, Seq> {
    headers: &'a [Cow<'a, str>],
    rows: Vec<Seq>,
    alignments: Cow<'a, [Alignment]>,
}

#[derive(Clone, Copy, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

impl<'a, Seq> TextTableBuilder<'a, Seq>
where
    Seq: AsRef<[Cow<'a, str>]> + Default,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alignments(mut self, alignments: &'a [Alignment]) -> Self {
        self.alignments = Cow::Borrowed(alignments);
        self
    }

    pub fn headers(mut self, headers: &'a [Cow<'a, str>]) -> Self {
        self.headers = headers;
        if self.alignments.is_empty() {
            self.alignments = Cow::Owned(vec![Alignment::default(); self.headers.len()]);
        }
        self
    }

    pub fn row(mut self, row: Seq) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = Seq>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn build(self) -> String {
        let col_count = self.headers.len();
        if col_count == 0 {
            return String::new();
        }

        let mut col_widths: Vec<usize> = self.headers.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.as_ref().iter().enumerate().take(col_count) {
                col_widths[i] = col_widths[i].max(display_width(cell));
            }
        }

        let mut table = String::with_capacity(256 + self.rows.len() * 64);
        self.write_line(&mut table, self.headers, &col_widths);
        let rule_width = col_widths.iter().sum::<usize>() + COLUMN_GAP * (col_count - 1);
        let _ = writeln!(&mut table, "{}", "-".repeat(rule_width));
        for row in &self.rows {
            self.write_line(&mut table, row.as_ref(), &col_widths);
        }
        table
    }

    fn write_line(&self, out: &mut String, cells: &[Cow<'_, str>], col_widths: &[usize]) {
        let mut line = String::new();
        for (i, width) in col_widths.iter().enumerate() {
            let cell = cells.get(i).map(AsRef::as_ref).unwrap_or("");
            let padding = " ".repeat(width.saturating_sub(display_width(cell)));
            if i > 0 {
                line.push_str(&" ".repeat(COLUMN_GAP));
            }
            match self.alignments.get(i).copied().unwrap_or_default() {
                Alignment::Left => {
                    line.push_str(cell);
                    line.push_str(&padding);
                }
                Alignment::Right => {
                    line.push_str(&padding);
                    line.push_str(cell);
                }
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
}

/// Terminal columns taken by `text`; non-ASCII counts as double width.
fn display_width(text: &str) -> usize {
    text.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}
