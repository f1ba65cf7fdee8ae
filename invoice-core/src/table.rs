use std::collections::BTreeSet;
use std::io::Write;

use crate::document::{format_coord, PdfDocument};
use crate::fonts::{BuiltinFont, FontMetrics};
use crate::graphics::{light_border, text_body, white, Color};
use crate::grouping::group_items;
use crate::model::{format_money, format_pct, format_qty, LineItem, Theme};
use crate::text::{wrap_text, Rect, TextAlign, TextStyle};
use crate::writer::escape_pdf_string;
use crate::MM;

// -------------------------------------------------------
// Generic row/cell layer
// -------------------------------------------------------

/// Result of fitting a row into the cursor's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitResult {
    /// The row was placed.
    Stop,
    /// The rectangle is full; turn the page and retry.
    BoxFull,
    /// Nothing placed yet and the rectangle cannot hold even this row.
    BoxEmpty,
}

/// Style options for a table cell.
#[derive(Debug, Clone)]
pub struct CellStyle {
    /// Optional cell background (overrides the row background).
    pub background_color: Option<Color>,
    /// Text color; black when unset.
    pub text_color: Option<Color>,
    pub font: BuiltinFont,
    pub font_size: f64,
    /// Padding applied to all four sides, in points.
    pub padding: f64,
    pub align: TextAlign,
}

impl Default for CellStyle {
    fn default() -> Self {
        CellStyle {
            background_color: None,
            text_color: None,
            font: BuiltinFont::Helvetica,
            font_size: 10.0,
            padding: 4.0,
            align: TextAlign::Left,
        }
    }
}

/// A single table cell: text plus style. Text wraps within the column.
#[derive(Debug, Clone)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Cell {
            text: text.into(),
            style: CellStyle::default(),
        }
    }

    pub fn styled(text: impl Into<String>, style: CellStyle) -> Self {
        Cell {
            text: text.into(),
            style,
        }
    }
}

/// A row of cells.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Optional background applied to the entire row.
    pub background_color: Option<Color>,
    /// When true the first cell spans every column.
    pub span: bool,
    /// Override for the rule drawn below this row.
    pub rule_color: Option<Color>,
    pub rule_width: Option<f64>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row {
            cells,
            background_color: None,
            span: false,
            rule_color: None,
            rule_width: None,
        }
    }

    /// A row whose single cell spans the full table width.
    pub fn spanning(cell: Cell) -> Self {
        let background = cell.style.background_color;
        Row {
            cells: vec![cell],
            background_color: background,
            span: true,
            rule_color: None,
            rule_width: None,
        }
    }
}

/// Table layout configuration: column widths and grid style. Holds no row
/// data — the caller feeds one `Row` at a time to `fit_row`, so row sets
/// of any size stream through without buffering.
pub struct Table {
    /// Column widths in points.
    pub columns: Vec<f64>,
    /// Grid rule color (below each row and between columns).
    pub border_color: Color,
    /// Grid rule width in points. 0.0 disables the grid.
    pub border_width: f64,
}

impl Table {
    pub fn new(columns: Vec<f64>) -> Self {
        Table {
            columns,
            border_color: Color::rgb(0.0, 0.0, 0.0),
            border_width: 0.5,
        }
    }

    pub fn total_width(&self) -> f64 {
        self.columns.iter().sum()
    }

    /// Height this row needs: the tallest wrapped cell plus padding.
    pub fn measure_row_height(&self, row: &Row) -> f64 {
        if row.span {
            return row
                .cells
                .first()
                .map(|cell| measure_cell_height(cell, self.total_width()))
                .unwrap_or(0.0);
        }
        self.columns
            .iter()
            .enumerate()
            .map(|(i, &width)| match row.cells.get(i) {
                Some(cell) => measure_cell_height(cell, width),
                None => 0.0,
            })
            .fold(0.0_f64, f64::max)
    }

    /// Generate content-stream bytes for one row at the cursor position.
    /// Returns the bytes, a `FitResult`, and the fonts used.
    pub(crate) fn generate_row_ops(
        &self,
        row: &Row,
        cursor: &mut TableCursor,
    ) -> (Vec<u8>, FitResult, BTreeSet<BuiltinFont>) {
        let row_height = self.measure_row_height(row);
        let bottom = cursor.rect.bottom();

        if cursor.current_y - row_height < bottom {
            // Nothing placed yet means the rect itself is too small;
            // otherwise the box is simply full and the caller turns the page.
            let result = if cursor.first_row {
                FitResult::BoxEmpty
            } else {
                FitResult::BoxFull
            };
            return (Vec::new(), result, BTreeSet::new());
        }

        let mut output: Vec<u8> = Vec::new();
        let mut fonts = BTreeSet::new();

        self.draw_backgrounds(row, cursor.rect.x, cursor.current_y, row_height, &mut output);

        if row.span {
            if let Some(cell) = row.cells.first() {
                render_cell(
                    cell,
                    cursor.rect.x,
                    cursor.current_y,
                    self.total_width(),
                    &mut output,
                    &mut fonts,
                );
            }
        } else {
            let mut col_x = cursor.rect.x;
            for (i, &width) in self.columns.iter().enumerate() {
                if let Some(cell) = row.cells.get(i) {
                    render_cell(cell, col_x, cursor.current_y, width, &mut output, &mut fonts);
                }
                col_x += width;
            }
        }

        if self.border_width > 0.0 {
            self.draw_grid(row, cursor.rect.x, cursor.current_y, row_height, &mut output);
        }

        cursor.current_y -= row_height;
        cursor.first_row = false;
        (output, FitResult::Stop, fonts)
    }

    /// Row background first, per-cell backgrounds on top.
    fn draw_backgrounds(&self, row: &Row, x: f64, top: f64, height: f64, output: &mut Vec<u8>) {
        let bottom = top - height;
        if let Some(bg) = row.background_color {
            fill_rect(bg, x, bottom, self.total_width(), height, output);
        }
        if row.span {
            return;
        }
        let mut col_x = x;
        for (i, &width) in self.columns.iter().enumerate() {
            if let Some(cell) = row.cells.get(i) {
                if let Some(bg) = cell.style.background_color {
                    if row.background_color != Some(bg) {
                        fill_rect(bg, col_x, bottom, width, height, output);
                    }
                }
            }
            col_x += width;
        }
    }

    /// Rule below the row plus column dividers (none for spanning rows).
    fn draw_grid(&self, row: &Row, x: f64, top: f64, height: f64, output: &mut Vec<u8>) {
        let bottom = top - height;
        let color = row.rule_color.unwrap_or(self.border_color);
        let width = row.rule_width.unwrap_or(self.border_width);

        output.extend_from_slice(b"q\n");
        output.extend_from_slice(
            format!(
                "{} {} {} RG\n{} w\n",
                format_coord(color.r),
                format_coord(color.g),
                format_coord(color.b),
                format_coord(width),
            )
            .as_bytes(),
        );
        output.extend_from_slice(
            format!(
                "{} {} m\n{} {} l\nS\n",
                format_coord(x),
                format_coord(bottom),
                format_coord(x + self.total_width()),
                format_coord(bottom),
            )
            .as_bytes(),
        );

        if !row.span {
            output.extend_from_slice(
                format!(
                    "{} {} {} RG\n{} w\n",
                    format_coord(self.border_color.r),
                    format_coord(self.border_color.g),
                    format_coord(self.border_color.b),
                    format_coord(self.border_width),
                )
                .as_bytes(),
            );
            let mut col_x = x;
            for &col_width in &self.columns {
                col_x += col_width;
                output.extend_from_slice(
                    format!(
                        "{} {} m\n{} {} l\nS\n",
                        format_coord(col_x),
                        format_coord(top),
                        format_coord(col_x),
                        format_coord(bottom),
                    )
                    .as_bytes(),
                );
            }
        }
        output.extend_from_slice(b"Q\n");
    }
}

/// Tracks where the next row lands within a page rect.
///
/// Create one per table area, `reset` it when starting a new page, and use
/// `is_first_row` to detect a fresh page (to repeat a header row).
/// `current_y` after placement is the bottom edge of the last row — the
/// anchor for whatever follows the table.
pub struct TableCursor {
    pub(crate) rect: Rect,
    pub(crate) current_y: f64,
    pub(crate) first_row: bool,
}

impl TableCursor {
    pub fn new(rect: &Rect) -> Self {
        TableCursor {
            rect: *rect,
            current_y: rect.y,
            first_row: true,
        }
    }

    pub fn reset(&mut self, rect: &Rect) {
        self.rect = *rect;
        self.current_y = rect.y;
        self.first_row = true;
    }

    pub fn is_first_row(&self) -> bool {
        self.first_row
    }

    pub fn current_y(&self) -> f64 {
        self.current_y
    }
}

fn measure_cell_height(cell: &Cell, col_width: f64) -> f64 {
    let style = &cell.style;
    let avail = (col_width - 2.0 * style.padding).max(1.0);
    let ts = TextStyle::new(style.font, style.font_size);
    let lines = wrap_text(&cell.text, avail, &ts);
    lines.len() as f64 * FontMetrics::line_height(style.font_size) + 2.0 * style.padding
}

fn fill_rect(color: Color, x: f64, y: f64, width: f64, height: f64, output: &mut Vec<u8>) {
    output.extend_from_slice(
        format!(
            "{} {} {} rg\n{} {} {} {} re\nf\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height),
        )
        .as_bytes(),
    );
}

/// Render one cell's wrapped, aligned text.
///
/// An explicit fill color is always set inside the BT block; without it the
/// fill color left over from background drawing would bleed into the text.
fn render_cell(
    cell: &Cell,
    cell_x: f64,
    row_top: f64,
    col_width: f64,
    output: &mut Vec<u8>,
    fonts: &mut BTreeSet<BuiltinFont>,
) {
    let style = &cell.style;
    let avail = (col_width - 2.0 * style.padding).max(1.0);
    let ts = TextStyle::new(style.font, style.font_size);
    let lh = FontMetrics::line_height(style.font_size);
    let lines = wrap_text(&cell.text, avail, &ts);

    let line_x = |line: &str| -> f64 {
        match style.align {
            TextAlign::Left => cell_x + style.padding,
            TextAlign::Center => {
                let w = FontMetrics::measure_text(line, style.font, style.font_size);
                cell_x + (col_width - w) / 2.0
            }
            TextAlign::Right => {
                let w = FontMetrics::measure_text(line, style.font, style.font_size);
                cell_x + col_width - style.padding - w
            }
        }
    };

    output.extend_from_slice(b"BT\n");
    let color = style.text_color.unwrap_or(Color::rgb(0.0, 0.0, 0.0));
    output.extend_from_slice(
        format!(
            "{} {} {} rg\n/{} {} Tf\n",
            format_coord(color.r),
            format_coord(color.g),
            format_coord(color.b),
            style.font.pdf_name(),
            format_coord(style.font_size),
        )
        .as_bytes(),
    );
    fonts.insert(style.font);

    // Baseline of the first line: top padding plus approximate ascent.
    let mut prev_x = 0.0;
    let mut first = true;
    for line in &lines {
        let x = line_x(line);
        if first {
            let y = row_top - style.padding - style.font_size;
            output.extend_from_slice(format!("{} {} Td\n", format_coord(x), format_coord(y)).as_bytes());
            first = false;
        } else {
            // Td is relative to the previous line start.
            output.extend_from_slice(
                format!("{} {} Td\n", format_coord(x - prev_x), format_coord(-lh)).as_bytes(),
            );
        }
        prev_x = x;
        if !line.is_empty() {
            output.extend_from_slice(format!("({}) Tj\n", escape_pdf_string(line)).as_bytes());
        }
    }
    output.extend_from_slice(b"ET\n");
}

// -------------------------------------------------------
// Invoice item table
// -------------------------------------------------------

/// Classification of a body row, used by the splitting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Section label spanning all columns.
    Section,
    /// One line item.
    Data,
}

struct BodyRow {
    kind: RowKind,
    row: Row,
    height: f64,
}

/// The grouped, styled, splittable line-item table.
///
/// Built once per invoice; the layout engine repeatedly asks `chunk_end`
/// how many rows fit in a given height and draws each chunk with
/// `draw_chunk`. The column-header row is repeated at the top of every
/// chunk and does not count as a body row.
pub struct ItemTable {
    table: Table,
    header: Row,
    header_height: f64,
    rows: Vec<BodyRow>,
}

/// Fixed column widths in millimetres; the description column is wide,
/// everything else narrow. The sum (188 mm) is independent of page width.
const COLUMN_WIDTHS_MM: [f64; 6] = [20.0, 83.0, 18.0, 22.0, 18.0, 27.0];

const HEADER_LABELS: [&str; 6] = ["DATE", "ITEM DESCRIPTION", "QTY", "UNIT (Rs)", "GST%", "AMOUNT (Rs)"];

fn section_bg() -> Color {
    Color::from_hex(0xFFF3E6)
}

fn zebra_bg() -> Color {
    Color::from_hex(0xFAFAF7)
}

impl ItemTable {
    pub fn build(items: &[LineItem], covers: Option<u32>, theme: &Theme) -> ItemTable {
        let columns: Vec<f64> = COLUMN_WIDTHS_MM.iter().map(|w| w * MM).collect();
        let mut table = Table::new(columns);
        table.border_color = light_border();
        table.border_width = 0.3;

        let header_style = CellStyle {
            background_color: Some(theme.header),
            text_color: Some(white()),
            font: BuiltinFont::HelveticaBold,
            font_size: 8.0,
            padding: 5.0,
            align: TextAlign::Center,
        };
        let mut header = Row::new(
            HEADER_LABELS
                .iter()
                .map(|label| Cell::styled(*label, header_style.clone()))
                .collect(),
        );
        header.background_color = Some(theme.header);
        header.rule_color = Some(theme.accent);
        header.rule_width = Some(0.5);
        let header_height = table.measure_row_height(&header);

        let section_style = CellStyle {
            background_color: Some(section_bg()),
            text_color: Some(theme.accent),
            font: BuiltinFont::HelveticaBoldOblique,
            font_size: 7.5,
            padding: 4.0,
            align: TextAlign::Center,
        };
        let data_style = CellStyle {
            background_color: None,
            text_color: Some(text_body()),
            font: BuiltinFont::Helvetica,
            font_size: 8.0,
            padding: 3.0,
            align: TextAlign::Center,
        };

        let covers_suffix = match covers {
            Some(n) => format!(" ({} Covers)", n),
            None => String::new(),
        };

        let mut rows: Vec<BodyRow> = Vec::new();
        for section in group_items(items) {
            let mut label_parts: Vec<String> = Vec::new();
            if !section.category.is_empty() {
                label_parts.push(section.category.to_uppercase());
            }
            if !section.date.is_empty() {
                label_parts.push(section.date.to_string());
            }
            let label = format!("— {}{} —", label_parts.join("  —  "), covers_suffix);
            let row = Row::spanning(Cell::styled(label, section_style.clone()));
            let height = table.measure_row_height(&row);
            rows.push(BodyRow { kind: RowKind::Section, row, height });

            let mut stripe = 0usize;
            let mut first_in_section = true;
            for item in &section.items {
                let background = if stripe % 2 == 1 { Some(zebra_bg()) } else { None };
                stripe += 1;

                let date_label = if first_in_section { item.date.clone() } else { String::new() };
                first_in_section = false;

                let left = CellStyle { align: TextAlign::Left, ..data_style.clone() };
                let right = CellStyle { align: TextAlign::Right, ..data_style.clone() };
                let mut row = Row::new(vec![
                    Cell::styled(date_label, data_style.clone()),
                    Cell::styled(item.description.clone(), left),
                    Cell::styled(format_qty(item.qty), data_style.clone()),
                    Cell::styled(format_money(item.unit_price), data_style.clone()),
                    Cell::styled(format_pct(item.tax_pct), data_style.clone()),
                    Cell::styled(format_money(item.amount), right),
                ]);
                row.background_color = background;
                let height = table.measure_row_height(&row);
                rows.push(BodyRow { kind: RowKind::Data, row, height });
            }
        }

        ItemTable {
            table,
            header,
            header_height,
            rows,
        }
    }

    /// Total table width in points.
    pub fn width(&self) -> f64 {
        self.table.total_width()
    }

    /// Number of body rows (section headers plus data rows).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn kind(&self, index: usize) -> RowKind {
        self.rows[index].kind
    }

    /// How far a chunk starting at `from` may extend inside `avail_height`,
    /// returning the exclusive end index.
    ///
    /// The repeated column header is charged against the height first.
    /// Guarantees: at least one row of progress per call, and a section
    /// header is never the last row of a chunk while its data rows remain —
    /// either the header moves to the next chunk, or (when it is the only
    /// row that fit) its first data row is force-placed with it.
    pub fn chunk_end(&self, from: usize, avail_height: f64) -> usize {
        debug_assert!(from < self.rows.len());
        let mut used = self.header_height;
        let mut end = from;
        while end < self.rows.len() && used + self.rows[end].height <= avail_height {
            used += self.rows[end].height;
            end += 1;
        }

        if end == from {
            end = from + 1;
        }
        if end < self.rows.len() && self.rows[end - 1].kind == RowKind::Section {
            if end - from > 1 {
                end -= 1;
            } else {
                end += 1;
            }
        }
        end
    }

    /// Height of the chunk `[from, end)` including the repeated header.
    pub fn chunk_height(&self, from: usize, end: usize) -> f64 {
        self.header_height + self.rows[from..end].iter().map(|r| r.height).sum::<f64>()
    }

    /// Draw the chunk `[from, end)` with its column header at `top_y`.
    /// Returns the y coordinate of the chunk's bottom edge.
    pub fn draw_chunk<W: Write>(
        &self,
        doc: &mut PdfDocument<W>,
        from: usize,
        end: usize,
        x: f64,
        top_y: f64,
    ) -> f64 {
        let rect = Rect {
            x,
            y: top_y,
            width: self.width(),
            // Slack so precomputed heights never lose to rounding.
            height: self.chunk_height(from, end) + 1.0,
        };
        let mut cursor = TableCursor::new(&rect);
        doc.fit_row(&self.table, &self.header, &mut cursor);
        for body in &self.rows[from..end] {
            doc.fit_row(&self.table, &body.row, &mut cursor);
        }
        cursor.current_y()
    }
}
