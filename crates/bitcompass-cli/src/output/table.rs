use crate::ui::{Tone, paint_if};

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

/// Columns never shrink below this many characters when fitting the terminal.
const MIN_COLUMN: usize = 6;

/// Render an aligned table. Cells in the `kind` column are colored by value.
#[must_use]
pub fn render_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
                .max(MIN_COLUMN)
        })
        .collect();

    if let Some(max_width) = options.max_width {
        fit_widths(&mut widths, headers, max_width);
    }

    let kind_column = headers.iter().position(|header| *header == "kind");

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&truncate_text(&header.to_uppercase(), *width), *width))
        .collect::<Vec<_>>()
        .join("  ");
    let header_line = paint_if(options.color, Tone::Dim, header_line.trim_end());

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let cell = pad(&truncate_text(value, *width), *width);
                match kind_tone(value) {
                    Some(tone) if options.color && kind_column == Some(index) => {
                        paint_if(true, tone, &cell)
                    }
                    _ => cell,
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    });

    std::iter::once(header_line)
        .chain(row_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shrink the widest columns one character at a time until the row fits.
fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: usize) {
    let separators = widths.len().saturating_sub(1) * 2;
    let total = |widths: &[usize]| widths.iter().sum::<usize>() + separators;

    while total(widths) > max_width {
        let candidate = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > headers[*idx].len().max(MIN_COLUMN))
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);
        let Some(idx) = candidate else {
            break;
        };
        widths[idx] -= 1;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{value}{}", " ".repeat(width.saturating_sub(len)))
}

fn kind_tone(value: &str) -> Option<Tone> {
    match value {
        "rule" => Some(Tone::Cyan),
        "solution" => Some(Tone::Green),
        _ => None,
    }
}
