//! Formatting helpers shared by the console reports.

/// Render a table with every column right-aligned and two spaces between
/// columns, without a trailing newline.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:>width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render(headers.to_vec()));
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Capitalize the first character (`status` -> `Status`).
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a label list as `[a, b]`.
pub fn format_labels(labels: &[String]) -> String {
    format!("[{}]", labels.join(", "))
}
