//! Table output for resources

use crate::resource::{display_value, Resource};
use std::io::{self, Write};

/// Print one resource as a `Property | Value` table in field order
pub fn print_resource<R: Resource>(out: &mut impl Write, resource: &R) -> io::Result<()> {
    let attributes = resource.attributes();
    let rows: Vec<Vec<String>> = R::FIELDS
        .iter()
        .map(|(field, label)| {
            vec![
                label.to_string(),
                display_value(attributes.get(*field)),
            ]
        })
        .collect();
    write_table(out, &["Property", "Value"], &rows)
}

/// Print resources as a table with one column per field label
pub fn print_list<R: Resource>(out: &mut impl Write, resources: &[R]) -> io::Result<()> {
    let headers: Vec<&str> = R::FIELDS.iter().map(|(_, label)| *label).collect();
    let rows: Vec<Vec<String>> = resources
        .iter()
        .map(|resource| {
            let attributes = resource.attributes();
            R::FIELDS
                .iter()
                .map(|(field, _)| display_value(attributes.get(*field)))
                .collect()
        })
        .collect();
    write_table(out, &headers, &rows)
}

fn write_table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+", separator);

    writeln!(out, "{}", separator)?;
    write_row(out, &widths, headers.iter().copied())?;
    writeln!(out, "{}", separator)?;
    for row in rows {
        write_row(out, &widths, row.iter().map(String::as_str))?;
    }
    writeln!(out, "{}", separator)
}

fn write_row<'a>(
    out: &mut impl Write,
    widths: &[usize],
    cells: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let line = widths
        .iter()
        .zip(cells)
        .map(|(width, cell)| {
            let pad = width - cell.chars().count();
            format!(" {}{} ", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("|");
    writeln!(out, "|{}|", line)
}
