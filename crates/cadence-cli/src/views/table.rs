use cadence_core::models::{Occurrence, SeriesDefinition, SeriesKind};
use cadence_core::summary::PeriodSummary;
use chrono::NaiveDate;
use comfy_table::{Attribute, Cell, Color, Row, Table};

fn kind_cell(kind: SeriesKind) -> Cell {
    match kind {
        SeriesKind::Income => Cell::new("income").fg(Color::Green),
        SeriesKind::PlannedExpense => Cell::new("expense").fg(Color::Yellow),
    }
}

pub fn display_series(series: &[SeriesDefinition]) {
    if series.is_empty() {
        println!("No series found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Kind", "Amount", "Repeats", "From", "Until"]);

    for s in series {
        let mut row = Row::new();
        row.add_cell(Cell::new(s.id));
        row.add_cell(Cell::new(&s.title).add_attribute(Attribute::Bold));
        row.add_cell(kind_cell(s.kind));
        row.add_cell(Cell::new(s.amount));
        row.add_cell(Cell::new(s.rule.describe()));
        row.add_cell(Cell::new(s.start_date));
        row.add_cell(Cell::new(s.end_date));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_occurrences(occurrences: &[Occurrence], today: NaiveDate) {
    if occurrences.is_empty() {
        println!("No occurrences found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Title", "Kind", "Amount", "Status"]);

    for occurrence in occurrences {
        let mut row = Row::new();
        row.add_cell(Cell::new(occurrence.id));

        let date_cell = Cell::new(occurrence.date);
        row.add_cell(if occurrence.date < today {
            date_cell.fg(Color::DarkGrey)
        } else if occurrence.date == today {
            date_cell.fg(Color::Yellow)
        } else {
            date_cell
        });

        // ↻ marks a series occurrence, ✎ one that was edited by hand
        let mut title = String::new();
        if occurrence.series_id.is_some() {
            title.push_str("↻ ");
        }
        title.push_str(&occurrence.title);
        if occurrence.is_exception {
            title.push_str(" ✎");
        }
        row.add_cell(Cell::new(title));
        row.add_cell(kind_cell(occurrence.kind));
        row.add_cell(Cell::new(occurrence.amount));
        row.add_cell(if occurrence.is_planned {
            Cell::new("planned")
        } else {
            Cell::new("received").fg(Color::Green)
        });
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_dates(dates: &[NaiveDate]) {
    if dates.is_empty() {
        println!("No dates in range.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Date", "Weekday"]);
    for (index, date) in dates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(date),
            Cell::new(date.format("%A")),
        ]);
    }

    println!("{table}");
}

pub fn display_summary(summary: &PeriodSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(format!("{} to {}", summary.start, summary.end)).add_attribute(Attribute::Bold),
        Cell::new("Amount"),
    ]);
    table.add_row(vec![Cell::new("Planned income"), Cell::new(summary.planned_income)]);
    table.add_row(vec![Cell::new("Received income"), Cell::new(summary.actual_income)]);
    table.add_row(vec![Cell::new("Planned expenses"), Cell::new(summary.planned_expenses)]);

    let net = summary.net_planned();
    let net_cell = Cell::new(net).add_attribute(Attribute::Bold);
    table.add_row(vec![
        Cell::new("Net planned"),
        if net.is_sign_negative() {
            net_cell.fg(Color::Red)
        } else {
            net_cell.fg(Color::Green)
        },
    ]);
    table.add_row(vec![
        Cell::new("Occurrences"),
        Cell::new(summary.occurrence_count),
    ]);

    println!("{table}");
}
