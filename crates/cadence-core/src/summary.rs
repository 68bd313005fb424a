use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Occurrence, SeriesKind};

/// Totals for the occurrences dated inside one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Income still expected (`is_planned`)
    pub planned_income: Decimal,
    /// Income already received
    pub actual_income: Decimal,
    pub planned_expenses: Decimal,
    pub occurrence_count: usize,
}

impl PeriodSummary {
    /// Sums `occurrences` dated in `[start, end]`; anything outside is ignored.
    pub fn from_occurrences(start: NaiveDate, end: NaiveDate, occurrences: &[Occurrence]) -> Self {
        let mut summary = Self {
            start,
            end,
            planned_income: Decimal::ZERO,
            actual_income: Decimal::ZERO,
            planned_expenses: Decimal::ZERO,
            occurrence_count: 0,
        };

        for occurrence in occurrences
            .iter()
            .filter(|o| o.date >= start && o.date <= end)
        {
            match (occurrence.kind, occurrence.is_planned) {
                (SeriesKind::Income, true) => summary.planned_income += occurrence.amount,
                (SeriesKind::Income, false) => summary.actual_income += occurrence.amount,
                (SeriesKind::PlannedExpense, _) => summary.planned_expenses += occurrence.amount,
            }
            summary.occurrence_count += 1;
        }
        summary
    }

    pub fn net_planned(&self) -> Decimal {
        self.planned_income - self.planned_expenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewOccurrenceData;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn occurrence(kind: SeriesKind, amount: i64, is_planned: bool, date: NaiveDate) -> Occurrence {
        Occurrence::standalone(&NewOccurrenceData {
            kind,
            title: "entry".to_string(),
            amount: Decimal::new(amount, 2),
            is_planned,
            date,
        })
    }

    #[test]
    fn test_summary_splits_by_kind_and_plan() {
        let occurrences = vec![
            occurrence(SeriesKind::Income, 300000, true, ymd(2025, 3, 1)),
            occurrence(SeriesKind::Income, 4550, false, ymd(2025, 3, 9)),
            occurrence(SeriesKind::PlannedExpense, 95000, true, ymd(2025, 3, 5)),
            // Outside the period
            occurrence(SeriesKind::Income, 100, true, ymd(2025, 4, 1)),
        ];
        let summary =
            PeriodSummary::from_occurrences(ymd(2025, 3, 1), ymd(2025, 3, 31), &occurrences);

        assert_eq!(summary.planned_income, Decimal::new(300000, 2));
        assert_eq!(summary.actual_income, Decimal::new(4550, 2));
        assert_eq!(summary.planned_expenses, Decimal::new(95000, 2));
        assert_eq!(summary.occurrence_count, 3);
        assert_eq!(summary.net_planned(), Decimal::new(205000, 2));
    }

    #[test]
    fn test_empty_period() {
        let summary = PeriodSummary::from_occurrences(ymd(2025, 3, 1), ymd(2025, 3, 31), &[]);
        assert_eq!(summary.occurrence_count, 0);
        assert_eq!(summary.net_planned(), Decimal::ZERO);
    }
}
