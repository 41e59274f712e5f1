//! Report-time aggregates. These are derived for presentation and never
//! written back to budgets.

use std::{collections::HashMap, ops::AddAssign};

use engine::{Budget, BudgetStatus, Money};

/// Label used when a budget has no dentist (or no patient).
pub const NOT_INFORMED: &str = "Não informado";

/// Display order of the per-status table.
pub const STATUS_ORDER: [BudgetStatus; 3] = [
    BudgetStatus::Accepted,
    BudgetStatus::Negotiating,
    BudgetStatus::Rejected,
];

/// A sum of budget amounts, in cents.
///
/// Every single amount fits in an `i64`; their sum may not, so sums are
/// kept in an `i128`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Total(i128);

impl Total {
    pub const ZERO: Total = Total(0);

    pub const fn cents(self) -> i128 {
        self.0
    }

    /// Value in major units, as written to the workbook.
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl From<Money> for Total {
    fn from(value: Money) -> Self {
        Self(i128::from(value.cents()))
    }
}

impl AddAssign<Money> for Total {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += i128::from(rhs.cents());
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusTotals {
    pub status: BudgetStatus,
    pub count: u64,
    pub value: Total,
    /// `count / total count`, 0 when there are no budgets.
    pub share: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupTotals {
    pub name: String,
    pub count: u64,
    pub value: Total,
}

impl GroupTotals {
    pub fn average(&self) -> Money {
        average(self.value, self.count)
    }
}

/// Counts and sums of `final_total` over a set of budgets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BudgetSummary {
    pub count: u64,
    pub value: Total,
    pub by_status: Vec<StatusTotals>,
    /// In order of first appearance.
    pub by_dentist: Vec<GroupTotals>,
    /// In order of first appearance.
    pub by_patient: Vec<GroupTotals>,
}

impl BudgetSummary {
    pub fn from_budgets(budgets: &[Budget]) -> Self {
        let count = budgets.len() as u64;
        let mut value = Total::ZERO;
        for budget in budgets {
            value += budget.final_total;
        }

        let by_status = STATUS_ORDER
            .iter()
            .map(|&status| {
                let mut n = 0u64;
                let mut v = Total::ZERO;
                for budget in budgets.iter().filter(|b| b.status == status) {
                    n += 1;
                    v += budget.final_total;
                }
                StatusTotals {
                    status,
                    count: n,
                    value: v,
                    share: if count == 0 { 0.0 } else { n as f64 / count as f64 },
                }
            })
            .collect();

        let by_dentist = group(budgets, |b| {
            b.dentist
                .as_ref()
                .map(|d| (Some(d.id), d.name.clone()))
                .unwrap_or((None, NOT_INFORMED.to_string()))
        });
        let by_patient = group(budgets, |b| {
            b.patient
                .as_ref()
                .map(|p| (Some(p.id), p.name.clone()))
                .unwrap_or((None, NOT_INFORMED.to_string()))
        });

        Self {
            count,
            value,
            by_status,
            by_dentist,
            by_patient,
        }
    }

    pub fn status(&self, status: BudgetStatus) -> u64 {
        self.by_status
            .iter()
            .find(|row| row.status == status)
            .map_or(0, |row| row.count)
    }

    /// Mean final total, zero without budgets.
    pub fn average_ticket(&self) -> Money {
        average(self.value, self.count)
    }
}

fn group<F>(budgets: &[Budget], key: F) -> Vec<GroupTotals>
where
    F: Fn(&Budget) -> (Option<i32>, String),
{
    let mut index: HashMap<Option<i32>, usize> = HashMap::new();
    let mut rows: Vec<GroupTotals> = Vec::new();
    for budget in budgets {
        let (id, name) = key(budget);
        let slot = *index.entry(id).or_insert_with(|| {
            rows.push(GroupTotals {
                name,
                count: 0,
                value: Total::ZERO,
            });
            rows.len() - 1
        });
        rows[slot].count += 1;
        rows[slot].value += budget.final_total;
    }
    rows
}

/// Rounds half away from zero to the cent.
fn average(value: Total, count: u64) -> Money {
    if count == 0 {
        return Money::ZERO;
    }
    let value = value.cents();
    let count = i128::from(count);
    let half = count / 2;
    let rounded = if value >= 0 {
        (value + half) / count
    } else {
        (value - half) / count
    };
    // The mean of i64 amounts is itself within i64.
    Money::new(rounded.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rounds_to_the_cent() {
        assert_eq!(average(Money::new(100).into(), 3), Money::new(33));
        assert_eq!(average(Money::new(200).into(), 3), Money::new(67));
        assert_eq!(average(Money::new(-200).into(), 3), Money::new(-67));
        assert_eq!(average(Money::new(500).into(), 0), Money::ZERO);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = BudgetSummary::from_budgets(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_ticket(), Money::ZERO);
        assert_eq!(summary.by_status.len(), 3);
        assert!(summary.by_status.iter().all(|row| row.share == 0.0));
        assert!(summary.by_dentist.is_empty());
    }
}
