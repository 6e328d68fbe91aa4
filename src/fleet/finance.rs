use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{HireOut, Maintenance, Transaction};

/// Decimal places used when money leaves the service in a rendered document.
pub const MONEY_SCALE: u32 = 2;

/// Rounds for display only. Sums are always accumulated at full precision.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Maintenance rows charged to a trip. A row must point at the trip and belong to the same
/// truck; a link to another truck's trip is treated as a data error and skipped.
pub fn trip_maintenance<'a>(
    trip: &'a HireOut,
    maintenances: &'a [Maintenance],
) -> impl Iterator<Item = &'a Maintenance> + 'a {
    maintenances
        .iter()
        .filter(move |m| m.hire_out_id == Some(trip.id) && m.truck_id == trip.truck_id)
}

pub fn trip_maintenance_cost(trip: &HireOut, maintenances: &[Maintenance]) -> Decimal {
    trip_maintenance(trip, maintenances).map(|m| m.cost).sum()
}

pub fn trip_profit(trip: &HireOut, maintenances: &[Maintenance]) -> Decimal {
    trip.total_earnings - trip_maintenance_cost(trip, maintenances)
}

pub fn truck_revenue(truck_id: Uuid, hire_outs: &[HireOut]) -> Decimal {
    hire_outs
        .iter()
        .filter(|h| h.truck_id == truck_id)
        .map(|h| h.total_earnings)
        .sum()
}

/// Includes general maintenance that is not attached to any trip.
pub fn truck_maintenance_cost(truck_id: Uuid, maintenances: &[Maintenance]) -> Decimal {
    maintenances
        .iter()
        .filter(|m| m.truck_id == truck_id)
        .map(|m| m.cost)
        .sum()
}

pub fn truck_net_profit(
    truck_id: Uuid,
    hire_outs: &[HireOut],
    maintenances: &[Maintenance],
) -> Decimal {
    truck_revenue(truck_id, hire_outs) - truck_maintenance_cost(truck_id, maintenances)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TruckFinancials {
    pub truck_id: Uuid,
    pub trips: usize,
    pub revenue: Decimal,
    pub maintenance_cost: Decimal,
    pub net_profit: Decimal,
}

pub fn truck_financials(
    truck_id: Uuid,
    hire_outs: &[HireOut],
    maintenances: &[Maintenance],
) -> TruckFinancials {
    let revenue = truck_revenue(truck_id, hire_outs);
    let maintenance_cost = truck_maintenance_cost(truck_id, maintenances);
    TruckFinancials {
        truck_id,
        trips: hire_outs.iter().filter(|h| h.truck_id == truck_id).count(),
        revenue,
        maintenance_cost,
        net_profit: revenue - maintenance_cost,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetTotals {
    pub revenue: Decimal,
    pub maintenance_cost: Decimal,
    pub net_profit: Decimal,
}

pub fn fleet_totals<'a, I>(per_truck: I) -> FleetTotals
where
    I: IntoIterator<Item = &'a TruckFinancials>,
{
    per_truck
        .into_iter()
        .fold(FleetTotals::default(), |acc, truck| FleetTotals {
            revenue: acc.revenue + truck.revenue,
            maintenance_cost: acc.maintenance_cost + truck.maintenance_cost,
            net_profit: acc.net_profit + truck.net_profit,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction type `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CashSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

pub fn cash_summary(transactions: &[Transaction]) -> CashSummary {
    let mut summary = CashSummary::default();
    for tx in transactions {
        match tx.kind.parse::<TransactionKind>() {
            Ok(TransactionKind::Income) => summary.total_income += tx.amount,
            Ok(TransactionKind::Expense) => summary.total_expense += tx.amount,
            Err(_) => {}
        }
    }
    summary.balance = summary.total_income - summary.total_expense;
    summary
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceSummary {
    pub count: usize,
    pub total_cost: Decimal,
    pub average_cost: Decimal,
}

/// Record count, total and mean cost of a maintenance list. An empty list yields zeros.
pub fn maintenance_summary<'a, I>(rows: I) -> MaintenanceSummary
where
    I: IntoIterator<Item = &'a Maintenance>,
{
    let (count, total_cost) = rows
        .into_iter()
        .fold((0usize, Decimal::ZERO), |(count, total), m| (count + 1, total + m.cost));
    let average_cost = if count == 0 {
        Decimal::ZERO
    } else {
        total_cost / Decimal::from(count)
    };
    MaintenanceSummary {
        count,
        total_cost,
        average_cost,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::fleet::status::{derive_status, TruckStatus};
    use crate::fleet::test_support::{hire_out, maintenance, transaction};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn empty_inputs_sum_to_zero() {
        let truck = Uuid::new_v4();
        assert_eq!(truck_revenue(truck, &[]), Decimal::ZERO);
        assert_eq!(truck_maintenance_cost(truck, &[]), Decimal::ZERO);
        assert_eq!(truck_net_profit(truck, &[], &[]), Decimal::ZERO);
        assert_eq!(fleet_totals(&[]), FleetTotals::default());
        assert_eq!(cash_summary(&[]), CashSummary::default());
    }

    #[test]
    fn general_maintenance_counts_for_truck_but_not_trip() {
        let truck = Uuid::new_v4();
        let trip = hire_out(truck, dec!(5000), now() - Duration::days(1), None);
        let linked = maintenance(truck, Some(trip.id), dec!(500), now());
        let general = maintenance(truck, None, dec!(2500), now());
        let hire_outs = vec![trip.clone()];
        let maintenances = vec![linked, general];

        assert_eq!(trip_maintenance_cost(&trip, &maintenances), dec!(500));
        assert_eq!(trip_profit(&trip, &maintenances), dec!(4500));
        assert_eq!(truck_maintenance_cost(truck, &maintenances), dec!(3000));
        assert_eq!(truck_net_profit(truck, &hire_outs, &maintenances), dec!(2000));
        assert_eq!(
            derive_status(truck, None, &hire_outs, now()),
            TruckStatus::InTransit { trip_id: trip.id }
        );
    }

    #[test]
    fn mismatched_trip_link_is_not_charged_to_trip() {
        let truck_a = Uuid::new_v4();
        let truck_b = Uuid::new_v4();
        let trip = hire_out(truck_a, dec!(1000), now(), None);
        let stray = maintenance(truck_b, Some(trip.id), dec!(300), now());
        let maintenances = vec![stray];

        assert_eq!(trip_maintenance_cost(&trip, &maintenances), Decimal::ZERO);
        assert_eq!(trip_profit(&trip, &maintenances), dec!(1000));
        assert_eq!(truck_maintenance_cost(truck_b, &maintenances), dec!(300));
    }

    #[test]
    fn fleet_totals_sum_per_truck_figures() {
        let truck_a = Uuid::new_v4();
        let truck_b = Uuid::new_v4();
        let hire_outs = vec![
            hire_out(truck_a, dec!(1200.50), now(), Some(now())),
            hire_out(truck_a, dec!(800), now(), None),
            hire_out(truck_b, dec!(300.25), now(), None),
        ];
        let maintenances = vec![
            maintenance(truck_a, None, dec!(100.10), now()),
            maintenance(truck_b, Some(hire_outs[2].id), dec!(400), now()),
        ];

        let per_truck: Vec<TruckFinancials> = [truck_a, truck_b]
            .into_iter()
            .map(|id| truck_financials(id, &hire_outs, &maintenances))
            .collect();

        assert_eq!(per_truck[0].trips, 2);
        assert_eq!(per_truck[0].net_profit, dec!(1900.40));
        assert_eq!(per_truck[1].net_profit, dec!(-99.75));

        let totals = fleet_totals(&per_truck);
        assert_eq!(totals.revenue, dec!(2300.75));
        assert_eq!(totals.maintenance_cost, dec!(500.10));
        assert_eq!(totals.net_profit, dec!(1800.65));
        assert_eq!(totals.net_profit, totals.revenue - totals.maintenance_cost);
    }

    #[test]
    fn aggregation_is_repeatable() {
        let truck = Uuid::new_v4();
        let hire_outs = vec![hire_out(truck, dec!(10.1), now(), None)];
        let maintenances = vec![maintenance(truck, None, dec!(0.2), now())];

        let first = truck_financials(truck, &hire_outs, &maintenances);
        let second = truck_financials(truck, &hire_outs, &maintenances);
        assert_eq!(first, second);
        assert_eq!(first.net_profit, dec!(9.9));
    }

    #[test]
    fn cash_summary_splits_income_and_expense() {
        let txs = vec![
            transaction("income", dec!(1500)),
            transaction("expense", dec!(200.50)),
            transaction("income", dec!(99.50)),
        ];

        let summary = cash_summary(&txs);
        assert_eq!(summary.total_income, dec!(1599.50));
        assert_eq!(summary.total_expense, dec!(200.50));
        assert_eq!(summary.balance, dec!(1399.00));
    }

    #[test]
    fn maintenance_summary_counts_and_averages() {
        let truck = Uuid::new_v4();
        let rows = vec![
            maintenance(truck, None, dec!(500), now()),
            maintenance(truck, None, dec!(250.50), now()),
            maintenance(truck, None, dec!(0.004), now()),
        ];

        let summary = maintenance_summary(&rows);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total_cost, dec!(750.504));
        assert_eq!(summary.average_cost, dec!(250.168));
    }

    #[test]
    fn empty_maintenance_summary_is_zero() {
        assert_eq!(maintenance_summary(&[]), MaintenanceSummary::default());
    }

    #[test]
    fn rounding_only_touches_display_values() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
        assert_eq!(round_money(dec!(3)), dec!(3));
    }

    #[test]
    fn transaction_kind_round_trips_through_text() {
        assert_eq!("income".parse::<TransactionKind>(), Ok(TransactionKind::Income));
        assert_eq!(TransactionKind::Expense.to_string(), "expense");
        assert!("refund".parse::<TransactionKind>().is_err());
    }
}
