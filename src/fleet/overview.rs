use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{HireOut, Maintenance, Transaction, Truck};

use super::finance::{cash_summary, fleet_totals, truck_financials, TruckFinancials};
use super::status::{derive_status, ManualStatus, TruckStatus};

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetOverview {
    pub trucks: usize,
    pub available: usize,
    pub in_transit: usize,
    pub in_maintenance: usize,
    pub retired: usize,
    pub total_earnings: Decimal,
    pub maintenance_cost: Decimal,
    pub net_profit: Decimal,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

pub fn truck_statuses<'a>(
    trucks: &'a [Truck],
    hire_outs: &'a [HireOut],
    now: NaiveDateTime,
) -> impl Iterator<Item = (&'a Truck, TruckStatus)> + 'a {
    trucks.iter().map(move |truck| {
        let manual = ManualStatus::from_column(truck.manual_status.as_deref());
        (truck, derive_status(truck.id, manual, hire_outs, now))
    })
}

pub fn fleet_overview(
    trucks: &[Truck],
    hire_outs: &[HireOut],
    maintenances: &[Maintenance],
    transactions: &[Transaction],
    now: NaiveDateTime,
) -> FleetOverview {
    let mut overview = FleetOverview {
        trucks: trucks.len(),
        ..FleetOverview::default()
    };

    for (_, status) in truck_statuses(trucks, hire_outs, now) {
        match status {
            TruckStatus::Available => overview.available += 1,
            TruckStatus::InTransit { .. } => overview.in_transit += 1,
            TruckStatus::Maintenance => overview.in_maintenance += 1,
            TruckStatus::Retired => overview.retired += 1,
        }
    }

    let per_truck: Vec<TruckFinancials> = trucks
        .iter()
        .map(|truck| truck_financials(truck.id, hire_outs, maintenances))
        .collect();
    let totals = fleet_totals(&per_truck);
    overview.total_earnings = totals.revenue;
    overview.maintenance_cost = totals.maintenance_cost;
    overview.net_profit = totals.net_profit;

    let cash = cash_summary(transactions);
    overview.total_income = cash.total_income;
    overview.total_expense = cash.total_expense;
    overview.balance = cash.balance;

    overview
}
