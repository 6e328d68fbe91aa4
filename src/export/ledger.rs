use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::fleet::{
    fleet_totals, trip_maintenance, trip_maintenance_cost, trip_profit, truck_financials,
    FleetTotals, TruckFinancials,
};
use crate::models::{HireOut, Maintenance, Truck};

pub const CASH_MODE: &str = "Cash";
pub const FINAL_BALANCE_REMARK: &str = "Final Balance";
const FALLBACK_REMARK: &str = "Maintenance";
const UNKNOWN_LOCATION: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub cash_in: Decimal,
    pub cash_out: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub remark: String,
    pub mode: Option<String>,
    pub cash_in: Option<Decimal>,
    pub cash_out: Option<Decimal>,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct TripLedger {
    pub trip_id: Uuid,
    pub truck_name: String,
    pub customer_name: String,
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub generated_on: NaiveDate,
    pub summary: LedgerSummary,
    pub total_entries: usize,
    pub rows: Vec<LedgerRow>,
}

/// Running-balance statement of one trip: the trip earnings come in first, then every
/// maintenance charged to the trip goes out in date order, then a closing balance row.
pub fn build_trip_ledger(
    truck: &Truck,
    trip: &HireOut,
    maintenances: &[Maintenance],
    today: NaiveDate,
) -> TripLedger {
    let mut charges: Vec<&Maintenance> = trip_maintenance(trip, maintenances).collect();
    // stable, so same-day rows keep their load order
    charges.sort_by_key(|m| m.date);

    let cash_in = trip.total_earnings;
    let cash_out: Decimal = charges.iter().map(|m| m.cost).sum();
    let final_balance = cash_in - cash_out;

    let mut rows = Vec::with_capacity(charges.len() + 2);
    let mut running = cash_in;
    rows.push(LedgerRow {
        date: trip.start_date.date(),
        remark: trip.customer_name.clone(),
        mode: Some(CASH_MODE.to_string()),
        cash_in: Some(cash_in),
        cash_out: None,
        balance: running,
    });

    for charge in &charges {
        running -= charge.cost;
        rows.push(LedgerRow {
            date: charge.date.date(),
            remark: maintenance_remark(charge),
            mode: Some(CASH_MODE.to_string()),
            cash_in: None,
            cash_out: Some(charge.cost),
            balance: running,
        });
    }

    rows.push(LedgerRow {
        date: today,
        remark: FINAL_BALANCE_REMARK.to_string(),
        mode: None,
        cash_in: None,
        cash_out: None,
        balance: final_balance,
    });

    TripLedger {
        trip_id: trip.id,
        truck_name: truck.name.clone(),
        customer_name: trip.customer_name.clone(),
        origin: location_or_unknown(trip.origin.as_deref()),
        destination: location_or_unknown(trip.destination.as_deref()),
        start_date: trip.start_date.date(),
        end_date: trip.end_date.map(|end| end.date()),
        generated_on: today,
        summary: LedgerSummary {
            cash_in,
            cash_out,
            balance: final_balance,
        },
        total_entries: charges.len() + 1,
        rows,
    }
}

fn maintenance_remark(maintenance: &Maintenance) -> String {
    [maintenance.name.as_deref(), Some(maintenance.maintenance_type.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(FALLBACK_REMARK)
        .to_string()
}

fn location_or_unknown(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetReportEntry {
    pub name: String,
    pub plate: String,
    #[serde(flatten)]
    pub financials: TruckFinancials,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub generated_on: NaiveDate,
    pub trucks: Vec<FleetReportEntry>,
    pub totals: FleetTotals,
}

pub fn build_fleet_report(
    trucks: &[Truck],
    hire_outs: &[HireOut],
    maintenances: &[Maintenance],
    today: NaiveDate,
) -> FleetReport {
    let entries: Vec<FleetReportEntry> = trucks
        .iter()
        .map(|truck| FleetReportEntry {
            name: truck.name.clone(),
            plate: truck.plate.clone(),
            financials: truck_financials(truck.id, hire_outs, maintenances),
        })
        .collect();
    let totals = fleet_totals(entries.iter().map(|entry| &entry.financials));

    FleetReport {
        generated_on: today,
        trucks: entries,
        totals,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementTrip {
    pub trip_id: Uuid,
    pub customer_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub load_amount: Decimal,
    pub earnings: Decimal,
    pub maintenance_cost: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatementMaintenance {
    pub date: NaiveDate,
    pub remark: String,
    pub details: Option<String>,
    pub hire_out_id: Option<Uuid>,
    pub cost: Decimal,
}

/// Everything the single-truck report shows: totals, trip history and maintenance history.
#[derive(Debug, Clone, Serialize)]
pub struct TruckStatement {
    pub truck_id: Uuid,
    pub name: String,
    pub plate: String,
    pub capacity: Decimal,
    pub generated_on: NaiveDate,
    pub financials: TruckFinancials,
    pub trips: Vec<StatementTrip>,
    pub maintenances: Vec<StatementMaintenance>,
}

pub fn build_truck_statement(
    truck: &Truck,
    hire_outs: &[HireOut],
    maintenances: &[Maintenance],
    today: NaiveDate,
) -> TruckStatement {
    let mut trips: Vec<&HireOut> = hire_outs.iter().filter(|h| h.truck_id == truck.id).collect();
    trips.sort_by_key(|h| h.start_date);
    let mut charges: Vec<&Maintenance> =
        maintenances.iter().filter(|m| m.truck_id == truck.id).collect();
    charges.sort_by_key(|m| m.date);

    TruckStatement {
        truck_id: truck.id,
        name: truck.name.clone(),
        plate: truck.plate.clone(),
        capacity: truck.capacity,
        generated_on: today,
        financials: truck_financials(truck.id, hire_outs, maintenances),
        trips: trips
            .into_iter()
            .map(|trip| StatementTrip {
                trip_id: trip.id,
                customer_name: trip.customer_name.clone(),
                start_date: trip.start_date.date(),
                end_date: trip.end_date.map(|end| end.date()),
                load_amount: trip.load_amount,
                earnings: trip.total_earnings,
                maintenance_cost: trip_maintenance_cost(trip, maintenances),
                profit: trip_profit(trip, maintenances),
            })
            .collect(),
        maintenances: charges
            .into_iter()
            .map(|m| StatementMaintenance {
                date: m.date.date(),
                remark: maintenance_remark(m),
                details: m.details.clone(),
                hire_out_id: m.hire_out_id,
                cost: m.cost,
            })
            .collect(),
    }
}
