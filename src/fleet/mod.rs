//! Pure derivations over fleet rows: truck status and money figures.
//!
//! Nothing here touches the database. Callers load the rows (usually through the list
//! cache) and pass slices in, together with the instant they consider "now".

pub mod finance;
pub mod overview;
pub mod status;

pub use finance::{
    cash_summary, fleet_totals, round_money, trip_maintenance, trip_maintenance_cost, trip_profit,
    maintenance_summary, truck_financials, CashSummary, FleetTotals, MaintenanceSummary,
    TransactionKind, TruckFinancials,
};
pub use overview::{fleet_overview, truck_statuses, FleetOverview};
pub use status::{
    derive_status, is_ongoing, parse_status_filter, ManualStatus, StatusChange, TruckStatus,
};
