use chrono::NaiveDate;
use csv::{Writer, WriterBuilder};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::fleet::round_money;

use super::ledger::{FleetReport, TripLedger, TruckStatement};
use super::pdf::PdfRenderer;
use super::ExportError;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Turns report data into a downloadable document. The numbers are fixed by the ledger
/// builders; a renderer only decides layout and encoding.
pub trait ReportRenderer: Send + Sync + 'static {
    fn content_type(&self) -> &'static str;
    fn extension(&self) -> &'static str;
    fn render_trip(&self, ledger: &TripLedger) -> Result<Vec<u8>, ExportError>;
    fn render_fleet(&self, report: &FleetReport) -> Result<Vec<u8>, ExportError>;
    fn render_truck(&self, statement: &TruckStatement) -> Result<Vec<u8>, ExportError>;
}

/// Download format picked with `?format=`. PDF unless asked otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Csv,
}

impl ReportFormat {
    pub fn renderer(self) -> &'static dyn ReportRenderer {
        match self {
            ReportFormat::Pdf => &PdfRenderer,
            ReportFormat::Csv => &CsvRenderer,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvRenderer;

impl CsvRenderer {
    fn writer() -> Writer<Vec<u8>> {
        WriterBuilder::new().flexible(true).from_writer(Vec::new())
    }

    fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
        writer
            .into_inner()
            .map_err(|err| ExportError::Flush(err.error().to_string()))
    }
}

impl ReportRenderer for CsvRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render_trip(&self, ledger: &TripLedger) -> Result<Vec<u8>, ExportError> {
        let mut out = Self::writer();

        out.write_record([ledger.truck_name.as_str()])?;
        out.write_record(["Customer", ledger.customer_name.as_str()])?;
        out.write_record([
            "From",
            ledger.origin.as_str(),
            "To",
            ledger.destination.as_str(),
        ])?;
        let end = ledger
            .end_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "Ongoing".to_string());
        out.write_record([
            "Duration".to_string(),
            ledger.start_date.format(DATE_FORMAT).to_string(),
            end,
        ])?;

        out.write_record(["Total Cash In", "Total Cash Out", "Final Balance"])?;
        out.write_record([
            money(ledger.summary.cash_in),
            money(ledger.summary.cash_out),
            money(ledger.summary.balance),
        ])?;
        out.write_record([
            "Total No. of entries".to_string(),
            ledger.total_entries.to_string(),
        ])?;

        out.write_record(["Date", "Remark", "Mode", "Cash In", "Cash Out", "Balance"])?;
        for row in &ledger.rows {
            out.write_record([
                row.date.format(DATE_FORMAT).to_string(),
                row.remark.clone(),
                row.mode.clone().unwrap_or_default(),
                row.cash_in.map(money).unwrap_or_default(),
                row.cash_out.map(money).unwrap_or_default(),
                money(row.balance),
            ])?;
        }

        Self::finish(out)
    }

    fn render_fleet(&self, report: &FleetReport) -> Result<Vec<u8>, ExportError> {
        let mut out = Self::writer();

        out.write_record(["Fleet Management Report".to_string()])?;
        out.write_record([
            "Generated on".to_string(),
            report.generated_on.format(DATE_FORMAT).to_string(),
        ])?;
        out.write_record(["Truck", "Plate", "Trips", "Earnings", "Maintenance", "Net Profit"])?;
        for entry in &report.trucks {
            out.write_record([
                entry.name.clone(),
                entry.plate.clone(),
                entry.financials.trips.to_string(),
                money(entry.financials.revenue),
                money(entry.financials.maintenance_cost),
                money(entry.financials.net_profit),
            ])?;
        }
        out.write_record([
            "Total".to_string(),
            String::new(),
            report
                .trucks
                .iter()
                .map(|entry| entry.financials.trips)
                .sum::<usize>()
                .to_string(),
            money(report.totals.revenue),
            money(report.totals.maintenance_cost),
            money(report.totals.net_profit),
        ])?;

        Self::finish(out)
    }

    fn render_truck(&self, statement: &TruckStatement) -> Result<Vec<u8>, ExportError> {
        let mut out = Self::writer();

        out.write_record([format!("{} ({})", statement.name, statement.plate)])?;
        out.write_record(["Capacity".to_string(), statement.capacity.normalize().to_string()])?;
        out.write_record([
            "Generated on".to_string(),
            statement.generated_on.format(DATE_FORMAT).to_string(),
        ])?;
        out.write_record(["Total Earnings", "Total Maintenance", "Net Profit"])?;
        out.write_record([
            money(statement.financials.revenue),
            money(statement.financials.maintenance_cost),
            money(statement.financials.net_profit),
        ])?;

        out.write_record(["Hire Out History"])?;
        out.write_record([
            "Customer",
            "Start Date",
            "End Date",
            "Load",
            "Earnings",
            "Maintenance",
            "Profit",
        ])?;
        for trip in &statement.trips {
            out.write_record([
                trip.customer_name.clone(),
                trip.start_date.format(DATE_FORMAT).to_string(),
                date_or_dash(trip.end_date),
                trip.load_amount.normalize().to_string(),
                money(trip.earnings),
                money(trip.maintenance_cost),
                money(trip.profit),
            ])?;
        }

        out.write_record(["Maintenance History"])?;
        out.write_record(["Date", "Item", "Details", "Cost"])?;
        for row in &statement.maintenances {
            out.write_record([
                row.date.format(DATE_FORMAT).to_string(),
                row.remark.clone(),
                row.details.clone().unwrap_or_else(|| "-".to_string()),
                money(row.cost),
            ])?;
        }

        Self::finish(out)
    }
}

pub(crate) fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub(crate) fn money(value: Decimal) -> String {
    let mut rounded = round_money(value);
    rounded.rescale(crate::fleet::finance::MONEY_SCALE);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::export::ledger::{
        FleetReportEntry, LedgerRow, LedgerSummary, StatementMaintenance, StatementTrip,
    };
    use crate::fleet::{FleetTotals, TruckFinancials};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn money_is_rounded_to_cents() {
        assert_eq!(money(dec!(4000)), "4000.00");
        assert_eq!(money(dec!(12.345)), "12.35");
        assert_eq!(money(dec!(-0.5)), "-0.50");
    }

    #[test]
    fn trip_csv_contains_summary_and_ledger_rows() {
        let ledger = TripLedger {
            trip_id: Uuid::nil(),
            truck_name: "Volvo FH".to_string(),
            customer_name: "Acme, Ltd".to_string(),
            origin: "Nairobi".to_string(),
            destination: "N/A".to_string(),
            start_date: date(1),
            end_date: None,
            generated_on: date(20),
            summary: LedgerSummary {
                cash_in: dec!(5000),
                cash_out: dec!(500),
                balance: dec!(4500),
            },
            total_entries: 2,
            rows: vec![
                LedgerRow {
                    date: date(1),
                    remark: "Acme, Ltd".to_string(),
                    mode: Some("Cash".to_string()),
                    cash_in: Some(dec!(5000)),
                    cash_out: None,
                    balance: dec!(5000),
                },
                LedgerRow {
                    date: date(3),
                    remark: "Oil change".to_string(),
                    mode: Some("Cash".to_string()),
                    cash_in: None,
                    cash_out: Some(dec!(500)),
                    balance: dec!(4500),
                },
                LedgerRow {
                    date: date(20),
                    remark: "Final Balance".to_string(),
                    mode: None,
                    cash_in: None,
                    cash_out: None,
                    balance: dec!(4500),
                },
            ],
        };

        let bytes = CsvRenderer.render_trip(&ledger).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Volvo FH");
        assert_eq!(lines[1], "Customer,\"Acme, Ltd\"");
        assert_eq!(lines[3], "Duration,2025-05-01,Ongoing");
        assert_eq!(lines[5], "5000.00,500.00,4500.00");
        assert_eq!(lines[6], "Total No. of entries,2");
        assert_eq!(lines[7], "Date,Remark,Mode,Cash In,Cash Out,Balance");
        assert_eq!(lines[9], "2025-05-03,Oil change,Cash,,500.00,4500.00");
        assert_eq!(lines[10], "2025-05-20,Final Balance,,,,4500.00");
    }

    #[test]
    fn fleet_csv_ends_with_totals() {
        let report = FleetReport {
            generated_on: date(2),
            trucks: vec![FleetReportEntry {
                name: "Volvo FH".to_string(),
                plate: "KBX 101A".to_string(),
                financials: TruckFinancials {
                    truck_id: Uuid::nil(),
                    trips: 3,
                    revenue: dec!(5000),
                    maintenance_cost: dec!(3000),
                    net_profit: dec!(2000),
                },
            }],
            totals: FleetTotals {
                revenue: dec!(5000),
                maintenance_cost: dec!(3000),
                net_profit: dec!(2000),
            },
        };

        let text = String::from_utf8(CsvRenderer.render_fleet(&report).unwrap()).unwrap();
        let last = text.lines().last().unwrap();
        assert_eq!(last, "Total,,3,5000.00,3000.00,2000.00");
        assert!(text.contains("Volvo FH,KBX 101A,3,5000.00,3000.00,2000.00"));
    }

    #[test]
    fn truck_csv_has_history_sections() {
        let statement = TruckStatement {
            truck_id: Uuid::nil(),
            name: "Volvo FH".to_string(),
            plate: "KBX 101A".to_string(),
            capacity: dec!(20000.00),
            generated_on: date(20),
            financials: TruckFinancials {
                truck_id: Uuid::nil(),
                trips: 1,
                revenue: dec!(5000),
                maintenance_cost: dec!(3000),
                net_profit: dec!(2000),
            },
            trips: vec![StatementTrip {
                trip_id: Uuid::nil(),
                customer_name: "Acme Freight".to_string(),
                start_date: date(1),
                end_date: None,
                load_amount: dec!(12000),
                earnings: dec!(5000),
                maintenance_cost: dec!(500),
                profit: dec!(4500),
            }],
            maintenances: vec![StatementMaintenance {
                date: date(3),
                remark: "Tyre change".to_string(),
                details: None,
                hire_out_id: Some(Uuid::nil()),
                cost: dec!(500),
            }],
        };

        let text = String::from_utf8(CsvRenderer.render_truck(&statement).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Volvo FH (KBX 101A)");
        assert_eq!(lines[1], "Capacity,20000");
        assert_eq!(lines[4], "5000.00,3000.00,2000.00");
        assert!(text.contains("Acme Freight,2025-05-01,-,12000,5000.00,500.00,4500.00"));
        assert_eq!(lines.last().copied(), Some("2025-05-03,Tyre change,-,500.00"));
    }

    #[test]
    fn report_format_defaults_to_pdf() {
        assert_eq!(ReportFormat::default(), ReportFormat::Pdf);
        assert_eq!(ReportFormat::Csv.renderer().extension(), "csv");
        assert_eq!(ReportFormat::Pdf.renderer().content_type(), "application/pdf");
    }
}
