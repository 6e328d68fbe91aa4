use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use super::ledger::{FleetReport, TripLedger, TruckStatement};
use super::render::{date_or_dash, money, ReportRenderer, DATE_FORMAT};
use super::ExportError;

// A4 portrait
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LAYER: &str = "report";

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 9.0;
const LINE_HEIGHT: f32 = 5.5;
/// Average Helvetica glyph width in mm at 1 pt, used to clip cells.
const GLYPH_WIDTH: f32 = 0.2;

const SUMMARY_COLUMNS: [f32; 3] = [60.0, 60.0, 60.0];
const LEDGER_COLUMNS: [f32; 6] = [24.0, 52.0, 16.0, 28.0, 28.0, 32.0];
const FLEET_COLUMNS: [f32; 6] = [46.0, 28.0, 14.0, 32.0, 32.0, 28.0];
const TRIP_COLUMNS: [f32; 7] = [40.0, 22.0, 22.0, 22.0, 26.0, 24.0, 24.0];
const MAINTENANCE_COLUMNS: [f32; 4] = [24.0, 50.0, 76.0, 30.0];

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl ReportRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render_trip(&self, ledger: &TripLedger) -> Result<Vec<u8>, ExportError> {
        let mut page = PageWriter::new(&ledger.truck_name)?;

        page.title(&ledger.truck_name);
        page.text(&format!("Customer: {}", ledger.customer_name));
        page.text(&format!("From: {}    To: {}", ledger.origin, ledger.destination));
        let end = ledger
            .end_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "Ongoing".to_string());
        page.text(&format!(
            "Duration: {} to {end}",
            ledger.start_date.format(DATE_FORMAT)
        ));
        page.gap();

        page.row(&SUMMARY_COLUMNS, &["Total Cash In", "Total Cash Out", "Final Balance"], true);
        page.row(
            &SUMMARY_COLUMNS,
            &[
                money(ledger.summary.cash_in),
                money(ledger.summary.cash_out),
                money(ledger.summary.balance),
            ],
            false,
        );
        page.text(&format!("Total No. of entries: {}", ledger.total_entries));
        page.gap();

        page.row(
            &LEDGER_COLUMNS,
            &["Date", "Remark", "Mode", "Cash In", "Cash Out", "Balance"],
            true,
        );
        for row in &ledger.rows {
            page.row(
                &LEDGER_COLUMNS,
                &[
                    row.date.format(DATE_FORMAT).to_string(),
                    row.remark.clone(),
                    row.mode.clone().unwrap_or_default(),
                    row.cash_in.map(money).unwrap_or_default(),
                    row.cash_out.map(money).unwrap_or_default(),
                    money(row.balance),
                ],
                false,
            );
        }

        page.finish()
    }

    fn render_fleet(&self, report: &FleetReport) -> Result<Vec<u8>, ExportError> {
        let mut page = PageWriter::new("Fleet Management Report")?;

        page.title("Fleet Management Report");
        page.text(&format!(
            "Generated on {}",
            report.generated_on.format(DATE_FORMAT)
        ));
        page.gap();
        page.row(&SUMMARY_COLUMNS, &["Total Earnings", "Total Maintenance", "Net Profit"], true);
        page.row(
            &SUMMARY_COLUMNS,
            &[
                money(report.totals.revenue),
                money(report.totals.maintenance_cost),
                money(report.totals.net_profit),
            ],
            false,
        );
        page.gap();

        page.row(
            &FLEET_COLUMNS,
            &["Truck", "Plate", "Trips", "Earnings", "Maintenance", "Net Profit"],
            true,
        );
        for entry in &report.trucks {
            page.row(
                &FLEET_COLUMNS,
                &[
                    entry.name.clone(),
                    entry.plate.clone(),
                    entry.financials.trips.to_string(),
                    money(entry.financials.revenue),
                    money(entry.financials.maintenance_cost),
                    money(entry.financials.net_profit),
                ],
                false,
            );
        }
        let trips: usize = report.trucks.iter().map(|entry| entry.financials.trips).sum();
        page.row(
            &FLEET_COLUMNS,
            &[
                "Total".to_string(),
                String::new(),
                trips.to_string(),
                money(report.totals.revenue),
                money(report.totals.maintenance_cost),
                money(report.totals.net_profit),
            ],
            true,
        );

        page.finish()
    }

    fn render_truck(&self, statement: &TruckStatement) -> Result<Vec<u8>, ExportError> {
        let heading = format!("{} ({})", statement.name, statement.plate);
        let mut page = PageWriter::new(&heading)?;

        page.title(&heading);
        page.text(&format!("Capacity: {}", statement.capacity.normalize()));
        page.text(&format!(
            "Generated on {}",
            statement.generated_on.format(DATE_FORMAT)
        ));
        page.gap();
        page.row(&SUMMARY_COLUMNS, &["Total Earnings", "Total Maintenance", "Net Profit"], true);
        page.row(
            &SUMMARY_COLUMNS,
            &[
                money(statement.financials.revenue),
                money(statement.financials.maintenance_cost),
                money(statement.financials.net_profit),
            ],
            false,
        );
        page.gap();

        page.heading("Hire Out History");
        page.row(
            &TRIP_COLUMNS,
            &["Customer", "Start", "End", "Load", "Earnings", "Maintenance", "Profit"],
            true,
        );
        for trip in &statement.trips {
            page.row(
                &TRIP_COLUMNS,
                &[
                    trip.customer_name.clone(),
                    trip.start_date.format(DATE_FORMAT).to_string(),
                    date_or_dash(trip.end_date),
                    trip.load_amount.normalize().to_string(),
                    money(trip.earnings),
                    money(trip.maintenance_cost),
                    money(trip.profit),
                ],
                false,
            );
        }
        page.gap();

        page.heading("Maintenance History");
        page.row(&MAINTENANCE_COLUMNS, &["Date", "Item", "Details", "Cost"], true);
        for row in &statement.maintenances {
            page.row(
                &MAINTENANCE_COLUMNS,
                &[
                    row.date.format(DATE_FORMAT).to_string(),
                    row.remark.clone(),
                    row.details.clone().unwrap_or_else(|| "-".to_string()),
                    money(row.cost),
                ],
                false,
            );
        }

        page.finish()
    }
}

/// Top-down text cursor over a document that adds pages as rows run out of room.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn advance(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= height;
    }

    fn title(&mut self, text: &str) {
        self.advance(TITLE_SIZE * 0.5);
        self.layer
            .use_text(text, TITLE_SIZE, Mm(MARGIN), Mm(self.y), &self.bold);
        self.y -= 3.0;
    }

    fn heading(&mut self, text: &str) {
        self.advance(HEADING_SIZE * 0.5);
        self.layer
            .use_text(text, HEADING_SIZE, Mm(MARGIN), Mm(self.y), &self.bold);
        self.y -= 1.5;
    }

    fn text(&mut self, text: &str) {
        self.advance(LINE_HEIGHT);
        self.layer
            .use_text(text, BODY_SIZE, Mm(MARGIN), Mm(self.y), &self.regular);
    }

    fn gap(&mut self) {
        self.y -= LINE_HEIGHT;
    }

    fn row<S: AsRef<str>>(&mut self, widths: &[f32], cells: &[S], bold: bool) {
        self.advance(LINE_HEIGHT);
        let font = if bold { &self.bold } else { &self.regular };
        let mut x = MARGIN;
        for (width, cell) in widths.iter().zip(cells) {
            let text = clip(cell.as_ref(), *width);
            if !text.is_empty() {
                self.layer.use_text(text, BODY_SIZE, Mm(x), Mm(self.y), font);
            }
            x += width;
        }
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

fn pdf_error(err: printpdf::Error) -> ExportError {
    ExportError::Pdf(err.to_string())
}

/// Cuts a cell to what fits its column, leaving a small gutter.
fn clip(text: &str, width: f32) -> String {
    let fits = ((width - 2.0) / (BODY_SIZE * GLYPH_WIDTH)).max(1.0) as usize;
    if text.chars().count() <= fits {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(fits.saturating_sub(1)).collect();
        clipped.push('~');
        clipped
    }
}
