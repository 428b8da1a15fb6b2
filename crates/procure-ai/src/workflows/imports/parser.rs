use std::io::Read;

use rust_decimal::Decimal;

use super::mapping::{self, Column};
use super::normalizer::{normalize_amount, normalize_header};
use super::InvoiceImportError;
use crate::workflows::procurement::money;

/// One line item lifted out of an extract, amounts already parsed.
#[derive(Debug)]
pub(crate) struct ExtractedRow {
    pub(crate) product_code: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) quantity: Decimal,
    pub(crate) unit_price: Decimal,
    pub(crate) line_total: Decimal,
    pub(crate) vat_rate: Option<Decimal>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ExtractedRow>, InvoiceImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|header| mapping::column_for_header(&normalize_header(header)))
        .collect();

    let position = |column: Column| columns.iter().position(|c| *c == Some(column));
    let quantity_at = position(Column::Quantity)
        .ok_or(InvoiceImportError::MissingColumn("quantity"))?;
    let unit_price_at = position(Column::UnitPrice)
        .ok_or(InvoiceImportError::MissingColumn("unit price"))?;
    let product_code_at = position(Column::ProductCode);
    let description_at = position(Column::Description);
    let line_total_at = position(Column::LineTotal);
    let vat_rate_at = position(Column::VatRate);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cell = |index: usize| record.get(index).map(str::trim).filter(|v| !v.is_empty());

        let quantity = parse_cell("quantity", cell(quantity_at))?;
        let unit_price = parse_cell("unit price", cell(unit_price_at))?;
        let line_total = match line_total_at.and_then(cell) {
            Some(raw) => money::parse_amount("line total", &normalize_amount(raw))?,
            None => quantity * unit_price,
        };
        let vat_rate = match vat_rate_at.and_then(cell) {
            Some(raw) => Some(money::parse_amount("VAT rate", &normalize_amount(raw))?),
            None => None,
        };

        rows.push(ExtractedRow {
            product_code: product_code_at.and_then(cell).map(str::to_string),
            description: description_at.and_then(cell).map(str::to_string),
            quantity,
            unit_price,
            line_total,
            vat_rate,
        });
    }

    Ok(rows)
}

fn parse_cell(field: &'static str, raw: Option<&str>) -> Result<Decimal, InvoiceImportError> {
    let raw = raw.ok_or(InvoiceImportError::EmptyField(field))?;
    Ok(money::parse_amount(field, &normalize_amount(raw))?)
}
