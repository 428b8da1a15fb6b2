//! Invoice line-item ingestion.
//!
//! Upstream, uploaded supplier invoices go through OCR; what reaches this
//! service is the tabular extraction output. The importer turns one extract
//! into an [`Invoice`] the reconciliation engine can consume. Column
//! captions vary wildly between supplier templates, so headers are matched
//! through a normalized alias table; amounts are parsed strictly and a
//! malformed cell aborts the whole invoice rather than importing a partial
//! or silently-zeroed document.

mod mapping;
mod normalizer;
mod parser;

use std::io::Read;
use std::path::Path;

use crate::workflows::procurement::domain::{
    Invoice, InvoiceId, InvoiceLine, InvoiceLineId, ProductId, SupplierId,
};
use crate::workflows::procurement::money::AmountError;

use parser::ExtractedRow;

#[derive(Debug)]
pub enum InvoiceImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
    EmptyField(&'static str),
    Amount(AmountError),
}

impl std::fmt::Display for InvoiceImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceImportError::Io(err) => write!(f, "failed to read invoice extract: {}", err),
            InvoiceImportError::Csv(err) => write!(f, "invalid invoice extract data: {}", err),
            InvoiceImportError::MissingColumn(column) => {
                write!(f, "invoice extract has no recognizable {} column", column)
            }
            InvoiceImportError::EmptyField(field) => {
                write!(f, "invoice extract row is missing its {} value", field)
            }
            InvoiceImportError::Amount(err) => {
                write!(f, "invoice extract carries an unusable amount: {}", err)
            }
        }
    }
}

impl std::error::Error for InvoiceImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvoiceImportError::Io(err) => Some(err),
            InvoiceImportError::Csv(err) => Some(err),
            InvoiceImportError::MissingColumn(_) | InvoiceImportError::EmptyField(_) => None,
            InvoiceImportError::Amount(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for InvoiceImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for InvoiceImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<AmountError> for InvoiceImportError {
    fn from(err: AmountError) -> Self {
        Self::Amount(err)
    }
}

pub struct InvoiceExtractImporter;

impl InvoiceExtractImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        invoice_id: InvoiceId,
        supplier_id: SupplierId,
    ) -> Result<Invoice, InvoiceImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, invoice_id, supplier_id)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        invoice_id: InvoiceId,
        supplier_id: SupplierId,
    ) -> Result<Invoice, InvoiceImportError> {
        let rows = parser::parse_rows(reader)?;

        let mut lines = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            lines.push(line_from_row(&invoice_id, index, row));
        }

        Ok(Invoice {
            id: invoice_id,
            supplier_id,
            lines,
        })
    }
}

fn line_from_row(invoice_id: &InvoiceId, index: usize, row: ExtractedRow) -> InvoiceLine {
    InvoiceLine {
        id: InvoiceLineId(format!("{}-l{}", invoice_id.0, index + 1)),
        product_id: row.product_code.map(ProductId),
        description: row.description,
        quantity: row.quantity,
        unit_price: row.unit_price,
        line_total: row.line_total,
        vat_rate: row.vat_rate,
    }
}
