use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical columns of an invoice line extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    ProductCode,
    Description,
    Quantity,
    UnitPrice,
    LineTotal,
    VatRate,
}

static HEADER_MAP: OnceLock<HashMap<String, Column>> = OnceLock::new();

pub(crate) fn column_for_header(normalized: &str) -> Option<Column> {
    header_map().get(normalized).copied()
}

fn header_map() -> &'static HashMap<String, Column> {
    HEADER_MAP.get_or_init(|| {
        const HEADER_TO_COLUMN: &[(&str, Column)] = &[
            // Product reference
            ("Product Code", Column::ProductCode),
            ("Code", Column::ProductCode),
            ("SKU", Column::ProductCode),
            ("Reference", Column::ProductCode),
            ("Ref", Column::ProductCode),
            ("Article", Column::ProductCode),
            ("R\u{e9}f\u{e9}rence", Column::ProductCode),
            // Free-text designation
            ("Description", Column::Description),
            ("Designation", Column::Description),
            ("D\u{e9}signation", Column::Description),
            ("Item", Column::Description),
            ("Label", Column::Description),
            ("Product", Column::Description),
            // Quantity
            ("Qty", Column::Quantity),
            ("Quantity", Column::Quantity),
            ("Qt\u{e9}", Column::Quantity),
            ("Quantite", Column::Quantity),
            // Unit price
            ("Unit Price", Column::UnitPrice),
            ("Unit Cost", Column::UnitPrice),
            ("Price", Column::UnitPrice),
            ("P.U.", Column::UnitPrice),
            ("PU", Column::UnitPrice),
            ("Prix Unitaire", Column::UnitPrice),
            // Line total
            ("Line Total", Column::LineTotal),
            ("Total", Column::LineTotal),
            ("Amount", Column::LineTotal),
            ("Montant", Column::LineTotal),
            ("Total HT", Column::LineTotal),
            // VAT
            ("VAT", Column::VatRate),
            ("VAT Rate", Column::VatRate),
            ("VAT %", Column::VatRate),
            ("Tax", Column::VatRate),
            ("Tax Rate", Column::VatRate),
            ("TVA", Column::VatRate),
        ];

        let mut map = HashMap::with_capacity(HEADER_TO_COLUMN.len());
        for (header, column) in HEADER_TO_COLUMN {
            map.insert(normalize_header(header), *column);
        }
        map
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(header: &str) -> Option<Column> {
    column_for_header(&normalize_header(header))
}
