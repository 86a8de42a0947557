//! CSV ingestion for the procurement dataset.
//!
//! Maps the published CSV headers onto the collection's snake_case
//! field names, coerces the numeric columns, and bulk-replaces the
//! `procurement_data` collection. Blank cells become JSON null so
//! generated `$match` stages can filter on missing values.

use std::io::Read;

use procurechat_core::schema::COLLECTION;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::client::{DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// CSV header to collection field name, in dataset column order.
const COLUMN_MAPPING: &[(&str, &str)] = &[
    ("Creation Date", "creation_date"),
    ("Purchase Date", "purchase_date"),
    ("Fiscal Year", "fiscal_year"),
    ("LPA Number", "lpa_number"),
    ("Purchase Order Number", "purchase_order_number"),
    ("Requisition Number", "requisition_number"),
    ("Acquisition Type", "acquisition_type"),
    ("Sub-Acquisition Type", "sub_acquisition_type"),
    ("Acquisition Method", "acquisition_method"),
    ("Sub-Acquisition Method", "sub_acquisition_method"),
    ("Department Name", "department_name"),
    ("Supplier Code", "supplier_code"),
    ("Supplier Name", "supplier_name"),
    ("Supplier Qualifications", "supplier_qualifications"),
    ("Item Name", "item_name"),
    ("Item Description", "item_description"),
    ("Quantity", "quantity"),
    ("Unit Price", "unit_price"),
    ("Total Price", "total_price"),
    ("Classification Codes", "classification_codes"),
    ("Normalized UNSPSC", "normalized_unspsc"),
    ("Commodity Title", "commodity_title"),
    ("Class Title", "class_title"),
    ("Family Title", "family_title"),
    ("Segment Title", "segment_title"),
    ("Location", "location"),
];

const NUMERIC_FIELDS: &[&str] = &["quantity", "unit_price", "total_price"];

/// Parse dataset CSV into store documents.
pub fn parse_documents(reader: impl Read) -> Result<Vec<Value>, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let field_names: Vec<Option<&str>> = headers
        .iter()
        .map(|header| {
            COLUMN_MAPPING
                .iter()
                .find(|(column, _)| column.eq_ignore_ascii_case(header.trim()))
                .map(|(_, field)| *field)
        })
        .collect();

    let mut documents = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut document = Map::new();

        for (index, field_name) in field_names.iter().enumerate() {
            let Some(field_name) = field_name else {
                continue;
            };
            let raw = record.get(index).unwrap_or("").trim();
            document.insert(field_name.to_string(), coerce_field(field_name, raw));
        }

        if !document.is_empty() {
            documents.push(Value::Object(document));
        }
    }

    Ok(documents)
}

/// Load the dataset into the store, replacing any previous contents of
/// the procurement collection. Returns the number of records loaded.
pub async fn load_dataset(
    store: &dyn DocumentStore,
    reader: impl Read,
) -> Result<u64, IngestError> {
    let documents = parse_documents(reader)?;
    let record_count = store.replace_all(COLLECTION, &documents).await?;

    tracing::info!(
        event_name = "ingest.load_dataset.completed",
        record_count,
        "procurement dataset loaded"
    );
    Ok(record_count)
}

fn coerce_field(field_name: &str, raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }

    if NUMERIC_FIELDS.contains(&field_name) {
        return parse_number(raw).map_or(Value::Null, |number| {
            serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
        });
    }

    Value::String(raw.to_string())
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String =
        raw.chars().filter(|ch| !matches!(ch, '$' | ',' | ' ')).collect();
    cleaned.parse::<f64>().ok()
}
