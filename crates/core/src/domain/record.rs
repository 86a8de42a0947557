use serde::{Deserialize, Serialize};

/// One purchase-order line item from the state procurement dataset.
///
/// Records are created in bulk during dataset load and never mutated
/// individually; the backing collection is only ever replaced wholesale.
/// Date fields keep the dataset's `MM/DD/YYYY` string form so generated
/// queries can convert them with `$dateFromString`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcurementRecord {
    pub creation_date: Option<String>,
    pub purchase_date: Option<String>,
    pub fiscal_year: Option<String>,
    pub lpa_number: Option<String>,
    pub purchase_order_number: Option<String>,
    pub requisition_number: Option<String>,
    pub acquisition_type: Option<String>,
    pub sub_acquisition_type: Option<String>,
    pub acquisition_method: Option<String>,
    pub sub_acquisition_method: Option<String>,
    pub department_name: Option<String>,
    pub supplier_code: Option<String>,
    pub supplier_name: Option<String>,
    pub supplier_qualifications: Option<String>,
    pub item_name: Option<String>,
    pub item_description: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub classification_codes: Option<String>,
    pub normalized_unspsc: Option<String>,
    pub commodity_title: Option<String>,
    pub class_title: Option<String>,
    pub family_title: Option<String>,
    pub segment_title: Option<String>,
    /// Geocoordinate string for the purchasing location, e.g. `"(38.5, -121.4)"`.
    pub location: Option<String>,
}
