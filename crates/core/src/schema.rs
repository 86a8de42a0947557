//! Static description of the procurement dataset, rendered into the
//! query-generation prompt so the model targets real field names.

/// Collection that holds every [`ProcurementRecord`](crate::domain::ProcurementRecord).
pub const COLLECTION: &str = "procurement_data";

/// Schema text interpolated into the query-generation template.
///
/// Field names and date conventions must match what the ingestion path
/// writes; the model only ever sees this description, never the data.
pub const DATASET_SCHEMA: &str = r#"Database Schema for California Procurement Data:

Collection: procurement_data
Fields:
- creation_date (string): System date when the purchase order was entered, format "MM/DD/YYYY"
  Example: "08/27/2013"
- purchase_date (string): Purchase order date entered by the user, format "MM/DD/YYYY"
  Example: "08/15/2013"
- fiscal_year (string): State of CA fiscal year (July 1 - June 30)
  Example: "2013/2014"
- lpa_number (string): Leveraged Procurement Agreement / contract number
  Example: "1-19-70-01A"
- purchase_order_number (string): PO identifier
  Example: "P132000012345"
- requisition_number (string): Internal request number
  Example: "REQ-1234"
- acquisition_type (string): IT Goods, IT Services, Non-IT Goods, Non-IT Services
  Example: "IT Goods"
- sub_acquisition_type (string): Sub-category of acquisition type
  Example: "Hardware"
- acquisition_method (string): Procurement method
  Example: "Competitive Bid"
- sub_acquisition_method (string): Sub-category of procurement method
  Example: "Invitation for Bid"
- department_name (string): Name of the purchasing department
  Example: "Department of Technology"
- supplier_code (string): Internal supplier identifier
  Example: "1707291"
- supplier_name (string): Supplier name
  Example: "ABC Inc."
- supplier_qualifications (string): SB, SBE, DVBE, NP, MB certification codes
  Example: "SB, DVBE"
- item_name (string): Name of the purchased items
  Example: "Laptops"
- item_description (string): Description of the purchased items
  Example: "15-inch laptops with 16GB RAM"
- quantity (number): Quantity of items
  Example: 100
- unit_price (number): Price per unit
  Example: 1500.00
- total_price (number): Total price excluding taxes and shipping
  Example: 150000.00
- classification_codes (string): UNSPSC codes
  Example: "43211503"
- normalized_unspsc (string): Normalized UNSPSC code
  Example: "43211503"
- commodity_title (string): UNSPSC commodity title
  Example: "Notebook Computers"
- class_title (string): UNSPSC class title
  Example: "Computers"
- family_title (string): UNSPSC family title
  Example: "Computer Equipment and Accessories"
- segment_title (string): UNSPSC segment title
  Example: "Information Technology Broadcasting and Telecommunications"
- location (string): Geocoordinates of the purchasing location
  Example: "(38.5816, -121.4944)"

Important Notes:
- The date fields (creation_date, purchase_date) are stored as strings in the format "MM/DD/YYYY".
- When comparing dates, use the $dateFromString operator to convert the date strings to Date objects.
  Example: {"$dateFromString": {"dateString": "01/01/2012", "format": "%m/%d/%Y"}}
- Use the $gte and $lte operators for date range comparisons.
- Aggregate and group data as needed to answer the question accurately.
- Project only the necessary fields in the final output.
"#;
