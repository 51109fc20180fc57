use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TRANSACTION_ID: &str = "transactionId";

/// A record of the ledger API. Only `transactionId` is known to the
/// server, the object is otherwise stored as sent, key order included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct LedgerRecord {
    transaction_id: i64,
    fields: Map<String, Value>,
}

impl LedgerRecord {
    pub fn transaction_id(&self) -> i64 {
        self.transaction_id
    }

    /// Rewrites the ID in place, the key keeps its position.
    pub fn set_transaction_id(&mut self, id: i64) {
        self.transaction_id = id;
        self.fields.insert(TRANSACTION_ID.to_string(), Value::from(id));
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for LedgerRecord {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let transaction_id = match fields.get(TRANSACTION_ID) {
            Some(id) => id
                .as_i64()
                .ok_or_else(|| format!("`{}` must be an integer, got {}", TRANSACTION_ID, id))?,
            None => return Err(format!("missing field `{}`", TRANSACTION_ID)),
        };

        Ok(Self {
            transaction_id,
            fields,
        })
    }
}

impl From<LedgerRecord> for Map<String, Value> {
    fn from(record: LedgerRecord) -> Self {
        record.fields
    }
}

/// Returns `candidate`, or the first integer above it that no record uses.
/// `None` when the search runs past `i64::MAX`.
pub fn next_free_id(records: &[LedgerRecord], candidate: i64) -> Option<i64> {
    let taken: HashSet<i64> = records.iter().map(|r| r.transaction_id).collect();

    let mut id = candidate;
    while taken.contains(&id) {
        id = id.checked_add(1)?;
    }
    Some(id)
}

/// Drops every record carrying `id`, returns how many were removed.
pub fn remove_by_id(records: &mut Vec<LedgerRecord>, id: i64) -> usize {
    let before = records.len();
    records.retain(|r| r.transaction_id != id);
    before - records.len()
}

/// A sale recorded by the cashier API, totals computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub total_price: f64,
    pub money_received: f64,
    pub change: f64,
    #[serde(default)]
    pub timestamp: Value,
}

/// Body of `POST /process_transaction` before validation. Fields stay raw
/// JSON so numbers sent as strings can still be coerced.
#[derive(Debug, Default, Deserialize)]
pub struct SaleRequest {
    pub product_name: Option<Value>,
    pub quantity: Option<Value>,
    pub price_per_unit: Option<Value>,
    pub money_received: Option<Value>,
    pub timestamp: Option<Value>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SaleRejection {
    MissingFields,
    InvalidField(&'static str),
}

impl SaleRequest {
    pub fn into_sale(self) -> Result<Sale, SaleRejection> {
        let (Some(product_name), Some(quantity), Some(price_per_unit), Some(money_received)) = (
            self.product_name.filter(is_truthy),
            self.quantity.filter(is_truthy),
            self.price_per_unit.filter(is_truthy),
            self.money_received.filter(|v| !v.is_null()),
        ) else {
            return Err(SaleRejection::MissingFields);
        };

        let product_name = match product_name {
            Value::String(name) => name,
            _ => return Err(SaleRejection::InvalidField("product_name")),
        };
        let quantity = as_integer(&quantity).ok_or(SaleRejection::InvalidField("quantity"))?;
        let price_per_unit =
            as_float(&price_per_unit).ok_or(SaleRejection::InvalidField("price_per_unit"))?;
        let money_received =
            as_float(&money_received).ok_or(SaleRejection::InvalidField("money_received"))?;

        // JSON has no representation for inf or NaN, they would be stored as null
        let total_price = quantity as f64 * price_per_unit;
        if !total_price.is_finite() {
            return Err(SaleRejection::InvalidField("quantity"));
        }
        let change = money_received - total_price;
        if !change.is_finite() {
            return Err(SaleRejection::InvalidField("money_received"));
        }

        Ok(Sale {
            product_name,
            quantity,
            price_per_unit,
            total_price,
            money_received,
            change,
            timestamp: self.timestamp.unwrap_or(Value::Null),
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|f: &f64| f.is_finite())
}

/// A row of the sales history API. `id` is assigned by the server and
/// only orders the rows, `transaction_id` is the unique key callers use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesEntry {
    pub id: u64,
    pub transaction_id: String,
    pub timestamp: String,
    pub items: Value,
    pub total_amount: f64,
    pub payment_received: f64,
    pub change: f64,
    pub debt_amount: f64,
    pub status: String,
}

/// Body of `POST /sales` before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRequest {
    pub transaction_id: Option<Value>,
    pub timestamp: Option<Value>,
    pub items: Option<Value>,
    pub total_amount: Option<Value>,
    pub payment_received: Option<Value>,
    pub change: Option<Value>,
    pub debt_amount: Option<Value>,
    pub status: Option<Value>,
}

impl SalesRequest {
    /// Validates the body into an entry with row id `id`. Text fields and
    /// `items` must be truthy, amounts only have to be present.
    pub fn into_entry(self, id: u64) -> Result<SalesEntry, SaleRejection> {
        let present = |v: &Value| !v.is_null();
        let (
            Some(transaction_id),
            Some(timestamp),
            Some(items),
            Some(total_amount),
            Some(payment_received),
            Some(change),
            Some(debt_amount),
            Some(status),
        ) = (
            self.transaction_id.filter(is_truthy),
            self.timestamp.filter(is_truthy),
            self.items.filter(is_truthy),
            self.total_amount.filter(present),
            self.payment_received.filter(present),
            self.change.filter(present),
            self.debt_amount.filter(present),
            self.status.filter(is_truthy),
        )
        else {
            return Err(SaleRejection::MissingFields);
        };

        Ok(SalesEntry {
            id,
            transaction_id: as_text(transaction_id)
                .ok_or(SaleRejection::InvalidField("transactionId"))?,
            timestamp: as_text(timestamp).ok_or(SaleRejection::InvalidField("timestamp"))?,
            items,
            total_amount: as_float(&total_amount)
                .ok_or(SaleRejection::InvalidField("totalAmount"))?,
            payment_received: as_float(&payment_received)
                .ok_or(SaleRejection::InvalidField("paymentReceived"))?,
            change: as_float(&change).ok_or(SaleRejection::InvalidField("change"))?,
            debt_amount: as_float(&debt_amount).ok_or(SaleRejection::InvalidField("debtAmount"))?,
            status: as_text(status).ok_or(SaleRejection::InvalidField("status"))?,
        })
    }
}

/// Row id following the highest one in use.
pub fn next_row_id(entries: &[SalesEntry]) -> u64 {
    entries.iter().map(|e| e.id).max().map_or(1, |id| id + 1)
}

/// Removes the sale at `index`, shifting the later ones down.
pub fn remove_at(sales: &mut Vec<Sale>, index: usize) -> Option<Sale> {
    (index < sales.len()).then(|| sales.remove(index))
}
