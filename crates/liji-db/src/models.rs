//! Rust models for the ledger tables.
//!
//! Stored models (`Record`, `Giftbook`, `GiftbookItem`) always carry ids and
//! timestamps. The `*Input` models are what a batch save accepts: ids are
//! optional and timestamps are assigned by the store, so any extra fields a
//! client echoes back are ignored.

use chrono::{DateTime, Utc};
use liji_common::{GiftbookId, GiftbookItemId, RecordId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single tracked gift or monetary exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Record {
    #[schema(value_type = i64)]
    pub id: RecordId,
    pub person_name: String,
    pub event_type: String,
    pub event_date: String,
    pub amount: f64,
    pub gift_type: Option<String>,
    pub notes: Option<String>,
    pub is_returned: bool,
    pub return_date: Option<String>,
    pub return_amount: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record as submitted to a batch save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct RecordInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub person_name: String,
    pub event_type: String,
    pub event_date: String,
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::non_empty")]
    pub gift_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub is_returned: bool,
    #[serde(default, deserialize_with = "lenient::non_empty")]
    pub return_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_zero")]
    pub return_amount: Option<f64>,
}

impl RecordInput {
    /// Stored id, if the client sent one.
    pub fn record_id(&self) -> Option<RecordId> {
        RecordId::from_client(self.id)
    }

    /// Build the stored form of this input.
    pub fn into_record(
        self,
        id: RecordId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Record {
        Record {
            id,
            person_name: self.person_name,
            event_type: self.event_type,
            event_date: self.event_date,
            amount: self.amount,
            gift_type: self.gift_type,
            notes: self.notes,
            is_returned: self.is_returned,
            return_date: self.return_date,
            return_amount: self.return_amount,
            created_at,
            updated_at,
        }
    }
}

impl From<Record> for RecordInput {
    fn from(record: Record) -> Self {
        Self {
            id: Some(record.id.get()),
            person_name: record.person_name,
            event_type: record.event_type,
            event_date: record.event_date,
            amount: record.amount,
            gift_type: record.gift_type,
            notes: record.notes,
            is_returned: record.is_returned,
            return_date: record.return_date,
            return_amount: record.return_amount,
        }
    }
}

/// A named collection of contributions for one event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Giftbook {
    #[schema(value_type = i64)]
    pub id: GiftbookId,
    pub name: String,
    pub event_type: String,
    pub event_date: String,
    pub total_amount: f64,
    pub total_count: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<GiftbookItem>,
}

/// One contribution inside a giftbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct GiftbookItem {
    #[schema(value_type = i64)]
    pub id: GiftbookItemId,
    #[schema(value_type = i64)]
    pub giftbook_id: GiftbookId,
    pub person_name: String,
    pub amount: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A giftbook as submitted to a batch save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct GiftbookInput {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub event_type: String,
    pub event_date: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub total_count: i64,
    #[serde(default, deserialize_with = "lenient::non_empty")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub items: Vec<GiftbookItemInput>,
}

impl GiftbookInput {
    /// Stored id, if the client sent one.
    pub fn giftbook_id(&self) -> Option<GiftbookId> {
        GiftbookId::from_client(self.id)
    }
}

impl From<Giftbook> for GiftbookInput {
    fn from(book: Giftbook) -> Self {
        Self {
            id: Some(book.id.get()),
            name: book.name,
            event_type: book.event_type,
            event_date: book.event_date,
            total_amount: book.total_amount,
            total_count: book.total_count,
            notes: book.notes,
            items: book.items.into_iter().map(Into::into).collect(),
        }
    }
}

/// A giftbook line item as submitted to a batch save. Item ids are never
/// reused; items are rewritten with every save of their giftbook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct GiftbookItemInput {
    pub person_name: String,
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient::non_empty")]
    pub notes: Option<String>,
}

impl From<GiftbookItem> for GiftbookItemInput {
    fn from(item: GiftbookItem) -> Self {
        Self {
            person_name: item.person_name,
            amount: item.amount,
            notes: item.notes,
        }
    }
}

/// Input decoding that follows what the web client actually sends: blank
/// optional fields arrive as `""`, `0` or `null`, and flags may be `0`/`1`.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// `null` reads as the type's default.
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Any JSON value, read as a flag: `null`, `false`, `0` and `""` are false.
    pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        })
    }

    /// Optional text where `""` means absent.
    pub fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
    }

    /// Optional amount where `0` means absent.
    pub fn non_zero<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<f64>::deserialize(deserializer)?.filter(|v| *v != 0.0))
    }
}

/// Row counts from one batch save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}
