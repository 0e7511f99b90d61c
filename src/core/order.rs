//! Order draft, validated order, and placed order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use super::category::Category;
use super::error::{FieldValidationError, ValidationError};

/// Wire names of the fields that must be filled before dispatch
pub const REQUIRED_FIELDS: [&str; 4] = ["fullName", "phone", "address", "size"];

const REQUIRED_MESSAGE: &str = "Ce champ est obligatoire";

/// Mutable form state for an order being composed
///
/// Every field is kept as text, exactly as typed. Nothing is checked until
/// [`OrderDraft::to_order`] turns it into an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDraft {
    #[validate(length(min = 1, max = 120, message = "Ce champ est obligatoire (120 caractères max)"))]
    pub full_name: String,

    #[validate(length(min = 1, max = 32, message = "Ce champ est obligatoire (32 caractères max)"))]
    pub phone: String,

    #[validate(length(min = 1, max = 500, message = "Ce champ est obligatoire (500 caractères max)"))]
    pub address: String,

    #[validate(length(min = 1, max = 32, message = "Ce champ est obligatoire"))]
    pub size: String,

    #[serde(deserialize_with = "text_or_number")]
    pub quantity: String,

    #[validate(length(max = 1000, message = "1000 caractères max"))]
    pub notes: String,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            address: String::new(),
            size: String::new(),
            quantity: "1".to_string(),
            notes: String::new(),
        }
    }
}

/// Quantity arrives as form text or as a JSON number
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(u64),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(n) => n.to_string(),
    })
}

/// A draft field, addressed by its wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    FullName,
    Phone,
    Address,
    Size,
    Quantity,
    Notes,
}

impl DraftField {
    pub fn wire_name(&self) -> &'static str {
        match self {
            DraftField::FullName => "fullName",
            DraftField::Phone => "phone",
            DraftField::Address => "address",
            DraftField::Size => "size",
            DraftField::Quantity => "quantity",
            DraftField::Notes => "notes",
        }
    }
}

impl OrderDraft {
    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::FullName => self.full_name = value,
            DraftField::Phone => self.phone = value,
            DraftField::Address => self.address = value,
            DraftField::Size => self.size = value,
            DraftField::Quantity => self.quantity = value,
            DraftField::Notes => self.notes = value,
        }
    }

    /// Required fields that are still blank, by wire name
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            (&self.full_name, REQUIRED_FIELDS[0]),
            (&self.phone, REQUIRED_FIELDS[1]),
            (&self.address, REQUIRED_FIELDS[2]),
            (&self.size, REQUIRED_FIELDS[3]),
        ]
        .into_iter()
        .filter(|(value, _)| value.trim().is_empty())
        .map(|(_, name)| name)
        .collect()
    }

    /// True when every required field has a non-blank value
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    fn trimmed(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            size: self.size.trim().to_string(),
            quantity: self.quantity.trim().to_string(),
            notes: self.notes.trim().to_string(),
        }
    }

    /// Turn the draft into a typed order for `category`
    ///
    /// Every failing field is reported at once. Sizes must belong to the
    /// category's size list; an empty quantity means 1.
    pub fn to_order(&self, category: Category) -> Result<Order, ValidationError> {
        let draft = self.trimmed();
        let mut errors = Vec::new();

        if let Err(report) = Validate::validate(&draft) {
            for (field, field_errors) in report.field_errors() {
                let message = field_errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| REQUIRED_MESSAGE.to_string());
                errors.push(FieldValidationError::new(wire_name(&field), message));
            }
        }

        if !draft.size.is_empty() && !category.accepts_size(&draft.size) {
            errors.push(FieldValidationError::new(
                "size",
                format!(
                    "Taille '{}' indisponible pour la {} (choix: {})",
                    draft.size,
                    category.display_label(),
                    category.sizes().join(", ")
                ),
            ));
        }

        let quantity = match parse_quantity(&draft.quantity) {
            Some(q) => q,
            None => {
                errors.push(FieldValidationError::new(
                    "quantity",
                    format!(
                        "La quantité doit être un entier positif (valeur: {})",
                        draft.quantity
                    ),
                ));
                1
            }
        };

        if !errors.is_empty() {
            errors.sort_by_key(|e| field_rank(&e.field));
            return Err(ValidationError::FieldErrors(errors));
        }

        Ok(Order {
            full_name: draft.full_name,
            phone: draft.phone,
            address: draft.address,
            category,
            size: draft.size,
            quantity,
            notes: Some(draft.notes).filter(|n| !n.is_empty()),
        })
    }
}

fn parse_quantity(text: &str) -> Option<u32> {
    if text.is_empty() {
        return Some(1);
    }
    text.parse::<u32>().ok().filter(|q| *q >= 1)
}

fn wire_name(field: &str) -> String {
    match field {
        "full_name" | "fullName" => "fullName".to_string(),
        other => other.to_string(),
    }
}

fn field_rank(field: &str) -> usize {
    ["fullName", "phone", "address", "size", "quantity", "notes"]
        .iter()
        .position(|f| *f == field)
        .unwrap_or(usize::MAX)
}

/// A validated order, frozen at submit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub category: Category,
    pub size: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An order stamped by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub placed_at: DateTime<Utc>,
}

impl PlacedOrder {
    pub fn new(order: Order, placed_at: DateTime<Utc>) -> Self {
        Self { order, placed_at }
    }
}

impl std::ops::Deref for PlacedOrder {
    type Target = Order;

    fn deref(&self) -> &Self::Target {
        &self.order
    }
}
