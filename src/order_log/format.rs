//! Text format of the order log
//!
//! The log is a flat text file. Each record is a run of `Label: value` lines
//! followed by a blank line and `---`; records are joined by a blank line.
//!
//! ```text
//! Date: 2026-10-19T09:12:44.120Z
//! Nom: Ali Ben Salah
//! Téléphone: +21611111111
//! Adresse: Rue 1, Djerba
//! Catégorie: Blouza Homme
//! Taille: M
//! Quantité: 2
//! Notes: Aucune
//!
//! ---
//! ```
//!
//! Reading is schema-on-read: lines with an unknown label are dropped and a
//! missing label leaves its field unset. Parsing never fails.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::core::category::{Category, ColorBand};
use crate::core::order::PlacedOrder;

/// Written in place of empty notes
pub const NO_NOTES: &str = "Aucune";

/// Separator between the previous content and a new record
pub const RECORD_JOINER: &str = "\n\n";

pub const LABEL_DATE: &str = "Date:";
pub const LABEL_NAME: &str = "Nom:";
pub const LABEL_PHONE: &str = "Téléphone:";
pub const LABEL_ADDRESS: &str = "Adresse:";
pub const LABEL_CATEGORY: &str = "Catégorie:";
pub const LABEL_SIZE: &str = "Taille:";
pub const LABEL_QUANTITY: &str = "Quantité:";
pub const LABEL_NOTES: &str = "Notes:";

fn record_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| {
        Regex::new(r"\n[ \t]*\n---[ \t]*\n[ \t]*\n").expect("record boundary pattern is valid")
    })
}

/// Values are written on a single line; embedded line breaks become spaces
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format one record, terminated by its `---` line
pub fn format_block(order: &PlacedOrder) -> String {
    let notes = order
        .notes
        .as_deref()
        .map(single_line)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| NO_NOTES.to_string());

    format!(
        "{LABEL_DATE} {date}\n\
         {LABEL_NAME} {name}\n\
         {LABEL_PHONE} {phone}\n\
         {LABEL_ADDRESS} {address}\n\
         {LABEL_CATEGORY} {category}\n\
         {LABEL_SIZE} {size}\n\
         {LABEL_QUANTITY} {quantity}\n\
         {LABEL_NOTES} {notes}\n\
         \n\
         ---",
        date = order.placed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        name = single_line(&order.full_name),
        phone = single_line(&order.phone),
        address = single_line(&order.address),
        category = order.category.display_label(),
        size = single_line(&order.size),
        quantity = order.quantity,
    )
}

/// The full log text after appending `order` to `existing`
pub fn append_block(existing: &str, order: &PlacedOrder) -> String {
    let block = format_block(order);
    let mut content = String::with_capacity(existing.len() + RECORD_JOINER.len() + block.len());
    content.push_str(existing);
    content.push_str(RECORD_JOINER);
    content.push_str(&block);
    content
}

/// One record as read back from the log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedOrder {
    /// Position in the log (`order-1` is the oldest), not a stored id
    pub id: String,
    pub timestamp: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub quantity: Option<String>,
    pub notes: Option<String>,
}

impl LoggedOrder {
    /// Typed category, when the label is one of the three known ones
    pub fn category_kind(&self) -> Option<Category> {
        self.category.as_deref().and_then(Category::from_label)
    }

    pub fn color_band(&self) -> ColorBand {
        self.category
            .as_deref()
            .map(ColorBand::for_label)
            .unwrap_or(ColorBand::Neutral)
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn quantity_value(&self) -> Option<u32> {
        self.quantity.as_deref().and_then(|q| q.parse().ok())
    }

    /// Notes as the customer wrote them; the placeholder reads as none
    pub fn customer_notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| *n != NO_NOTES && !n.is_empty())
    }

    fn assign(&mut self, line: &str) {
        let line = line.trim();
        let fields: [(&str, &mut Option<String>); 8] = [
            (LABEL_DATE, &mut self.timestamp),
            (LABEL_NAME, &mut self.full_name),
            (LABEL_PHONE, &mut self.phone),
            (LABEL_ADDRESS, &mut self.address),
            (LABEL_CATEGORY, &mut self.category),
            (LABEL_SIZE, &mut self.size),
            (LABEL_QUANTITY, &mut self.quantity),
            (LABEL_NOTES, &mut self.notes),
        ];
        for (label, slot) in fields {
            if let Some(rest) = line.strip_prefix(label) {
                *slot = Some(rest.trim().to_string());
                return;
            }
        }
    }
}

/// Split the log into records, newest first
///
/// Records are numbered `order-1..order-N` in append order before the
/// sequence is reversed.
pub fn parse_log(text: &str) -> Vec<LoggedOrder> {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut orders: Vec<LoggedOrder> = record_boundary()
        .split(trimmed)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty() && *chunk != "---")
        .enumerate()
        .map(|(index, chunk)| {
            let mut order = LoggedOrder {
                id: format!("order-{}", index + 1),
                ..Default::default()
            };
            for line in chunk.lines() {
                order.assign(line);
            }
            order
        })
        .collect();

    orders.reverse();
    tracing::debug!(count = orders.len(), "parsed order log");
    orders
}

/// Number of records in the log text
pub fn count_records(text: &str) -> usize {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return 0;
    }
    record_boundary()
        .split(trimmed)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty() && *chunk != "---")
        .count()
}
