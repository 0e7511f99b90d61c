//! Notification message rendering

use anyhow::{Context as _, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::core::order::PlacedOrder;

const TEMPLATE_NAME: &str = "order_message";

const ORDER_TEMPLATE: &str = "\
🆕 <b>NOUVELLE COMMANDE BLOUZA DJERBA</b>

📅 <b>Date:</b> {{ date }}
👤 <b>Nom:</b> {{ full_name | telegram_escape }}
📞 <b>Téléphone:</b> {{ phone | telegram_escape }}
📍 <b>Adresse:</b> {{ address | telegram_escape }}
👕 <b>Catégorie:</b> {{ category }}
📏 <b>Taille:</b> {{ size | telegram_escape }}
🔢 <b>Quantité:</b> {{ quantity }}
{% if notes %}📝 <b>Notes:</b> {{ notes | telegram_escape }}{% endif %}

💰 <b>Paiement:</b> À la livraison
";

/// Djerba local time (Africa/Tunis has no daylight saving)
pub const DEFAULT_UTC_OFFSET_SECONDS: i32 = 3600;

/// Escapes the three characters Telegram's HTML mode reserves
fn telegram_escape(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    Ok(Value::String(escaped))
}

/// Renders the HTML message sent for each order
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    tera: Tera,
    offset: FixedOffset,
}

impl MessageFormatter {
    pub fn new() -> Result<Self> {
        let offset = FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECONDS)
            .context("Invalid default UTC offset")?;
        Self::with_offset(offset)
    }

    /// Dates are shown in the given local offset
    pub fn with_offset(offset: FixedOffset) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("telegram_escape", telegram_escape);
        tera.add_raw_template(TEMPLATE_NAME, ORDER_TEMPLATE)
            .context("Failed to compile order message template")?;

        Ok(Self { tera, offset })
    }

    /// Local date as `dd/mm/yyyy HH:MM:SS`
    pub fn local_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string()
    }

    pub fn render(&self, order: &PlacedOrder) -> Result<String> {
        let mut context = Context::new();
        context.insert("date", &self.local_date(order.placed_at));
        context.insert("full_name", &order.full_name);
        context.insert("phone", &order.phone);
        context.insert("address", &order.address);
        context.insert("category", &order.category.display_label());
        context.insert("size", &order.size);
        context.insert("quantity", &order.quantity);
        context.insert("notes", &order.notes);

        let message = self
            .tera
            .render(TEMPLATE_NAME, &context)
            .context("Failed to render order message")?;

        Ok(message.trim().to_string())
    }
}
