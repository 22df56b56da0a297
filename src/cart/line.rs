use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::MenuItem;
use crate::id::EntityId;

/// One dish in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: EntityId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    pub qty: u32,
}

impl CartLine {
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            qty: 1,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.qty)
    }
}

/// Rebuilds cart lines from a persisted payload.
///
/// Numeric fields stored as strings are coerced; anything that cannot be read
/// as a number counts as zero. Lines with a non-positive quantity, a negative
/// price or no name are dropped. A payload that is not a JSON array yields an
/// empty cart.
pub fn rehydrate(raw: &str) -> Vec<CartLine> {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "stored cart is not valid JSON; starting empty");
            return Vec::new();
        }
    };
    let Value::Array(entries) = parsed else {
        warn!("stored cart is not an array; starting empty");
        return Vec::new();
    };

    let total = entries.len();
    let mut lines: Vec<CartLine> = Vec::with_capacity(total);
    for entry in entries {
        let Some(line) = line_from_value(&entry) else {
            continue;
        };
        // keep the invariant of one line per id even if storage was edited by hand
        if let Some(existing) = lines.iter_mut().find(|l| l.id == line.id) {
            existing.qty = existing.qty.saturating_add(line.qty);
        } else {
            lines.push(line);
        }
    }
    if lines.len() < total {
        warn!(dropped = total - lines.len(), "invalid stored cart lines dropped");
    }
    lines
}

fn line_from_value(entry: &Value) -> Option<CartLine> {
    let obj = entry.as_object()?;
    let id: EntityId = serde_json::from_value(obj.get("id")?.clone()).ok()?;
    let name = obj.get("name").and_then(Value::as_str).unwrap_or_default();
    if name.trim().is_empty() {
        return None;
    }
    let qty = coerce_number(obj.get("qty")).floor();
    let price = coerce_number(obj.get("price"));
    if qty < 1.0 || price < 0.0 {
        return None;
    }
    Some(CartLine {
        id,
        name: name.to_string(),
        price,
        image: obj
            .get("image")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        qty: qty.min(f64::from(u32::MAX)) as u32,
    })
}

fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}
