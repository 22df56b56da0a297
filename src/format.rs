//! Display helpers for money and timestamps.

use time::macros::format_description;
use time::OffsetDateTime;

/// `1500.0` becomes `"1,500 Birr"`. Fractions keep up to two digits; NaN and infinities render as zero.
pub fn format_currency(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return format!("0 {currency}");
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let frac = cents % 100;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    let number = match frac {
        0 => whole,
        f if f % 10 == 0 => format!("{whole}.{}", f / 10),
        f => format!("{whole}.{f:02}"),
    };
    format!("{sign}{number} {currency}")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_timestamp(at: Option<OffsetDateTime>) -> String {
    let Some(at) = at else {
        return "-".to_string();
    };
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute] [offset_hour sign:mandatory]:[offset_minute]"
    ))
    .unwrap_or_else(|_| "-".to_string())
}

/// RFC 3339 timestamps that read unparseable or non-string values as absent.
pub(crate) mod lenient_rfc3339 {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;
    use tracing::debug;

    pub fn serialize<S: Serializer>(
        at: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        time::serde::rfc3339::option::serialize(at, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => match OffsetDateTime::parse(&s, &Rfc3339) {
                Ok(at) => Some(at),
                Err(e) => {
                    debug!(value = %s, error = %e, "timestamp not rfc3339; treated as absent");
                    None
                }
            },
            _ => None,
        })
    }
}
