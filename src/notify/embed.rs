use crate::feed::types::IpoEntry;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;

pub const MAX_EMBEDS: usize = 3;

pub const USERNAME: &str = "IPO Notifier";
pub const AVATAR_URL: &str = "https://img.icons8.com/fluency/48/000000/bullish.png";
pub const THUMBNAIL_URL: &str = "https://www.svgrepo.com/show/483222/stock-market.svg";
pub const FOOTER_TEXT: &str = "Reported by IPO Notifier Bot | @dev-sandip";
pub const CURRENCY: &str = "NPR";

pub const COLOR_OPEN: u32 = 0x00FF00;
pub const COLOR_CLOSED: u32 = 0xFF0000;

/// Embed timestamps are always rendered at UTC+05:30.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub username: String,
    pub avatar_url: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub thumbnail: EmbedImage,
    pub footer: EmbedFooter,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Render the first [`MAX_EMBEDS`] entries into a webhook payload stamped with `now`.
pub fn render(entries: &[IpoEntry], now: DateTime<Utc>) -> WebhookPayload {
    let ist = FixedOffset::east_opt(IST_OFFSET_SECS).expect("UTC+05:30 is a valid offset");
    let timestamp = now
        .with_timezone(&ist)
        .to_rfc3339_opts(SecondsFormat::Micros, false);
    WebhookPayload {
        username: USERNAME.to_string(),
        avatar_url: AVATAR_URL.to_string(),
        embeds: entries
            .iter()
            .take(MAX_EMBEDS)
            .map(|e| render_entry(e, &timestamp))
            .collect(),
    }
}

fn render_entry(ipo: &IpoEntry, timestamp: &str) -> Embed {
    let description = format!(
        "**Sector**: {}\n**Share Type**: {}\n**Rating**: {}",
        ipo.sector_name,
        capitalize(&ipo.share_type),
        ipo.rating.as_deref().unwrap_or("N/A"),
    );

    let fields = vec![
        field("📊 Status", ipo.status.clone()),
        field("💵 Price per Unit", format!("{} {}", CURRENCY, ipo.price_per_unit)),
        field("📈 Total Units", format_number(&ipo.units)),
        field(
            "🔢 Min/Max Units",
            format!("{} / {}", format_number(&ipo.min_units), format_number(&ipo.max_units)),
        ),
        field(
            "📅 Opening Date",
            format!("{} ({})", ipo.opening_date_ad, ipo.opening_date_bs),
        ),
        field(
            "🕒 Closing Date",
            format!(
                "{} ({}) at {}",
                ipo.closing_date_ad, ipo.closing_date_bs, ipo.closing_date_closing_time
            ),
        ),
        field("🏢 Share Registrar", ipo.share_registrar.clone()),
        field("💰 Total Amount", format!("{} {}", CURRENCY, format_number(&ipo.total_amount))),
    ];

    Embed {
        title: format!("{} ({})", ipo.company_name, ipo.stock_symbol),
        description,
        color: status_color(&ipo.status),
        fields,
        thumbnail: EmbedImage {
            url: THUMBNAIL_URL.to_string(),
        },
        footer: EmbedFooter {
            text: FOOTER_TEXT.to_string(),
        },
        timestamp: timestamp.to_string(),
    }
}

fn field(name: &str, value: String) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value,
        inline: true,
    }
}

pub fn status_color(status: &str) -> u32 {
    if status.eq_ignore_ascii_case("open") {
        COLOR_OPEN
    } else {
        COLOR_CLOSED
    }
}

/// Group digits with commas: "1234567" -> "1,234,567". Non-integers pass through.
pub fn format_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(n) = trimmed.parse::<i128>() else {
        return raw.to_string();
    };

    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
