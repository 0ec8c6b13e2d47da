//! Money math in integer minor units (centavos) and payment methods.
//!
//! All amounts everywhere in the workspace are integer cents; floats never
//! touch money. Formatting and parsing use pt-BR notation (`.` thousands
//! groups, `,` decimal separator).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PaymentMethod
// ---------------------------------------------------------------------------

/// Payment methods, in wire spelling. `CARD` is a legacy alias seen on old
/// orders and is accepted on input as `CREDIT_CARD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Pix,
    Cash,
    #[serde(alias = "CARD")]
    CreditCard,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::Cash => "CASH",
            Self::CreditCard => "CREDIT_CARD",
        }
    }

    /// Only CASH orders carry a "change for" amount.
    pub fn takes_change_for(&self) -> bool {
        matches!(self, Self::Cash)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format integer cents as pt-BR currency: `2200` → `"R$ 22,00"`,
/// `123456` → `"R$ 1.234,56"`.
pub fn format_brl(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = abs / 100;
    let centavos = abs % 100;

    let digits = reais.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{sign}R$ {grouped},{centavos:02}")
}

/// Change due on a CASH order: `max(change_for − total, 0)`.
pub fn change_due(total_cents: i64, change_for_cents: i64) -> i64 {
    (change_for_cents - total_cents).max(0)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Error from [`parse_brl_cents`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    Empty,
    Malformed(String),
}

impl std::fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty amount"),
            Self::Malformed(raw) => write!(f, "unrecognized amount: {raw:?}"),
        }
    }
}

impl std::error::Error for MoneyParseError {}

/// Parse a pt-BR money string into integer cents.
///
/// Accepted forms: `"50"`, `"50,5"`, `"50,00"`, `"1.234,56"`, with an
/// optional leading `R$`. Thousands groups must be proper (`1.23,45` is
/// refused); at most two decimal digits.
pub fn parse_brl_cents(input: &str) -> Result<i64, MoneyParseError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("R$").map(str::trim).unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(MoneyParseError::Empty);
    }

    let malformed = || MoneyParseError::Malformed(input.trim().to_string());

    let (int_part, dec_part) = match trimmed.split_once(',') {
        Some((i, d)) => (i, Some(d)),
        None => (trimmed, None),
    };

    // Integer part: plain digits, or 1-3 digits followed by dot-separated
    // groups of exactly 3.
    let reais: i64 = if int_part.contains('.') {
        let mut groups = int_part.split('.');
        let first = groups.next().ok_or_else(malformed)?;
        if first.is_empty() || first.len() > 3 || !first.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let mut digits = String::from(first);
        for group in groups {
            if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
                return Err(malformed());
            }
            digits.push_str(group);
        }
        digits.parse().map_err(|_| malformed())?
    } else {
        if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        int_part.parse().map_err(|_| malformed())?
    };

    let centavos: i64 = match dec_part {
        None => 0,
        Some(d) if d.len() == 1 && d.chars().all(|c| c.is_ascii_digit()) => {
            // One decimal digit is the tens place: "50,5" is 50 centavos.
            d.parse::<i64>().map_err(|_| malformed())? * 10
        }
        Some(d) if d.len() == 2 && d.chars().all(|c| c.is_ascii_digit()) => {
            d.parse().map_err(|_| malformed())?
        }
        Some(_) => return Err(malformed()),
    };

    Ok(reais * 100 + centavos)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
