//! File size specification parsing.

/// Error for a size specification that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid size specification {spec:?}: {reason}")]
pub struct SizeSpecError {
    pub spec: String,
    pub reason: String,
}

impl SizeSpecError {
    fn new(spec: &str, reason: impl Into<String>) -> Self {
        Self {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

/// Bytes per unit suffix (powers of 1024).
fn unit_size(unit: char) -> Option<u64> {
    let exponent = match unit {
        'B' => 0,
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        'E' => 6,
        _ => return None,
    };
    Some(1024u64.pow(exponent))
}

/// Parse a size specification like "4M", "1.5K" or "4M-1B" into bytes.
/// Supports:
/// - A base size with a unit: "128K"
/// - One decimal digit on the base size: "1.1T"
/// - An optional shift with its own unit: "4M+1B", "1G-4K"
///
/// Units are B, K, M, G, T, P and E (powers of 1024). A shift that would make
/// the size negative yields 0.
pub fn parse_size_spec(spec: &str) -> Result<u64, SizeSpecError> {
    let s = spec.trim();
    if s.is_empty() {
        return Err(SizeSpecError::new(spec, "empty size"));
    }

    let (base, shift) = match s.find(|c: char| c == '+' || c == '-') {
        Some(index) => (&s[..index], Some((&s[index..index + 1], &s[index + 1..]))),
        None => (s, None),
    };

    let base_size = parse_base(spec, base)?;

    let Some((operator, shift)) = shift else {
        return Ok(base_size);
    };

    let (digits, unit) = split_unit(spec, shift)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(SizeSpecError::new(spec, format!("invalid shift {shift:?}")));
    }
    let shift_size = digits
        .parse::<u64>()
        .ok()
        .and_then(|count| count.checked_mul(unit))
        .ok_or_else(|| SizeSpecError::new(spec, "shift is too large"))?;

    if operator == "+" {
        base_size
            .checked_add(shift_size)
            .ok_or_else(|| SizeSpecError::new(spec, "size is too large"))
    } else {
        Ok(base_size.saturating_sub(shift_size))
    }
}

/// Split `"<number><unit>"` into the number text and the unit size.
fn split_unit<'a>(spec: &str, part: &'a str) -> Result<(&'a str, u64), SizeSpecError> {
    let Some(unit_char) = part.chars().last() else {
        return Err(SizeSpecError::new(spec, "missing size"));
    };
    let unit = unit_size(unit_char).ok_or_else(|| {
        if unit_char.is_ascii_digit() {
            SizeSpecError::new(spec, format!("missing unit after {part:?}"))
        } else {
            SizeSpecError::new(spec, format!("unknown unit '{unit_char}'"))
        }
    })?;
    Ok((&part[..part.len() - unit_char.len_utf8()], unit))
}

fn parse_base(spec: &str, base: &str) -> Result<u64, SizeSpecError> {
    let (number, unit) = split_unit(spec, base)?;
    let invalid = || SizeSpecError::new(spec, format!("invalid size {number:?}"));

    let (whole, tenths) = match number.split_once('.') {
        Some((whole, fraction)) if fraction.len() == 1 => (whole, fraction),
        Some(_) => return Err(invalid()),
        None => (number, "0"),
    };
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let tenths: u64 = tenths.parse().map_err(|_| invalid())?;
    let whole: u64 = whole.parse().map_err(|_| invalid())?;

    let too_large = || SizeSpecError::new(spec, "size is too large");
    let whole_bytes = whole.checked_mul(unit).ok_or_else(too_large)?;
    let tenth_bytes = tenths * unit / 10;
    whole_bytes.checked_add(tenth_bytes).ok_or_else(too_large)
}
