//! Treasury price notation in 32nds.
//!
//! Bond prices travel through every feed and sink as text of the form
//! `<whole>-<32nds><eighth>`, e.g. `99-16+` = 99 + 16/32 + 4/256. The eighth
//! digit counts 256ths within the 32nd; a value of 4 (half a 32nd) is always
//! written as `+`.
//!
//! Encoding truncates to the 1/256 grid, it never rounds.
use crate::error::TradingError;
use crate::result::Result;

/// Convert a fractional price string into its decimal value.
///
/// Accepts a literal `4` as well as `+` in the eighth position.
pub fn from_fractional(text: &str) -> Result<f64> {
    let invalid = || TradingError::PriceFormat(text.to_string());
    let trimmed = text.trim();
    let (whole, fraction) = trimmed.split_once('-').ok_or_else(invalid)?;
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let whole: u32 = whole.parse().map_err(|_| invalid())?;

    let fraction = fraction.as_bytes();
    if fraction.len() != 3 || !fraction[..2].iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let thirty_seconds = u32::from((fraction[0] - b'0') * 10 + (fraction[1] - b'0'));
    if thirty_seconds >= 32 {
        return Err(invalid());
    }
    let eighths = match fraction[2] {
        b'+' => 4,
        digit @ b'0'..=b'7' => u32::from(digit - b'0'),
        _ => return Err(invalid()),
    };

    Ok(f64::from(whole) + f64::from(thirty_seconds) / 32.0 + f64::from(eighths) / 256.0)
}

/// Convert a decimal price into fractional notation, truncating below 1/256.
pub fn to_fractional(price: f64) -> String {
    let whole = price.floor();
    let frac256 = ((price - whole) * 256.0).floor() as u32;
    let thirty_seconds = frac256 / 8;
    let eighths = frac256 % 8;

    if eighths == 4 {
        format!("{}-{:02}+", whole as i64, thirty_seconds)
    } else {
        format!("{}-{:02}{}", whole as i64, thirty_seconds, eighths)
    }
}
