//! GST computation module
//!
//! Pure derivations between net, tax, and gross amounts, plus the rate
//! suggestion lookup. All arithmetic runs in integer paise with half-up
//! rounding; `tax_from_gross` derives the net first and subtracts, so
//! `net + tax` always reconstructs the gross exactly.
//!
//! Whichever of the three values the user edited last is authoritative:
//! exactly one dependent field is recomputed from the other two. The
//! functions accept any rate in `[0, 100)`; rejecting non-slab rates is the
//! caller's concern.

use crate::models::{ExpenseCategory, Money, Taxonomy, DEFAULT_GST_RATE};

/// Suggest a GST rate for a category/sub-category pair.
///
/// Falls back to the standard 18% when the combination is not in the table.
/// Pure lookup: the same inputs always yield the same rate.
pub fn suggest_rate(taxonomy: &Taxonomy, category: ExpenseCategory, sub_category: &str) -> u8 {
    taxonomy
        .def(category)
        .map(|def| def.rate_for(sub_category))
        .unwrap_or(DEFAULT_GST_RATE)
}

/// Tax contained in a gross (tax-inclusive) amount at the given rate.
///
/// `tax = gross - gross / (1 + rate/100)`, rounded to whole paise.
pub fn tax_from_gross(gross: Money, rate: u8) -> Money {
    gross - net_from_gross(gross, rate)
}

/// Net (tax-exclusive) portion of a gross amount at the given rate.
pub fn net_from_gross(gross: Money, rate: u8) -> Money {
    let divisor = 100 + i128::from(rate);
    let scaled = i128::from(gross.paise()) * 100;
    Money::from_paise(div_round_half_up(scaled, divisor))
}

/// Tax on top of a net (tax-exclusive) amount at the given rate.
///
/// `tax = net * rate / 100`, rounded to whole paise.
pub fn tax_from_net(net: Money, rate: u8) -> Money {
    let scaled = i128::from(net.paise()) * i128::from(rate);
    Money::from_paise(div_round_half_up(scaled, 100))
}

/// Gross amount for a net amount at the given rate.
pub fn gross_from_net(net: Money, rate: u8) -> Money {
    net + tax_from_net(net, rate)
}

/// Net amount when the user fixed the gross and entered the tax by hand.
pub fn net_from_gross_and_tax(gross: Money, tax: Money) -> Money {
    gross - tax
}

/// Integer division rounding half away from zero (inputs here are
/// non-negative in practice; negative numerators round symmetrically).
fn div_round_half_up(numerator: i128, divisor: i128) -> i64 {
    let half = divisor / 2;
    let adjusted = if numerator >= 0 {
        numerator + half
    } else {
        numerator - half
    };
    (adjusted / divisor) as i64
}
