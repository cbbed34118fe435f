//! Renewal pricing for cores that already carry a workload

use crate::{price::apply_factor, Error, Result};
use region_core::{Balance, CoreIndex, RenewalQuote};
use rust_decimal::Decimal;

/// Price of a renewal after `missed_cycles` cycles of compounding `bump`.
///
/// Each cycle adds `price × bump` (rounded down). The result never decreases as
/// `missed_cycles` grows; exceeding the balance range is an [`Error::Overflow`].
pub fn renewal_price(base: Balance, bump: Decimal, missed_cycles: u32) -> Result<Balance> {
    if bump.is_sign_negative() {
        return Err(Error::InvalidSale(format!("negative renewal bump {}", bump)));
    }

    let mut price = base;
    for cycle in 0..missed_cycles {
        let increment = apply_factor(price, bump)?;
        if increment == 0 {
            // A zero step stays zero for every later cycle
            break;
        }
        price = price.checked_add(increment).ok_or_else(|| {
            Error::Overflow(format!(
                "renewal price exceeds the balance range after {} cycles",
                cycle + 1
            ))
        })?;
    }

    Ok(price)
}

/// Renewal price for `core` from the chain's quote, if one exists
pub fn renewal_price_from_quote(
    core: CoreIndex,
    quote: Option<&RenewalQuote>,
    bump: Decimal,
    missed_cycles: u32,
) -> Result<Balance> {
    let quote = quote.ok_or_else(|| {
        Error::QuoteNotFound(format!("no renewal recorded for core {}", core))
    })?;
    renewal_price(quote.price, bump, missed_cycles)
}
