//! Whitelist and tobin-tax reconciliation.
//!
//! The tobin-tax table doubles as the set of vote targets. It must mirror the
//! `whitelist` parameter exactly; any divergence is fixed by clearing the
//! table and rewriting it in full.

use iq_keepers::BankKeeper;
use iq_store::TobinTaxStore;
use iq_types::{DenomList, DenomMetadata, DenomUnit};

use crate::OracleError;

/// Whether the stored table differs from the whitelist in size, membership
/// or any tax rate.
pub fn whitelist_diverged(
    store: &impl TobinTaxStore,
    whitelist: &DenomList,
) -> Result<bool, OracleError> {
    let stored = store.iter_tobin_taxes()?;
    if stored.len() != whitelist.len() {
        return Ok(true);
    }
    for denom in whitelist {
        match store.get_tobin_tax(&denom.name)? {
            Some(tax) if tax == denom.tobin_tax => {}
            _ => return Ok(true),
        }
    }
    Ok(false)
}

/// Bring the tobin-tax table in line with `whitelist`, registering bank
/// metadata for denominations the bank has never seen.
///
/// Returns whether anything was rewritten. With an unchanged whitelist this
/// performs no writes.
pub fn apply_whitelist(
    store: &impl TobinTaxStore,
    bank: &impl BankKeeper,
    whitelist: &DenomList,
) -> Result<bool, OracleError> {
    if !whitelist_diverged(store, whitelist)? {
        return Ok(false);
    }

    store.clear_tobin_taxes()?;
    for denom in whitelist {
        store.put_tobin_tax(&denom.name, denom.tobin_tax)?;

        if bank.denom_metadata(&denom.name).is_some() {
            continue;
        }
        match denom_metadata_for(&denom.name) {
            Some(metadata) => bank.set_denom_metadata(metadata),
            None => tracing::warn!(denom = %denom.name, "cannot derive display metadata"),
        }
    }

    tracing::info!(denoms = whitelist.len(), "tobin tax table rewritten from whitelist");
    Ok(true)
}

/// Display metadata for a micro-unit denomination such as `ukrw`.
///
/// The display name drops the one-character unit prefix (`krw`); units are
/// `ukrw` (10^0), `mkrw` (10^3) and `krw` (10^6). `None` for names too short
/// to carry a display name.
pub fn denom_metadata_for(base: &str) -> Option<DenomMetadata> {
    let display = base.get(1..).filter(|d| !d.is_empty())?;
    let upper = display.to_ascii_uppercase();
    let symbol_stem = upper.get(..upper.len() - 1)?;

    Some(DenomMetadata {
        description: "The native stable token of the IQ Swartz.".to_string(),
        denom_units: vec![
            DenomUnit {
                denom: format!("u{display}"),
                exponent: 0,
                aliases: vec![format!("micro{display}")],
            },
            DenomUnit {
                denom: format!("m{display}"),
                exponent: 3,
                aliases: vec![format!("milli{display}")],
            },
            DenomUnit {
                denom: display.to_string(),
                exponent: 6,
                aliases: vec![],
            },
        ],
        base: base.to_string(),
        display: display.to_string(),
        name: format!("{upper} IQ"),
        symbol: format!("{symbol_stem}IQ"),
    })
}
