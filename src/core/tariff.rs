use crate::domain::model::{TariffMatch, TariffRate};
use crate::domain::ports::TariffLookup;
use crate::utils::error::{LandedCostError, Result};
use crate::utils::validation::validate_classification_prefix;

/// Fewest digits accepted when searching origin classification codes.
pub const MIN_PREFIX_DIGITS: usize = 4;

/// Drops the dots of printed schedules, `6109.10.00` becomes `61091000`.
pub fn normalize_code(code: &str) -> String {
    code.trim().chars().filter(|c| *c != '.').collect()
}

pub fn suggest_codes<T: TariffLookup + ?Sized>(lookup: &T, prefix: &str) -> Result<Vec<TariffMatch>> {
    validate_classification_prefix("tariff.prefix", prefix.trim(), MIN_PREFIX_DIGITS)?;
    lookup.suggest(&normalize_code(prefix))
}

/// Lowest ad-valorem rate among `rates`. Lines without a rate only win when
/// nothing else is available; on ties the first line wins.
pub fn best_rate(rates: &[TariffRate]) -> Option<&TariffRate> {
    rates.iter().fold(None, |best: Option<&TariffRate>, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            let current_rate = current.ad_valorem.unwrap_or(f64::INFINITY);
            let candidate_rate = candidate.ad_valorem.unwrap_or(f64::INFINITY);
            if candidate_rate < current_rate {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

/// Duty rate for `code` as a decimal fraction.
pub fn lookup_duty_rate<T: TariffLookup + ?Sized>(lookup: &T, code: &str) -> Result<f64> {
    validate_classification_prefix("tariff.classification_code", code.trim(), 6)?;
    let code = normalize_code(code);
    let rates = lookup.rates_for(&code)?;
    let best = best_rate(&rates).ok_or_else(|| LandedCostError::LookupUnavailable {
        message: format!("no destination tariff line for {}", code),
    })?;
    tracing::debug!("Best tariff line for {}: {:?}", code, best);

    best.ad_valorem.ok_or_else(|| LandedCostError::LookupUnavailable {
        message: format!("no ad-valorem rate for {}", best.code),
    })
}

/// Like [`lookup_duty_rate`], but an unavailable rate becomes zero.
pub fn resolve_duty_rate<T: TariffLookup + ?Sized>(lookup: &T, code: &str) -> Result<f64> {
    match lookup_duty_rate(lookup, code) {
        Ok(rate) => {
            tracing::info!("🧾 Duty rate for {}: {}", code, rate);
            Ok(rate)
        }
        Err(e @ LandedCostError::LookupUnavailable { .. }) => {
            tracing::warn!("⚠️ {}, using a duty rate of 0", e);
            Ok(0.0)
        }
        Err(e) => Err(e),
    }
}
