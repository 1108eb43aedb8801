use crate::domain::model::{AdditionalCosts, BoxManifestEntry, CostBreakdown, FreightQuote};
use crate::utils::error::AllocationError;

/// Declared shipment value below which import duty is waived.
pub const DE_MINIMIS_THRESHOLD: f64 = 800.0;

/// Items actually quoted, recovered from each box's declared value.
///
/// Sums that land within rounding noise of a whole number are snapped to it,
/// so a manifest built by `pack` gives back exactly the packed quantity.
pub fn reconstruct_item_count(manifest: &[BoxManifestEntry], unit_price: f64) -> f64 {
    let count: f64 = manifest
        .iter()
        .map(|entry| entry.declared_value / unit_price)
        .sum();
    let nearest = count.round();
    if (count - nearest).abs() <= 1e-9 * count.abs().max(1.0) {
        nearest
    } else {
        count
    }
}

/// Duty owed on one item. Exemption is judged on the nominal order value,
/// not on what the manifest reconstructs to.
pub fn duty_per_item(unit_price: f64, quantity: u64, duty_rate: f64) -> f64 {
    if unit_price * (quantity as f64) < DE_MINIMIS_THRESHOLD {
        0.0
    } else {
        duty_rate * unit_price
    }
}

/// Spreads one consolidated freight quote, duty, storage and local delivery
/// over the items in `manifest`.
pub fn allocate(
    manifest: &[BoxManifestEntry],
    freight_quote: Option<&FreightQuote>,
    unit_price: f64,
    quantity: u64,
    costs: &AdditionalCosts,
) -> Result<CostBreakdown, AllocationError> {
    let quote = freight_quote.ok_or(AllocationError::NoFreightQuote)?;
    if unit_price == 0.0 {
        return Err(AllocationError::ZeroUnitPrice);
    }

    let item_count = reconstruct_item_count(manifest, unit_price);
    if !item_count.is_finite() || item_count <= 0.0 {
        return Err(AllocationError::EmptyManifest {
            reconstructed: item_count,
        });
    }
    if item_count != quantity as f64 {
        tracing::warn!(
            "⚠️ Manifest holds {} items but {} were requested",
            item_count,
            quantity
        );
    }

    let freight_per_item = quote.price / item_count;
    let duty_per_item = duty_per_item(unit_price, quantity, costs.duty_rate);
    let duty_total = duty_per_item * item_count;
    let storage_total = costs.storage_fee_per_item * item_count;
    let storage_per_item = storage_total / item_count;
    let local_delivery_total = costs.local_delivery_fee_per_item * item_count;
    let local_delivery_per_item = local_delivery_total / item_count;

    let total_per_item = (quote.price + duty_total + storage_total + local_delivery_total) / item_count;

    tracing::debug!(
        freight_per_item,
        duty_per_item,
        storage_per_item,
        local_delivery_per_item,
        "Allocated landed cost"
    );

    Ok(CostBreakdown {
        freight_total: quote.price,
        item_count,
        freight_per_item,
        duty_per_item,
        duty_total,
        storage_total,
        storage_per_item,
        local_delivery_total,
        local_delivery_per_item,
        total_per_item,
    })
}
