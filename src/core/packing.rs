use crate::domain::model::{BoxManifestEntry, ItemSpec, MasterBoxSpec, PackingPlan};
use crate::utils::error::{LandedCostError, Result};
use serde::{Deserialize, Serialize};

/// What to do when a single item does not fit the master box by volume or
/// weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    /// Treat the box as holding one item anyway.
    #[default]
    Clamp,
    /// Refuse to pack.
    Reject,
}

/// Items that fit one master box, bound by volume and by payload weight.
/// May be zero.
pub fn raw_capacity(item: &ItemSpec, master_box: &MasterBoxSpec) -> u64 {
    let by_volume = (master_box.volume() / item.volume()).floor() as u64;
    let by_weight = (master_box.max_weight / item.weight).floor() as u64;
    tracing::debug!(by_volume, by_weight, "Master box capacity");
    by_volume.min(by_weight)
}

/// Packs `item.quantity` units into as few master boxes as possible.
///
/// Capacity is never below one: an item that does not fit is still shipped
/// one per box. Every box keeps the master box dimensions, only the last one
/// may be partially filled.
pub fn pack(item: &ItemSpec, master_box: &MasterBoxSpec) -> PackingPlan {
    let raw = raw_capacity(item, master_box);
    if raw == 0 {
        tracing::warn!(
            "⚠️ Item does not fit the master box, assuming one item per box"
        );
    }
    build_plan(item, master_box, raw.max(1))
}

/// Same as [`pack`], but honours `policy` for items that do not fit.
pub fn pack_with_policy(
    item: &ItemSpec,
    master_box: &MasterBoxSpec,
    policy: OversizePolicy,
) -> Result<PackingPlan> {
    match policy {
        OversizePolicy::Clamp => Ok(pack(item, master_box)),
        OversizePolicy::Reject => {
            let raw = raw_capacity(item, master_box);
            if raw == 0 {
                return Err(LandedCostError::InvalidConfiguration {
                    message: format!(
                        "an item of {:.2} volume and {:.2} weight does not fit a master box of {:.2} volume holding {:.2}",
                        item.volume(),
                        item.weight,
                        master_box.volume(),
                        master_box.max_weight
                    ),
                });
            }
            Ok(build_plan(item, master_box, raw))
        }
    }
}

fn build_plan(item: &ItemSpec, master_box: &MasterBoxSpec, capacity: u64) -> PackingPlan {
    let box_count = item.quantity.div_ceil(capacity);
    let total_weight = item.quantity as f64 * item.weight;

    let mut manifest = Vec::with_capacity(box_count as usize);
    let mut remaining = item.quantity;
    for index in 1..=box_count {
        let items_in_box = capacity.min(remaining);
        manifest.push(BoxManifestEntry {
            name: format!("Box {}", index),
            height: master_box.height,
            width: master_box.width,
            depth: master_box.depth,
            weight: items_in_box as f64 * item.weight,
            declared_value: items_in_box as f64 * item.unit_price,
            item_count: items_in_box,
        });
        remaining -= items_in_box;
    }
    debug_assert_eq!(remaining, 0);

    tracing::info!(
        "📦 Packed {} items into {} boxes ({} per box, {:.2} total weight)",
        item.quantity,
        box_count,
        capacity,
        total_weight
    );

    PackingPlan {
        box_count,
        total_weight,
        capacity_per_box: capacity,
        manifest,
    }
}
