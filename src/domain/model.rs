use crate::utils::error::Result;
use crate::utils::validation::{validate_non_negative, validate_positive, validate_quantity, Validate};
use serde::{Deserialize, Serialize};

/// One sellable unit and how many of them are shipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemSpec {
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub weight: f64,
    pub unit_price: f64,
    pub quantity: u64,
}

impl ItemSpec {
    pub fn volume(&self) -> f64 {
        self.height * self.width * self.depth
    }
}

impl Default for ItemSpec {
    fn default() -> Self {
        Self {
            height: 10.0,
            width: 10.0,
            depth: 10.0,
            weight: 0.5,
            unit_price: 50.0,
            quantity: 1,
        }
    }
}

impl Validate for ItemSpec {
    fn validate(&self) -> Result<()> {
        validate_positive("item.height", self.height)?;
        validate_positive("item.width", self.width)?;
        validate_positive("item.depth", self.depth)?;
        validate_positive("item.weight", self.weight)?;
        validate_positive("item.unit_price", self.unit_price)?;
        validate_quantity("item.quantity", self.quantity)
    }
}

/// The fixed-size outer box used for consolidated shipments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterBoxSpec {
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub max_weight: f64,
}

impl MasterBoxSpec {
    pub fn volume(&self) -> f64 {
        self.height * self.width * self.depth
    }
}

impl Default for MasterBoxSpec {
    fn default() -> Self {
        Self {
            height: 40.0,
            width: 40.0,
            depth: 40.0,
            max_weight: 50.0,
        }
    }
}

impl Validate for MasterBoxSpec {
    fn validate(&self) -> Result<()> {
        validate_positive("master_box.height", self.height)?;
        validate_positive("master_box.width", self.width)?;
        validate_positive("master_box.depth", self.depth)?;
        validate_positive("master_box.max_weight", self.max_weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxManifestEntry {
    pub name: String,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub weight: f64,
    pub declared_value: f64,
    pub item_count: u64,
}

/// Result of packing one item type into master boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingPlan {
    pub box_count: u64,
    pub total_weight: f64,
    pub capacity_per_box: u64,
    pub manifest: Vec<BoxManifestEntry>,
}

impl PackingPlan {
    pub fn packages(&self) -> Vec<PackageDescriptor> {
        self.manifest.iter().map(PackageDescriptor::from).collect()
    }
}

/// A package as the freight-quote service sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub height: f64,
    pub width: f64,
    pub depth: f64,
    pub weight: f64,
    #[serde(rename = "price")]
    pub declared_value: f64,
}

impl From<&BoxManifestEntry> for PackageDescriptor {
    fn from(entry: &BoxManifestEntry) -> Self {
        Self {
            name: entry.name.clone(),
            height: entry.height,
            width: entry.width,
            depth: entry.depth,
            weight: entry.weight,
            declared_value: entry.declared_value,
        }
    }
}

impl PackageDescriptor {
    /// A single parcel holding exactly one item.
    pub fn single_item(item: &ItemSpec) -> Self {
        Self {
            name: "Package 1".to_string(),
            height: item.height,
            width: item.width,
            depth: item.depth,
            weight: item.weight,
            declared_value: item.unit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightQuote {
    pub carrier: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalCosts {
    pub storage_fee_per_item: f64,
    pub local_delivery_fee_per_item: f64,
    /// Decimal fraction, 0.05 for 5%.
    pub duty_rate: f64,
}

impl Default for AdditionalCosts {
    fn default() -> Self {
        Self {
            storage_fee_per_item: 0.50,
            local_delivery_fee_per_item: 5.00,
            duty_rate: 0.0,
        }
    }
}

impl Validate for AdditionalCosts {
    fn validate(&self) -> Result<()> {
        validate_non_negative("costs.storage_fee_per_item", self.storage_fee_per_item)?;
        validate_non_negative(
            "costs.local_delivery_fee_per_item",
            self.local_delivery_fee_per_item,
        )?;
        validate_non_negative("costs.duty_rate", self.duty_rate)
    }
}

/// Per-item landed cost of a consolidated shipment and every intermediate
/// value that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub freight_total: f64,
    pub item_count: f64,
    pub freight_per_item: f64,
    pub duty_per_item: f64,
    pub duty_total: f64,
    pub storage_total: f64,
    pub storage_per_item: f64,
    pub local_delivery_total: f64,
    pub local_delivery_per_item: f64,
    pub total_per_item: f64,
}

/// Per-item cost of shipping every unit as its own parcel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct D2cBaseline {
    pub carrier: String,
    pub cost_per_item: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffMatch {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRate {
    pub code: String,
    pub description: String,
    /// `None` when the table has no ad-valorem equivalent for the line.
    pub ad_valorem: Option<f64>,
}
