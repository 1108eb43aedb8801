use crate::core::pipeline::ComparisonContext;
use crate::domain::model::{CostBreakdown, D2cBaseline, FreightQuote, PackingPlan};
use crate::utils::error::{LandedCostError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    D2c,
    FormalExport,
    Tie,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::D2c => write!(f, "D2C"),
            Strategy::FormalExport => write!(f, "Formal export"),
            Strategy::Tie => write!(f, "Tie"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub quantity: u64,
    pub d2c: D2cBaseline,
    pub formal_quote: FreightQuote,
    pub packing: PackingPlan,
    pub breakdown: CostBreakdown,
    pub d2c_total: f64,
    pub formal_total: f64,
    pub cheaper: Strategy,
}

impl ComparisonReport {
    pub fn from_context(ctx: &ComparisonContext) -> Result<Self> {
        let stage = |name: &str| LandedCostError::StageOutOfOrder {
            required: name.to_string(),
        };
        let d2c = ctx.baseline.clone().ok_or_else(|| stage("d2c baseline"))?;
        let packing = ctx.packing.clone().ok_or_else(|| stage("packing"))?;
        let formal_quote = ctx.formal_quote.clone().ok_or_else(|| stage("formal quote"))?;
        let breakdown = ctx.breakdown.clone().ok_or_else(|| stage("allocation"))?;

        let quantity = ctx.input.item.quantity;
        let d2c_total = quantity as f64 * d2c.cost_per_item;
        let formal_total = quantity as f64 * breakdown.total_per_item;
        let cheaper = cheaper_strategy(d2c.cost_per_item, breakdown.total_per_item);

        Ok(Self {
            generated_at: Utc::now(),
            quantity,
            d2c,
            formal_quote,
            packing,
            breakdown,
            d2c_total,
            formal_total,
            cheaper,
        })
    }

    /// Absolute difference per item between the two strategies.
    pub fn savings_per_item(&self) -> f64 {
        (self.d2c.cost_per_item - self.breakdown.total_per_item).abs()
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Table => Ok(self.to_table()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Csv => breakdown_csv(&self.breakdown),
        }
    }

    fn to_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "D2C - cost per item:    ${:.2} ({})\n",
            self.d2c.cost_per_item, self.d2c.carrier
        ));
        out.push_str(&format!(
            "Formal - cost per item: ${:.2} ({})\n",
            self.breakdown.total_per_item, self.formal_quote.carrier
        ));
        out.push_str(&format!(
            "Total for {} items:     D2C ${:.2} / Formal ${:.2}\n",
            self.quantity, self.d2c_total, self.formal_total
        ));
        match self.cheaper {
            Strategy::Tie => out.push_str("Both strategies cost the same\n"),
            cheaper => out.push_str(&format!(
                "Cheaper: {} by ${:.2} per item\n",
                cheaper,
                self.savings_per_item()
            )),
        }
        out.push('\n');
        out.push_str(&packing_table(&self.packing));
        out.push('\n');
        out.push_str(&breakdown_table(&self.breakdown));
        out
    }
}

/// Lower per-item cost wins.
pub fn cheaper_strategy(d2c_per_item: f64, formal_per_item: f64) -> Strategy {
    if d2c_per_item < formal_per_item {
        Strategy::D2c
    } else if formal_per_item < d2c_per_item {
        Strategy::FormalExport
    } else {
        Strategy::Tie
    }
}

fn format_count(count: f64) -> String {
    if count.fract() == 0.0 {
        format!("{:.0}", count)
    } else {
        format!("{:.4}", count)
    }
}

/// The ten labeled lines of the formal cost breakdown, in display order.
pub fn breakdown_rows(breakdown: &CostBreakdown) -> Vec<(&'static str, String)> {
    let money = |v: f64| format!("${:.2}", v);
    vec![
        ("Formal freight total", money(breakdown.freight_total)),
        ("Item count", format_count(breakdown.item_count)),
        ("Freight per item", money(breakdown.freight_per_item)),
        ("Duty per item", money(breakdown.duty_per_item)),
        ("Duty total", money(breakdown.duty_total)),
        ("Storage total", money(breakdown.storage_total)),
        ("Storage per item", money(breakdown.storage_per_item)),
        ("Local delivery total", money(breakdown.local_delivery_total)),
        ("Local delivery per item", money(breakdown.local_delivery_per_item)),
        ("Total formal per item", money(breakdown.total_per_item)),
    ]
}

pub fn breakdown_table(breakdown: &CostBreakdown) -> String {
    let rows = breakdown_rows(breakdown);
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::from("Formal cost breakdown\n");
    for (label, value) in rows {
        out.push_str(&format!("  {:<width$}  {:>12}\n", label, value, width = width));
    }
    out
}

pub fn breakdown_csv(breakdown: &CostBreakdown) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["item", "value"])?;
    for (label, value) in breakdown_rows(breakdown) {
        writer.write_record([label, value.as_str()])?;
    }
    into_string(writer)
}

pub fn packing_table(plan: &PackingPlan) -> String {
    let mut out = String::from("Master box configuration\n");
    out.push_str(&format!("  Boxes needed:          {}\n", plan.box_count));
    out.push_str(&format!("  Total item weight:     {:.2} kg\n", plan.total_weight));
    out.push_str(&format!("  Capacity per box:      {} items\n", plan.capacity_per_box));
    out.push_str(&format!(
        "  {:<8} {:>8} {:>8} {:>8} {:>10} {:>12} {:>7}\n",
        "name", "height", "width", "depth", "weight", "value", "items"
    ));
    for entry in &plan.manifest {
        out.push_str(&format!(
            "  {:<8} {:>8.1} {:>8.1} {:>8.1} {:>10.2} {:>12.2} {:>7}\n",
            entry.name,
            entry.height,
            entry.width,
            entry.depth,
            entry.weight,
            entry.declared_value,
            entry.item_count
        ));
    }
    out
}

pub fn packing_csv(plan: &PackingPlan) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in &plan.manifest {
        writer.serialize(entry)?;
    }
    into_string(writer)
}

pub fn render_packing(plan: &PackingPlan, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Table => Ok(packing_table(plan)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(plan)?),
        ReportFormat::Csv => packing_csv(plan),
    }
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| LandedCostError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| {
        LandedCostError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}
