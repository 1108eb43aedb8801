use crate::core::allocation::allocate;
use crate::core::baseline::d2c_baseline;
use crate::core::packing::{pack_with_policy, OversizePolicy};
use crate::core::report::ComparisonReport;
use crate::core::tariff::resolve_duty_rate;
use crate::domain::model::{
    AdditionalCosts, CostBreakdown, D2cBaseline, FreightQuote, ItemSpec, MasterBoxSpec, PackingPlan,
};
use crate::domain::ports::{FreightQuoter, TariffLookup};
use crate::utils::error::{LandedCostError, Result};
use crate::utils::validation::{validate_non_negative, Validate};
use serde::{Deserialize, Serialize};

/// Everything the user enters before a comparison starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub item: ItemSpec,
    pub master_box: MasterBoxSpec,
    pub storage_fee_per_item: f64,
    pub local_delivery_fee_per_item: f64,
    /// Explicit duty rate. Takes precedence over the tariff tables.
    pub duty_rate: Option<f64>,
    pub classification_code: Option<String>,
    pub oversize_policy: OversizePolicy,
}

impl Default for ComparisonInput {
    fn default() -> Self {
        let costs = AdditionalCosts::default();
        Self {
            item: ItemSpec::default(),
            master_box: MasterBoxSpec::default(),
            storage_fee_per_item: costs.storage_fee_per_item,
            local_delivery_fee_per_item: costs.local_delivery_fee_per_item,
            duty_rate: None,
            classification_code: None,
            oversize_policy: OversizePolicy::default(),
        }
    }
}

impl Validate for ComparisonInput {
    fn validate(&self) -> Result<()> {
        self.item.validate()?;
        self.master_box.validate()?;
        validate_non_negative("costs.storage_fee_per_item", self.storage_fee_per_item)?;
        validate_non_negative(
            "costs.local_delivery_fee_per_item",
            self.local_delivery_fee_per_item,
        )?;
        if let Some(rate) = self.duty_rate {
            validate_non_negative("costs.duty_rate", rate)?;
        }
        Ok(())
    }
}

/// Results gathered so far in one comparison session.
///
/// Stages never mutate a context in place: each returns a new one, so a
/// failed stage leaves the earlier results untouched and can be retried alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonContext {
    pub input: ComparisonInput,
    pub duty_rate: Option<f64>,
    pub baseline: Option<D2cBaseline>,
    pub packing: Option<PackingPlan>,
    pub formal_quote: Option<FreightQuote>,
    pub breakdown: Option<CostBreakdown>,
}

impl ComparisonContext {
    pub fn new(input: ComparisonInput) -> Self {
        Self {
            input,
            duty_rate: None,
            baseline: None,
            packing: None,
            formal_quote: None,
            breakdown: None,
        }
    }

    /// Costs fed to allocation. A duty rate that was never resolved counts as 0.
    pub fn additional_costs(&self) -> AdditionalCosts {
        AdditionalCosts {
            storage_fee_per_item: self.input.storage_fee_per_item,
            local_delivery_fee_per_item: self.input.local_delivery_fee_per_item,
            duty_rate: self.duty_rate.or(self.input.duty_rate).unwrap_or(0.0),
        }
    }

    pub fn packing(&self) -> Result<&PackingPlan> {
        self.packing
            .as_ref()
            .ok_or_else(|| LandedCostError::StageOutOfOrder {
                required: "packing".to_string(),
            })
    }
}

/// Runs the comparison stages against a freight quoter and, optionally, a
/// set of tariff tables.
pub struct ComparisonEngine<Q: FreightQuoter> {
    quoter: Q,
    tariff: Option<Box<dyn TariffLookup>>,
}

impl<Q: FreightQuoter> ComparisonEngine<Q> {
    pub fn new(quoter: Q) -> Self {
        Self {
            quoter,
            tariff: None,
        }
    }

    pub fn with_tariff(mut self, tariff: impl TariffLookup + 'static) -> Self {
        self.tariff = Some(Box::new(tariff));
        self
    }

    /// Settles the duty rate: explicit input first, then the tariff tables,
    /// else zero.
    pub fn resolve_duty(&self, ctx: &ComparisonContext) -> Result<ComparisonContext> {
        let rate = match (ctx.input.duty_rate, &self.tariff, &ctx.input.classification_code) {
            (Some(rate), _, _) => rate,
            (None, Some(tariff), Some(code)) => resolve_duty_rate(&**tariff, code)?,
            _ => {
                tracing::debug!("No classification code or tariff tables, duty rate is 0");
                0.0
            }
        };
        Ok(ComparisonContext {
            duty_rate: Some(rate),
            ..ctx.clone()
        })
    }

    pub async fn run_baseline(&self, ctx: &ComparisonContext) -> Result<ComparisonContext> {
        ctx.input.item.validate()?;
        let baseline = d2c_baseline(&self.quoter, &ctx.input.item).await?;
        Ok(ComparisonContext {
            baseline: Some(baseline),
            ..ctx.clone()
        })
    }

    /// Packs the order. Clears any quote or breakdown of an earlier packing.
    pub fn run_packing(&self, ctx: &ComparisonContext) -> Result<ComparisonContext> {
        ctx.input.validate()?;
        let plan = pack_with_policy(
            &ctx.input.item,
            &ctx.input.master_box,
            ctx.input.oversize_policy,
        )?;
        Ok(ComparisonContext {
            packing: Some(plan),
            formal_quote: None,
            breakdown: None,
            ..ctx.clone()
        })
    }

    pub async fn run_formal_quote(&self, ctx: &ComparisonContext) -> Result<ComparisonContext> {
        let plan = ctx.packing()?;
        let quote = self.quoter.quote(&plan.packages()).await?;
        let Some(quote) = quote else {
            return Err(LandedCostError::NoFreightQuote {
                shipment: format!("consolidated shipment of {} boxes", plan.box_count),
            });
        };
        tracing::info!(
            "🚢 Formal freight, consolidated: {} - ${:.2}",
            quote.carrier,
            quote.price
        );
        Ok(ComparisonContext {
            formal_quote: Some(quote),
            breakdown: None,
            ..ctx.clone()
        })
    }

    pub fn run_allocation(&self, ctx: &ComparisonContext) -> Result<ComparisonContext> {
        let plan = ctx.packing()?;
        let breakdown = allocate(
            &plan.manifest,
            ctx.formal_quote.as_ref(),
            ctx.input.item.unit_price,
            ctx.input.item.quantity,
            &ctx.additional_costs(),
        )?;
        tracing::info!(
            "💰 Formal total per item: ${:.2}",
            breakdown.total_per_item
        );
        Ok(ComparisonContext {
            breakdown: Some(breakdown),
            ..ctx.clone()
        })
    }

    /// All stages in order, ending with the comparison report.
    pub async fn run(&self, input: ComparisonInput) -> Result<ComparisonReport> {
        tracing::info!("Starting D2C vs formal export comparison");
        input.validate()?;

        let ctx = ComparisonContext::new(input);
        let ctx = self.resolve_duty(&ctx)?;
        let ctx = self.run_baseline(&ctx).await?;
        let ctx = self.run_packing(&ctx)?;
        let ctx = self.run_formal_quote(&ctx).await?;
        let ctx = self.run_allocation(&ctx)?;

        ComparisonReport::from_context(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PackageDescriptor, TariffMatch, TariffRate};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Prices each request at a flat fee per package.
    struct FlatRateQuoter {
        per_package: f64,
        calls: AtomicUsize,
    }

    impl FlatRateQuoter {
        fn new(per_package: f64) -> Self {
            Self {
                per_package,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FreightQuoter for FlatRateQuoter {
        async fn quote(&self, packages: &[PackageDescriptor]) -> Result<Option<FreightQuote>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(FreightQuote {
                carrier: "Flat".to_string(),
                price: self.per_package * packages.len() as f64,
            }))
        }
    }

    struct NoCarrier;

    #[async_trait]
    impl FreightQuoter for NoCarrier {
        async fn quote(&self, _packages: &[PackageDescriptor]) -> Result<Option<FreightQuote>> {
            Ok(None)
        }
    }

    struct FixedTariff(Option<f64>);

    impl TariffLookup for FixedTariff {
        fn suggest(&self, _prefix: &str) -> Result<Vec<TariffMatch>> {
            Ok(Vec::new())
        }

        fn rates_for(&self, code: &str) -> Result<Vec<TariffRate>> {
            Ok(vec![TariffRate {
                code: code.to_string(),
                description: "fixed".to_string(),
                ad_valorem: self.0,
            }])
        }
    }

    fn input(quantity: u64) -> ComparisonInput {
        ComparisonInput {
            item: ItemSpec {
                quantity,
                ..ItemSpec::default()
            },
            ..ComparisonInput::default()
        }
    }

    #[tokio::test]
    async fn test_full_run_produces_report() {
        let engine = ComparisonEngine::new(FlatRateQuoter::new(45.0));

        let report = engine.run(input(12)).await.unwrap();

        assert_eq!(report.d2c.cost_per_item, 45.0);
        assert_eq!(report.packing.box_count, 1);
        assert!((report.breakdown.total_per_item - 9.25).abs() < 1e-9);
        assert_eq!(engine.quoter.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duty_rate_from_tariff_tables() {
        let engine = ComparisonEngine::new(FlatRateQuoter::new(45.0)).with_tariff(FixedTariff(Some(0.1)));
        let mut input = input(20);
        input.classification_code = Some("61091000".to_string());

        let ctx = engine.resolve_duty(&ComparisonContext::new(input)).unwrap();
        assert_eq!(ctx.duty_rate, Some(0.1));

        let ctx = engine.run_packing(&ctx).unwrap();
        let ctx = engine.run_formal_quote(&ctx).await.unwrap();
        let ctx = engine.run_allocation(&ctx).unwrap();
        let breakdown = ctx.breakdown.unwrap();
        assert!((breakdown.duty_per_item - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_explicit_duty_rate_overrides_tables() {
        let engine = ComparisonEngine::new(FlatRateQuoter::new(45.0)).with_tariff(FixedTariff(Some(0.1)));
        let mut input = input(20);
        input.classification_code = Some("61091000".to_string());
        input.duty_rate = Some(0.02);

        let ctx = engine.resolve_duty(&ComparisonContext::new(input)).unwrap();
        assert_eq!(ctx.duty_rate, Some(0.02));
    }

    #[tokio::test]
    async fn test_unavailable_tariff_rate_defaults_to_zero() {
        let engine = ComparisonEngine::new(FlatRateQuoter::new(45.0)).with_tariff(FixedTariff(None));
        let mut input = input(20);
        input.classification_code = Some("61091000".to_string());

        let ctx = engine.resolve_duty(&ComparisonContext::new(input)).unwrap();
        assert_eq!(ctx.duty_rate, Some(0.0));
    }

    #[tokio::test]
    async fn test_failed_quote_keeps_earlier_results() {
        let engine = ComparisonEngine::new(NoCarrier);
        let ctx = engine.run_packing(&ComparisonContext::new(input(100))).unwrap();

        let err = engine.run_formal_quote(&ctx).await.unwrap_err();
        assert!(matches!(err, LandedCostError::NoFreightQuote { .. }));
        assert_eq!(ctx.packing().unwrap().box_count, 2);

        let err = engine.run_allocation(&ctx).unwrap_err();
        assert!(matches!(
            err,
            LandedCostError::Allocation(crate::utils::error::AllocationError::NoFreightQuote)
        ));
    }

    #[tokio::test]
    async fn test_quote_before_packing_is_rejected() {
        let engine = ComparisonEngine::new(FlatRateQuoter::new(10.0));
        let err = engine
            .run_formal_quote(&ComparisonContext::new(input(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, LandedCostError::StageOutOfOrder { .. }));
        assert_eq!(engine.quoter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_stops_before_quoting() {
        let engine = ComparisonEngine::new(FlatRateQuoter::new(10.0));
        let mut bad = input(5);
        bad.item.unit_price = 0.0;

        let err = engine.run(bad).await.unwrap_err();
        assert!(matches!(err, LandedCostError::InvalidInput { .. }));
        assert_eq!(engine.quoter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_repacking_clears_stale_quote() {
        let engine = ComparisonEngine::new(NoCarrier);
        let mut ctx = engine.run_packing(&ComparisonContext::new(input(10))).unwrap();
        ctx.formal_quote = Some(FreightQuote {
            carrier: "Old".to_string(),
            price: 1.0,
        });

        let repacked = engine.run_packing(&ctx).unwrap();
        assert!(repacked.formal_quote.is_none());
    }
}
