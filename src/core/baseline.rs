use crate::domain::model::{D2cBaseline, ItemSpec, PackageDescriptor};
use crate::domain::ports::FreightQuoter;
use crate::utils::error::{LandedCostError, Result};

/// Quotes one parcel holding one item. The price, undivided, is the D2C cost
/// per item.
pub async fn d2c_baseline<Q>(quoter: &Q, item: &ItemSpec) -> Result<D2cBaseline>
where
    Q: FreightQuoter + ?Sized,
{
    let package = PackageDescriptor::single_item(item);
    tracing::debug!("Requesting D2C quote for {:?}", package);

    match quoter.quote(std::slice::from_ref(&package)).await? {
        Some(quote) => {
            tracing::info!("🚚 D2C per item: {} - ${:.2}", quote.carrier, quote.price);
            Ok(D2cBaseline {
                carrier: quote.carrier,
                cost_per_item: quote.price,
            })
        }
        None => Err(LandedCostError::NoFreightQuote {
            shipment: "single-item D2C parcel".to_string(),
        }),
    }
}
