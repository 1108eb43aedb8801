use crate::domain::model::{FreightQuote, PackageDescriptor, TariffMatch, TariffRate};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Quotation service for a shipment of one or more packages.
///
/// `Ok(None)` means no carrier offered a price (service unreachable, empty or
/// malformed answer). It is never reported as a zero price.
#[async_trait]
pub trait FreightQuoter: Send + Sync {
    async fn quote(&self, packages: &[PackageDescriptor]) -> Result<Option<FreightQuote>>;
}

/// Classification and duty-rate tables.
pub trait TariffLookup: Send + Sync {
    /// Origin classification codes starting with `prefix`, in table order.
    fn suggest(&self, prefix: &str) -> Result<Vec<TariffMatch>>;

    /// Destination rate rows matching the first six digits of `code`.
    fn rates_for(&self, code: &str) -> Result<Vec<TariffRate>>;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
