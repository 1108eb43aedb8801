pub mod allocation;
pub mod baseline;
pub mod packing;
pub mod pipeline;
pub mod report;
pub mod tariff;

pub use crate::domain::model::{
    AdditionalCosts, BoxManifestEntry, CostBreakdown, FreightQuote, ItemSpec, MasterBoxSpec,
    PackingPlan,
};
pub use crate::domain::ports::{FreightQuoter, Storage, TariffLookup};
pub use crate::utils::error::Result;
