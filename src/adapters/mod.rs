// Adapters layer: concrete implementations of the domain ports.

pub mod freight;
pub mod storage;
pub mod tariff;
