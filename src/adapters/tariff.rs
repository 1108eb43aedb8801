use crate::domain::model::{TariffMatch, TariffRate};
use crate::domain::ports::TariffLookup;
use crate::utils::error::{LandedCostError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct OriginRow {
    product_code: String,
    product_description: String,
}

#[derive(Debug, Deserialize)]
struct DestinationRow {
    product_code: String,
    product_description: String,
    ave: String,
}

/// Classification and duty tables held in memory, loaded from CSV exports.
///
/// The origin table needs `product_code,product_description` columns, the
/// destination table also needs `ave`, which may read `N/A`.
#[derive(Debug, Clone, Default)]
pub struct CsvTariffTable {
    origin: Vec<TariffMatch>,
    destination: Vec<TariffRate>,
}

impl CsvTariffTable {
    pub fn from_files<P: AsRef<Path>>(origin: P, destination: P) -> Result<Self> {
        let origin_file = std::fs::File::open(origin.as_ref())?;
        let destination_file = std::fs::File::open(destination.as_ref())?;
        let table = Self::from_readers(origin_file, destination_file)?;
        tracing::info!(
            "📚 Loaded {} origin codes and {} destination tariff lines",
            table.origin.len(),
            table.destination.len()
        );
        Ok(table)
    }

    pub fn from_readers<R: Read, S: Read>(origin: R, destination: S) -> Result<Self> {
        let mut origin_reader = csv::Reader::from_reader(origin);
        let origin = origin_reader
            .deserialize::<OriginRow>()
            .map(|row| {
                row.map(|r| TariffMatch {
                    code: r.product_code.trim().to_string(),
                    description: r.product_description.trim().to_string(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut destination_reader = csv::Reader::from_reader(destination);
        let destination = destination_reader
            .deserialize::<DestinationRow>()
            .map(|row| {
                row.map(|r| TariffRate {
                    code: r.product_code.trim().to_string(),
                    description: r.product_description.trim().to_string(),
                    ad_valorem: parse_rate(&r.ave),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            origin,
            destination,
        })
    }
}

/// `N/A`, blanks and anything non-numeric mean no rate.
fn parse_rate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|rate| rate.is_finite())
}

impl TariffLookup for CsvTariffTable {
    fn suggest(&self, prefix: &str) -> Result<Vec<TariffMatch>> {
        if self.origin.is_empty() {
            return Err(LandedCostError::LookupUnavailable {
                message: "origin classification table is empty".to_string(),
            });
        }
        Ok(self
            .origin
            .iter()
            .filter(|m| m.code.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn rates_for(&self, code: &str) -> Result<Vec<TariffRate>> {
        if self.destination.is_empty() {
            return Err(LandedCostError::LookupUnavailable {
                message: "destination tariff table is empty".to_string(),
            });
        }
        let head: String = code.chars().take(6).collect();
        Ok(self
            .destination
            .iter()
            .filter(|r| r.code.starts_with(&head))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "\
product_code,product_description
61091000,\"Camisetas de malha, de algodao\"
61099000,Camisetas de outras materias texteis
85171300,Smartphones
";

    const DESTINATION: &str = "\
product_code,product_description,ave
610910,\"T-shirts, of cotton\",0.165
6109100010,\"Men's or boys', of cotton\",N/A
610990,Of other textile materials,0.32
851713,Smartphones,0
";

    fn table() -> CsvTariffTable {
        CsvTariffTable::from_readers(ORIGIN.as_bytes(), DESTINATION.as_bytes()).unwrap()
    }

    #[test]
    fn test_suggest_by_prefix() {
        let matches = table().suggest("6109").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].description, "Camisetas de malha, de algodao");
    }

    #[test]
    fn test_rates_match_first_six_digits() {
        let rates = table().rates_for("61091000").unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].ad_valorem, Some(0.165));
        assert_eq!(rates[1].ad_valorem, None);
    }

    #[test]
    fn test_empty_tables_are_unavailable() {
        let empty = CsvTariffTable::default();
        assert!(matches!(
            empty.rates_for("610910"),
            Err(LandedCostError::LookupUnavailable { .. })
        ));
        assert!(matches!(
            empty.suggest("6109"),
            Err(LandedCostError::LookupUnavailable { .. })
        ));
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let result = CsvTariffTable::from_readers(ORIGIN.as_bytes(), "product_code\n610910\n".as_bytes());
        assert!(matches!(result, Err(LandedCostError::CsvError(_))));
    }
}
