use crate::adapters::freight::FreightSettings;
use crate::core::packing::OversizePolicy;
use crate::core::pipeline::ComparisonInput;
use crate::core::report::ReportFormat;
use crate::domain::model::{AdditionalCosts, ItemSpec, MasterBoxSpec};
use crate::utils::error::{LandedCostError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default)]
    pub item: ItemSpec,
    #[serde(default)]
    pub master_box: MasterBoxSpec,
    #[serde(default)]
    pub costs: CostsConfig,
    #[serde(default)]
    pub packing: PackingConfig,
    pub tariff: Option<TariffConfig>,
    #[serde(default)]
    pub freight: FreightSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostsConfig {
    pub storage_fee_per_item: f64,
    pub local_delivery_fee_per_item: f64,
    /// When set, the tariff tables are not consulted.
    pub duty_rate: Option<f64>,
}

impl Default for CostsConfig {
    fn default() -> Self {
        let costs = AdditionalCosts::default();
        Self {
            storage_fee_per_item: costs.storage_fee_per_item,
            local_delivery_fee_per_item: costs.local_delivery_fee_per_item,
            duty_rate: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingConfig {
    #[serde(default)]
    pub oversize_policy: OversizePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    pub classification_code: Option<String>,
    pub origin_table: String,
    pub destination_table: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: ReportFormat,
    /// Directory reports are written to. Stdout when absent.
    pub directory: Option<String>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            item: ItemSpec::default(),
            master_box: MasterBoxSpec::default(),
            costs: CostsConfig::default(),
            packing: PackingConfig::default(),
            tariff: None,
            freight: FreightSettings::default(),
            output: OutputConfig::default(),
        }
    }
}

impl ComparisonConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LandedCostError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LandedCostError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value. Unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LandedCostError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        self.comparison_input().validate()?;

        validate_url("freight.endpoint", &self.freight.endpoint)?;
        validate_non_empty_string("freight.origin_country", &self.freight.origin_country)?;
        validate_non_empty_string(
            "freight.destination_country",
            &self.freight.destination_country,
        )?;
        validate_non_empty_string("freight.currency", &self.freight.currency)?;

        if let Some(tariff) = &self.tariff {
            validate_path("tariff.origin_table", &tariff.origin_table)?;
            validate_path("tariff.destination_table", &tariff.destination_table)?;
        }
        if let Some(directory) = &self.output.directory {
            validate_path("output.directory", directory)?;
        }

        Ok(())
    }

    /// Checked only by commands that reach the quotation API.
    pub fn require_api_key(&self) -> Result<()> {
        let key = self.freight.api_key.trim();
        if key.is_empty() || key.starts_with("${") {
            return Err(LandedCostError::MissingConfigError {
                field: "freight.api_key".to_string(),
            });
        }
        Ok(())
    }

    pub fn comparison_input(&self) -> ComparisonInput {
        ComparisonInput {
            item: self.item.clone(),
            master_box: self.master_box.clone(),
            storage_fee_per_item: self.costs.storage_fee_per_item,
            local_delivery_fee_per_item: self.costs.local_delivery_fee_per_item,
            duty_rate: self.costs.duty_rate,
            classification_code: self
                .tariff
                .as_ref()
                .and_then(|t| t.classification_code.clone()),
            oversize_policy: self.packing.oversize_policy,
        }
    }
}

impl Validate for ComparisonConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[item]
height = 12.0
width = 8.0
depth = 4.0
weight = 0.3
unit_price = 19.9
quantity = 250

[master_box]
height = 50.0
width = 40.0
depth = 30.0
max_weight = 30.0

[costs]
storage_fee_per_item = 0.25
local_delivery_fee_per_item = 4.5
duty_rate = 0.12

[packing]
oversize_policy = "reject"

[freight]
endpoint = "https://quotes.example.com/v2/quotation"
api_key = "secret"
timeout_seconds = 20

[output]
format = "json"
"#;

        let config = ComparisonConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.item.quantity, 250);
        assert_eq!(config.master_box.max_weight, 30.0);
        assert_eq!(config.costs.duty_rate, Some(0.12));
        assert_eq!(config.packing.oversize_policy, OversizePolicy::Reject);
        assert_eq!(config.freight.timeout_seconds, Some(20));
        assert_eq!(config.freight.origin_country, "BR");
        assert_eq!(config.output.format, ReportFormat::Json);
        assert!(config.validate().is_ok());
        assert!(config.require_api_key().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ComparisonConfig::from_toml_str("").unwrap();
        assert_eq!(config, ComparisonConfig::default());
        assert_eq!(config.costs.storage_fee_per_item, 0.5);
        assert_eq!(config.costs.local_delivery_fee_per_item, 5.0);
        assert!(config.validate().is_ok());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LANDED_COST_TEST_KEY", "from-env");

        let toml_content = r#"
[freight]
api_key = "${LANDED_COST_TEST_KEY}"
"#;
        let config = ComparisonConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.freight.api_key, "from-env");

        std::env::remove_var("LANDED_COST_TEST_KEY");
    }

    #[test]
    fn test_unresolved_api_key_is_missing() {
        let toml_content = r#"
[freight]
api_key = "${LANDED_COST_UNSET_VARIABLE}"
"#;
        let config = ComparisonConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.require_api_key(),
            Err(LandedCostError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_non_positive_dimension_fails_validation() {
        let toml_content = r#"
[master_box]
height = 0.0
width = 40.0
depth = 40.0
max_weight = 50.0
"#;
        let config = ComparisonConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(LandedCostError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_invalid_endpoint_fails_validation() {
        let toml_content = r#"
[freight]
endpoint = "not-a-url"
"#;
        let config = ComparisonConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tariff_section_feeds_classification_code() {
        let toml_content = r#"
[tariff]
classification_code = "61091000"
origin_table = "data/origin.csv"
destination_table = "data/destination.csv"
"#;
        let config = ComparisonConfig::from_toml_str(toml_content).unwrap();
        let input = config.comparison_input();
        assert_eq!(input.classification_code.as_deref(), Some("61091000"));
        assert_eq!(input.duty_rate, None);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[item]\nheight = 10.0\nwidth = 10.0\ndepth = 10.0\nweight = 0.5\nunit_price = 50.0\nquantity = 12\n")
            .unwrap();

        let config = ComparisonConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.item.quantity, 12);
    }
}
