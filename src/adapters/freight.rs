use crate::domain::model::{FreightQuote, PackageDescriptor};
use crate::domain::ports::FreightQuoter;
use crate::utils::error::{LandedCostError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.shipsmart.com.br/v2/quotation?level=simple";
const USER_AGENT: &str = concat!("landed-cost/", env!("CARGO_PKG_VERSION"));

/// Connection and shipment settings for the quotation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreightSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_origin")]
    pub origin_country: String,
    #[serde(default = "default_destination")]
    pub destination_country: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_origin() -> String {
    "BR".to_string()
}

fn default_destination() -> String {
    "US".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for FreightSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            timeout_seconds: None,
            origin_country: default_origin(),
            destination_country: default_destination(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Serialize)]
struct QuotationRequest<'a> {
    object: &'static str,
    r#type: &'static str,
    tax: &'static str,
    insurance: bool,
    residential_delivery: bool,
    non_stackable: bool,
    currency_quote: &'a str,
    currency_payment: &'a str,
    address_sender: Address<'a>,
    address_receiver: Address<'a>,
    boxes: &'a [PackageDescriptor],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    country_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct QuotationResponse {
    data: Option<QuotationData>,
}

#[derive(Debug, Deserialize)]
struct QuotationData {
    carriers: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct CarrierOffer {
    name: String,
    currency_payment_amount: Amount,
}

/// The API sends amounts either as JSON numbers or as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn value(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => Some(*n),
            Amount::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Cheapest usable offer. Ties keep the first offer seen; offers without a
/// positive, finite price are ignored.
pub fn select_cheapest<I>(offers: I) -> Option<FreightQuote>
where
    I: IntoIterator<Item = FreightQuote>,
{
    offers
        .into_iter()
        .filter(|offer| offer.price.is_finite() && offer.price > 0.0)
        .fold(None, |best: Option<FreightQuote>, offer| match best {
            Some(current) if current.price <= offer.price => Some(current),
            _ => Some(offer),
        })
}

/// Extracts the cheapest carrier from a quotation response body.
pub fn parse_best_offer(body: &serde_json::Value) -> Option<FreightQuote> {
    let response: QuotationResponse = match serde_json::from_value(body.clone()) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("⚠️ Unexpected quotation response shape: {}", e);
            return None;
        }
    };
    let carriers = response.data?.carriers?;

    let offers = carriers.into_iter().filter_map(|raw| {
        match serde_json::from_value::<CarrierOffer>(raw) {
            Ok(offer) => match offer.currency_payment_amount.value() {
                Some(price) => Some(FreightQuote {
                    carrier: offer.name,
                    price,
                }),
                None => {
                    tracing::warn!("⚠️ Skipping carrier '{}' with unreadable price", offer.name);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("⚠️ Skipping malformed carrier offer: {}", e);
                None
            }
        }
    });
    select_cheapest(offers)
}

pub struct ShipsmartClient {
    settings: FreightSettings,
    client: Client,
}

impl ShipsmartClient {
    pub fn new(settings: FreightSettings) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        Ok(Self {
            settings,
            client: builder.build()?,
        })
    }

    pub fn settings(&self) -> &FreightSettings {
        &self.settings
    }

    fn request_body<'a>(&'a self, packages: &'a [PackageDescriptor]) -> QuotationRequest<'a> {
        QuotationRequest {
            object: "not_doc",
            r#type: "simple",
            tax: "receiver",
            insurance: false,
            residential_delivery: false,
            non_stackable: false,
            currency_quote: &self.settings.currency,
            currency_payment: &self.settings.currency,
            address_sender: Address {
                country_code: &self.settings.origin_country,
            },
            address_receiver: Address {
                country_code: &self.settings.destination_country,
            },
            boxes: packages,
        }
    }
}

#[async_trait]
impl FreightQuoter for ShipsmartClient {
    async fn quote(&self, packages: &[PackageDescriptor]) -> Result<Option<FreightQuote>> {
        if packages.is_empty() {
            return Err(LandedCostError::invalid_input(
                "packages",
                0,
                "a quotation needs at least one package",
            ));
        }

        tracing::debug!(
            "Requesting quotation for {} packages from: {}",
            packages.len(),
            self.settings.endpoint
        );

        let response = match self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_body(packages))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("⚠️ Quotation service unreachable: {}", e);
                return Ok(None);
            }
        };

        tracing::debug!("Quotation response status: {}", response.status());
        if !response.status().is_success() {
            tracing::warn!("⚠️ Quotation rejected with status {}", response.status());
            return Ok(None);
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("⚠️ Quotation response is not JSON: {}", e);
                return Ok(None);
            }
        };

        let best = parse_best_offer(&body);
        if best.is_none() {
            tracing::warn!("⚠️ No carrier offered a usable price");
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn offer(carrier: &str, price: f64) -> FreightQuote {
        FreightQuote {
            carrier: carrier.to_string(),
            price,
        }
    }

    #[test]
    fn test_select_cheapest_first_wins_on_ties() {
        let best = select_cheapest(vec![
            offer("UPS", 30.0),
            offer("DHL", 25.0),
            offer("FedEx", 25.0),
        ])
        .unwrap();
        assert_eq!(best.carrier, "DHL");
    }

    #[test]
    fn test_select_cheapest_ignores_zero_prices() {
        assert!(select_cheapest(vec![offer("Free", 0.0)]).is_none());
        assert!(select_cheapest(Vec::new()).is_none());
        assert_eq!(
            select_cheapest(vec![offer("Free", 0.0), offer("UPS", 9.0)]).unwrap().carrier,
            "UPS"
        );
    }

    #[test]
    fn test_parse_best_offer_accepts_string_amounts() {
        let body = json!({
            "data": {
                "carriers": [
                    {"name": "UPS Saver", "currency_payment_amount": "48.90"},
                    {"name": "DHL Express", "currency_payment_amount": 45.10},
                    {"name": "Broken", "currency_payment_amount": "n/a"},
                    {"currency_payment_amount": 1.0}
                ]
            }
        });
        let best = parse_best_offer(&body).unwrap();
        assert_eq!(best.carrier, "DHL Express");
        assert_eq!(best.price, 45.10);
    }

    #[test]
    fn test_parse_best_offer_without_carriers() {
        assert!(parse_best_offer(&json!({"data": {}})).is_none());
        assert!(parse_best_offer(&json!({"error": "unauthorized"})).is_none());
        assert!(parse_best_offer(&json!({"data": {"carriers": []}})).is_none());
        assert!(parse_best_offer(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_request_body_uses_settings() {
        let client = ShipsmartClient::new(FreightSettings::default()).unwrap();
        let packages = vec![PackageDescriptor {
            name: "Box 1".to_string(),
            height: 40.0,
            width: 40.0,
            depth: 40.0,
            weight: 6.0,
            declared_value: 600.0,
        }];
        let body = serde_json::to_value(client.request_body(&packages)).unwrap();

        assert_eq!(body["object"], "not_doc");
        assert_eq!(body["type"], "simple");
        assert_eq!(body["currency_quote"], "USD");
        assert_eq!(body["address_sender"]["country_code"], "BR");
        assert_eq!(body["address_receiver"]["country_code"], "US");
        assert_eq!(body["boxes"][0]["price"], 600.0);
    }
}
