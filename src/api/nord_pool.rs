//! [Nord Pool](https://data.nordpoolgroup.com) day-ahead prices.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    core::rate::RawPriceEntry,
    prelude::*,
    quantity::rate::MegawattHourRate,
    scheduler::{PriceService, ServiceError},
};

const URL: &str = "https://dataportal-api.nordpoolgroup.com/api/DayAheadPrices";

pub struct Api {
    client: Client,
    area: String,
    currency: String,
}

impl Api {
    pub fn new(area: String, currency: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, area, currency })
    }
}

#[async_trait]
impl PriceService for Api {
    /// Get the prices of the configured area on the specified delivery date.
    #[instrument(skip_all, fields(on = %on, area = %self.area))]
    async fn get_prices_for_date(&self, on: NaiveDate) -> Result<Option<Value>, ServiceError> {
        info!("fetching…");
        let response = self
            .client
            .get(URL)
            .query(&[
                ("date", on.to_string().as_str()),
                ("market", "DayAhead"),
                ("deliveryArea", self.area.as_str()),
                ("currency", self.currency.as_str()),
            ])
            .send()
            .await
            .context("failed to call")?;
        match response.status() {
            StatusCode::NO_CONTENT => {
                info!("nothing published yet");
                return Ok(None);
            }
            StatusCode::SERVICE_UNAVAILABLE => return Err(ServiceError::NotReady),
            _ => {}
        }
        let prices = response
            .error_for_status()
            .context("request failed")?
            .json::<DayAheadPrices>()
            .await
            .context("failed to deserialize the response")?;
        if let Some(currency) = &prices.currency
            && !currency.eq_ignore_ascii_case(&self.currency)
        {
            warn!(%currency, "unexpected currency");
        }

        let entries: Vec<RawPriceEntry> = prices
            .multi_area_entries
            .into_iter()
            .map(|entry| RawPriceEntry {
                start: entry.delivery_start,
                end: entry.delivery_end,
                price: entry.entry_per_area.get(&self.area).copied().flatten().map(MegawattHourRate),
            })
            .collect();
        info!(n_entries = entries.len(), "fetched");
        let entries = serde_json::to_value(entries).context("failed to serialize the entries")?;
        Ok(Some(Value::Object(Map::from_iter([(self.area.clone(), entries)]))))
    }

    fn currency(&self, area: &str) -> Option<String> {
        area.eq_ignore_ascii_case(&self.area).then(|| self.currency.clone())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DayAheadPrices {
    currency: Option<String>,
    multi_area_entries: Vec<MultiAreaEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultiAreaEntry {
    delivery_start: DateTime<FixedOffset>,
    delivery_end: DateTime<FixedOffset>,

    /// Price per megawatt-hour by delivery area.
    entry_per_area: HashMap<String, Option<f64>>,
}

#[cfg(test)]
mod tests {
    use chrono::Local;

    use super::*;
    use crate::scheduler::{FetchOutcome, fetch};

    #[test]
    fn test_deserialize_response() -> Result {
        let prices: DayAheadPrices = serde_json::from_str(
            r#"{
                "deliveryDateCET": "2025-08-09",
                "currency": "EUR",
                "multiAreaEntries": [
                    {
                        "deliveryStart": "2025-08-08T22:00:00Z",
                        "deliveryEnd": "2025-08-08T22:15:00Z",
                        "entryPerArea": {"NL": 95.12}
                    }
                ]
            }"#,
        )?;
        assert_eq!(prices.currency.as_deref(), Some("EUR"));
        assert_eq!(prices.multi_area_entries[0].entry_per_area["NL"], Some(95.12));
        Ok(())
    }

    #[test]
    fn test_currency_lookup() -> Result {
        let api = Api::new("NL".to_string(), "EUR".to_string())?;
        assert_eq!(api.currency("nl").as_deref(), Some("EUR"));
        assert_eq!(api.currency("SE3"), None);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_prices_for_date_ok() -> Result {
        let api = Api::new("NL".to_string(), "EUR".to_string())?;
        let FetchOutcome::Data { currency, raw } = fetch(&api, Local::now().date_naive()).await
        else {
            bail!("no prices");
        };
        assert_eq!(currency.as_deref(), Some("EUR"));
        assert!(!raw.is_empty());
        assert!(raw.len() <= 24 * 4);
        assert!(raw.is_sorted_by_key(|entry| entry.start));
        Ok(())
    }
}
