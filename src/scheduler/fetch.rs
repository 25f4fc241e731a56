use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::{core::rate::RawPriceEntry, prelude::*};

/// Day-ahead price service.
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Published prices keyed by area, or [`None`] when the service has nothing for the date.
    async fn get_prices_for_date(&self, on: NaiveDate) -> Result<Option<Value>, ServiceError>;

    /// Currency the prices of the area are quoted in, if known.
    fn currency(&self, area: &str) -> Option<String>;
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ServiceError {
    #[display("the price service is not ready")]
    NotReady,

    #[display("{_0:#}")]
    Other(#[error(not(source))] Error),
}

impl From<Error> for ServiceError {
    fn from(error: Error) -> Self {
        Self::Other(error)
    }
}

/// Classified result of a single fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Data { currency: Option<String>, raw: Vec<RawPriceEntry> },
    NoData,
    ServiceNotReady,
    BadResponseStructure,
    Other,
}

impl FetchOutcome {
    pub const fn status(&self) -> FetchStatus {
        match self {
            Self::Data { .. } => FetchStatus::SuccessData,
            Self::NoData => FetchStatus::SuccessNoData,
            Self::ServiceNotReady => FetchStatus::ErrorServiceNotReady,
            Self::BadResponseStructure => FetchStatus::ErrorBadResponseStructure,
            Self::Other => FetchStatus::ErrorOther,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, derive_more::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStatus {
    #[display("SUCCESS_DATA")]
    SuccessData,

    #[display("SUCCESS_NO_DATA")]
    SuccessNoData,

    #[display("ERROR_SERVICE_NOT_READY")]
    ErrorServiceNotReady,

    #[display("ERROR_BAD_RESPONSE_STRUCTURE")]
    ErrorBadResponseStructure,

    #[display("ERROR_OTHER")]
    ErrorOther,
}

/// Call the service and classify the response. Never fails.
///
/// A usable response holds exactly one area mapped onto a list of price entries.
#[instrument(skip_all, fields(on = %on))]
pub async fn fetch<S: PriceService + ?Sized>(service: &S, on: NaiveDate) -> FetchOutcome {
    info!("fetching…");
    let response = match service.get_prices_for_date(on).await {
        Ok(response) => response,
        Err(ServiceError::NotReady) => {
            warn!("the price service is not ready");
            return FetchOutcome::ServiceNotReady;
        }
        Err(ServiceError::Other(error)) => {
            error!("failed to fetch the prices: {error:#}");
            return FetchOutcome::Other;
        }
    };

    let Some(Value::Object(areas)) = response.filter(|response| !is_empty(response)) else {
        warn!("no prices published");
        return FetchOutcome::NoData;
    };
    let mut areas = areas.into_iter();
    let (Some((area, entries)), None) = (areas.next(), areas.next()) else {
        warn!("expected exactly one area in the response");
        return FetchOutcome::BadResponseStructure;
    };
    if !entries.is_array() {
        warn!(%area, "the area prices are not a list");
        return FetchOutcome::BadResponseStructure;
    }
    let raw = match serde_json::from_value::<Vec<RawPriceEntry>>(entries) {
        Ok(raw) => raw,
        Err(error) => {
            warn!(%area, "malformed price entries: {error:#}");
            return FetchOutcome::BadResponseStructure;
        }
    };

    let currency = service.currency(&area);
    if currency.is_none() {
        warn!(%area, "could not determine the currency");
    }
    info!(%area, ?currency, n_entries = raw.len(), "fetched");
    FetchOutcome::Data { currency, raw }
}

fn is_empty(response: &Value) -> bool {
    match response {
        Value::Null => true,
        Value::Object(object) => object.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
pub mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use chrono::TimeDelta;
    use serde_json::json;

    use super::*;

    /// Replays the scripted responses and records the requested dates.
    ///
    /// Once the script runs out, every call fails.
    #[derive(Clone, Default)]
    pub struct ScriptedService {
        pub responses: Arc<Mutex<VecDeque<Result<Option<Value>, ServiceError>>>>,
        pub requested: Arc<Mutex<Vec<NaiveDate>>>,
        pub currency: Option<String>,
    }

    impl ScriptedService {
        pub fn push(&self, response: Result<Option<Value>, ServiceError>) -> &Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn requested(&self) -> Vec<NaiveDate> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PriceService for ScriptedService {
        async fn get_prices_for_date(&self, on: NaiveDate) -> Result<Option<Value>, ServiceError> {
            self.requested.lock().unwrap().push(on);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted").into()))
        }

        fn currency(&self, area: &str) -> Option<String> {
            self.currency.clone().filter(|_| area == "NL")
        }
    }

    /// Single-area response with hourly prices on the date.
    pub fn day_response(on: NaiveDate, n_hours: u32) -> Value {
        let entries = (0..n_hours)
            .map(|hour| {
                let start = on.and_hms_opt(hour, 0, 0).unwrap().and_utc();
                json!({
                    "start": start.to_rfc3339(),
                    "end": (start + TimeDelta::hours(1)).to_rfc3339(),
                    "price": 10.0 * f64::from(hour),
                })
            })
            .collect::<Vec<_>>();
        json!({ "NL": entries })
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 9).unwrap()
    }

    fn service(currency: Option<&str>) -> ScriptedService {
        ScriptedService { currency: currency.map(ToString::to_string), ..Default::default() }
    }

    #[tokio::test]
    async fn test_data() {
        let service = service(Some("EUR"));
        service.push(Ok(Some(day_response(date(), 24))));
        let FetchOutcome::Data { currency, raw } = fetch(&service, date()).await else {
            panic!("expected data");
        };
        assert_eq!(currency.as_deref(), Some("EUR"));
        assert_eq!(raw.len(), 24);
        assert_eq!(service.requested(), vec![date()]);
    }

    #[tokio::test]
    async fn test_missing_currency_is_not_fatal() {
        let service = service(None);
        service.push(Ok(Some(day_response(date(), 1))));
        assert!(matches!(
            fetch(&service, date()).await,
            FetchOutcome::Data { currency: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_no_data() {
        let service = service(None);
        service.push(Ok(None)).push(Ok(Some(json!({})))).push(Ok(Some(Value::Null)));
        for _ in 0..3 {
            assert_eq!(fetch(&service, date()).await.status(), FetchStatus::SuccessNoData);
        }
    }

    #[tokio::test]
    async fn test_bad_response_structure() {
        let service = service(None);
        service
            .push(Ok(Some(json!({ "NL": [], "BE": [] }))))
            .push(Ok(Some(json!({ "NL": { "start": "now" } }))))
            .push(Ok(Some(json!({ "NL": [{ "start": "yesterday" }] }))));
        for _ in 0..3 {
            assert_eq!(
                fetch(&service, date()).await.status(),
                FetchStatus::ErrorBadResponseStructure
            );
        }
    }

    #[tokio::test]
    async fn test_service_errors() {
        let service = service(None);
        service.push(Err(ServiceError::NotReady));
        assert_eq!(fetch(&service, date()).await.status(), FetchStatus::ErrorServiceNotReady);
        assert_eq!(fetch(&service, date()).await.status(), FetchStatus::ErrorOther);
    }

    #[test]
    fn test_status_display() -> Result {
        assert_eq!(FetchStatus::ErrorBadResponseStructure.to_string(), "ERROR_BAD_RESPONSE_STRUCTURE");
        assert_eq!(serde_json::to_string(&FetchStatus::SuccessNoData)?, r#""SUCCESS_NO_DATA""#);
        Ok(())
    }
}
