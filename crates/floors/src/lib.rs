//! Client for the remote floor-price service. Fetches the floor schedule
//! for the page's ad slots; a plain request/response client with no shared
//! state with the analytics aggregator.

use {
    crate::device::DeviceType,
    serde::{Deserialize, Serialize},
    thiserror::Error,
    url::Url,
};

pub mod device;

pub const DEFAULT_URL: &str = "https://api.floors.dev/sgw/v1/floors";

#[derive(Debug, Error)]
pub enum Error {
    #[error("a floor service api key is required")]
    MissingKey,
    #[error("floor service has no data for the requested ad units")]
    NoData,
    #[error("failed to call floor service: {0}")]
    Http(#[from] reqwest::Error),
}

/// Request body for the floor service.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorsRequest {
    pub device_type: DeviceType,
    /// Paths of the slots currently on the page.
    pub ad_units: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FloorSchedule {
    pub floors: Vec<Floor>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub ad_unit: String,
    pub floor: f64,
    pub currency: String,
}

pub struct FloorsApi {
    base: Url,
    client: reqwest::Client,
    key: String,
}

impl FloorsApi {
    pub fn new(client: reqwest::Client, base: Url, key: String) -> Result<Self, Error> {
        if key.is_empty() {
            return Err(Error::MissingKey);
        }
        Ok(Self { base, client, key })
    }

    /// Fetches the floor schedule for the given slots. Callers log failures
    /// and continue; floors are an optimization, never a hard requirement.
    pub async fn floors(&self, request: &FloorsRequest) -> Result<FloorSchedule, Error> {
        let response = self
            .client
            .post(self.base.clone())
            .header("x-api-key", &self.key)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Err(Error::NoData);
        }

        let schedule: FloorSchedule = response.json().await?;
        tracing::debug!(floors = schedule.floors.len(), "fetched floor schedule");
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_the_service_field_names() {
        observe::tracing::initialize_reentrant("floors=debug");
        let request = FloorsRequest {
            device_type: DeviceType::Mobile,
            ad_units: vec!["/1234/homepage/div1".to_owned()],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "deviceType": "Mobile",
                "adUnits": ["/1234/homepage/div1"],
            })
        );
    }

    #[test]
    fn schedule_deserializes() {
        let schedule: FloorSchedule = serde_json::from_str(
            r#"{
                "floors": [
                    {"adUnit": "/1234/homepage/div1", "floor": 0.45, "currency": "USD"},
                    {"adUnit": "/1234/homepage/div2", "floor": 1.2, "currency": "USD"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(schedule.floors.len(), 2);
        assert_eq!(schedule.floors[0].ad_unit, "/1234/homepage/div1");
        assert_eq!(schedule.floors[0].floor, 0.45);
    }

    #[test]
    fn an_empty_key_is_rejected() {
        let api = FloorsApi::new(
            reqwest::Client::new(),
            DEFAULT_URL.parse().unwrap(),
            String::new(),
        );
        assert!(matches!(api, Err(Error::MissingKey)));
    }
}
