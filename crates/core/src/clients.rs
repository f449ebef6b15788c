//! Contracts for the external demographic and metadata services.
//!
//! The demographic service owns the Person record a patient id points at;
//! the metadata service owns location reference data. Both are consumed
//! through traits so the directory can be exercised against fakes; the
//! HTTP implementations carry a bounded per-call deadline from
//! [`CoreConfig`](crate::config::CoreConfig).
//!
//! Failure policy is decided by the caller, not here: these clients report
//! failures as [`CdrError::Upstream`]; read paths in the directory absorb
//! them, the patient-void path propagates them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::error::{CdrError, CdrResult};

/// Demographic record owned by the external Person service.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonRecord {
    pub person_id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<chrono::NaiveDate>,
}

/// Location reference data owned by the metadata service.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationRecord {
    pub location_id: i32,
    pub name: String,
}

#[async_trait]
pub trait DemographicClient: Send + Sync {
    /// Fetches a Person by id. Absent persons are `Ok(None)`.
    async fn get_person(
        &self,
        person_id: i64,
        include_voided: bool,
    ) -> CdrResult<Option<PersonRecord>>;

    /// Creates a Person and returns it with its assigned id.
    async fn add_person(&self, person: PersonRecord) -> CdrResult<PersonRecord>;

    /// Voids the Person record.
    async fn delete_person(&self, person_id: i64, reason: &str) -> CdrResult<()>;
}

#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Fetches a location by id. Absent locations are `Ok(None)`.
    async fn get_location(&self, location_id: i32) -> CdrResult<Option<LocationRecord>>;
}

#[derive(Serialize)]
struct VoidRequestBody<'a> {
    void_reason: &'a str,
}

/// HTTP client for the demographic service.
#[derive(Clone)]
pub struct HttpDemographicClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDemographicClient {
    pub fn new(cfg: &CoreConfig) -> CdrResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.external_call_timeout())
            .build()
            .map_err(|e| CdrError::Upstream(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: cfg.demographic_base_url().to_string(),
        })
    }
}

#[async_trait]
impl DemographicClient for HttpDemographicClient {
    async fn get_person(
        &self,
        person_id: i64,
        include_voided: bool,
    ) -> CdrResult<Option<PersonRecord>> {
        let url = format!("{}/people/{}/{}", self.base_url, person_id, include_voided);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CdrError::Upstream(format!("demographic service get_person: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| CdrError::Upstream(format!("demographic service get_person: {e}")))?;
        let person = response
            .json::<PersonRecord>()
            .await
            .map_err(|e| CdrError::Upstream(format!("demographic service response body: {e}")))?;
        Ok(Some(person))
    }

    async fn add_person(&self, person: PersonRecord) -> CdrResult<PersonRecord> {
        let url = format!("{}/people", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&person)
            .send()
            .await
            .map_err(|e| CdrError::Upstream(format!("demographic service add_person: {e}")))?
            .error_for_status()
            .map_err(|e| CdrError::Upstream(format!("demographic service add_person: {e}")))?;
        response
            .json::<PersonRecord>()
            .await
            .map_err(|e| CdrError::Upstream(format!("demographic service response body: {e}")))
    }

    async fn delete_person(&self, person_id: i64, reason: &str) -> CdrResult<()> {
        let url = format!("{}/people/{}", self.base_url, person_id);
        self.http
            .delete(&url)
            .json(&VoidRequestBody { void_reason: reason })
            .send()
            .await
            .map_err(|e| CdrError::Upstream(format!("demographic service delete_person: {e}")))?
            .error_for_status()
            .map_err(|e| CdrError::Upstream(format!("demographic service delete_person: {e}")))?;
        Ok(())
    }
}

/// HTTP client for the metadata service.
#[derive(Clone)]
pub struct HttpMetadataClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMetadataClient {
    pub fn new(cfg: &CoreConfig) -> CdrResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.external_call_timeout())
            .build()
            .map_err(|e| CdrError::Upstream(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: cfg.metadata_base_url().to_string(),
        })
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn get_location(&self, location_id: i32) -> CdrResult<Option<LocationRecord>> {
        let url = format!("{}/locations/{}", self.base_url, location_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CdrError::Upstream(format!("metadata service get_location: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| CdrError::Upstream(format!("metadata service get_location: {e}")))?;
        let location = response
            .json::<LocationRecord>()
            .await
            .map_err(|e| CdrError::Upstream(format!("metadata service response body: {e}")))?;
        Ok(Some(location))
    }
}
