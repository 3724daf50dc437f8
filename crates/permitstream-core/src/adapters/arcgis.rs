//! Adapter for ArcGIS feature-service query endpoints.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use time::{Date, Duration, OffsetDateTime};
use tracing::debug;

use permitstream_store::{format_day, PermitRecord};

use crate::adapter::{FetchConstraints, SourceAdapter};
use crate::adapters::pager::{fetch_paged, Page};
use crate::adapters::Pacing;
use crate::error::FetchError;
use crate::http::{HttpClient, HttpRequest};
use crate::normalize::{parse_currency, parse_issue_date, parse_text, DateEncoding};
use crate::retry::RetryPolicy;
use crate::source::SourceId;

/// Attribute names for one feature service.
#[derive(Debug, Clone)]
pub struct ArcGisFieldMap {
    pub permit_number: &'static str,
    pub address: &'static str,
    /// Appended to the raw address when the service stores street-only
    /// locations (e.g. `", Nashville, TN"`).
    pub address_suffix: Option<&'static str>,
    pub permit_type: &'static str,
    pub value: &'static str,
    pub issue_date: &'static str,
    pub date_encoding: DateEncoding,
    pub status: &'static str,
}

impl ArcGisFieldMap {
    fn out_fields(&self) -> String {
        [
            self.permit_number,
            self.address,
            self.permit_type,
            self.value,
            self.issue_date,
            self.status,
        ]
        .join(",")
    }
}

/// Static description of one ArcGIS-backed source.
#[derive(Debug, Clone)]
pub struct ArcGisSpec {
    pub id: SourceId,
    pub url: &'static str,
    pub fields: ArcGisFieldMap,
    /// Whether the service supports a date-bounded `where` clause.
    /// Services that reject `DATE` literals get `1=1` and rely on
    /// ordering plus the record cap instead.
    pub date_filtered: bool,
}

/// ArcGIS feature-service adapter.
pub struct ArcGisAdapter {
    spec: ArcGisSpec,
    http: Arc<dyn HttpClient>,
    policy: RetryPolicy,
    pacing: Pacing,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    attributes: serde_json::Map<String, Value>,
}

impl ArcGisAdapter {
    pub fn new(
        spec: ArcGisSpec,
        http: Arc<dyn HttpClient>,
        policy: RetryPolicy,
        pacing: Pacing,
    ) -> Self {
        Self {
            spec,
            http,
            policy,
            pacing,
        }
    }

    fn where_clause(&self, since: Date) -> String {
        if self.spec.date_filtered {
            format!(
                "{} >= DATE '{}'",
                self.spec.fields.issue_date,
                format_day(since)
            )
        } else {
            String::from("1=1")
        }
    }

    async fn fetch_batch(
        &self,
        since: Date,
        offset: usize,
        limit: usize,
    ) -> Result<Page, FetchError> {
        let request = HttpRequest::get(self.spec.url)
            .with_query("where", self.where_clause(since))
            .with_query("outFields", self.spec.fields.out_fields())
            .with_query(
                "orderByFields",
                format!("{} DESC", self.spec.fields.issue_date),
            )
            .with_query("resultOffset", offset.to_string())
            .with_query("resultRecordCount", limit.to_string())
            .with_query("returnGeometry", "false")
            .with_query("f", "json");

        let response = self.http.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(e.message())
            } else {
                FetchError::connect(e.message())
            }
        })?;
        if !response.is_success() {
            return Err(FetchError::upstream_status(response.status));
        }

        let payload: QueryResponse = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::malformed_payload(format!("arcgis payload: {e}")))?;
        if let Some(error) = payload.error {
            return Err(FetchError::internal(format!(
                "arcgis service error: {error}"
            )));
        }

        let raw_count = payload.features.len();
        let records = payload
            .features
            .into_iter()
            .filter_map(|feature| self.normalize(&feature.attributes))
            .collect();
        Ok(Page { records, raw_count })
    }

    /// Converts one feature's attributes into a record. Only features with
    /// neither a permit number nor an address are dropped; any other
    /// malformed field degrades to its default.
    fn normalize(&self, attributes: &serde_json::Map<String, Value>) -> Option<PermitRecord> {
        let fields = &self.spec.fields;
        let field = |name: &str| attributes.get(name).unwrap_or(&Value::Null);

        let permit_number = parse_text(field(fields.permit_number)).unwrap_or_default();
        let mut address = parse_text(field(fields.address)).unwrap_or_default();
        if permit_number.is_empty() && address.is_empty() {
            debug!(source_id = %self.spec.id, "dropping feature with no identity");
            return None;
        }
        if let Some(suffix) = fields.address_suffix {
            if !address.is_empty() {
                address.push_str(suffix);
            }
        }

        Some(PermitRecord {
            source_id: self.spec.id.as_str().to_owned(),
            permit_number,
            address,
            permit_type: parse_text(field(fields.permit_type)).unwrap_or_default(),
            estimated_value: parse_currency(field(fields.value)),
            issue_date: parse_issue_date(field(fields.issue_date), fields.date_encoding),
            status: parse_text(field(fields.status)),
            scraped_at: OffsetDateTime::now_utc(),
        })
    }
}

impl SourceAdapter for ArcGisAdapter {
    fn id(&self) -> &SourceId {
        &self.spec.id
    }

    fn fetch<'a>(
        &'a self,
        constraints: FetchConstraints,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PermitRecord>, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            let today = OffsetDateTime::now_utc().date();
            let since = today
                .checked_sub(Duration::days(i64::from(constraints.lookback_days)))
                .unwrap_or(today);

            fetch_paged(
                self.spec.id.as_str(),
                constraints,
                &self.policy,
                self.pacing,
                |offset, limit| self.fetch_batch(since, offset, limit),
            )
            .await
        })
    }
}
