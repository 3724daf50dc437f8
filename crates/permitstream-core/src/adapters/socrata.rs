//! Adapter for Socrata open-data resource endpoints.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

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

/// Column names for one Socrata resource.
#[derive(Debug, Clone)]
pub struct SocrataFieldMap {
    pub permit_number: &'static str,
    /// Address components joined with `", "`; most resources split the
    /// street, city, and state into separate columns.
    pub address_parts: &'static [&'static str],
    pub permit_type: &'static str,
    pub value: &'static str,
    pub issue_date: &'static str,
    pub status: &'static str,
}

/// Static description of one Socrata-backed source.
#[derive(Debug, Clone)]
pub struct SocrataSpec {
    pub id: SourceId,
    pub url: &'static str,
    pub fields: SocrataFieldMap,
    /// Resources whose date column rejects `$where` comparisons are
    /// fetched unfiltered and trimmed client-side instead.
    pub server_side_date_filter: bool,
}

/// Socrata resource adapter.
pub struct SocrataAdapter {
    spec: SocrataSpec,
    http: Arc<dyn HttpClient>,
    policy: RetryPolicy,
    pacing: Pacing,
}

impl SocrataAdapter {
    pub fn new(
        spec: SocrataSpec,
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

    async fn fetch_batch(
        &self,
        since: Date,
        offset: usize,
        limit: usize,
    ) -> Result<Page, FetchError> {
        let mut request = HttpRequest::get(self.spec.url)
            .with_query("$order", format!("{} DESC", self.spec.fields.issue_date))
            .with_query("$limit", limit.to_string())
            .with_query("$offset", offset.to_string());
        if self.spec.server_side_date_filter {
            request = request.with_query(
                "$where",
                format!("{} >= '{}'", self.spec.fields.issue_date, format_day(since)),
            );
        }

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

        let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&response.body)
            .map_err(|e| FetchError::malformed_payload(format!("socrata payload: {e}")))?;

        let raw_count = rows.len();
        let records = rows
            .iter()
            .filter_map(|row| self.normalize(row))
            .filter(|record| {
                // Client-side date trim for resources without $where support.
                // Undated records are kept; dropping them would lose leads.
                self.spec.server_side_date_filter
                    || record.issue_date.map_or(true, |date| date >= since)
            })
            .collect();
        Ok(Page { records, raw_count })
    }

    fn normalize(&self, row: &serde_json::Map<String, Value>) -> Option<PermitRecord> {
        let fields = &self.spec.fields;
        let field = |name: &str| row.get(name).unwrap_or(&Value::Null);

        let permit_number = parse_text(field(fields.permit_number)).unwrap_or_default();
        let address = fields
            .address_parts
            .iter()
            .filter_map(|part| parse_text(field(part)))
            .collect::<Vec<_>>()
            .join(", ");
        if permit_number.is_empty() && address.is_empty() {
            debug!(source_id = %self.spec.id, "dropping row with no identity");
            return None;
        }

        Some(PermitRecord {
            source_id: self.spec.id.as_str().to_owned(),
            permit_number,
            address,
            permit_type: parse_text(field(fields.permit_type)).unwrap_or_default(),
            estimated_value: parse_currency(field(fields.value)),
            issue_date: parse_issue_date(field(fields.issue_date), DateEncoding::Iso8601),
            status: parse_text(field(fields.status)),
            scraped_at: OffsetDateTime::now_utc(),
        })
    }
}

impl SourceAdapter for SocrataAdapter {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpError, HttpResponse};
    use serde_json::json;
    use std::sync::Mutex;

    struct ScriptedHttpClient {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>
        {
            self.requests.lock().expect("lock").push(request);
            let next = {
                let mut responses = self.responses.lock().expect("lock");
                if responses.is_empty() {
                    Ok(HttpResponse::ok_json("[]"))
                } else {
                    responses.remove(0)
                }
            };
            Box::pin(async move { next })
        }
    }

    fn spec() -> SocrataSpec {
        SocrataSpec {
            id: SourceId::new("houston").expect("valid id"),
            url: "https://data.houstontexas.gov/resource/msrk-w9d7.json",
            fields: SocrataFieldMap {
                permit_number: "permit_num",
                address_parts: &["original_address1", "city", "state"],
                permit_type: "permit_type_desc",
                value: "total_job_valuation",
                issue_date: "issue_date",
                status: "status",
            },
            server_side_date_filter: true,
        }
    }

    #[tokio::test]
    async fn composes_address_from_parts() {
        let body = json!([{
            "permit_num": "H-1",
            "original_address1": "1000 Main St",
            "city": "Houston",
            "state": "TX",
            "permit_type_desc": "REMODEL",
            "total_job_valuation": "$250,000",
            "issue_date": "2026-07-01T00:00:00.000",
            "status": "ISSUED"
        }])
        .to_string();
        let http = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]));
        let adapter = SocrataAdapter::new(
            spec(),
            http.clone(),
            RetryPolicy::immediate(),
            Pacing::none(),
        );

        let records = adapter
            .fetch(FetchConstraints::default())
            .await
            .expect("fetch succeeds");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].address, "1000 Main St, Houston, TX");
        assert_eq!(records[0].estimated_value, Some(250_000.0));
        assert_eq!(
            records[0].issue_date,
            Some(time::macros::date!(2026 - 07 - 01))
        );

        let requests = http.requests.lock().expect("lock");
        let query = &requests[0].query;
        assert!(query
            .iter()
            .any(|(name, value)| name == "$where" && value.contains("issue_date >= '")));
        assert!(query.contains(&(String::from("$offset"), String::from("0"))));
    }

    #[tokio::test]
    async fn client_side_filter_trims_old_records_but_keeps_undated() {
        let mut spec = spec();
        spec.server_side_date_filter = false;
        let body = json!([
            { "permit_num": "H-OLD", "original_address1": "1 Old Rd", "issue_date": "2000-01-01T00:00:00.000" },
            { "permit_num": "H-UNDATED", "original_address1": "2 Mystery Ln" },
        ])
        .to_string();
        let http = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]));
        let adapter =
            SocrataAdapter::new(spec, http, RetryPolicy::immediate(), Pacing::none());

        let records = adapter
            .fetch(FetchConstraints::default())
            .await
            .expect("fetch succeeds");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].permit_number, "H-UNDATED");
    }

    #[tokio::test]
    async fn upstream_client_error_with_no_progress_propagates() {
        let http = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse {
            status: 400,
            body: String::from("bad $where"),
        })]));
        let adapter =
            SocrataAdapter::new(spec(), http, RetryPolicy::immediate(), Pacing::none());

        let result = adapter.fetch(FetchConstraints::default()).await;
        assert!(result.is_err());
    }
}
