//! Built-in source catalog.
//!
//! One entry per supported jurisdiction, split by upstream family. The
//! endpoints and field names are facts about the public portals, so they
//! live here as data rather than configuration.

use std::sync::Arc;

use crate::adapter::SourceAdapter;
use crate::adapters::arcgis::{ArcGisAdapter, ArcGisFieldMap, ArcGisSpec};
use crate::adapters::socrata::{SocrataAdapter, SocrataFieldMap, SocrataSpec};
use crate::adapters::Pacing;
use crate::http::HttpClient;
use crate::normalize::DateEncoding;
use crate::retry::RetryPolicy;
use crate::source::SourceId;

fn source_id(value: &'static str) -> SourceId {
    SourceId::new(value).unwrap_or_else(|_| unreachable!("catalog ids are valid slugs"))
}

fn arcgis_specs() -> Vec<ArcGisSpec> {
    vec![
        ArcGisSpec {
            id: source_id("nashville"),
            url: "https://services2.arcgis.com/dUS8W8FLMfTccxJz/arcgis/rest/services/Building_Permits/FeatureServer/0/query",
            fields: ArcGisFieldMap {
                permit_number: "CASE_NUMBER",
                address: "LOCATION",
                address_suffix: Some(", Nashville, TN"),
                permit_type: "CASE_TYPE_DESC",
                value: "CONSTVAL",
                issue_date: "DATE_ISSUED",
                date_encoding: DateEncoding::EpochMillis,
                status: "STATUS_CODE",
            },
            // The service rejects DATE literals in `where`; rely on
            // DATE_ISSUED ordering plus the record cap.
            date_filtered: false,
        },
        ArcGisSpec {
            id: source_id("charlotte"),
            url: "https://services.arcgis.com/lQySeXwbBg53XWDi/arcgis/rest/services/building_permits/FeatureServer/0/query",
            fields: ArcGisFieldMap {
                permit_number: "PermitNum",
                address: "OriginalAddress1",
                address_suffix: Some(", Charlotte, NC"),
                permit_type: "Type",
                value: "EstProjectCost",
                issue_date: "IssuedDate",
                date_encoding: DateEncoding::Iso8601,
                status: "StatusCurrent",
            },
            date_filtered: true,
        },
        ArcGisSpec {
            id: source_id("phoenix"),
            url: "https://services1.arcgis.com/mpVYz37anSdrK4d8/arcgis/rest/services/Building_Permits/FeatureServer/0/query",
            fields: ArcGisFieldMap {
                permit_number: "permit_number",
                address: "address",
                address_suffix: None,
                permit_type: "work_type",
                value: "cost",
                issue_date: "issued_date",
                date_encoding: DateEncoding::EpochMillis,
                status: "status",
            },
            date_filtered: true,
        },
    ]
}

fn socrata_specs() -> Vec<SocrataSpec> {
    vec![
        SocrataSpec {
            id: source_id("houston"),
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
        },
        SocrataSpec {
            id: source_id("austin"),
            url: "https://data.austintexas.gov/resource/3syk-w9eu.json",
            fields: SocrataFieldMap {
                permit_number: "permit_num",
                address_parts: &["original_address1", "original_city", "original_state"],
                permit_type: "permit_type_desc",
                value: "total_job_valuation",
                issue_date: "issue_date",
                status: "status_current",
            },
            server_side_date_filter: true,
        },
        SocrataSpec {
            id: source_id("chattanooga"),
            url: "https://www.chattadata.org/resource/764y-vxm2.json",
            fields: SocrataFieldMap {
                permit_number: "permitnum",
                address_parts: &["originaladdress1", "originalcity", "originalstate", "originalzip"],
                permit_type: "permittype",
                value: "estprojectcost",
                issue_date: "issueddate",
                status: "statuscurrent",
            },
            // The issueddate column is text on this resource; $where
            // comparisons return 400s, so trimming happens client-side.
            server_side_date_filter: false,
        },
    ]
}

/// Every built-in source id, in run order.
pub fn builtin_source_ids() -> Vec<SourceId> {
    arcgis_specs()
        .into_iter()
        .map(|spec| spec.id)
        .chain(socrata_specs().into_iter().map(|spec| spec.id))
        .collect()
}

/// Instantiates the full built-in adapter set over one shared transport.
pub fn builtin_adapters(
    http: Arc<dyn HttpClient>,
    policy: RetryPolicy,
    pacing: Pacing,
) -> Vec<Arc<dyn SourceAdapter>> {
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();
    for spec in arcgis_specs() {
        adapters.push(Arc::new(ArcGisAdapter::new(
            spec,
            http.clone(),
            policy,
            pacing,
        )));
    }
    for spec in socrata_specs() {
        adapters.push(Arc::new(SocrataAdapter::new(
            spec,
            http.clone(),
            policy,
            pacing,
        )));
    }
    adapters
}
