//! JSON API over the generated dataset.

use axum::{extract::State, Json};
use axum_extra::extract::Query;
use chrono::NaiveDate;
use datafun_common::{DatafunError, Record, Region};
use datafun_core::filter::{filter, region_counts};
use datafun_core::FilterCriteria;
use serde::{Deserialize, Serialize};

use crate::error::WebResult;
use crate::handlers::pages::parse_date;
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub n: Option<usize>,
    #[serde(default)]
    pub region: Vec<String>,
    pub date_lo: Option<String>,
    pub date_hi: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegionCount {
    pub region: Region,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    /// Size of the generated dataset before filtering.
    pub total: usize,
    pub matched: usize,
    pub region_counts: Vec<RegionCount>,
    pub records: Vec<Record>,
}

/// GET /api/records — filtered dataset. Without filters every record is returned.
pub async fn api_records(
    State(state): State<SharedState>,
    Query(query): Query<RecordsQuery>,
) -> WebResult<Json<RecordsResponse>> {
    let n = query.n.unwrap_or(state.config.data.rows);
    let max = state.config.data.max_api_rows;
    if n > max {
        return Err(DatafunError::InvalidArgument(format!(
            "n must be at most {}, got {}",
            max, n
        ))
        .into());
    }
    let dataset = state.dataset_of(n)?;

    let regions = if query.region.is_empty() {
        Region::ALL.to_vec()
    } else {
        query
            .region
            .iter()
            .map(|r| r.parse::<Region>())
            .collect::<Result<Vec<_>, _>>()?
    };
    let criteria = FilterCriteria::new(
        regions,
        parse_date(query.date_lo.as_deref())?.unwrap_or(NaiveDate::MIN),
        parse_date(query.date_hi.as_deref())?.unwrap_or(NaiveDate::MAX),
    );

    let records = filter(&dataset, &criteria);
    let region_counts = region_counts(&records)
        .into_iter()
        .map(|(region, count)| RegionCount { region, count })
        .collect();

    Ok(Json(RecordsResponse {
        total: dataset.len(),
        matched: records.len(),
        region_counts,
        records,
    }))
}
