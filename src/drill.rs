//! Submits a temporal drill and drives it to completion.

use chrono::NaiveDate;

use crate::error::{Result, SmipsError};
use crate::normalise::{self, TimeSeries, CSV_OUTPUT};
use crate::product::Product;
use crate::site::Site;
use crate::wps::request::{geo_json_point, point_schema, MIME_GEO_JSON};
use crate::wps::{ExecuteRequest, InputValue, Job, JobState, RequestedOutput, WpsService};

/// Identifier of the point-extraction process on the server.
pub const TEMPORAL_DRILL: &str = "temporalDrill";

/// Date format the drill expects its bounds in.
const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds the extraction request for one (site, product) pair.
pub fn drill_request(site: &Site, product: Product) -> ExecuteRequest {
    ExecuteRequest {
        process: TEMPORAL_DRILL.to_string(),
        inputs: vec![
            (
                "datasetId".to_string(),
                InputValue::Literal(product.dataset_id()),
            ),
            (
                "startDate".to_string(),
                InputValue::Literal(format_date(site.start)),
            ),
            (
                "endDate".to_string(),
                InputValue::Literal(format_date(site.end)),
            ),
            (
                "point".to_string(),
                InputValue::Complex {
                    mime_type: MIME_GEO_JSON.to_string(),
                    schema: point_schema(),
                    body: geo_json_point(site.lon, site.lat),
                },
            ),
        ],
        outputs: vec![RequestedOutput {
            identifier: CSV_OUTPUT.to_string(),
            mime_type: "text/csv".to_string(),
        }],
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// Polls until the job completes, reporting percent progress after each
/// check. The callback's final invocation is always 100.0, made exactly
/// once, whatever percentage the job itself last reported.
pub async fn wait_for_completion<W, F>(wps: &W, job: &mut Job, mut progress: F) -> Result<()>
where
    W: WpsService,
    F: FnMut(f32),
{
    while !job.is_complete() {
        job.status = wps
            .check_status(job)
            .await
            .map_err(|source| SmipsError::Polling {
                process: job.process.clone(),
                source,
            })?;

        // Everything under 100 is progress; the single terminal 100 is
        // issued after the loop, so an in-flight 100 never surfaces.
        let percent = job.percent_completed();
        if percent < 100.0 {
            progress(percent);
        }
    }
    progress(100.0);

    if let JobState::Failed { message } = &job.status.state {
        return Err(SmipsError::ProcessFailed {
            process: job.process.clone(),
            message: message.clone(),
        });
    }

    Ok(())
}

/// Downloads one normalised time series for a (site, product) pair.
pub async fn download_timeseries<W, F>(
    wps: &W,
    site: &Site,
    product: Product,
    progress: F,
) -> Result<TimeSeries>
where
    W: WpsService,
    F: FnMut(f32),
{
    let request = drill_request(site, product);
    let mut job = wps
        .execute(&request)
        .await
        .map_err(|source| SmipsError::Submission {
            process: TEMPORAL_DRILL.to_string(),
            source,
        })?;

    wait_for_completion(wps, &mut job, progress).await?;

    normalise::normalise(TEMPORAL_DRILL, job.outputs())
}

// -- Tests -------------------------------------------------------------------
