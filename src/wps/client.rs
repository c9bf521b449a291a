//! HTTP access to a WPS endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::time::sleep;

use super::describe::{
    parse_capabilities, parse_process_description, ProcessDescription, ServerInfo,
};
use super::request::ExecuteRequest;
use super::response::parse_execute_response;
use super::{Job, JobStatus, WpsError, WpsService};

/// Interval between status checks of a stored execute response.
const POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// A connection to one WPS endpoint, built once and shared for the run.
#[derive(Debug, Clone)]
pub struct WpsClient {
    http: Client,
    endpoint: String,
    poll_interval: Duration,
}

impl WpsClient {
    pub fn new(endpoint: &str) -> Self {
        WpsClient {
            http: Client::new(),
            endpoint: endpoint.to_string(),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// `GetCapabilities`: identification, operations and process catalogue.
    pub async fn capabilities(&self) -> Result<ServerInfo, WpsError> {
        let url = format!("{}?service=WPS&request=GetCapabilities", self.endpoint);
        let xml = self.http.get(&url).send().await?.text().await?;

        parse_capabilities(&xml)
    }

    /// `DescribeProcess`: the inputs and outputs of one process.
    pub async fn describe_process(&self, process: &str) -> Result<ProcessDescription, WpsError> {
        let url = format!(
            "{}?service=WPS&request=DescribeProcess&version=1.0.0&identifier={}",
            self.endpoint, process
        );
        let xml = self.http.get(&url).send().await?.text().await?;

        parse_process_description(&xml)
    }
}

#[async_trait]
impl WpsService for WpsClient {
    async fn execute(&self, request: &ExecuteRequest) -> Result<Job, WpsError> {
        let xml = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "text/xml")
            .body(request.to_xml())
            .send()
            .await?
            .text()
            .await?;

        let response = parse_execute_response(&xml)?;
        let status_location = response.status_location.ok_or_else(|| {
            WpsError::InvalidResponse("execute response has no statusLocation".to_string())
        })?;

        Ok(Job {
            process: request.process.clone(),
            status_location,
            status: response.status,
        })
    }

    async fn check_status(&self, job: &Job) -> Result<JobStatus, WpsError> {
        // The stored response only moves every few seconds; wait first,
        // then fetch, the cadence the server documentation recommends.
        sleep(self.poll_interval).await;

        let xml = self
            .http
            .get(&job.status_location)
            .send()
            .await?
            .text()
            .await?;

        Ok(parse_execute_response(&xml)?.status)
    }
}
