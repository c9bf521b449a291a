//! Parses WPS execute-response and exception documents.
//!
//! A stored execute response carries the status location, one of five
//! status states, and (once succeeded, with lineage on) the embedded
//! output channels. Lineage also echoes the request's inputs and output
//! definitions back, so output capture is scoped to `ProcessOutputs`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{JobState, JobStatus, ProcessOutput, WpsError};

/// A parsed execute response: where to poll, and the status it reported.
#[derive(Debug, Clone)]
pub struct ExecuteResponse {
    pub status_location: Option<String>,
    pub status: JobStatus,
}

/// Parses an execute response, or the bare `ows:ExceptionReport` a WPS
/// serves when the request itself is rejected.
pub fn parse_execute_response(xml: &str) -> Result<ExecuteResponse, WpsError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut status_location = None;
    let mut state: Option<JobState> = None;
    let mut outputs: Vec<ProcessOutput> = Vec::new();

    let mut saw_execute_response = false;
    let mut is_exception_report = false;
    let mut in_process_outputs = false;
    let mut current_output: Option<ProcessOutput> = None;
    let mut in_output_identifier = false;
    let mut in_output_data = false;
    let mut in_exception_text = false;
    let mut exception_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ExecuteResponse" => {
                    saw_execute_response = true;
                    status_location = attr_value(&e, b"statusLocation")?;
                }
                b"ExceptionReport" if !saw_execute_response => is_exception_report = true,
                b"ProcessAccepted" => state = Some(JobState::Accepted),
                b"ProcessStarted" => {
                    state = Some(JobState::Started {
                        percent: percent_attr(&e)?,
                    })
                }
                b"ProcessPaused" => {
                    state = Some(JobState::Paused {
                        percent: percent_attr(&e)?,
                    })
                }
                b"ProcessSucceeded" => state = Some(JobState::Succeeded),
                b"ProcessOutputs" => in_process_outputs = true,
                b"Output" if in_process_outputs => {
                    current_output = Some(ProcessOutput {
                        identifier: String::new(),
                        chunks: Vec::new(),
                    })
                }
                b"Identifier" if current_output.is_some() && !in_output_data => {
                    in_output_identifier = true
                }
                b"ComplexData" | b"LiteralData" if current_output.is_some() => {
                    in_output_data = true
                }
                b"ExceptionText" => in_exception_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"ProcessAccepted" => state = Some(JobState::Accepted),
                b"ProcessStarted" => {
                    state = Some(JobState::Started {
                        percent: percent_attr(&e)?,
                    })
                }
                b"ProcessPaused" => {
                    state = Some(JobState::Paused {
                        percent: percent_attr(&e)?,
                    })
                }
                b"ProcessSucceeded" => state = Some(JobState::Succeeded),
                b"ProcessFailed" => {
                    state = Some(JobState::Failed {
                        message: "process failed".to_string(),
                    })
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_output_identifier {
                    if let Some(output) = current_output.as_mut() {
                        output.identifier.push_str(&t.unescape()?);
                    }
                } else if in_output_data {
                    if let Some(output) = current_output.as_mut() {
                        output.chunks.push(t.unescape()?.into_owned());
                    }
                } else if in_exception_text {
                    exception_text.push_str(&t.unescape()?);
                }
            }
            Ok(Event::CData(t)) => {
                if in_output_data {
                    if let Some(output) = current_output.as_mut() {
                        output
                            .chunks
                            .push(String::from_utf8_lossy(&t.into_inner()).into_owned());
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"ProcessOutputs" => in_process_outputs = false,
                b"Output" => {
                    if let Some(mut output) = current_output.take() {
                        output.identifier = output.identifier.trim().to_string();
                        outputs.push(output);
                    }
                }
                b"Identifier" => in_output_identifier = false,
                b"ComplexData" | b"LiteralData" => in_output_data = false,
                b"ExceptionText" => in_exception_text = false,
                b"ProcessFailed" => {
                    let message = match exception_text.trim() {
                        "" => "process failed".to_string(),
                        text => text.to_string(),
                    };
                    state = Some(JobState::Failed { message });
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(WpsError::InvalidResponse(format!(
                    "invalid xml at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
        buf.clear();
    }

    if is_exception_report {
        let message = match exception_text.trim() {
            "" => "unspecified server exception".to_string(),
            text => text.to_string(),
        };
        return Err(WpsError::Exception(message));
    }

    let state = state.ok_or_else(|| {
        WpsError::InvalidResponse("no status in execute response".to_string())
    })?;

    Ok(ExecuteResponse {
        status_location,
        status: JobStatus { state, outputs },
    })
}

pub(super) fn attr_value(e: &BytesStart, name: &[u8]) -> Result<Option<String>, WpsError> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }

    Ok(None)
}

fn percent_attr(e: &BytesStart) -> Result<f32, WpsError> {
    match attr_value(e, b"percentCompleted")? {
        Some(raw) => raw.trim().parse::<f32>().map_err(|_| {
            WpsError::InvalidResponse(format!("bad percentCompleted `{}`", raw))
        }),
        None => Ok(0.0),
    }
}

// -- Tests -------------------------------------------------------------------
