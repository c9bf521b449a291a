//! Parses `GetCapabilities` and `DescribeProcess` documents.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::response::attr_value;
use super::WpsError;

/// What a server says about itself: identification, the operations it
/// accepts and the processes it offers.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    pub service_type: String,
    pub title: String,
    pub description: String,
    pub operations: Vec<String>,
    pub processes: Vec<ProcessSummary>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessSummary {
    pub identifier: String,
    pub title: String,
    pub description: String,
}

/// Inputs and outputs of one process.
#[derive(Debug, Clone, Default)]
pub struct ProcessDescription {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub inputs: Vec<InputDescription>,
    pub outputs: Vec<OutputDescription>,
}

#[derive(Debug, Clone, Default)]
pub struct InputDescription {
    pub identifier: String,
    pub data_type: String,
    pub min_occurs: u32,
    pub max_occurs: u32,
}

#[derive(Debug, Clone, Default)]
pub struct OutputDescription {
    pub identifier: String,
    pub data_type: String,
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Abstract,
    ServiceType,
    Identifier,
    DataType,
}

pub fn parse_capabilities(xml: &str) -> Result<ServerInfo, WpsError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut info = ServerInfo::default();
    let mut in_identification = false;
    let mut in_offerings = false;
    let mut current_process: Option<ProcessSummary> = None;
    let mut capture: Option<Field> = None;
    let mut is_exception_report = false;
    let mut in_exception_text = false;
    let mut exception_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ExceptionReport" => is_exception_report = true,
                b"ExceptionText" => in_exception_text = true,
                b"ServiceIdentification" => in_identification = true,
                b"ProcessOfferings" => in_offerings = true,
                b"Process" if in_offerings => current_process = Some(ProcessSummary::default()),
                b"Operation" => {
                    if let Some(name) = attr_value(&e, b"name")? {
                        info.operations.push(name);
                    }
                }
                b"Title" if in_identification || current_process.is_some() => {
                    capture = Some(Field::Title)
                }
                b"Abstract" if in_identification || current_process.is_some() => {
                    capture = Some(Field::Abstract)
                }
                b"ServiceType" if in_identification => capture = Some(Field::ServiceType),
                b"Identifier" if current_process.is_some() => capture = Some(Field::Identifier),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_exception_text {
                    exception_text.push_str(&t.unescape()?);
                } else if let Some(field) = capture {
                    let text = t.unescape()?;
                    match (field, current_process.as_mut()) {
                        (Field::Title, Some(process)) => process.title.push_str(&text),
                        (Field::Abstract, Some(process)) => process.description.push_str(&text),
                        (Field::Identifier, Some(process)) => process.identifier.push_str(&text),
                        (Field::Title, None) => info.title.push_str(&text),
                        (Field::Abstract, None) => info.description.push_str(&text),
                        (Field::ServiceType, _) => info.service_type.push_str(&text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"ExceptionText" => in_exception_text = false,
                b"ServiceIdentification" => in_identification = false,
                b"ProcessOfferings" => in_offerings = false,
                b"Title" | b"Abstract" | b"ServiceType" | b"Identifier" => capture = None,
                b"Process" => {
                    if let Some(mut process) = current_process.take() {
                        process.identifier = trimmed(process.identifier);
                        process.title = trimmed(process.title);
                        process.description = trimmed(process.description);
                        info.processes.push(process);
                    }
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
        return Err(exception(exception_text));
    }

    info.title = trimmed(info.title);
    info.description = trimmed(info.description);
    info.service_type = trimmed(info.service_type);

    Ok(info)
}

pub fn parse_process_description(xml: &str) -> Result<ProcessDescription, WpsError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut description = ProcessDescription::default();
    let mut found = false;
    let mut current_input: Option<InputDescription> = None;
    let mut current_output: Option<OutputDescription> = None;
    let mut capture: Option<Field> = None;
    let mut is_exception_report = false;
    let mut in_exception_text = false;
    let mut exception_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ExceptionReport" => is_exception_report = true,
                b"ExceptionText" => in_exception_text = true,
                b"ProcessDescription" => found = true,
                b"Input" => current_input = Some(input_from(&e)?),
                b"Output" => current_output = Some(OutputDescription::default()),
                b"Identifier" => capture = Some(Field::Identifier),
                b"Title" if current_input.is_none() && current_output.is_none() => {
                    capture = Some(Field::Title)
                }
                b"Abstract" if current_input.is_none() && current_output.is_none() => {
                    capture = Some(Field::Abstract)
                }
                b"DataType" => capture = Some(Field::DataType),
                b"ComplexData" => {
                    if let Some(input) = current_input.as_mut() {
                        input.data_type = "ComplexData".to_string();
                    }
                }
                b"ComplexOutput" => {
                    if let Some(output) = current_output.as_mut() {
                        output.data_type = "ComplexData".to_string();
                    }
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_exception_text {
                    exception_text.push_str(&t.unescape()?);
                } else if let Some(field) = capture {
                    let text = t.unescape()?;
                    match field {
                        Field::Identifier => {
                            if let Some(input) = current_input.as_mut() {
                                input.identifier.push_str(&text);
                            } else if let Some(output) = current_output.as_mut() {
                                output.identifier.push_str(&text);
                            } else {
                                description.identifier.push_str(&text);
                            }
                        }
                        Field::Title => description.title.push_str(&text),
                        Field::Abstract => description.description.push_str(&text),
                        Field::DataType => {
                            if let Some(input) = current_input.as_mut() {
                                input.data_type.push_str(&text);
                            } else if let Some(output) = current_output.as_mut() {
                                output.data_type.push_str(&text);
                            }
                        }
                        Field::ServiceType => {}
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"ExceptionText" => in_exception_text = false,
                b"Identifier" | b"Title" | b"Abstract" | b"DataType" => capture = None,
                b"Input" => {
                    if let Some(mut input) = current_input.take() {
                        input.identifier = trimmed(input.identifier);
                        input.data_type = trimmed(input.data_type);
                        description.inputs.push(input);
                    }
                }
                b"Output" => {
                    if let Some(mut output) = current_output.take() {
                        output.identifier = trimmed(output.identifier);
                        output.data_type = trimmed(output.data_type);
                        description.outputs.push(output);
                    }
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
        return Err(exception(exception_text));
    }
    if !found {
        return Err(WpsError::InvalidResponse(
            "no process description in response".to_string(),
        ));
    }

    description.identifier = trimmed(description.identifier);
    description.title = trimmed(description.title);
    description.description = trimmed(description.description);

    Ok(description)
}

fn input_from(e: &BytesStart) -> Result<InputDescription, WpsError> {
    Ok(InputDescription {
        identifier: String::new(),
        data_type: String::new(),
        min_occurs: occurs_attr(e, b"minOccurs")?,
        max_occurs: occurs_attr(e, b"maxOccurs")?,
    })
}

// Occurrence bounds default to 1 when the server leaves them off.
fn occurs_attr(e: &BytesStart, name: &[u8]) -> Result<u32, WpsError> {
    Ok(match attr_value(e, name)? {
        Some(raw) => raw.trim().parse().unwrap_or(1),
        None => 1,
    })
}

fn exception(text: String) -> WpsError {
    let message = match text.trim() {
        "" => "unspecified server exception".to_string(),
        text => text.to_string(),
    };
    WpsError::Exception(message)
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

// -- Tests -------------------------------------------------------------------
