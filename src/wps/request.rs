//! Builds WPS `Execute` request documents.

use quick_xml::escape::escape;

/// Geometry MIME type the server accepts for point inputs.
pub const MIME_GEO_JSON: &str = "application/vnd.geo+json";

const SCHEMA_BASE: &str = "http://geojson.org/geojson-spec.html";
const SCHEMA_POINT: &str = "Point";

/// Schema URI identifying the GeoJSON `Point` shape.
pub fn point_schema() -> String {
    format!("{}#{}", SCHEMA_BASE, SCHEMA_POINT)
}

/// GeoJSON representation of a point, to two decimal places.
pub fn geo_json_point(lon: f64, lat: f64) -> String {
    format!(
        r#"{{ "type": "Point", "coordinates": [{:.2}, {:.2}] }}"#,
        lon, lat
    )
}

/// A process execution request: inputs by identifier, plus the output
/// channels to embed in the response.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteRequest {
    pub process: String,
    pub inputs: Vec<(String, InputValue)>,
    pub outputs: Vec<RequestedOutput>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Literal(String),
    Complex {
        mime_type: String,
        schema: String,
        body: String,
    },
}

/// An output channel requested as embedded text rather than a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedOutput {
    pub identifier: String,
    pub mime_type: String,
}

impl ExecuteRequest {
    /// Renders the stored-asynchronous-execution document the endpoint
    /// expects to be POSTed.
    pub fn to_xml(&self) -> String {
        let mut inputs = String::new();
        for (identifier, value) in &self.inputs {
            match value {
                InputValue::Literal(text) => {
                    inputs.push_str(&format!(
                        "<wps:Input><ows:Identifier>{}</ows:Identifier><wps:Data><wps:LiteralData>{}</wps:LiteralData></wps:Data></wps:Input>",
                        escape(identifier),
                        escape(text),
                    ));
                }
                InputValue::Complex {
                    mime_type,
                    schema,
                    body,
                } => {
                    inputs.push_str(&format!(
                        "<wps:Input><ows:Identifier>{}</ows:Identifier><wps:Data><wps:ComplexData mimeType=\"{}\" schema=\"{}\">{}</wps:ComplexData></wps:Data></wps:Input>",
                        escape(identifier),
                        escape(mime_type),
                        escape(schema),
                        escape(body),
                    ));
                }
            }
        }

        let mut outputs = String::new();
        for output in &self.outputs {
            outputs.push_str(&format!(
                "<wps:Output asReference=\"false\" mimeType=\"{}\"><ows:Identifier>{}</ows:Identifier></wps:Output>",
                escape(&output.mime_type),
                escape(&output.identifier),
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<wps:Execute service="WPS" version="1.0.0" xmlns:wps="http://www.opengis.net/wps/1.0.0" xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:Identifier>{identifier}</ows:Identifier>
  <wps:DataInputs>{inputs}</wps:DataInputs>
  <wps:ResponseForm>
    <wps:ResponseDocument storeExecuteResponse="true" status="true" lineage="true">{outputs}</wps:ResponseDocument>
  </wps:ResponseForm>
</wps:Execute>
"#,
            identifier = escape(&self.process),
            inputs = inputs,
            outputs = outputs,
        )
    }
}

// -- Tests -------------------------------------------------------------------
