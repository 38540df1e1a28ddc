//! # XML-RPC Binding
//!
//! Encodes `<methodCall>` documents and decodes `<methodResponse>` documents
//! into [`serde_json::Value`]s.
//!
//! Value mapping:
//!
//! | XML-RPC                         | JSON value               |
//! |---------------------------------|--------------------------|
//! | `string`, untyped text          | string                   |
//! | `int`, `i4`, `i8`               | integer                  |
//! | `boolean`                       | bool                     |
//! | `double`                        | number                   |
//! | `dateTime.iso8601`              | string (as sent)         |
//! | `base64`                        | string (decoded, lossy)  |
//! | `nil`                           | null                     |
//! | `array`                         | array                    |
//! | `struct`                        | object                   |

use crate::error::Error;
use crate::transport::{HttpSettings, Transport};
use base64::Engine;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Number, Value};
use std::fmt::Display;
use tracing::debug;

// =============================================================================
// TRANSPORT
// =============================================================================

/// XML-RPC-over-HTTP binding.
#[derive(Debug, Clone)]
pub struct XmlRpcTransport {
    url: String,
    client: reqwest::Client,
}

impl XmlRpcTransport {
    /// Create a transport with default settings (TLS verified, 30 s timeout).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        Self::with_settings(url, &HttpSettings::default())
    }

    /// Create a transport with explicit HTTP settings.
    pub fn with_settings(url: impl Into<String>, settings: &HttpSettings) -> Result<Self, Error> {
        Ok(Self {
            url: url.into(),
            client: settings.build_client()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for XmlRpcTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, Error> {
        debug!(method, binding = "xml", "remote call");

        let body = encode_call(method, &params);
        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        decode_response(&text)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encode a method call document.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?><methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn encode_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Null => out.push_str("<nil/>"),
        Value::Bool(b) => {
            out.push_str(if *b { "<boolean>1</boolean>" } else { "<boolean>0</boolean>" });
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // <int> is 32-bit on the wire
                if i32::try_from(i).is_ok() {
                    out.push_str(&format!("<int>{}</int>", i));
                } else {
                    out.push_str(&format!("<i8>{}</i8>", i));
                }
            } else if let Some(u) = n.as_u64() {
                out.push_str(&format!("<i8>{}</i8>", u));
            } else {
                out.push_str(&format!("<double>{}</double>", n));
            }
        }
        Value::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Object(map) => {
            out.push_str("<struct>");
            for (name, item) in map {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                encode_value(out, item);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a method response document.
///
/// A `<fault>` response is returned as [`Error::Fault`].
pub fn decode_response(xml: &str) -> Result<Value, Error> {
    let root = parse_document(xml)?;
    if root.name != "methodResponse" {
        return Err(Error::Protocol(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| Error::Xml("<fault> without <value>".to_string()))?;
        let fault = decode_value(value)?;
        return Err(Error::Fault {
            code: fault.get("faultCode").and_then(Value::as_i64).unwrap_or(0),
            message: fault
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        });
    }

    let value = root
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| Error::Protocol("<methodResponse> without a result value".to_string()))?;
    decode_value(value)
}

fn decode_value(value: &Element) -> Result<Value, Error> {
    // Untyped text is a string and keeps its whitespace. Once a typed child is
    // present, text around it is layout.
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text.clone()));
    };
    let text = typed.text.trim();

    match typed.name.as_str() {
        "string" => Ok(Value::String(typed.text.clone())),
        "dateTime.iso8601" => Ok(Value::String(text.to_string())),
        "int" | "i4" | "i8" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| Error::Xml(format!("bad integer {:?}: {}", text, e))),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(Error::Xml(format!("bad boolean {:?}", other))),
        },
        "double" => {
            let f: f64 = text
                .parse()
                .map_err(|e| Error::Xml(format!("bad double {:?}: {}", text, e)))?;
            Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
        }
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| Error::Xml(format!("bad base64: {}", e)))?;
            Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        }
        "nil" => Ok(Value::Null),
        "array" => {
            let Some(data) = typed.child("data") else {
                return Ok(Value::Array(Vec::new()));
            };
            let items = data
                .children
                .iter()
                .filter(|c| c.name == "value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(items))
        }
        "struct" => {
            let mut map = Map::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| Error::Xml("<member> without <name>".to_string()))?;
                let item = member
                    .child("value")
                    .ok_or_else(|| Error::Xml(format!("<member> {} without <value>", name.text)))?;
                map.insert(name.text.clone(), decode_value(item)?);
            }
            Ok(Value::Object(map))
        }
        other => Err(Error::Xml(format!("unsupported value type <{}>", other))),
    }
}

// =============================================================================
// DOCUMENT TREE
// =============================================================================

/// Minimal element tree; attributes are not used by XML-RPC.
#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

fn xml_error(e: impl Display) -> Error {
    Error::Xml(e.to_string())
}

fn parse_document(xml: &str) -> Result<Element, Error> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                stack.push(Element::new(name));
            }
            Event::Empty(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Element::new(name)),
                    None => return Ok(Element::new(name)),
                }
            }
            Event::End(_) => {
                let done = stack
                    .pop()
                    .ok_or_else(|| Error::Xml("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => return Ok(done),
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape().map_err(xml_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => return Err(Error::Xml("document ended before the root element closed".to_string())),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    fn response(value: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><methodResponse><params><param><value>{}</value></param></params></methodResponse>",
            value
        )
    }

    #[test]
    fn encode_login_call() {
        let xml = encode_call("auth.login", &[json!("admin"), json!("p&ss<")]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?><methodCall><methodName>auth.login</methodName><params>\
             <param><value><string>admin</string></value></param>\
             <param><value><string>p&amp;ss&lt;</string></value></param>\
             </params></methodCall>"
        );
    }

    #[test]
    fn encode_int_and_large_int() {
        let xml = encode_call("m", &[json!(1000010000), json!(10_000_000_000i64)]);
        assert!(xml.contains("<int>1000010000</int>"));
        assert!(xml.contains("<i8>10000000000</i8>"));
    }

    #[test]
    fn encode_nested_values() {
        let xml = encode_call("m", &[json!({"ids": [1, 2], "flag": true, "none": null})]);
        assert!(xml.contains("<struct><member><name>ids</name><value><array><data><value><int>1</int></value><value><int>2</int></value></data></array></value></member>"));
        assert!(xml.contains("<boolean>1</boolean>"));
        assert!(xml.contains("<nil/>"));
    }

    #[test]
    fn decode_string_result() {
        let v = decode_response(&response("<string>5x3a9f</string>")).unwrap();
        assert_eq!(v, json!("5x3a9f"));
    }

    #[test]
    fn decode_untyped_value_is_string() {
        let v = decode_response(&response("session-key")).unwrap();
        assert_eq!(v, json!("session-key"));
    }

    #[test]
    fn decode_scalars() {
        assert_eq!(decode_response(&response("<i4>42</i4>")).unwrap(), json!(42));
        assert_eq!(decode_response(&response("<int>-7</int>")).unwrap(), json!(-7));
        assert_eq!(decode_response(&response("<boolean>0</boolean>")).unwrap(), json!(false));
        assert_eq!(decode_response(&response("<double>2.5</double>")).unwrap(), json!(2.5));
        assert_eq!(decode_response(&response("<nil/>")).unwrap(), Value::Null);
        assert_eq!(
            decode_response(&response("<dateTime.iso8601>20240131T08:00:00</dateTime.iso8601>")).unwrap(),
            json!("20240131T08:00:00")
        );
        assert_eq!(decode_response(&response("<base64>aGVsbG8=</base64>")).unwrap(), json!("hello"));
    }

    #[test]
    fn decode_keeps_whitespace_inside_strings() {
        assert_eq!(decode_response(&response("<string>  tok  </string>")).unwrap(), json!("  tok  "));
        assert_eq!(decode_response(&response("  tok  ")).unwrap(), json!("  tok  "));
        assert_eq!(decode_response(&response("<string> </string>")).unwrap(), json!(" "));
    }

    #[test]
    fn decode_indented_document() {
        let xml = "<?xml version=\"1.0\"?>\n\
                   <methodResponse>\n\
                     <params>\n\
                       <param>\n\
                         <value>\n\
                           <struct>\n\
                             <member>\n\
                               <name>id</name>\n\
                               <value>\n  <i4> 1000010000 </i4>\n</value>\n\
                             </member>\n\
                             <member>\n\
                               <name>name</name>\n\
                               <value><string> web01</string></value>\n\
                             </member>\n\
                             <member>\n\
                               <name>active</name>\n\
                               <value><boolean>\n1\n</boolean></value>\n\
                             </member>\n\
                           </struct>\n\
                         </value>\n\
                       </param>\n\
                     </params>\n\
                   </methodResponse>\n";
        assert_eq!(
            decode_response(xml).unwrap(),
            json!({"id": 1000010000, "name": " web01", "active": true})
        );
    }

    #[test]
    fn decode_escaped_text() {
        let v = decode_response(&response("<string>a &amp; b</string>")).unwrap();
        assert_eq!(v, json!("a & b"));
    }

    #[test]
    fn decode_system_list() {
        let xml = response(
            "<array><data>\
               <value><struct>\
                 <member><name>id</name><value><i4>1000010000</i4></value></member>\
                 <member><name>name</name><value><string>web01</string></value></member>\
               </struct></value>\
               <value><struct>\
                 <member><name>id</name><value><i4>1000010001</i4></value></member>\
                 <member><name>name</name><value>db01</value></member>\
               </struct></value>\
             </data></array>",
        );
        let v = decode_response(&xml).unwrap();
        assert_eq!(
            v,
            json!([
                {"id": 1000010000, "name": "web01"},
                {"id": 1000010001, "name": "db01"}
            ])
        );
    }

    #[test]
    fn decode_empty_array() {
        assert_eq!(decode_response(&response("<array><data></data></array>")).unwrap(), json!([]));
        assert_eq!(decode_response(&response("<array><data/></array>")).unwrap(), json!([]));
    }

    #[test]
    fn decode_fault() {
        let xml = "<?xml version=\"1.0\"?><methodResponse><fault><value><struct>\
                   <member><name>faultCode</name><value><int>2950</int></value></member>\
                   <member><name>faultString</name><value><string>Either the password or username is incorrect.</string></value></member>\
                   </struct></value></fault></methodResponse>";
        match decode_response(xml) {
            Err(Error::Fault { code, message }) => {
                assert_eq!(code, 2950);
                assert_eq!(message, "Either the password or username is incorrect.");
            }
            other => panic!("Expected Fault, got: {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode_response("<html><body>502</body></html>"), Err(Error::Protocol(_))));
        assert!(matches!(decode_response("<methodResponse><params>"), Err(Error::Xml(_))));
        assert!(matches!(decode_response(&response("<int>many</int>")), Err(Error::Xml(_))));
        assert!(matches!(decode_response(&response("<float>1</float>")), Err(Error::Xml(_))));
    }

    #[test]
    fn decode_mismatched_tags() {
        assert!(decode_response("<methodResponse><params></param></methodResponse>").is_err());
    }
}
