//! XML-RPC `methodResponse` parser
//!
//! The document is first read into a small element tree with quick-xml,
//! then decoded recursively.

use crate::error::SippyError;
use crate::value::Value;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn read_tree(xml: &str) -> Result<Element, SippyError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SippyError::Parse(format!("malformed XML: {}", e)))?;

        match event {
            Event::Start(e) => stack.push(Element::new(e.name().as_ref())),
            Event::Empty(e) => {
                let element = Element::new(e.name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| SippyError::Parse("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| SippyError::Parse(format!("bad text content: {}", e)))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(SippyError::Parse(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| SippyError::Parse("empty document".to_string()))
}

/// Decode the children of a `<value>` element
///
/// Type tags are inspected in fixed order: array, struct, string, int/i4,
/// boolean, double. A value with no known tag decodes to its text, or to
/// the text of its single child (`dateTime.iso8601`, `base64`, ...).
fn decode_value(value: &Element) -> Result<Value, SippyError> {
    if let Some(array) = value.child("array") {
        let items = match array.child("data") {
            Some(data) => data
                .children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        return Ok(Value::Array(items));
    }

    if let Some(st) = value.child("struct") {
        let mut members = BTreeMap::new();
        for member in st.children_named("member") {
            if let (Some(name), Some(inner)) = (member.child("name"), member.child("value")) {
                members.insert(name.text.clone(), decode_value(inner)?);
            }
        }
        return Ok(Value::Struct(members));
    }

    if let Some(s) = value.child("string") {
        return Ok(Value::String(s.text.clone()));
    }

    if let Some(int) = value.child("int").or_else(|| value.child("i4")) {
        return parse_scalar(&int.text, 0, |t| t.parse::<i64>().ok()).map(Value::Integer);
    }

    if let Some(b) = value.child("boolean") {
        return parse_scalar(&b.text, false, |t| match t {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        })
        .map(Value::Boolean);
    }

    if let Some(d) = value.child("double") {
        return parse_scalar(&d.text, 0.0, |t| t.parse::<f64>().ok()).map(Value::Double);
    }

    match value.children.as_slice() {
        [only] => Ok(Value::String(only.text.clone())),
        _ => Ok(Value::String(value.text.clone())),
    }
}

fn parse_scalar<T>(
    text: &str,
    empty: T,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, SippyError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(empty);
    }
    parse(text).ok_or_else(|| SippyError::Parse(format!("invalid scalar '{}'", text)))
}

/// Parse a `methodResponse` document
///
/// Returns the decoded value of the first `<param>`. A `<fault>` yields
/// [`SippyError::Fault`] carrying the decoded fault struct.
pub fn parse_response(xml: &str) -> Result<Value, SippyError> {
    let root = read_tree(xml)?;

    if let Some(fault) = root.child("fault") {
        let detail = match fault.child("value") {
            Some(value) => decode_value(value)?,
            None => Value::Struct(BTreeMap::new()),
        };
        return Err(SippyError::Fault(detail));
    }

    let value = root
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| SippyError::Parse("missing params/param/value".to_string()))?;

    decode_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::build_request;

    fn response(value_xml: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<methodResponse><params><param><value>{}</value></param></params></methodResponse>",
            value_xml
        )
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse_response(&response("<string>hi</string>")).unwrap(), Value::from("hi"));
        assert_eq!(parse_response(&response("<int>42</int>")).unwrap(), Value::Integer(42));
        assert_eq!(parse_response(&response("<i4>-3</i4>")).unwrap(), Value::Integer(-3));
        assert_eq!(parse_response(&response("<boolean>1</boolean>")).unwrap(), Value::Boolean(true));
        assert_eq!(parse_response(&response("<double>2.5</double>")).unwrap(), Value::Double(2.5));
        assert_eq!(parse_response(&response("bare")).unwrap(), Value::from("bare"));
    }

    #[test]
    fn test_empty_scalars_default() {
        assert_eq!(parse_response(&response("<string></string>")).unwrap(), Value::from(""));
        assert_eq!(parse_response(&response("<int/>")).unwrap(), Value::Integer(0));
        assert_eq!(parse_response(&response("<boolean></boolean>")).unwrap(), Value::Boolean(false));
        assert_eq!(parse_response(&response("<double></double>")).unwrap(), Value::Double(0.0));
    }

    #[test]
    fn test_entities_unescaped() {
        assert_eq!(
            parse_response(&response("<string>a &amp; b &lt;c&gt;</string>")).unwrap(),
            Value::from("a & b <c>")
        );
    }

    #[test]
    fn test_array_of_structs() {
        let xml = response(
            r#"<array><data>
                <value><struct>
                    <member><name>CLI</name><value><string>100</string></value></member>
                    <member><name>DURATION</name><value><int>12</int></value></member>
                </struct></value>
                <value><string>x</string></value>
            </data></array>"#,
        );
        let value = parse_response(&xml).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        let first = items[0].as_struct().unwrap();
        assert_eq!(first["CLI"], Value::from("100"));
        assert_eq!(first["DURATION"], Value::Integer(12));
        assert_eq!(items[1], Value::from("x"));
    }

    #[test]
    fn test_array_without_data_is_empty() {
        assert_eq!(parse_response(&response("<array></array>")).unwrap(), Value::Array(vec![]));
    }

    #[test]
    fn test_duplicate_struct_members_overwrite() {
        let xml = response(
            "<struct><member><name>k</name><value><int>1</int></value></member>\
             <member><name>k</name><value><int>2</int></value></member></struct>",
        );
        let value = parse_response(&xml).unwrap();
        assert_eq!(value.as_struct().unwrap()["k"], Value::Integer(2));
    }

    #[test]
    fn test_datetime_decodes_to_text() {
        let xml = response("<dateTime.iso8601>20240105T10:11:12</dateTime.iso8601>");
        assert_eq!(parse_response(&xml).unwrap(), Value::from("20240105T10:11:12"));
    }

    #[test]
    fn test_fault() {
        let xml = r#"<?xml version="1.0"?>
            <methodResponse><fault><value><struct>
                <member><name>faultCode</name><value><int>401</int></value></member>
                <member><name>faultString</name><value><string>Unauthorized</string></value></member>
            </struct></value></fault></methodResponse>"#;

        match parse_response(xml) {
            Err(SippyError::Fault(detail)) => {
                let members = detail.as_struct().unwrap();
                assert_eq!(members["faultCode"], Value::Integer(401));
                assert_eq!(members["faultString"], Value::from("Unauthorized"));
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_response("<methodResponse><params>"), Err(SippyError::Parse(_))));
        assert!(matches!(parse_response("not xml at all <"), Err(SippyError::Parse(_))));
        assert!(matches!(
            parse_response("<methodResponse></methodResponse>"),
            Err(SippyError::Parse(_))
        ));
        assert!(matches!(
            parse_response(&response("<int>twelve</int>")),
            Err(SippyError::Parse(_))
        ));
        assert!(matches!(parse_response(""), Err(SippyError::Parse(_))));
    }

    #[test]
    fn test_built_params_reparse() {
        let mut members = BTreeMap::new();
        members.insert("i_customer".to_string(), Value::from("7"));
        members.insert("recursive".to_string(), Value::Boolean(true));
        let params = [
            Value::from("hello"),
            Value::Integer(12),
            Value::Boolean(false),
            Value::Struct(members),
        ];

        // A response carrying the same param list as a request
        let request = build_request("echo", &params);
        let start = request.find("<params>").unwrap();
        let end = request.find("</params>").unwrap() + "</params>".len();
        let doc = format!("<methodResponse>{}</methodResponse>", &request[start..end]);

        let root = read_tree(&doc).unwrap();
        let decoded: Vec<Value> = root
            .child("params")
            .unwrap()
            .children_named("param")
            .map(|p| decode_value(p.child("value").unwrap()).unwrap())
            .collect();

        assert_eq!(decoded[0], Value::from("hello"));
        assert_eq!(decoded[1], Value::Integer(12));
        assert_eq!(decoded[2].as_bool(), Some(false));
        let st = decoded[3].as_struct().unwrap();
        assert_eq!(st["i_customer"], Value::from("7"));
        assert_eq!(st["recursive"].as_bool(), Some(true));
    }
}
