//! XML-RPC `methodCall` builder

use crate::value::Value;
use quick_xml::escape::escape;
use std::collections::BTreeMap;

/// Serialize a method call
///
/// Booleans are sent as `<int>1</int>` / `<int>0</int>`, which is what the
/// softswitch expects. Struct members are written with the same scalar
/// rules; doubles, arrays and nested structs are sent as `<string>` of
/// their display form.
pub fn build_request(method: &str, params: &[Value]) -> String {
    let params_xml = if params.is_empty() {
        "<params></params>".to_string()
    } else {
        let encoded: String = params
            .iter()
            .map(|param| {
                let inner = match param {
                    Value::Struct(members) => encode_struct(members),
                    other => encode_scalar(other),
                };
                format!("<param><value>{}</value></param>", inner)
            })
            .collect();
        format!("<params>{}</params>", encoded)
    };

    format!(
        "<?xml version=\"1.0\"?>\n<methodCall>\n  <methodName>{}</methodName>\n  {}\n</methodCall>",
        escape(method),
        params_xml
    )
}

fn encode_scalar(value: &Value) -> String {
    match value {
        Value::Boolean(b) => format!("<int>{}</int>", i32::from(*b)),
        Value::Integer(i) => format!("<int>{}</int>", i),
        Value::String(s) => format!("<string>{}</string>", escape(s.as_str())),
        other => format!("<string>{}</string>", escape(other.to_string().as_str())),
    }
}

fn encode_struct(members: &BTreeMap<String, Value>) -> String {
    let encoded: String = members
        .iter()
        .map(|(name, value)| {
            format!(
                "<member><name>{}</name><value>{}</value></member>",
                escape(name.as_str()),
                encode_scalar(value)
            )
        })
        .collect();
    format!("<struct>{}</struct>", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params() {
        let xml = build_request("system.listMethods", &[]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\"?>\n<methodCall>\n  <methodName>system.listMethods</methodName>\n  <params></params>\n</methodCall>"
        );
    }

    #[test]
    fn test_scalars() {
        let xml = build_request(
            "getAccountInfo",
            &[Value::from("42"), Value::Integer(7), Value::Boolean(true), Value::Boolean(false)],
        );
        assert!(xml.contains(
            "<params><param><value><string>42</string></value></param>\
             <param><value><int>7</int></value></param>\
             <param><value><int>1</int></value></param>\
             <param><value><int>0</int></value></param></params>"
        ));
    }

    #[test]
    fn test_struct_members() {
        let mut members = BTreeMap::new();
        members.insert("i_customer".to_string(), Value::from("1"));
        members.insert("recursive".to_string(), Value::Boolean(true));
        let xml = build_request("listAllCalls", &[Value::Struct(members)]);
        assert!(xml.contains(
            "<param><value><struct>\
             <member><name>i_customer</name><value><string>1</string></value></member>\
             <member><name>recursive</name><value><int>1</int></value></member>\
             </struct></value></param>"
        ));
    }

    #[test]
    fn test_unsupported_kinds_fall_back_to_string() {
        let mut nested = BTreeMap::new();
        nested.insert("a".to_string(), Value::Integer(1));
        let mut members = BTreeMap::new();
        members.insert("inner".to_string(), Value::Struct(nested));
        members.insert("rate".to_string(), Value::Double(0.25));

        let xml = build_request("m", &[Value::Double(1.5), Value::Struct(members)]);
        assert!(xml.contains("<param><value><string>1.5</string></value></param>"));
        assert!(xml.contains("<name>rate</name><value><string>0.25</string></value>"));
        assert!(xml.contains("<name>inner</name><value><string>{&quot;a&quot;:1}</string></value>"));
    }

    #[test]
    fn test_escapes_markup() {
        let xml = build_request("m", &[Value::from("a<b & c>")]);
        assert!(xml.contains("<string>a&lt;b &amp; c&gt;</string>"));
    }
}
