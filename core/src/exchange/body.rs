use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use url::form_urlencoded;

use super::multipart::{content_disposition, MultipartWriter};
use super::resolve_field_value;
use crate::error::{Error, Result};
use crate::input::{Body, Field};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// An encoded body and the content type it implies.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct EncodedBody {
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl EncodedBody {
    fn new(body: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            body: Some(body),
            content_type: Some(content_type.into()),
        }
    }
}

pub(crate) fn build_body(body: &Body) -> Result<EncodedBody> {
    match body {
        Body::Empty => Ok(EncodedBody::default()),
        Body::Json {
            fields,
            raw_json_fields,
        } => build_json_body(fields, raw_json_fields),
        Body::Form { fields, files } if files.is_empty() => build_url_encoded_body(fields),
        Body::Form { fields, files } => build_multipart_body(fields, files),
        // Not sniffed: stdin bodies are assumed to be JSON.
        Body::Raw(raw) => Ok(EncodedBody::new(raw.clone(), JSON_CONTENT_TYPE)),
    }
}

fn build_json_body(fields: &[Field], raw_json_fields: &[Field]) -> Result<EncodedBody> {
    let mut object = Map::new();
    for field in fields {
        let value = resolve_field_value(field)?;
        object.insert(field.name.clone(), Value::String(value));
    }
    // Raw values win over plain fields of the same name.
    for field in raw_json_fields {
        let text = resolve_field_value(field)?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| Error::json(format!("parsing JSON value of '{}'", field.name), e))?;
        object.insert(field.name.clone(), value);
    }

    let body = serde_json::to_vec(&Value::Object(object))
        .map_err(|e| Error::json("marshaling JSON of HTTP body", e))?;
    Ok(EncodedBody::new(body, JSON_CONTENT_TYPE))
}

fn build_url_encoded_body(fields: &[Field]) -> Result<EncodedBody> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for field in fields {
        let value = resolve_field_value(field)?;
        serializer.append_pair(&field.name, &value);
    }
    Ok(EncodedBody::new(
        serializer.finish().into_bytes(),
        FORM_CONTENT_TYPE,
    ))
}

fn build_multipart_body(fields: &[Field], files: &[Field]) -> Result<EncodedBody> {
    let mut writer = MultipartWriter::new();

    for field in fields {
        let value = resolve_field_value(field)?;
        writer.write_part(&content_disposition(&field.name, None), value.as_bytes());
    }
    // Upload values are always paths; `name@path` has no inline form.
    for file in files {
        let filename = file_name(&file.value);
        let content = fs::read(&file.value)
            .map_err(|e| Error::io(format!("failed to read '{}'", file.value), e))?;
        writer.write_part(&content_disposition(&file.name, Some(&filename)), &content);
    }

    let content_type = writer.content_type();
    Ok(EncodedBody::new(writer.finish(), content_type))
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn path_of(file: &NamedTempFile) -> String {
        file.path().to_str().unwrap().to_string()
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(build_body(&Body::Empty).unwrap(), EncodedBody::default());
    }

    #[test]
    fn test_json_body() {
        let file = temp_file("test test");
        let body = Body::Json {
            fields: vec![
                Field::inline("foo", "bar"),
                Field::file("from_file", path_of(&file)),
            ],
            raw_json_fields: vec![
                Field::inline("boolean", "true"),
                Field::inline("array", r#"[1, null, "hello"]"#),
            ],
        };

        let encoded = build_body(&body).unwrap();

        let actual: Value = serde_json::from_slice(encoded.body.as_deref().unwrap()).unwrap();
        let expected = serde_json::json!({
            "foo": "bar",
            "from_file": "test test",
            "boolean": true,
            "array": [1, null, "hello"],
        });
        assert_eq!(actual, expected);
        assert_eq!(encoded.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_json_raw_field_is_native_value() {
        let body = Body::Json {
            fields: vec![Field::inline("hello", "world")],
            raw_json_fields: vec![Field::inline("flag", "true")],
        };
        let encoded = build_body(&body).unwrap();
        let actual: Value = serde_json::from_slice(encoded.body.as_deref().unwrap()).unwrap();
        assert_eq!(actual, serde_json::json!({"hello": "world", "flag": true}));
    }

    #[test]
    fn test_json_raw_field_overrides_plain_field() {
        let body = Body::Json {
            fields: vec![Field::inline("count", "one")],
            raw_json_fields: vec![Field::inline("count", "1")],
        };
        let encoded = build_body(&body).unwrap();
        let actual: Value = serde_json::from_slice(encoded.body.as_deref().unwrap()).unwrap();
        assert_eq!(actual, serde_json::json!({"count": 1}));
    }

    #[test]
    fn test_json_missing_file_names_field() {
        let body = Body::Json {
            fields: vec![Field::file("secret", "/no/such/file")],
            raw_json_fields: vec![],
        };
        let err = build_body(&body).unwrap_err();
        assert!(!err.is_usage());
        assert!(err.to_string().contains("'secret'"));
    }

    #[test]
    fn test_url_encoded_body() {
        let file = temp_file("love & peace");
        let body = Body::Form {
            fields: vec![
                Field::inline("foo", "bar"),
                Field::file("from_file", path_of(&file)),
            ],
            files: vec![],
        };

        let encoded = build_body(&body).unwrap();

        assert_eq!(
            encoded.body.as_deref(),
            Some(&b"foo=bar&from_file=love+%26+peace"[..])
        );
        assert_eq!(
            encoded.content_type.as_deref(),
            Some("application/x-www-form-urlencoded; charset=utf-8")
        );
    }

    #[test]
    fn test_multipart_body() {
        let file = temp_file("🍣 & 🍺");
        let file_name = file.path().file_name().unwrap().to_str().unwrap().to_string();
        let body = Body::Form {
            fields: vec![
                Field::inline("hello", "🍺 world!"),
                Field::inline(r#""double-quoted""#, "should be escaped"),
                Field::inline("from_stdin", "From STDIN"),
            ],
            files: vec![Field::file("file1", path_of(&file))],
        };

        let encoded = build_body(&body).unwrap();

        let expected = Regex::new(
            &[
                "^--[0-9a-f]+",
                &regex::escape(r#"Content-Disposition: form-data; name="hello""#),
                "",
                &regex::escape("🍺 world!"),
                "--[0-9a-f]+",
                &regex::escape("Content-Disposition: form-data; name*=utf-8''%22double-quoted%22"),
                "",
                "should be escaped",
                "--[0-9a-f]+",
                &regex::escape(r#"Content-Disposition: form-data; name="from_stdin""#),
                "",
                "From STDIN",
                "--[0-9a-f]+",
                &regex::escape(&format!(
                    r#"Content-Disposition: form-data; name="file1"; filename="{file_name}""#
                )),
                "",
                &regex::escape("🍣 & 🍺"),
                "--[0-9a-f]+--",
                "$",
            ]
            .join("\r\n"),
        )
        .unwrap();
        let actual = String::from_utf8(encoded.body.unwrap()).unwrap();
        assert!(expected.is_match(&actual), "unexpected body: {actual}");
        assert!(encoded
            .content_type
            .unwrap()
            .starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn test_multipart_missing_file() {
        let body = Body::Form {
            fields: vec![],
            files: vec![Field::file("upload", "/no/such/upload.bin")],
        };
        let err = build_body(&body).unwrap_err();
        assert!(err.to_string().contains("/no/such/upload.bin"));
    }

    #[test]
    fn test_raw_body_defaults_to_json() {
        let encoded = build_body(&Body::Raw(b"Hello, World!!".to_vec())).unwrap();
        assert_eq!(encoded.body.as_deref(), Some(&b"Hello, World!!"[..]));
        assert_eq!(encoded.content_type.as_deref(), Some("application/json"));
    }
}
