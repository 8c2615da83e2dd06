use std::io::Write;

use colored::{Color, Colorize};
use serde_json::Value;

use super::{PlainPrinter, Printer};
use crate::error::Result;
use crate::exchange::Headers;

const INDENT_WIDTH: usize = 4;
const BINARY_NOTICE: &str = "+-----------------------------------------+\n\
                             | NOTE: binary data not shown in terminal |\n\
                             +-----------------------------------------+\n";

/// Colourises the exchange and re-indents JSON bodies.
///
/// Falls back to the plain output for anything that is not a parsable JSON
/// body.
pub struct PrettyPrinter<W> {
    plain: PlainPrinter<W>,
    enable_color: bool,
}

impl<W: Write> PrettyPrinter<W> {
    pub fn new(writer: W, enable_color: bool) -> Self {
        Self {
            plain: PlainPrinter::new(writer),
            enable_color,
        }
    }

    pub fn into_inner(self) -> W {
        self.plain.into_inner()
    }

    fn paint(&self, text: &str, color: Color, bold: bool) -> String {
        if !self.enable_color {
            return text.to_string();
        }
        let painted = text.color(color);
        if bold {
            painted.bold().to_string()
        } else {
            painted.to_string()
        }
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut buf = line.as_bytes().to_vec();
        buf.push(b'\n');
        self.plain.print_body(&buf, None)
    }

    fn format_json(&self, out: &mut String, value: &Value, depth: usize) {
        match value {
            Value::Null => out.push_str(&self.paint("null", Color::Red, true)),
            Value::Bool(b) => out.push_str(&self.paint(&b.to_string(), Color::Red, true)),
            Value::Number(n) => out.push_str(&self.paint(&n.to_string(), Color::Cyan, false)),
            Value::String(_) => out.push_str(&self.paint(&value.to_string(), Color::Yellow, false)),
            Value::Array(items) => {
                if items.is_empty() {
                    out.push_str("[]");
                    return;
                }
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    push_indent(out, depth + 1);
                    self.format_json(out, item, depth + 1);
                    if i + 1 < items.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                push_indent(out, depth);
                out.push(']');
            }
            Value::Object(map) => {
                if map.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    push_indent(out, depth + 1);
                    let quoted = Value::String(key.clone()).to_string();
                    out.push_str(&self.paint(&quoted, Color::Blue, false));
                    out.push_str(": ");
                    self.format_json(out, item, depth + 1);
                    if i + 1 < map.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                push_indent(out, depth);
                out.push('}');
            }
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    out.push_str(&" ".repeat(depth * INDENT_WIDTH));
}

/// `application/json`, ignoring parameters such as `charset`.
pub fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

impl<W: Write> Printer for PrettyPrinter<W> {
    fn print_request_line(&mut self, method: &str, target: &str, proto: &str) -> Result<()> {
        let line = format!(
            "{} {} {}",
            self.paint(method, Color::White, true),
            self.paint(target, Color::Green, true),
            self.paint(proto, Color::Blue, false),
        );
        self.write_line(&line)
    }

    fn print_status_line(&mut self, proto: &str, status: u16, reason: &str) -> Result<()> {
        let status_color = if (200..300).contains(&status) {
            Color::Green
        } else {
            Color::Yellow
        };
        let line = format!(
            "{} {}",
            self.paint(proto, Color::Blue, false),
            self.paint(&format!("{status} {reason}"), status_color, true),
        );
        self.write_line(&line)
    }

    fn print_headers(&mut self, headers: &Headers) -> Result<()> {
        for (name, value) in headers.iter() {
            let line = format!(
                "{}{} {}",
                self.paint(name, Color::White, false),
                self.paint(":", Color::White, false),
                self.paint(value, Color::Cyan, false),
            );
            self.write_line(&line)?;
        }
        self.write_line("")
    }

    fn print_body(&mut self, body: &[u8], content_type: Option<&str>) -> Result<()> {
        if body.contains(&0) {
            return self.plain.print_body(BINARY_NOTICE.as_bytes(), None);
        }
        if !is_json(content_type) {
            return self.plain.print_body(body, content_type);
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(value) => {
                let mut out = String::new();
                self.format_json(&mut out, &value, 0);
                self.write_line(&out)
            }
            Err(e) => {
                log::debug!("body is not valid JSON, printing as-is: {e}");
                self.plain.print_body(body, content_type)?;
                self.write_line("")
            }
        }
    }

    fn print_download(&mut self, length: Option<u64>, filename: &str) -> Result<()> {
        let target = self.paint(filename, Color::Green, true);
        self.plain.print_download(length, &target)
    }

    fn flush(&mut self) -> Result<()> {
        self.plain.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(body: &[u8], content_type: Option<&str>) -> String {
        let mut printer = PrettyPrinter::new(Vec::new(), false);
        printer.print_body(body, content_type).unwrap();
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(Some("application/json")));
        assert!(is_json(Some(" application/json; charset=utf-8")));
        assert!(!is_json(Some("text/html")));
        assert!(!is_json(None));
    }

    #[test]
    fn test_json_is_reindented() {
        let out = render(
            br#"{"name":"reqline","tags":["a",1,true,null],"empty":{},"list":[]}"#,
            Some("application/json"),
        );
        let expected = r#"{
    "name": "reqline",
    "tags": [
        "a",
        1,
        true,
        null
    ],
    "empty": {},
    "list": []
}
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_invalid_json_printed_as_is() {
        assert_eq!(render(b"{oops", Some("application/json")), "{oops\n");
    }

    #[test]
    fn test_non_json_falls_back_to_plain() {
        assert_eq!(render(b"<p>hi</p>", Some("text/html")), "<p>hi</p>");
    }

    #[test]
    fn test_binary_body_is_hidden() {
        let out = render(b"\x89PNG\x00\x01", Some("image/png"));
        assert!(out.contains("binary data not shown"));
    }

    #[test]
    fn test_status_line_without_color() {
        let mut printer = PrettyPrinter::new(Vec::new(), false);
        printer.print_status_line("HTTP/1.1", 404, "Not Found").unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(out, "HTTP/1.1 404 Not Found\n");
    }
}
