use std::io::Write;

use super::{write_error, Printer};
use crate::error::Result;
use crate::exchange::Headers;

/// Writes everything verbatim, without colour or re-formatting.
pub struct PlainPrinter<W> {
    writer: W,
}

impl<W: Write> PlainPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Printer for PlainPrinter<W> {
    fn print_request_line(&mut self, method: &str, target: &str, proto: &str) -> Result<()> {
        writeln!(self.writer, "{method} {target} {proto}").map_err(write_error)
    }

    fn print_status_line(&mut self, proto: &str, status: u16, reason: &str) -> Result<()> {
        writeln!(self.writer, "{proto} {status} {reason}").map_err(write_error)
    }

    fn print_headers(&mut self, headers: &Headers) -> Result<()> {
        for (name, value) in headers.iter() {
            writeln!(self.writer, "{name}: {value}").map_err(write_error)?;
        }
        writeln!(self.writer).map_err(write_error)
    }

    fn print_body(&mut self, body: &[u8], _content_type: Option<&str>) -> Result<()> {
        self.writer.write_all(body).map_err(write_error)
    }

    fn print_download(&mut self, length: Option<u64>, filename: &str) -> Result<()> {
        match length {
            Some(length) => writeln!(self.writer, "Downloading {length} bytes to \"{filename}\""),
            None => writeln!(self.writer, "Downloading to \"{filename}\""),
        }
        .map_err(write_error)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(write_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_keep_insertion_order() {
        let headers: Headers = [("Zeta", "1"), ("Alpha", "2"), ("Zeta", "3")]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        let mut printer = PlainPrinter::new(Vec::new());
        printer.print_status_line("HTTP/1.1", 200, "OK").unwrap();
        printer.print_headers(&headers).unwrap();
        let out = String::from_utf8(printer.into_inner()).unwrap();
        assert_eq!(out, "HTTP/1.1 200 OK\nZeta: 1\nAlpha: 2\nZeta: 3\n\n");
    }

    #[test]
    fn test_body_is_verbatim() {
        let mut printer = PlainPrinter::new(Vec::new());
        printer
            .print_body(br#"{"a":1}"#, Some("application/json"))
            .unwrap();
        assert_eq!(printer.into_inner(), br#"{"a":1}"#);
    }
}
