//! Printing of the request/response exchange.

pub mod download;
pub mod plain;
pub mod pretty;

use std::io::Write;

pub use download::FileWriter;
pub use plain::PlainPrinter;
pub use pretty::PrettyPrinter;

use crate::error::Result;
use crate::exchange::Headers;

/// Which parts of the exchange are printed, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub print_request_header: bool,
    pub print_request_body: bool,
    pub print_response_header: bool,
    pub print_response_body: bool,

    pub enable_format: bool,
    pub enable_color: bool,

    pub download: bool,
    pub output_file: Option<String>,
    pub overwrite: bool,
}

pub trait Printer {
    fn print_request_line(&mut self, method: &str, target: &str, proto: &str) -> Result<()>;
    fn print_status_line(&mut self, proto: &str, status: u16, reason: &str) -> Result<()>;
    /// Headers are printed in insertion order, followed by a blank line.
    fn print_headers(&mut self, headers: &Headers) -> Result<()>;
    fn print_body(&mut self, body: &[u8], content_type: Option<&str>) -> Result<()>;
    fn print_download(&mut self, length: Option<u64>, filename: &str) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// Pretty printing when formatting is enabled, verbatim output otherwise.
pub fn new_printer<'a, W: Write + 'a>(writer: W, options: &Options) -> Box<dyn Printer + 'a> {
    if options.enable_format {
        Box::new(PrettyPrinter::new(writer, options.enable_color))
    } else {
        Box::new(PlainPrinter::new(writer))
    }
}

pub(crate) fn write_error(e: std::io::Error) -> crate::error::Error {
    crate::error::Error::io("writing output", e)
}
