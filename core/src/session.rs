//! One request/response exchange: build, echo, send, print.

use crate::error::Result;
use crate::exchange::{self, Headers, Transport, WireRequest};
use crate::input::Request;
use crate::output::{self, FileWriter, Printer};

/// Protocol shown on the echoed request line.
const REQUEST_PROTO: &str = "HTTP/1.1";

/// What happened to the exchange, for exit-status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    /// `None` when the request was not sent (`--offline`).
    pub status: Option<u16>,
}

impl Outcome {
    /// 3, 4 or 5 for redirect, client and server error responses when
    /// `check_status` is set; 0 otherwise.
    pub fn exit_status(&self, check_status: bool) -> i32 {
        match self.status {
            Some(status) if check_status && (300..600).contains(&status) => {
                i32::from(status / 100)
            }
            _ => 0,
        }
    }
}

/// Runs the whole exchange for `request`, printing through `printer`.
///
/// The transport is not touched when `exchange_options.offline` is set.
pub fn execute(
    request: &Request,
    transport: &dyn Transport,
    exchange_options: &exchange::Options,
    output_options: &output::Options,
    printer: &mut dyn Printer,
) -> Result<Outcome> {
    let wire = exchange::build_request(request, exchange_options)?;

    if output_options.print_request_header || output_options.print_request_body {
        print_request(&wire, output_options, printer)?;
    }
    if exchange_options.offline {
        printer.flush()?;
        return Ok(Outcome::default());
    }

    let response = transport.send(&wire)?;

    if output_options.print_response_header {
        printer.print_status_line(&response.version, response.status, &response.reason)?;
        printer.print_headers(&response.headers)?;
        printer.flush()?;
    }

    if output_options.download {
        let file = FileWriter::new(&request.url, output_options);
        let length = response
            .content_length()
            .unwrap_or(response.body.len() as u64);
        printer.print_download(Some(length), &file.filename())?;
        printer.flush()?;
        file.download(&response.body)?;
    } else if output_options.print_response_body {
        printer.print_body(&response.body, response.content_type())?;
    }
    printer.flush()?;

    Ok(Outcome {
        status: Some(response.status),
    })
}

/// Echoes the request the way it goes on the wire, with the `Host` and
/// `Content-Length` headers the transport adds.
fn print_request(
    wire: &WireRequest,
    options: &output::Options,
    printer: &mut dyn Printer,
) -> Result<()> {
    if options.print_request_header {
        printer.print_request_line(&wire.method, &wire.request_target(), REQUEST_PROTO)?;
        printer.print_headers(&echo_headers(wire))?;
    }
    if options.print_request_body {
        if let Some(body) = &wire.body {
            printer.print_body(body, wire.headers.get("Content-Type"))?;
        }
    }
    printer.print_body(b"\n", None)?;
    printer.flush()
}

fn echo_headers(wire: &WireRequest) -> Headers {
    let mut headers = Headers::new();
    if !wire.headers.contains("Host") {
        headers.add("Host", wire.host());
    }
    for (name, value) in wire.headers.iter() {
        headers.add(name, value);
    }
    if wire.body.is_some() && !wire.headers.contains("Content-Length") {
        headers.add("Content-Length", wire.content_length().to_string());
    }
    headers
}
