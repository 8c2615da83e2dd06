//! Core of the `reqline` HTTP client: request-item parsing, request
//! building and serialization, transport and printing of the exchange.

pub mod error;
pub mod exchange;
pub mod input;
pub mod output;
pub mod session;
pub mod version;

pub use crate::error::{Error, Result};
pub use crate::exchange::{build_request, HttpClient, Transport, WireRequest};
pub use crate::input::{parse_args, Request};
pub use crate::output::{new_printer, Printer};
pub use crate::session::{execute, Outcome};
