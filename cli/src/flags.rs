use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqline_core::exchange::options::DEFAULT_TIMEOUT;
use reqline_core::exchange::{self, Auth};
use reqline_core::{input, output, Error, Result};

use crate::Args;

static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9.]+$").expect("number pattern is valid"));

/// Whether stdin and stdout are attached to a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalInfo {
    pub stdin_is_terminal: bool,
    pub stdout_is_terminal: bool,
}

impl TerminalInfo {
    pub fn detect() -> Self {
        use std::io::IsTerminal;
        Self {
            stdin_is_terminal: std::io::stdin().is_terminal(),
            stdout_is_terminal: std::io::stdout().is_terminal(),
        }
    }
}

/// Options for every stage of the exchange, derived from the flags.
#[derive(Debug, Clone, Default)]
pub struct OptionSet {
    pub input: input::Options,
    pub exchange: exchange::Options,
    pub output: output::Options,
}

impl OptionSet {
    pub fn from_args(args: &Args, terminal: TerminalInfo) -> Result<Self> {
        let input = input::Options {
            form: args.form,
            read_stdin: !args.ignore_stdin && !terminal.stdin_is_terminal,
        };

        let mut output = output::Options {
            download: args.download,
            output_file: args.output.clone(),
            overwrite: args.overwrite,
            ..output::Options::default()
        };
        parse_print_flag(args, terminal.stdout_is_terminal, &mut output)?;
        parse_pretty(args.pretty.as_deref(), terminal.stdout_is_terminal, &mut output)?;

        let mut exchange = exchange::Options {
            timeout: parse_timeout(&args.timeout)?,
            follow_redirects: args.follow,
            skip_verify: parse_verify(args.verify.as_deref())?,
            force_http1: args.http1,
            auth: args.auth.as_deref().map(Auth::parse).transpose()?,
            check_status: args.check_status,
            offline: args.offline,
        };
        if output.download {
            exchange.timeout = None;
            exchange.follow_redirects = true;
        }
        if exchange.offline {
            output.print_request_header = true;
            output.print_request_body = true;
            output.print_response_header = false;
            output.print_response_body = false;
        }

        log::debug!("options: {input:?} {exchange:?} {output:?}");
        Ok(Self {
            input,
            exchange,
            output,
        })
    }
}

fn parse_print_flag(
    args: &Args,
    stdout_is_terminal: bool,
    output: &mut output::Options,
) -> Result<()> {
    let Some(print) = &args.print else {
        if args.headers {
            output.print_response_header = true;
        } else if args.body {
            output.print_response_body = true;
        } else if args.verbose {
            output.print_request_header = true;
            output.print_request_body = true;
            output.print_response_header = true;
            output.print_response_body = true;
        } else {
            output.print_response_header = stdout_is_terminal;
            output.print_response_body = true;
        }
        return Ok(());
    };

    for c in print.chars() {
        match c {
            'H' => output.print_request_header = true,
            'B' => output.print_request_body = true,
            'h' => output.print_response_header = true,
            'b' => output.print_response_body = true,
            _ => {
                return Err(Error::usage(format!(
                    "invalid char in --print value (must consist of HBhb): {c}"
                )))
            }
        }
    }
    Ok(())
}

fn parse_pretty(
    pretty: Option<&str>,
    stdout_is_terminal: bool,
    output: &mut output::Options,
) -> Result<()> {
    let (format, color) = match pretty {
        None => (stdout_is_terminal, stdout_is_terminal),
        Some("all") => (true, true),
        Some("format") => (true, false),
        Some("none") => (false, false),
        Some("colors") => return Err(Error::usage("--pretty=colors is not supported")),
        Some(other) => return Err(Error::usage(format!("unknown value of --pretty: {other}"))),
    };
    output.enable_format = format;
    output.enable_color = color;
    Ok(())
}

fn parse_verify(verify: Option<&str>) -> Result<bool> {
    match verify.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("yes") => Ok(false),
        Some("no") => Ok(true),
        Some(_) => Err(Error::usage("--verify must be 'yes' or 'no'")),
    }
}

/// A bare number is seconds; otherwise a duration such as `500ms` or
/// `1m 30s`. Zero disables the timeout.
fn parse_timeout(value: &str) -> Result<Option<Duration>> {
    let invalid = || {
        Error::usage(format!(
            "value of --timeout must be a number or duration string: {value}"
        ))
    };

    let duration = if RE_NUMBER.is_match(value) {
        let secs: f64 = value.parse().map_err(|_| invalid())?;
        Duration::try_from_secs_f64(secs).map_err(|_| invalid())?
    } else {
        humantime::parse_duration(value).map_err(|e| {
            log::debug!("--timeout {value:?}: {e}");
            invalid()
        })?
    };

    if duration.is_zero() {
        Ok(None)
    } else {
        Ok(Some(duration))
    }
}

pub fn default_timeout() -> String {
    format!("{}s", DEFAULT_TIMEOUT.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str], terminal: TerminalInfo) -> Result<OptionSet> {
        let args = Args::try_parse_from(std::iter::once("reqline").chain(argv.iter().copied()))
            .unwrap();
        OptionSet::from_args(&args, terminal)
    }

    fn piped() -> TerminalInfo {
        TerminalInfo::default()
    }

    fn terminal() -> TerminalInfo {
        TerminalInfo {
            stdin_is_terminal: true,
            stdout_is_terminal: true,
        }
    }

    #[test]
    fn test_defaults_when_piped() {
        let options = parse(&["example.com"], piped()).unwrap();
        assert!(options.input.read_stdin);
        assert!(!options.input.form);
        assert_eq!(options.exchange.timeout, Some(Duration::from_secs(30)));
        assert!(!options.exchange.skip_verify);
        assert_eq!(
            options.output,
            output::Options {
                print_response_body: true,
                ..output::Options::default()
            }
        );
    }

    #[test]
    fn test_defaults_on_terminal() {
        let options = parse(&["example.com"], terminal()).unwrap();
        assert!(!options.input.read_stdin);
        assert!(options.output.print_response_header);
        assert!(options.output.print_response_body);
        assert!(options.output.enable_format);
        assert!(options.output.enable_color);
    }

    #[test]
    fn test_last_of_form_and_json_wins() {
        let options = parse(&["-f", "-j", "example.com"], piped()).unwrap();
        assert!(!options.input.form);
        let options = parse(&["-j", "-f", "example.com"], piped()).unwrap();
        assert!(options.input.form);
    }

    #[test]
    fn test_print_shortcuts() {
        let options = parse(&["-v", "example.com"], piped()).unwrap();
        assert!(options.output.print_request_header);
        assert!(options.output.print_request_body);
        assert!(options.output.print_response_header);
        assert!(options.output.print_response_body);

        let options = parse(&["-h", "example.com"], terminal()).unwrap();
        assert!(options.output.print_response_header);
        assert!(!options.output.print_response_body);

        let options = parse(&["-b", "example.com"], terminal()).unwrap();
        assert!(!options.output.print_response_header);
        assert!(options.output.print_response_body);
    }

    #[test]
    fn test_print_flag() {
        let options = parse(&["--print", "Hb", "-v", "example.com"], piped()).unwrap();
        assert!(options.output.print_request_header);
        assert!(!options.output.print_request_body);
        assert!(!options.output.print_response_header);
        assert!(options.output.print_response_body);

        let err = parse(&["--print", "Hx", "example.com"], piped()).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_pretty() {
        let options = parse(&["--pretty", "format", "example.com"], piped()).unwrap();
        assert!(options.output.enable_format);
        assert!(!options.output.enable_color);

        let options = parse(&["--pretty", "none", "example.com"], terminal()).unwrap();
        assert!(!options.output.enable_format);

        assert!(parse(&["--pretty", "colors", "example.com"], piped()).is_err());
        assert!(parse(&["--pretty", "rainbow", "example.com"], piped()).is_err());
    }

    #[test]
    fn test_parse_timeout() {
        let cases = [
            ("30", Some(Duration::from_secs(30))),
            ("1.5", Some(Duration::from_millis(1500))),
            ("30s", Some(Duration::from_secs(30))),
            ("250ms", Some(Duration::from_millis(250))),
            ("1m 30s", Some(Duration::from_secs(90))),
            ("0s", None),
            ("2h", Some(Duration::from_secs(7200))),
            ("0", None),
        ];
        for (value, expected) in cases {
            assert_eq!(parse_timeout(value).unwrap(), expected, "{value}");
        }
        for value in ["", "abc", "10x", "s", "1m foo"] {
            assert!(parse_timeout(value).is_err(), "{value}");
        }
    }

    #[test]
    fn test_verify() {
        let options = parse(&["--verify", "NO", "example.com"], piped()).unwrap();
        assert!(options.exchange.skip_verify);
        let options = parse(&["--verify", "yes", "example.com"], piped()).unwrap();
        assert!(!options.exchange.skip_verify);
        assert!(parse(&["--verify", "maybe", "example.com"], piped()).is_err());
    }

    #[test]
    fn test_download_disables_timeout_and_follows() {
        let options = parse(&["-d", "--timeout", "5", "example.com"], piped()).unwrap();
        assert!(options.output.download);
        assert_eq!(options.exchange.timeout, None);
        assert!(options.exchange.follow_redirects);
    }

    #[test]
    fn test_auth() {
        let options = parse(&["-a", "alice:secret", "example.com"], piped()).unwrap();
        let auth = options.exchange.auth.unwrap();
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.password, "secret");

        let err = parse(&["-a", "alice", "example.com"], piped()).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_offline_prints_request_only() {
        let options = parse(&["--offline", "-b", "example.com"], terminal()).unwrap();
        assert!(options.exchange.offline);
        assert!(options.output.print_request_header);
        assert!(options.output.print_request_body);
        assert!(!options.output.print_response_body);
    }
}
