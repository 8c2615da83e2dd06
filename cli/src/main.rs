mod flags;

use std::io::{self, BufWriter};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use colored::*;

use flags::{OptionSet, TerminalInfo};
use reqline_core::{execute, new_printer, parse_args, Error, HttpClient};

#[derive(Parser, Debug)]
#[command(
    name = "reqline",
    version = reqline_core::version::VERSION,
    about = "A friendly command-line HTTP client",
    override_usage = "reqline [FLAGS] [METHOD] URL [ITEM [ITEM ...]]",
    disable_help_flag = true,
    after_help = "\x1b[1;36mREQUEST ITEMS:\x1b[0m
  name:value      request header            X-Token:abc
  name==value     URL query parameter       q==rust
  name=value      data field (JSON string)  title=hello
  name:=json      raw JSON field            count:=3  tags:='[\"a\"]'
  name@path       form file upload          avatar@./me.png (needs --form)
  @-              read a value from stdin   token=@-

\x1b[1;36mEXAMPLES:\x1b[0m
  Simple GET:                     reqline example.com/api
  JSON POST:                      reqline POST example.com/items name=box size:=3
  Form upload:                    reqline -f POST example.com/upload file@report.pdf
  Body from stdin:                echo '{\"a\":1}' | reqline PUT example.com/items/1
  Inspect without sending:        reqline --offline POST example.com/items name=box
  Download a file:                reqline -d example.com/files/data.tar.gz"
)]
pub struct Args {
    #[arg(value_name = "[METHOD] URL [ITEM]")]
    pub args: Vec<String>,

    // JSON is already the default; the flag only cancels an earlier `--form`.
    #[arg(short = 'j', long, overrides_with = "form", help = "Serialize data items as a JSON object (default)")]
    pub json: bool,

    #[arg(short = 'f', long, overrides_with = "json", help = "Serialize data items as form fields")]
    pub form: bool,

    #[arg(short = 'p', long, value_name = "HBhb", help = "What the output should contain: H/B request header/body, h/b response header/body")]
    pub print: Option<String>,

    #[arg(short = 'v', long, help = "Print the request as well as the response (--print=HBhb)")]
    pub verbose: bool,

    #[arg(short = 'h', long, help = "Print only the response headers (--print=h)")]
    pub headers: bool,

    #[arg(short = 'b', long, help = "Print only the response body (--print=b)")]
    pub body: bool,

    #[arg(long, help = "Do not read the request body from stdin")]
    pub ignore_stdin: bool,

    #[arg(short = 'd', long, help = "Save the response body to a file")]
    pub download: bool,

    #[arg(short = 'o', long, value_name = "FILE", help = "Output file for --download")]
    pub output: Option<String>,

    #[arg(long, help = "Overwrite an existing download target")]
    pub overwrite: bool,

    #[arg(long, help = "Force HTTP/1.1")]
    pub http1: bool,

    #[arg(long, value_name = "yes|no", help = "Verify the server TLS certificate (default yes)")]
    pub verify: Option<String>,

    #[arg(long, default_value_t = flags::default_timeout(), help = "Timeout for the whole exchange, in seconds or as a duration (e.g. 500ms, 1m)")]
    pub timeout: String,

    #[arg(long, help = "Exit with 3, 4 or 5 on redirect, client error or server error responses")]
    pub check_status: bool,

    #[arg(short = 'a', long, value_name = "USER:PASS", help = "Basic authentication credentials")]
    pub auth: Option<String>,

    #[arg(long, value_name = "all|format|none", help = "Output formatting")]
    pub pretty: Option<String>,

    #[arg(short = 'F', long, help = "Follow 30x Location redirects")]
    pub follow: bool,

    #[arg(long, help = "Build and print the request without sending it")]
    pub offline: bool,

    #[arg(long, help = "Enable debug logging on stderr")]
    pub debug: bool,

    #[arg(long, action = ArgAction::Help, help = "Print help")]
    pub help: Option<bool>,
}

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let args = Args::parse();
    init_logger(args.debug);

    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            report(&e);
            process::exit(1);
        }
    }
}

fn init_logger(debug: bool) {
    let default_filter = if debug {
        "warn,reqline=debug,reqline_core=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> Result<i32> {
    let options = OptionSet::from_args(args, TerminalInfo::detect())?;
    colored::control::set_override(options.output.enable_color);

    let stdin = io::stdin();
    let request = parse_args(&args.args, stdin.lock(), &options.input)?;

    let client = HttpClient::new(&options.exchange)?;
    let stdout = io::stdout();
    let mut printer = new_printer(BufWriter::new(stdout.lock()), &options.output);

    let outcome = execute(
        &request,
        &client,
        &options.exchange,
        &options.output,
        printer.as_mut(),
    )
    .with_context(|| format!("{} {}", request.method, request.url))?;

    Ok(outcome.exit_status(options.exchange.check_status))
}

/// Usage errors are followed by the usage line; everything else gets its
/// cause chain.
fn report(err: &anyhow::Error) {
    let is_usage = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<Error>())
        .any(Error::is_usage);

    if is_usage {
        eprintln!("{} {}", "error:".red().bold(), err.root_cause());
        eprintln!();
        eprintln!("{}", Args::command().render_usage());
        eprintln!("For more information, try '--help'.");
        return;
    }

    eprintln!("{} {}", "error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}
