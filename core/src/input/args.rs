use std::fs;
use std::io::Read;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::{Body, BodyKind, Field, Method, Options, Request, Stdin};
use crate::error::{Error, Result};

const DEFAULT_SCHEME: &str = "http";
const DEFAULT_HOST: &str = "localhost";

static RE_METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").expect("method pattern is valid"));
static RE_HEADER_FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-!#$%&'*+.^_|~a-zA-Z0-9]+$").expect("header name pattern is valid")
});
static RE_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("scheme pattern is valid")
});

/// The operator an item was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    /// `name:value`
    Header,
    /// `name==value`
    UrlParameter,
    /// `name=value`
    DataField,
    /// `name:=json`
    RawJsonField,
    /// `name@path`
    FormFile,
}

/// Item fields collected before the method is known.
#[derive(Default)]
struct Items {
    parameters: Vec<Field>,
    headers: Vec<Field>,
    body: Body,
}

/// Parses `[METHOD] URL [ITEM ...]` into a [`Request`].
///
/// Standard input is read at most once: either by an `@-` item value or, when
/// `options.read_stdin` is set and no item took it, as the raw body.
pub fn parse_args<S: AsRef<str>, R: Read>(
    args: &[S],
    stdin: R,
    options: &Options,
) -> Result<Request> {
    let (method_arg, url_arg, item_args) = match args {
        [] => return Err(Error::usage("URL is required")),
        [url] => (None, url.as_ref(), &[][..]),
        [first, second, rest @ ..] if RE_METHOD.is_match(first.as_ref()) => {
            (Some(first.as_ref()), second.as_ref(), rest)
        }
        [url, rest @ ..] => (None, url.as_ref(), rest),
    };

    let url = parse_url(url_arg)?;

    let mut stdin = Stdin::new(stdin);
    let mut items = Items::default();
    let preferred = options.preferred_body_kind();
    for arg in item_args {
        parse_item(arg.as_ref(), preferred, &mut items, &mut stdin)?;
    }

    if options.read_stdin && !stdin.is_consumed() {
        if !items.body.is_empty() {
            return Err(Error::usage(
                "body and item cannot be mixed: request body (from stdin) and request items (key=value) were both given",
            ));
        }
        items.body = Body::Raw(stdin.read_all("the request body")?);
    }

    let method = match method_arg {
        Some(token) => Method::new(token),
        None => guess_method(&items.body),
    };
    log::debug!("parsed request: {} {}", method, url);

    Ok(Request {
        method,
        url,
        parameters: items.parameters,
        headers: items.headers,
        body: items.body,
    })
}

fn guess_method(body: &Body) -> Method {
    if body.is_empty() {
        Method::new("GET")
    } else {
        Method::new("POST")
    }
}

/// Normalizes a user-supplied URL.
///
/// `:8080/x` and `/x` imply `localhost`, a missing scheme implies `http`,
/// and the path is never empty.
pub fn parse_url(s: &str) -> Result<Url> {
    let mut s = s.to_string();

    // ex) :8080/hello or /hello
    if s.starts_with(':') || s.starts_with('/') {
        s = format!("{DEFAULT_HOST}{s}");
    }

    // ex) example.com/hello
    if !RE_SCHEME.is_match(&s) {
        s = format!("{DEFAULT_SCHEME}://{s}");
    }

    // A bare trailing ':' in the authority parses as "no port".
    let mut url = Url::parse(&s).map_err(|_| Error::usage(format!("Invalid URL: {s}")))?;
    if url.path().is_empty() {
        url.set_path("/");
    }
    Ok(url)
}

/// Splits an item at its operator.
///
/// The leftmost operator character wins; `:=` and `==` only beat `:` and `=`
/// when they start at that same position. Returns `None` when the item has no
/// operator at all.
pub fn split_item(s: &str) -> Option<(ItemKind, &str, &str)> {
    let bytes = s.as_bytes();
    for (i, c) in s.char_indices() {
        let doubled = bytes.get(i + 1) == Some(&b'=');
        match c {
            ':' if doubled => return Some((ItemKind::RawJsonField, &s[..i], &s[i + 2..])),
            ':' => return Some((ItemKind::Header, &s[..i], &s[i + 1..])),
            '=' if doubled => return Some((ItemKind::UrlParameter, &s[..i], &s[i + 2..])),
            '=' => return Some((ItemKind::DataField, &s[..i], &s[i + 1..])),
            '@' => return Some((ItemKind::FormFile, &s[..i], &s[i + 1..])),
            _ => {}
        }
    }
    None
}

fn parse_item<R: Read>(
    item: &str,
    preferred: BodyKind,
    items: &mut Items,
    stdin: &mut Stdin<R>,
) -> Result<()> {
    let Some((kind, name, value)) = split_item(item) else {
        return Err(Error::usage(format!("unknown request item: {item}")));
    };
    log::debug!("request item {item:?} parsed as {kind:?}");

    match kind {
        ItemKind::DataField => {
            let field = parse_field(name, value, stdin)?;
            if items.body.kind().is_none() {
                items.body = Body::empty_of(preferred);
            }
            if let Body::Json { fields, .. } | Body::Form { fields, .. } = &mut items.body {
                fields.push(field);
            }
        }
        ItemKind::RawJsonField => {
            if preferred != BodyKind::Json || items.body.kind() == Some(BodyKind::Form) {
                return Err(Error::usage(
                    "raw JSON field item cannot be used in non-JSON body",
                ));
            }
            // Validate what will actually be sent, not the `@path` literal.
            let field = resolve_file(parse_field(name, value, stdin)?)?;
            if serde_json::from_str::<serde_json::Value>(&field.value).is_err() {
                return Err(Error::usage(format!(
                    "invalid JSON at '{}': {}",
                    name, field.value
                )));
            }
            if items.body.kind() != Some(BodyKind::Json) {
                items.body = Body::empty_of(BodyKind::Json);
            }
            if let Body::Json {
                raw_json_fields, ..
            } = &mut items.body
            {
                raw_json_fields.push(field);
            }
        }
        ItemKind::Header => {
            if !RE_HEADER_FIELD_NAME.is_match(name) {
                return Err(Error::usage(format!("invalid header field name: {name}")));
            }
            items.headers.push(parse_field(name, value, stdin)?);
        }
        ItemKind::UrlParameter => {
            items.parameters.push(parse_field(name, value, stdin)?);
        }
        ItemKind::FormFile => {
            if preferred != BodyKind::Form {
                return Err(Error::usage(
                    "form file field item cannot be used in non-form body (perhaps you meant --form?)",
                ));
            }
            if items.body.kind() != Some(BodyKind::Form) {
                items.body = Body::empty_of(BodyKind::Form);
            }
            if let Body::Form { files, .. } = &mut items.body {
                files.push(Field::file(name, value));
            }
        }
    }
    Ok(())
}

/// `@path` marks a file-backed value, `@-` takes standard input right away.
fn parse_field<R: Read>(name: &str, value: &str, stdin: &mut Stdin<R>) -> Result<Field> {
    match value.strip_prefix('@') {
        Some("-") => {
            let content = stdin.read_to_string(&format!("'{name}'"))?;
            Ok(Field::inline(name, content))
        }
        Some(path) => Ok(Field::file(name, path)),
        None => Ok(Field::inline(name, value)),
    }
}

fn resolve_file(field: Field) -> Result<Field> {
    if !field.is_file {
        return Ok(field);
    }
    let content = fs::read_to_string(&field.value)
        .map_err(|e| Error::io(format!("reading field value of '{}'", field.name), e))?;
    Ok(Field::inline(field.name, content))
}
