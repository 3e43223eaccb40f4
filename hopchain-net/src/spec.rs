//! Parsing of the URL-like spec strings that configure chain links.
//!
//! The accepted grammar is `scheme://[userinfo@][authority][/path][?query][#fragment]`,
//! where every component but the scheme may be empty. This is deliberately
//! small: a spec describes one chain link, not a resource on the web.
//!
//! ```
//! use hopchain_net::DialerSpec;
//!
//! let spec: DialerSpec = "ws://1.2.3.4:8080/tunnel?host=example.com".parse().unwrap();
//! assert_eq!("ws", spec.scheme());
//! assert_eq!("1.2.3.4:8080", spec.authority());
//! assert_eq!("/tunnel", spec.path());
//! assert_eq!(Some("example.com".to_owned()), spec.query_param("host"));
//! ```

use percent_encoding::percent_decode_str;
use std::{fmt, str::FromStr};

/// A parsed chain link spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialerSpec {
    scheme: String,
    userinfo: Option<String>,
    authority: String,
    path: String,
    query: Option<String>,
}

/// Error returned when a spec string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecParseError {
    /// The spec does not start with `scheme://`.
    MissingScheme,
    /// The scheme contains characters other than `[a-zA-Z0-9+.-]`,
    /// or does not start with a letter.
    InvalidScheme(String),
    /// An ASCII control character was found at the given byte offset.
    ControlCharacter(usize),
    /// A space was found in the authority.
    InvalidAuthority(String),
    /// A `%` was not followed by two hex digits, the decoded bytes are
    /// not valid UTF-8, or the authority escapes an ASCII byte other
    /// than `%` itself.
    InvalidPercentEncoding(&'static str),
    /// The port of the authority is not numeric.
    InvalidPort(String),
    /// An IPv6 literal was opened with `[` but never closed.
    UnterminatedIpv6(String),
}

impl fmt::Display for SpecParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingScheme => write!(f, "missing scheme (expected `scheme://...`)"),
            Self::InvalidScheme(scheme) => write!(f, "invalid scheme: {scheme:?}"),
            Self::ControlCharacter(pos) => {
                write!(f, "invalid control character at position {pos}")
            }
            Self::InvalidAuthority(authority) => write!(f, "invalid authority: {authority:?}"),
            Self::InvalidPercentEncoding(component) => {
                write!(f, "invalid percent-encoding in {component}")
            }
            Self::InvalidPort(port) => write!(f, "invalid port: {port:?}"),
            Self::UnterminatedIpv6(authority) => {
                write!(f, "missing ']' in IPv6 authority: {authority:?}")
            }
        }
    }
}

impl std::error::Error for SpecParseError {}

impl DialerSpec {
    /// Parse a spec string.
    pub fn parse(s: &str) -> Result<Self, SpecParseError> {
        if let Some(pos) = s.bytes().position(|b| b < 0x20 || b == 0x7f) {
            return Err(SpecParseError::ControlCharacter(pos));
        }

        // fragments carry no meaning for a chain link
        let s = s.split_once('#').map_or(s, |(head, _)| head);

        let (scheme, rest) = s.split_once("://").ok_or(SpecParseError::MissingScheme)?;
        if !is_valid_scheme(scheme) {
            return Err(SpecParseError::InvalidScheme(scheme.to_owned()));
        }

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        let (raw_authority, raw_path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        let (userinfo, raw_host) = match raw_authority.rsplit_once('@') {
            Some((userinfo, host)) => (Some(userinfo), host),
            None => (None, raw_authority),
        };
        if raw_host.contains(' ') {
            return Err(SpecParseError::InvalidAuthority(raw_authority.to_owned()));
        }
        validate_port(raw_host)?;

        validate_authority_escapes(raw_host)?;
        let userinfo = userinfo.map(|u| decode(u, "userinfo")).transpose()?;
        let path = decode(raw_path, "path")?;
        if let Some(query) = query {
            validate_escapes(query, "query")?;
        }

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            userinfo,
            authority: raw_host.to_owned(),
            path,
            query: query.map(ToOwned::to_owned),
        })
    }

    /// The (lowercased) scheme, e.g. `"ws"`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The decoded userinfo, if the authority had one.
    #[must_use]
    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    /// The raw (never decoded) `host[:port]`, without userinfo. Possibly empty.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// The decoded path. Possibly empty.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw (still encoded) query, if any.
    #[must_use]
    pub fn raw_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The decoded value of the first query parameter named `key`.
    ///
    /// Keys and values are decoded as `application/x-www-form-urlencoded`,
    /// meaning that `+` decodes to a space.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.query
            .as_deref()?
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(k, _)| decode_form(k) == key)
            .map(|(_, v)| decode_form(v))
    }
}

impl FromStr for DialerSpec {
    type Err = SpecParseError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn validate_port(host: &str) -> Result<(), SpecParseError> {
    let port = if let Some(ipv6) = host.strip_prefix('[') {
        let Some((_, after)) = ipv6.split_once(']') else {
            return Err(SpecParseError::UnterminatedIpv6(host.to_owned()));
        };
        match after.strip_prefix(':') {
            Some(port) => port,
            None if after.is_empty() => return Ok(()),
            None => return Err(SpecParseError::InvalidPort(after.to_owned())),
        }
    } else {
        match host.rsplit_once(':') {
            Some((_, port)) => port,
            None => return Ok(()),
        }
    };

    if port.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(SpecParseError::InvalidPort(port.to_owned()))
    }
}

fn validate_escapes(s: &str, component: &'static str) -> Result<(), SpecParseError> {
    let bytes = s.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            match bytes.get(idx + 1..idx + 3) {
                Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => idx += 3,
                _ => return Err(SpecParseError::InvalidPercentEncoding(component)),
            }
        } else {
            idx += 1;
        }
    }
    Ok(())
}

// only `%25` and non-ASCII bytes may be escaped in a host
fn validate_authority_escapes(host: &str) -> Result<(), SpecParseError> {
    validate_escapes(host, "authority")?;
    let bytes = host.as_bytes();
    let escaped_ascii = bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'%')
        .any(|(idx, _)| bytes[idx + 1] < b'8' && &bytes[idx..idx + 3] != b"%25");
    if escaped_ascii {
        Err(SpecParseError::InvalidPercentEncoding("authority"))
    } else {
        Ok(())
    }
}

fn decode(s: &str, component: &'static str) -> Result<String, SpecParseError> {
    validate_escapes(s, component)?;
    percent_decode_str(s)
        .decode_utf8()
        .map(Into::into)
        .map_err(|_utf8_err| SpecParseError::InvalidPercentEncoding(component))
}

fn decode_form(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_decode_str(&s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_spec() {
        let spec = DialerSpec::parse("WS://user:pw@1.2.3.4:8080/a%20b?host=foo.com&x=1#frag")
            .unwrap();
        assert_eq!("ws", spec.scheme());
        assert_eq!(Some("user:pw"), spec.userinfo());
        assert_eq!("1.2.3.4:8080", spec.authority());
        assert_eq!("/a b", spec.path());
        assert_eq!(Some("host=foo.com&x=1"), spec.raw_query());
        assert_eq!(Some("foo.com".to_owned()), spec.query_param("host"));
        assert_eq!(Some("1".to_owned()), spec.query_param("x"));
        assert_eq!(None, spec.query_param("y"));
    }

    #[test]
    fn parse_empty_components() {
        for input in ["ws://", "ws://@", "ws://?", "ws://#x"] {
            let spec = DialerSpec::parse(input).unwrap();
            assert_eq!("", spec.authority(), "input: {input}");
            assert_eq!("", spec.path(), "input: {input}");
        }

        let spec = DialerSpec::parse("ws://@/path").unwrap();
        assert_eq!(Some(""), spec.userinfo());
        assert_eq!("", spec.authority());
        assert_eq!("/path", spec.path());
    }

    #[test]
    fn parse_ipv6_authority() {
        let spec = DialerSpec::parse("ws://[::1]:443/x").unwrap();
        assert_eq!("[::1]:443", spec.authority());
        let spec = DialerSpec::parse("ws://[::1]").unwrap();
        assert_eq!("[::1]", spec.authority());
    }

    #[test]
    fn authority_is_not_decoded() {
        let spec = DialerSpec::parse("ws://caf%C3%A9.example:80").unwrap();
        assert_eq!("caf%C3%A9.example:80", spec.authority());
        let spec = DialerSpec::parse("ws://h%25x").unwrap();
        assert_eq!("h%25x", spec.authority());
    }

    #[test]
    fn query_param_form_decoding() {
        let spec = DialerSpec::parse("ws://h?host=a+b%2Ec&host=second&flag").unwrap();
        assert_eq!(Some("a b.c".to_owned()), spec.query_param("host"));
        assert_eq!(Some(String::new()), spec.query_param("flag"));
    }

    #[test]
    fn parse_errors() {
        for (input, expected) in [
            ("1.2.3.4:80", SpecParseError::MissingScheme),
            ("ws:/x", SpecParseError::MissingScheme),
            ("9s://x", SpecParseError::InvalidScheme("9s".to_owned())),
            ("ws://a\nb", SpecParseError::ControlCharacter(6)),
            ("ws://a b:80", SpecParseError::InvalidAuthority("a b:80".to_owned())),
            ("ws://h/%zz", SpecParseError::InvalidPercentEncoding("path")),
            ("ws://h/%4", SpecParseError::InvalidPercentEncoding("path")),
            ("ws://h%g1:80", SpecParseError::InvalidPercentEncoding("authority")),
            ("ws://h%3A99", SpecParseError::InvalidPercentEncoding("authority")),
            ("ws://h%2F..%2Fx:80", SpecParseError::InvalidPercentEncoding("authority")),
            ("ws://h%2f:80", SpecParseError::InvalidPercentEncoding("authority")),
            ("ws://%40h:80", SpecParseError::InvalidPercentEncoding("authority")),
            ("ws://h?host=%", SpecParseError::InvalidPercentEncoding("query")),
            ("ws://h/%ff", SpecParseError::InvalidPercentEncoding("path")),
            ("ws://h:8o", SpecParseError::InvalidPort("8o".to_owned())),
            ("ws://[::1]x", SpecParseError::InvalidPort("x".to_owned())),
            ("ws://[::1:80", SpecParseError::UnterminatedIpv6("[::1:80".to_owned())),
        ] {
            assert_eq!(Err(expected), DialerSpec::parse(input), "input: {input:?}");
        }
    }
}
