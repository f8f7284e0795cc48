//! Low-level transport flags.
//!
//! The `transport` section of the configuration is an open map of
//! client-builder toggles. Every name in it must match a [`TransportFlag`]
//! variant; unknown names are a hard error at configuration-load time rather
//! than being silently skipped, so a typo in a suite configuration surfaces
//! immediately.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::ClientBuilder;
use reqwest::redirect::Policy;
use serde_json::Value;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error_handling::ConfigurationError;

/// Recognized low-level transport flags.
///
/// Flag names are the snake_case form of the variant (e.g. `tcp_nodelay`),
/// each mapped onto the corresponding `reqwest` client-builder call.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum TransportFlag {
    /// Set `TCP_NODELAY` on sockets (boolean).
    TcpNodelay,
    /// TCP keepalive interval in seconds (integer).
    TcpKeepalive,
    /// Maximum idle connections per host (integer).
    PoolMaxIdlePerHost,
    /// Idle connection pool timeout in seconds (integer).
    PoolIdleTimeout,
    /// Restrict the client to HTTP/1 (boolean).
    Http1Only,
    /// Speak HTTP/2 without upgrade negotiation (boolean).
    Http2PriorKnowledge,
    /// Maximum redirect hops to follow; `0` disables redirects (integer).
    MaxRedirects,
    /// Automatically populate the `Referer` header on redirects (boolean).
    Referer,
    /// Log connection-level events through the transport's tracing (boolean).
    ConnectionVerbose,
}

/// Typed value of a transport flag, fixed at configuration-load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FlagValue {
    Bool(bool),
    Uint(u64),
}

impl TransportFlag {
    /// Human-readable description of the value type this flag expects.
    fn expected(self) -> &'static str {
        match self {
            TransportFlag::TcpNodelay
            | TransportFlag::Http1Only
            | TransportFlag::Http2PriorKnowledge
            | TransportFlag::Referer
            | TransportFlag::ConnectionVerbose => "a boolean",
            TransportFlag::TcpKeepalive
            | TransportFlag::PoolMaxIdlePerHost
            | TransportFlag::PoolIdleTimeout
            | TransportFlag::MaxRedirects => "a non-negative integer",
        }
    }

    fn parse_value(self, value: &Value) -> Result<FlagValue, ConfigurationError> {
        let parsed = match self {
            TransportFlag::TcpNodelay
            | TransportFlag::Http1Only
            | TransportFlag::Http2PriorKnowledge
            | TransportFlag::Referer
            | TransportFlag::ConnectionVerbose => value.as_bool().map(FlagValue::Bool),
            TransportFlag::TcpKeepalive
            | TransportFlag::PoolMaxIdlePerHost
            | TransportFlag::PoolIdleTimeout
            | TransportFlag::MaxRedirects => value.as_u64().map(FlagValue::Uint),
        };
        parsed.ok_or(ConfigurationError::InvalidTransportValue {
            flag: self.to_string(),
            expected: self.expected(),
        })
    }
}

/// Comma-separated list of all recognized flag names, for error messages.
fn recognized_flags() -> String {
    TransportFlag::iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validates a raw `transport` map into typed flag/value pairs.
///
/// # Errors
///
/// Returns `ConfigurationError::UnknownTransportFlag` for a name that is not
/// a [`TransportFlag`], and `InvalidTransportValue` when a value has the
/// wrong type for its flag.
pub(crate) fn parse_flags(
    map: &HashMap<String, Value>,
) -> Result<Vec<(TransportFlag, FlagValue)>, ConfigurationError> {
    let mut flags = Vec::with_capacity(map.len());
    for (name, value) in map {
        let flag = TransportFlag::from_str(name).map_err(|_| {
            ConfigurationError::UnknownTransportFlag {
                name: name.clone(),
                recognized: recognized_flags(),
            }
        })?;
        flags.push((flag, flag.parse_value(value)?));
    }
    Ok(flags)
}

/// Applies validated transport flags to a client builder.
pub(crate) fn apply_flags(
    mut builder: ClientBuilder,
    flags: &[(TransportFlag, FlagValue)],
) -> ClientBuilder {
    for (flag, value) in flags {
        builder = match (flag, value) {
            (TransportFlag::TcpNodelay, FlagValue::Bool(b)) => builder.tcp_nodelay(*b),
            (TransportFlag::TcpKeepalive, FlagValue::Uint(secs)) => {
                builder.tcp_keepalive(Duration::from_secs(*secs))
            }
            (TransportFlag::PoolMaxIdlePerHost, FlagValue::Uint(n)) => {
                builder.pool_max_idle_per_host(*n as usize)
            }
            (TransportFlag::PoolIdleTimeout, FlagValue::Uint(secs)) => {
                builder.pool_idle_timeout(Duration::from_secs(*secs))
            }
            (TransportFlag::Http1Only, FlagValue::Bool(true)) => builder.http1_only(),
            (TransportFlag::Http2PriorKnowledge, FlagValue::Bool(true)) => {
                builder.http2_prior_knowledge()
            }
            (TransportFlag::MaxRedirects, FlagValue::Uint(0)) => builder.redirect(Policy::none()),
            (TransportFlag::MaxRedirects, FlagValue::Uint(n)) => {
                builder.redirect(Policy::limited(*n as usize))
            }
            (TransportFlag::Referer, FlagValue::Bool(b)) => builder.referer(*b),
            (TransportFlag::ConnectionVerbose, FlagValue::Bool(b)) => {
                builder.connection_verbose(*b)
            }
            // Type mismatches are rejected by parse_flags; a false boolean on
            // the protocol-selection flags keeps the builder default.
            _ => builder,
        };
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_names_round_trip() {
        for flag in TransportFlag::iter() {
            let name = flag.to_string();
            assert_eq!(TransportFlag::from_str(&name).unwrap(), flag);
        }
    }

    #[test]
    fn test_parse_flags_accepts_valid_map() {
        let mut map = HashMap::new();
        map.insert("tcp_nodelay".to_string(), json!(true));
        map.insert("max_redirects".to_string(), json!(5));
        let flags = parse_flags(&map).unwrap();
        assert_eq!(flags.len(), 2);
        assert!(flags.contains(&(TransportFlag::TcpNodelay, FlagValue::Bool(true))));
        assert!(flags.contains(&(TransportFlag::MaxRedirects, FlagValue::Uint(5))));
    }

    #[test]
    fn test_parse_flags_rejects_unknown_name() {
        let mut map = HashMap::new();
        map.insert("curlopt_followlocation".to_string(), json!(true));
        let err = parse_flags(&map).unwrap_err();
        match err {
            ConfigurationError::UnknownTransportFlag { name, recognized } => {
                assert_eq!(name, "curlopt_followlocation");
                assert!(recognized.contains("tcp_nodelay"));
            }
            other => panic!("expected UnknownTransportFlag, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_flags_rejects_wrong_value_type() {
        let mut map = HashMap::new();
        map.insert("tcp_keepalive".to_string(), json!("sixty"));
        let err = parse_flags(&map).unwrap_err();
        match err {
            ConfigurationError::InvalidTransportValue { flag, expected } => {
                assert_eq!(flag, "tcp_keepalive");
                assert_eq!(expected, "a non-negative integer");
            }
            other => panic!("expected InvalidTransportValue, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_flags_rejects_negative_integer() {
        let mut map = HashMap::new();
        map.insert("max_redirects".to_string(), json!(-1));
        assert!(matches!(
            parse_flags(&map).unwrap_err(),
            ConfigurationError::InvalidTransportValue { .. }
        ));
    }

    #[test]
    fn test_apply_flags_builds_a_client() {
        let mut map = HashMap::new();
        map.insert("tcp_nodelay".to_string(), json!(true));
        map.insert("pool_max_idle_per_host".to_string(), json!(4));
        map.insert("max_redirects".to_string(), json!(0));
        let flags = parse_flags(&map).unwrap();
        let builder = apply_flags(ClientBuilder::new(), &flags);
        assert!(builder.build().is_ok());
    }
}
