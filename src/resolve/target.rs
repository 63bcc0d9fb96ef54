//! Target types shared by configuration decoding and resolution.
//!
//! A [`TargetSet`] is used both for partial records (templates, per-domain
//! overrides) and for fully resolved results. Each protocol entry is either
//! absent or a complete [`Target`]; the type makes a host without a port
//! unrepresentable.

use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Mail protocols the proxy front-end can ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Imap,
    Pop3,
    Smtp,
}

impl Protocol {
    /// Every supported protocol, in a fixed order.
    pub const ALL: [Protocol; 3] = [Protocol::Imap, Protocol::Pop3, Protocol::Smtp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Imap => "imap",
            Protocol::Pop3 => "pop3",
            Protocol::Smtp => "smtp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a protocol name is outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported protocol: '{0}'")]
pub struct UnknownProtocol(pub String);

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    /// Case-insensitive, nginx sends lowercase names but configs vary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownProtocol(s.to_string()))
    }
}

/// A backend mail server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Target {
    /// Host name or IP address handed back to the proxy. Never blank.
    #[serde(alias = "ip", deserialize_with = "non_blank_host")]
    pub host: String,

    /// Backend port; zero is rejected at decode time.
    pub port: NonZeroU16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: NonZeroU16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

fn non_blank_host<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let host = String::deserialize(deserializer)?;
    if host.trim().is_empty() {
        return Err(de::Error::invalid_value(
            Unexpected::Str(&host),
            &"a non-empty host",
        ));
    }
    Ok(host)
}

/// Per-protocol targets for a domain, template or the global default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetSet {
    /// Parent template name. Only read on per-domain overrides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub imap: Option<Target>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pop3: Option<Target>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp: Option<Target>,
}

impl TargetSet {
    /// Entry for `protocol`, if this set specifies one.
    pub fn get(&self, protocol: Protocol) -> Option<&Target> {
        match protocol {
            Protocol::Imap => self.imap.as_ref(),
            Protocol::Pop3 => self.pop3.as_ref(),
            Protocol::Smtp => self.smtp.as_ref(),
        }
    }

    fn slot_mut(&mut self, protocol: Protocol) -> &mut Option<Target> {
        match protocol {
            Protocol::Imap => &mut self.imap,
            Protocol::Pop3 => &mut self.pop3,
            Protocol::Smtp => &mut self.smtp,
        }
    }

    /// Replace this set's entries with every entry `layer` specifies.
    ///
    /// Entries `layer` leaves unspecified are untouched; nothing is ever
    /// cleared. The `template` field is not carried over.
    pub fn apply(&mut self, layer: &TargetSet) {
        for protocol in Protocol::ALL {
            if let Some(target) = layer.get(protocol) {
                *self.slot_mut(protocol) = Some(target.clone());
            }
        }
    }

    /// Builder-style setter, mostly useful for tests and fixtures.
    pub fn with(mut self, protocol: Protocol, target: Target) -> Self {
        *self.slot_mut(protocol) = Some(target);
        self
    }

    /// True when every supported protocol has a target.
    pub fn is_complete(&self) -> bool {
        Protocol::ALL.iter().all(|p| self.get(*p).is_some())
    }

    /// Protocols this set does not specify.
    pub fn missing(&self) -> Vec<Protocol> {
        Protocol::ALL
            .into_iter()
            .filter(|p| self.get(*p).is_none())
            .collect()
    }
}
