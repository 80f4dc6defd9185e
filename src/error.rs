//! Unified error types for the gas meter agent.
//!
//! Each subsystem has its own small `Copy` error enum; all of them convert
//! into the top-level [`Error`] so the control loop can log a single type.
//! Only configuration errors are fatal, and only at startup.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level agent error
// ---------------------------------------------------------------------------

/// Every fallible operation in the agent funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The Wi-Fi link could not be brought up (or was lost).
    LinkUnavailable(Option<i32>),
    /// The MQTT broker could not be reached over an established link.
    BrokerUnreachable(Option<i32>),
    /// The transport refused or failed to send a publish.
    PublishRejected(Option<i32>),
    /// The temperature probe is absent or returned garbage.
    SensorUnavailable,
    /// A required configuration value was not provided.
    ConfigurationMissing(&'static str),
    /// A configuration value is present but out of range.
    ConfigurationInvalid(&'static str),
}

struct Code(Option<i32>);

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(rc) => write!(f, " (rc={rc})"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkUnavailable(rc) => write!(f, "link unavailable{}", Code(*rc)),
            Self::BrokerUnreachable(rc) => write!(f, "broker unreachable{}", Code(*rc)),
            Self::PublishRejected(rc) => write!(f, "publish rejected{}", Code(*rc)),
            Self::SensorUnavailable => write!(f, "sensor unavailable"),
            Self::ConfigurationMissing(what) => write!(f, "configuration missing: {what}"),
            Self::ConfigurationInvalid(what) => write!(f, "configuration invalid: {what}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No probe is configured or wired.
    NotPresent,
    /// The reading sits at an ADC rail (open or shorted probe).
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => write!(f, "probe not present"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(_: SensorError) -> Self {
        Self::SensorUnavailable
    }
}

// ---------------------------------------------------------------------------
// Link (Wi-Fi) errors
// ---------------------------------------------------------------------------

/// One failed link-layer connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The driver rejected the station configuration.
    Config(i32),
    /// Association or DHCP did not complete.
    ConnectFailed(i32),
    /// Simulated or otherwise unexplained failure.
    Unknown,
}

impl LinkError {
    /// Platform error code, when the driver reported one.
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::Config(rc) | Self::ConnectFailed(rc) => Some(*rc),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(rc) => write!(f, "Wi-Fi configuration rejected (rc={rc})"),
            Self::ConnectFailed(rc) => write!(f, "Wi-Fi connect failed (rc={rc})"),
            Self::Unknown => write!(f, "Wi-Fi connect failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::LinkUnavailable(e.code())
    }
}

// ---------------------------------------------------------------------------
// Broker (MQTT) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerError {
    /// The client could not be created or never reported a CONNACK.
    Unreachable(Option<i32>),
    /// The client refused to enqueue or send a message.
    SendFailed(Option<i32>),
}

impl BrokerError {
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::Unreachable(rc) | Self::SendFailed(rc) => *rc,
        }
    }
}

impl fmt::Display for BrokerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(rc) => write!(f, "MQTT broker unreachable{}", Code(*rc)),
            Self::SendFailed(rc) => write!(f, "MQTT send failed{}", Code(*rc)),
        }
    }
}

impl From<BrokerError> for Error {
    fn from(e: BrokerError) -> Self {
        match e {
            BrokerError::Unreachable(rc) => Self::BrokerUnreachable(rc),
            BrokerError::SendFailed(rc) => Self::PublishRejected(rc),
        }
    }
}

// ---------------------------------------------------------------------------
// Supervisor-level errors
// ---------------------------------------------------------------------------

/// Returned by `ensure_ready` when a bounded retry policy gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    LinkUnavailable { attempts: u32, code: Option<i32> },
    BrokerUnreachable { attempts: u32, code: Option<i32> },
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkUnavailable { attempts, code } => {
                write!(f, "link unavailable after {attempts} attempts{}", Code(*code))
            }
            Self::BrokerUnreachable { attempts, code } => {
                write!(f, "broker unreachable after {attempts} attempts{}", Code(*code))
            }
        }
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        match e {
            ConnectivityError::LinkUnavailable { code, .. } => Self::LinkUnavailable(code),
            ConnectivityError::BrokerUnreachable { code, .. } => Self::BrokerUnreachable(code),
        }
    }
}

/// Returned by `ConnectivitySupervisor::publish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishError {
    /// `ensure_ready` was not called, or did not succeed, this tick.
    NotReady,
    /// The link dropped between `ensure_ready` and `publish`.
    LinkLost,
    /// The broker transport refused the message.
    Rejected(Option<i32>),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "sessions not ready"),
            Self::LinkLost => write!(f, "link lost before publish"),
            Self::Rejected(rc) => write!(f, "publish rejected{}", Code(*rc)),
        }
    }
}

impl From<PublishError> for Error {
    fn from(e: PublishError) -> Self {
        match e {
            PublishError::NotReady | PublishError::LinkLost => Self::LinkUnavailable(None),
            PublishError::Rejected(rc) => Self::PublishRejected(rc),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating [`AgentConfig`](crate::config::AgentConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is empty or absent. Names the field.
    Missing(&'static str),
    /// A field failed range validation. Describes the constraint.
    ValidationFailed(&'static str),
    /// The supplied document could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(what) => write!(f, "missing {what}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Malformed => write!(f, "malformed configuration document"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Missing(what) => Self::ConfigurationMissing(what),
            ConfigError::ValidationFailed(msg) => Self::ConfigurationInvalid(msg),
            ConfigError::Malformed => Self::ConfigurationInvalid("malformed document"),
        }
    }
}
