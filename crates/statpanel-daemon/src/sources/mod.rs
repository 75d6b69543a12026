//! Data sources for widgets.
//!
//! Widgets name a data source (optionally with arguments) in the layout. The
//! registry resolves the name at render time; lookup and call failures turn
//! into a visible sentinel string for that one widget instead of an error.

mod cpu;
mod disk;
mod memory;
mod network;
mod system;
mod throughput;

pub use throughput::ThroughputCache;

use crate::clock::SystemClock;
use crate::layout::Layout;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

/// Shown when a widget has no data source.
pub const NOT_AVAILABLE: &str = "N/A";
/// Shown when the named source does not exist.
pub const LOOKUP_ERROR: &str = "Error";
/// Shown when the source exists but the call failed.
pub const CALL_ERROR: &str = "Call Error";

/// Value returned by a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    Single(String),
    /// Main value plus a secondary detail, e.g. ("45.0%", "1843/3794MB").
    Pair(String, String),
}

impl DataValue {
    pub fn single(value: impl Into<String>) -> Self {
        DataValue::Single(value.into())
    }

    pub fn pair(main: impl Into<String>, sub: impl Into<String>) -> Self {
        DataValue::Pair(main.into(), sub.into())
    }

    /// Splits into (main, sub); a single value gets an "N/A" sub-value.
    pub fn into_pair(self) -> (String, String) {
        match self {
            DataValue::Single(main) => (main, NOT_AVAILABLE.to_string()),
            DataValue::Pair(main, sub) => (main, sub),
        }
    }
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Single(value) => write!(f, "{}", value),
            DataValue::Pair(main, sub) => write!(f, "{} ({})", main, sub),
        }
    }
}

/// Reference to a data source in the layout: a bare name or a name with arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DataSourceRef {
    Name(String),
    Call {
        name: String,
        #[serde(default)]
        args: Vec<toml::Value>,
    },
}

impl DataSourceRef {
    pub fn name(&self) -> &str {
        match self {
            DataSourceRef::Name(name) => name,
            DataSourceRef::Call { name, .. } => name,
        }
    }

    /// Arguments rendered as plain strings.
    pub fn args(&self) -> Vec<String> {
        match self {
            DataSourceRef::Name(_) => Vec::new(),
            DataSourceRef::Call { args, .. } => args
                .iter()
                .map(|v| match v {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        }
    }
}

/// Data source errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataSourceError {
    #[error("unknown data source '{0}'")]
    Unknown(String),

    #[error("'{name}' takes {min} to {max} arguments, got {got}")]
    Arity {
        name: String,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("{0}")]
    Failed(String),
}

/// Accepted argument count range, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: usize,
}

impl Arity {
    pub const NONE: Arity = Arity { min: 0, max: 0 };
    pub const OPTIONAL: Arity = Arity { min: 0, max: 1 };
    pub const ONE: Arity = Arity { min: 1, max: 1 };
}

pub type SourceFn = Box<dyn Fn(&[String]) -> Result<DataValue, DataSourceError> + Send + Sync>;

struct Entry {
    arity: Arity,
    func: SourceFn,
}

/// Resolves data source references to values.
pub trait DataFetch {
    fn fetch(&self, source: Option<&DataSourceRef>) -> DataValue;
}

/// A problem found while checking a layout against the registry.
#[derive(Debug)]
pub struct ValidationIssue {
    pub screen: usize,
    pub widget: usize,
    pub error: DataSourceError,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "screen {} widget {}: {}",
            self.screen, self.widget, self.error
        )
    }
}

/// Name to callable mapping. Read-only once rendering starts.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callable under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, arity: Arity, func: F)
    where
        F: Fn(&[String]) -> Result<DataValue, DataSourceError> + Send + Sync + 'static,
    {
        self.entries.insert(
            name.to_string(),
            Entry {
                arity,
                func: Box::new(func),
            },
        );
    }

    /// Returns registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Checks that `source` names a registered callable with a valid argument count.
    pub fn check(&self, source: &DataSourceRef) -> Result<(), DataSourceError> {
        let name = source.name();
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| DataSourceError::Unknown(name.to_string()))?;
        let got = source.args().len();
        if got < entry.arity.min || got > entry.arity.max {
            return Err(DataSourceError::Arity {
                name: name.to_string(),
                min: entry.arity.min,
                max: entry.arity.max,
                got,
            });
        }
        Ok(())
    }

    /// Calls the referenced source.
    pub fn call(&self, source: &DataSourceRef) -> Result<DataValue, DataSourceError> {
        self.check(source)?;
        let entry = &self.entries[source.name()];
        (entry.func)(&source.args())
    }

    /// Checks every widget data source in a layout.
    pub fn validate(&self, layout: &Layout) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (screen_idx, screen) in layout.screens.iter().enumerate() {
            for (widget_idx, widget) in screen.widgets.iter().enumerate() {
                if let Some(source) = &widget.data_source {
                    if let Err(error) = self.check(source) {
                        issues.push(ValidationIssue {
                            screen: screen_idx,
                            widget: widget_idx,
                            error,
                        });
                    }
                }
            }
        }
        issues
    }
}

impl DataFetch for Registry {
    fn fetch(&self, source: Option<&DataSourceRef>) -> DataValue {
        let Some(source) = source else {
            return DataValue::single(NOT_AVAILABLE);
        };
        match self.call(source) {
            Ok(value) => value,
            Err(e @ DataSourceError::Unknown(_)) => {
                warn!("Data source lookup failed: {}", e);
                DataValue::single(LOOKUP_ERROR)
            }
            Err(e) => {
                warn!("Data source '{}' failed: {}", source.name(), e);
                DataValue::single(CALL_ERROR)
            }
        }
    }
}

/// Builds the registry of built-in system metrics.
pub fn builtin() -> Registry {
    let mut registry = Registry::new();

    registry.register("get_cpu_temperature", Arity::NONE, |_| {
        Ok(DataValue::single(system::cpu_temperature()))
    });

    let cpu = Arc::new(Mutex::new(cpu::CpuSensor::new()));
    registry.register("get_cpu_usage", Arity::NONE, move |_| {
        let mut cpu = cpu
            .lock()
            .map_err(|_| DataSourceError::Failed("CPU sensor lock poisoned".into()))?;
        Ok(DataValue::single(match cpu.sample() {
            Some(usage) => format!("{:.1}%", usage),
            None => NOT_AVAILABLE.to_string(),
        }))
    });

    registry.register("get_ram_info", Arity::NONE, |_| {
        Ok(match memory::read_meminfo() {
            Some(info) => DataValue::pair(info.percent_label(), info.usage_label()),
            None => DataValue::pair(NOT_AVAILABLE, NOT_AVAILABLE),
        })
    });

    registry.register("get_disk_space", Arity::OPTIONAL, |args| {
        let path = args.first().map(String::as_str).unwrap_or("/");
        Ok(match disk::usage(path) {
            Some(usage) => DataValue::pair(usage.percent_label(), usage.usage_label()),
            None => DataValue::pair(NOT_AVAILABLE, NOT_AVAILABLE),
        })
    });

    registry.register("get_ip_address", Arity::OPTIONAL, |args| {
        let interface = args.first().map(String::as_str);
        Ok(DataValue::single(
            network::ipv4_address(interface).unwrap_or_else(|| "Not Connected".to_string()),
        ))
    });

    let throughput = Arc::new(Mutex::new(ThroughputCache::new(SystemClock)));
    registry.register("get_network_throughput", Arity::ONE, move |args| {
        let interface = &args[0];
        let counters = network::read_counters(interface).ok_or_else(|| {
            DataSourceError::Failed(format!("no statistics for interface {}", interface))
        })?;
        let mut cache = throughput
            .lock()
            .map_err(|_| DataSourceError::Failed("throughput cache lock poisoned".into()))?;
        let (rx, tx) = cache.update(interface, counters);
        Ok(DataValue::pair(
            format!("\u{2193}{}", network::format_rate(rx)),
            format!("\u{2191}{}", network::format_rate(tx)),
        ))
    });

    registry.register("get_current_time", Arity::NONE, |_| {
        Ok(DataValue::single(system::current_time()))
    });

    registry.register("get_hostname", Arity::NONE, |_| {
        Ok(DataValue::single(system::hostname()))
    });

    registry.register("get_uptime", Arity::NONE, |_| {
        Ok(DataValue::single(system::uptime()))
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register("answer", Arity::NONE, |_| Ok(DataValue::single("42")));
        registry.register("echo", Arity::ONE, |args| Ok(DataValue::single(&args[0])));
        registry.register("broken", Arity::NONE, |_| {
            Err(DataSourceError::Failed("sensor unplugged".into()))
        });
        registry
    }

    fn name(n: &str) -> DataSourceRef {
        DataSourceRef::Name(n.to_string())
    }

    #[test]
    fn test_fetch_known_source() {
        assert_eq!(registry().fetch(Some(&name("answer"))), DataValue::single("42"));
    }

    #[test]
    fn test_fetch_passes_arguments() {
        let source = DataSourceRef::Call {
            name: "echo".into(),
            args: vec![toml::Value::String("eth0".into())],
        };
        assert_eq!(registry().fetch(Some(&source)), DataValue::single("eth0"));

        let numeric = DataSourceRef::Call {
            name: "echo".into(),
            args: vec![toml::Value::Integer(7)],
        };
        assert_eq!(registry().fetch(Some(&numeric)), DataValue::single("7"));
    }

    #[test]
    fn test_fetch_sentinels() {
        let registry = registry();
        assert_eq!(registry.fetch(None), DataValue::single(NOT_AVAILABLE));
        assert_eq!(
            registry.fetch(Some(&name("missing"))),
            DataValue::single(LOOKUP_ERROR)
        );
        assert_eq!(
            registry.fetch(Some(&name("broken"))),
            DataValue::single(CALL_ERROR)
        );
        // Arity mismatch is a call error
        assert_eq!(
            registry.fetch(Some(&name("echo"))),
            DataValue::single(CALL_ERROR)
        );
    }

    #[test]
    fn test_check_reports_arity() {
        let err = registry().check(&name("echo")).unwrap_err();
        assert_eq!(
            err,
            DataSourceError::Arity {
                name: "echo".into(),
                min: 1,
                max: 1,
                got: 0
            }
        );
    }

    #[test]
    fn test_validate_layout() {
        let layout: Layout = toml::from_str(
            r#"
            [[screens]]
            title = "A"
            [[screens.widgets]]
            type = "static_text"
            data_source = "answer"
            [[screens.widgets]]
            type = "static_text"
            data_source = "nope"

            [[screens]]
            title = "B"
            [[screens.widgets]]
            type = "line_item"
            data_source = { name = "echo" }
            "#,
        )
        .unwrap();
        let issues = registry().validate(&layout);
        assert_eq!(issues.len(), 2);
        assert_eq!((issues[0].screen, issues[0].widget), (0, 1));
        assert_eq!(issues[0].error, DataSourceError::Unknown("nope".into()));
        assert_eq!((issues[1].screen, issues[1].widget), (1, 0));
    }

    #[test]
    fn test_data_value_pairs() {
        assert_eq!(
            DataValue::single("x").into_pair(),
            ("x".to_string(), NOT_AVAILABLE.to_string())
        );
        assert_eq!(DataValue::pair("a", "b").to_string(), "a (b)");
    }

    #[test]
    fn test_builtin_names() {
        let registry = builtin();
        for name in [
            "get_cpu_temperature",
            "get_cpu_usage",
            "get_ram_info",
            "get_disk_space",
            "get_ip_address",
            "get_network_throughput",
            "get_current_time",
            "get_hostname",
            "get_uptime",
        ] {
            assert!(registry.names().contains(&name), "missing {}", name);
        }
        // Values vary by host; the call itself must not fail
        assert!(registry.call(&name("get_current_time")).is_ok());
    }

    #[test]
    fn test_shipped_layout_validates() {
        let layout: Layout = toml::from_str(include_str!("../../../../config/layout.toml")).unwrap();
        assert!(!layout.screens.is_empty());
        let issues = builtin().validate(&layout);
        assert!(issues.is_empty(), "{:?}", issues);
    }
}
