//! Module variants and their static field metadata
//!
//! The same console serves every module type. Which one it is talking to is
//! decided once, from the shape of the first stats payload.

use serde_json::Value;

use super::rate::CounterPath;

/// Counter group that only collectors report
pub const COLLECTOR_MARKER: &str = "Urgent";

/// Kind of module on the other end of the console
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModuleVariant {
    /// Detection pending (or never completed)
    #[default]
    Unknown,
    Dispatcher,
    Collector,
}

impl ModuleVariant {
    /// Classify a stats payload
    pub fn classify(stats: &Value) -> Self {
        match stats.get(COLLECTOR_MARKER) {
            Some(_) => ModuleVariant::Collector,
            None => ModuleVariant::Dispatcher,
        }
    }

    /// Field metadata for this variant, `None` while unknown
    pub fn descriptor(self) -> Option<&'static ModuleDescriptor> {
        match self {
            ModuleVariant::Unknown => None,
            ModuleVariant::Dispatcher => Some(&DISPATCHER),
            ModuleVariant::Collector => Some(&COLLECTOR),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModuleVariant::Unknown => "Unknown",
            ModuleVariant::Dispatcher => "Dispatcher",
            ModuleVariant::Collector => "Collector",
        }
    }
}

impl std::fmt::Display for ModuleVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A plotted rate series: name, color and the counter it differences
#[derive(Clone, Copy, Debug)]
pub struct SeriesDescriptor {
    pub name: &'static str,
    /// RGBA
    pub color: [u8; 4],
    pub counter: CounterPath,
}

/// Telemetry series and config field names of one module variant
#[derive(Debug)]
pub struct ModuleDescriptor {
    pub variant: ModuleVariant,
    pub series: &'static [SeriesDescriptor],
    pub config_fields: &'static [&'static str],
}

const INCOMING: SeriesDescriptor = SeriesDescriptor {
    name: "Incoming bytes/s",
    color: [75, 192, 192, 255],
    counter: CounterPath(&["Total", "Incoming", "Bytes"]),
};

const OUTGOING: SeriesDescriptor = SeriesDescriptor {
    name: "Outgoing bytes/s",
    color: [192, 75, 75, 255],
    counter: CounterPath(&["Total", "Outgoing", "Bytes"]),
};

const STORED: SeriesDescriptor = SeriesDescriptor {
    name: "Stored bytes/s",
    color: [75, 75, 75, 255],
    counter: CounterPath(&["Store", "Outgoing", "Bytes"]),
};

pub static DISPATCHER: ModuleDescriptor = ModuleDescriptor {
    variant: ModuleVariant::Dispatcher,
    series: &[INCOMING, OUTGOING],
    config_fields: &["DestinationHost", "DestinationPort", "ReadOnly", "Verbose"],
};

pub static COLLECTOR: ModuleDescriptor = ModuleDescriptor {
    variant: ModuleVariant::Collector,
    series: &[INCOMING, OUTGOING, STORED],
    config_fields: &[
        "Destination",
        "Encoding",
        "StoreRegex",
        "UrgentRegex",
        "SpamRegex",
        "Port",
        "BufferSizeThreshold",
        "BufferTimeoutMS",
        "ReadOnly",
        "Verbose",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats() -> Value {
        json!({
            "Total": {
                "Incoming": { "Bytes": 10, "Messages": 1 },
                "Outgoing": { "Bytes": 20, "Messages": 2 }
            }
        })
    }

    #[test]
    fn urgent_group_means_collector() {
        let mut payload = stats();
        payload["Urgent"] = json!({ "Outgoing": { "Bytes": 0 } });
        assert_eq!(ModuleVariant::classify(&payload), ModuleVariant::Collector);
    }

    #[test]
    fn no_urgent_group_means_dispatcher() {
        assert_eq!(ModuleVariant::classify(&stats()), ModuleVariant::Dispatcher);
    }

    #[test]
    fn urgent_presence_alone_decides() {
        let mut payload = stats();
        payload["Urgent"] = Value::Null;
        assert_eq!(ModuleVariant::classify(&payload), ModuleVariant::Collector);
    }

    #[test]
    fn non_object_payload_is_dispatcher() {
        assert_eq!(ModuleVariant::classify(&json!([1, 2])), ModuleVariant::Dispatcher);
    }

    #[test]
    fn descriptors_match_variants() {
        assert!(ModuleVariant::Unknown.descriptor().is_none());
        for variant in [ModuleVariant::Dispatcher, ModuleVariant::Collector] {
            let descriptor = variant.descriptor().unwrap();
            assert_eq!(descriptor.variant, variant);
        }
    }

    #[test]
    fn only_collector_has_encoding_and_store_series() {
        assert!(!DISPATCHER.config_fields.contains(&"Encoding"));
        assert!(COLLECTOR.config_fields.contains(&"Encoding"));
        assert_eq!(DISPATCHER.series.len(), 2);
        assert_eq!(COLLECTOR.series.len(), 3);
        assert_eq!(COLLECTOR.series[2].counter.read(&json!({ "Store": { "Outgoing": { "Bytes": 7 } } })), 7.0);
    }
}
