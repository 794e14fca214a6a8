//! Live module configuration: typed draft and read/apply/reload sync
//!
//! [`ConfigSync`] is a sans-IO state machine. Operator actions and remote
//! completions go in, [`ConfigRequest`]s to execute come out. A successful
//! read always replaces the whole draft, local edits included.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// The one field edited through a fixed set of choices
pub const ENCODING_FIELD: &str = "Encoding";

/// Value of one config field, tagged by the control that edits it
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// Checkbox
    Bool(bool),
    /// Free text
    Text(String),
    /// Free text that was a JSON number when read
    Number(String),
    /// One of the module's encodings, spelled as the module sent it
    Choice(String),
    /// Null or structured; shown read-only and written back untouched
    Raw(Value),
}

impl FieldValue {
    fn from_json(name: &str, value: &Value) -> Self {
        match value {
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::String(s) if name == ENCODING_FIELD => FieldValue::Choice(s.clone()),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Number(n) => FieldValue::Number(n.to_string()),
            other => FieldValue::Raw(other.clone()),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Text(s) | FieldValue::Choice(s) => Value::String(s.clone()),
            FieldValue::Number(s) => parse_number(s)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(s.clone())),
            FieldValue::Raw(v) => v.clone(),
        }
    }

    /// Text shown in a free-text control, or by a read-only listing.
    /// Encodings display upper-cased whatever the module's spelling.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Text(s) | FieldValue::Number(s) => s.clone(),
            FieldValue::Choice(s) => s.to_uppercase(),
            FieldValue::Raw(Value::Null) => String::new(),
            FieldValue::Raw(v) => v.to_string(),
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Field name to value, as last read from the module (plus local edits)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigDescriptor {
    fields: BTreeMap<String, FieldValue>,
}

impl ConfigDescriptor {
    /// Build from a `getConfig` payload, which must be a JSON object
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let fields = object
            .iter()
            .map(|(name, v)| (name.clone(), FieldValue::from_json(name, v)))
            .collect();
        Some(Self { fields })
    }

    /// Body for `saveConfig`
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, v)| (name.clone(), v.to_json()))
            .collect();
        Value::Object(object)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for ConfigDescriptor {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A local edit coming from one form control
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldEdit {
    Toggle(bool),
    Text(String),
    Choose(String),
}

/// Local edit rejected; the draft is unchanged
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no config loaded yet")]
    NoDraft,

    #[error("field {0} is not in the current config")]
    UnknownField(String),

    #[error("field {field} does not take a {edit} edit")]
    KindMismatch { field: String, edit: &'static str },

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),
}

/// Where the sync currently stands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Loading,
    Ready,
    Applying,
    Reloading,
}

/// Remote call the owner of a [`ConfigSync`] must issue
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigRequest {
    FetchEncodings,
    Read,
    Write(ConfigDescriptor),
    Reload,
}

/// Read/apply/reload synchronization for one module's configuration
#[derive(Debug)]
pub struct ConfigSync {
    fields: &'static [&'static str],
    state: SyncState,
    draft: Option<ConfigDescriptor>,
    encodings: Vec<String>,
}

impl ConfigSync {
    /// `fields` is the variant's field list; it decides render order and
    /// whether encodings are needed
    pub fn new(fields: &'static [&'static str]) -> Self {
        Self {
            fields,
            state: SyncState::Idle,
            draft: None,
            encodings: Vec::new(),
        }
    }

    /// First request when the config view comes up
    pub fn start(&mut self) -> ConfigRequest {
        self.set_state(SyncState::Loading);
        if self.fields.contains(&ENCODING_FIELD) {
            ConfigRequest::FetchEncodings
        } else {
            ConfigRequest::Read
        }
    }

    /// Encodings arrived (or failed); the first read follows either way.
    /// Cached upper-cased, sorted, without case-only duplicates.
    pub fn on_encodings<E: Display>(&mut self, result: Result<Vec<String>, E>) -> ConfigRequest {
        match result {
            Ok(encodings) => {
                let mut encodings: Vec<String> =
                    encodings.iter().map(|e| e.to_uppercase()).collect();
                encodings.sort();
                encodings.dedup();
                debug!(count = encodings.len(), "Encodings cached");
                self.encodings = encodings;
            }
            Err(e) => warn!(error = %e, "Failed to fetch encodings"),
        }
        self.read()
    }

    /// Refresh: re-read the module's config
    pub fn read(&mut self) -> ConfigRequest {
        self.set_state(SyncState::Loading);
        ConfigRequest::Read
    }

    /// Send the whole draft; `None` if nothing has been read yet
    pub fn apply(&mut self) -> Option<ConfigRequest> {
        let draft = self.draft.clone()?;
        self.set_state(SyncState::Applying);
        Some(ConfigRequest::Write(draft))
    }

    /// Ask the module to reload its config from its own source
    pub fn reload(&mut self) -> ConfigRequest {
        self.set_state(SyncState::Reloading);
        ConfigRequest::Reload
    }

    /// A read landed. Success replaces the draft wholesale.
    pub fn on_read<E: Display>(&mut self, result: Result<ConfigDescriptor, E>) {
        match result {
            Ok(descriptor) => {
                debug!(fields = descriptor.len(), "Config read");
                self.draft = Some(descriptor);
                self.set_state(SyncState::Ready);
            }
            Err(e) => {
                warn!(error = %e, "Config read failed, keeping last state");
                let fallback = if self.draft.is_some() {
                    SyncState::Ready
                } else {
                    SyncState::Idle
                };
                self.set_state(fallback);
            }
        }
    }

    /// A write finished. The outcome is not trusted: always re-read.
    pub fn on_written<E: Display>(&mut self, result: Result<(), E>) -> ConfigRequest {
        if let Err(e) = result {
            warn!(error = %e, "Config write reported failure");
        }
        self.read()
    }

    /// A reload finished; re-read like after a write
    pub fn on_reloaded<E: Display>(&mut self, result: Result<(), E>) -> ConfigRequest {
        if let Err(e) = result {
            warn!(error = %e, "Config reload reported failure");
        }
        self.read()
    }

    /// Apply a local edit to the draft. The module is not touched.
    pub fn edit(&mut self, field: &str, edit: FieldEdit) -> Result<(), ConfigError> {
        let draft = self.draft.as_mut().ok_or(ConfigError::NoDraft)?;
        let current = draft
            .fields
            .get_mut(field)
            .ok_or_else(|| ConfigError::UnknownField(field.to_string()))?;

        let updated = match (&*current, edit) {
            (FieldValue::Bool(_), FieldEdit::Toggle(b)) => FieldValue::Bool(b),
            (FieldValue::Text(_), FieldEdit::Text(s)) => FieldValue::Text(s),
            (FieldValue::Number(_), FieldEdit::Text(s)) => FieldValue::Number(s),
            (FieldValue::Choice(_), FieldEdit::Choose(s)) => {
                let upper = s.to_uppercase();
                if !self.encodings.contains(&upper) {
                    return Err(ConfigError::UnsupportedEncoding(s));
                }
                FieldValue::Choice(upper)
            }
            (_, edit) => {
                return Err(ConfigError::KindMismatch {
                    field: field.to_string(),
                    edit: match edit {
                        FieldEdit::Toggle(_) => "toggle",
                        FieldEdit::Text(_) => "text",
                        FieldEdit::Choose(_) => "choice",
                    },
                })
            }
        };

        *current = updated;
        Ok(())
    }

    /// Fields to render: the variant's list, in order, skipping any the
    /// current draft does not carry
    pub fn visible_fields(&self) -> Vec<(&'static str, &FieldValue)> {
        let Some(draft) = &self.draft else {
            return Vec::new();
        };
        self.fields
            .iter()
            .filter_map(|&name| draft.get(name).map(|v| (name, v)))
            .collect()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn draft(&self) -> Option<&ConfigDescriptor> {
        self.draft.as_ref()
    }

    /// Sorted, upper-cased encodings
    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }

    fn set_state(&mut self, state: SyncState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Config sync state");
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DISPATCHER_FIELDS: &[&str] = &["DestinationHost", "DestinationPort", "ReadOnly", "Verbose"];
    const COLLECTOR_FIELDS: &[&str] = &["Destination", "Encoding", "Port", "Verbose"];

    fn descriptor(value: Value) -> ConfigDescriptor {
        ConfigDescriptor::from_json(&value).unwrap()
    }

    fn dispatcher_config() -> ConfigDescriptor {
        descriptor(json!({
            "DestinationHost": "10.0.0.1",
            "DestinationPort": 514,
            "ReadOnly": false,
            "Verbose": true
        }))
    }

    fn ready_dispatcher() -> ConfigSync {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        assert_eq!(sync.start(), ConfigRequest::Read);
        sync.on_read::<String>(Ok(dispatcher_config()));
        sync
    }

    fn ready_collector() -> ConfigSync {
        let mut sync = ConfigSync::new(COLLECTOR_FIELDS);
        assert_eq!(sync.start(), ConfigRequest::FetchEncodings);
        let next = sync.on_encodings::<String>(Ok(vec!["utf8".into(), "ascii".into()]));
        assert_eq!(next, ConfigRequest::Read);
        sync.on_read::<String>(Ok(descriptor(json!({
            "Destination": "store",
            "Encoding": "utf8",
            "Port": 9000,
            "Verbose": false
        }))));
        sync
    }

    #[test]
    fn values_are_tagged_by_shape() {
        let d = dispatcher_config();
        assert_eq!(d.get("DestinationHost"), Some(&FieldValue::Text("10.0.0.1".into())));
        assert_eq!(d.get("DestinationPort"), Some(&FieldValue::Number("514".into())));
        assert_eq!(d.get("ReadOnly"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn encoding_is_tagged_by_name() {
        let d = descriptor(json!({ "Encoding": "utf8", "Other": "utf8" }));
        assert_eq!(d.get("Encoding"), Some(&FieldValue::Choice("utf8".into())));
        assert_eq!(d.get("Encoding").map(FieldValue::display), Some("UTF8".to_string()));
        assert_eq!(d.get("Other"), Some(&FieldValue::Text("utf8".into())));
    }

    #[test]
    fn untouched_apply_sends_back_what_was_read() {
        let remote = json!({
            "Encoding": "utf8",
            "Extra": null,
            "List": [1, 2],
            "Nested": { "a": 1 },
            "Port": 9000,
            "Ratio": 0.25,
            "Verbose": true
        });
        let mut sync = ConfigSync::new(COLLECTOR_FIELDS);
        sync.start();
        sync.on_encodings::<String>(Ok(vec!["utf8".into()]));
        sync.on_read::<String>(Ok(descriptor(remote.clone())));

        let Some(ConfigRequest::Write(sent)) = sync.apply() else {
            panic!("apply must write");
        };
        assert_eq!(sent.to_json(), remote);
    }

    #[test]
    fn structured_values_are_read_only() {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        sync.start();
        sync.on_read::<String>(Ok(descriptor(json!({ "DestinationHost": null, "Verbose": [1] }))));

        let draft = sync.draft().unwrap();
        assert_eq!(draft.get("DestinationHost").map(FieldValue::display), Some(String::new()));
        assert_eq!(draft.get("Verbose").map(FieldValue::display), Some("[1]".to_string()));

        let err = sync.edit("DestinationHost", FieldEdit::Text("x".into())).unwrap_err();
        assert!(matches!(err, ConfigError::KindMismatch { .. }));
        assert_eq!(
            sync.draft().unwrap().get("DestinationHost"),
            Some(&FieldValue::Raw(Value::Null))
        );
    }

    #[test]
    fn non_object_config_is_rejected() {
        assert!(ConfigDescriptor::from_json(&json!([1])).is_none());
        assert!(ConfigDescriptor::from_json(&json!("x")).is_none());
    }

    #[test]
    fn numbers_go_back_as_numbers_while_they_parse() {
        let mut sync = ready_dispatcher();
        let body = sync.draft().unwrap().to_json();
        assert_eq!(body["DestinationPort"], json!(514));

        sync.edit("DestinationPort", FieldEdit::Text("6514".into())).unwrap();
        assert_eq!(sync.draft().unwrap().to_json()["DestinationPort"], json!(6514));

        sync.edit("DestinationPort", FieldEdit::Text("auto".into())).unwrap();
        assert_eq!(sync.draft().unwrap().to_json()["DestinationPort"], json!("auto"));
    }

    #[test]
    fn start_reads_directly_without_encoding_field() {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(sync.start(), ConfigRequest::Read);
        assert_eq!(sync.state(), SyncState::Loading);
    }

    #[test]
    fn encodings_are_sorted_and_read_follows() {
        let sync = ready_collector();
        assert_eq!(sync.encodings(), vec!["ASCII".to_string(), "UTF8".to_string()]);
        assert_eq!(sync.state(), SyncState::Ready);
    }

    #[test]
    fn encodings_differing_only_by_case_collapse() {
        let mut sync = ConfigSync::new(COLLECTOR_FIELDS);
        sync.start();
        sync.on_encodings::<String>(Ok(vec!["utf8".into(), "UTF8".into(), "Ascii".into()]));
        assert_eq!(sync.encodings(), vec!["ASCII".to_string(), "UTF8".to_string()]);
    }

    #[test]
    fn failed_encodings_still_read() {
        let mut sync = ConfigSync::new(COLLECTOR_FIELDS);
        sync.start();
        assert_eq!(sync.on_encodings::<&str>(Err("down")), ConfigRequest::Read);
        assert!(sync.encodings().is_empty());
    }

    #[test]
    fn apply_writes_whole_draft_then_reads_once() {
        let mut sync = ready_dispatcher();
        sync.edit("Verbose", FieldEdit::Toggle(false)).unwrap();

        let Some(ConfigRequest::Write(sent)) = sync.apply() else {
            panic!("apply must write");
        };
        assert_eq!(sent.len(), 4);
        assert_eq!(sent.get("Verbose"), Some(&FieldValue::Bool(false)));
        assert_eq!(sync.state(), SyncState::Applying);

        assert_eq!(sync.on_written::<String>(Ok(())), ConfigRequest::Read);
        assert_eq!(sync.state(), SyncState::Loading);
    }

    #[test]
    fn failed_write_still_reads() {
        let mut sync = ready_dispatcher();
        sync.apply();
        assert_eq!(sync.on_written::<&str>(Err("500")), ConfigRequest::Read);
    }

    #[test]
    fn reload_then_reads() {
        let mut sync = ready_dispatcher();
        assert_eq!(sync.reload(), ConfigRequest::Reload);
        assert_eq!(sync.state(), SyncState::Reloading);
        assert_eq!(sync.on_reloaded::<&str>(Err("timeout")), ConfigRequest::Read);
        assert_eq!(sync.state(), SyncState::Loading);
    }

    #[test]
    fn apply_without_draft_does_nothing() {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        sync.start();
        assert!(sync.apply().is_none());
        assert_eq!(sync.state(), SyncState::Loading);
    }

    #[test]
    fn read_overwrites_local_edits() {
        let mut sync = ready_dispatcher();
        sync.edit("DestinationHost", FieldEdit::Text("edited".into())).unwrap();
        sync.read();
        sync.on_read::<String>(Ok(dispatcher_config()));
        assert_eq!(
            sync.draft().unwrap().get("DestinationHost"),
            Some(&FieldValue::Text("10.0.0.1".into()))
        );
    }

    #[test]
    fn repeated_identical_read_is_idempotent() {
        let mut sync = ready_dispatcher();
        let before: Vec<(&str, FieldValue)> =
            sync.visible_fields().into_iter().map(|(n, v)| (n, v.clone())).collect();
        sync.read();
        sync.on_read::<String>(Ok(dispatcher_config()));
        let after: Vec<(&str, FieldValue)> =
            sync.visible_fields().into_iter().map(|(n, v)| (n, v.clone())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn failed_read_keeps_last_draft() {
        let mut sync = ready_dispatcher();
        sync.read();
        sync.on_read::<&str>(Err("unreachable"));
        assert_eq!(sync.state(), SyncState::Ready);
        assert_eq!(sync.draft(), Some(&dispatcher_config()));

        let mut fresh = ConfigSync::new(DISPATCHER_FIELDS);
        fresh.start();
        fresh.on_read::<&str>(Err("unreachable"));
        assert_eq!(fresh.state(), SyncState::Idle);
    }

    #[test]
    fn missing_field_hides_its_control() {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        sync.start();
        sync.on_read::<String>(Ok(descriptor(json!({ "DestinationHost": "a", "Verbose": true }))));
        let names: Vec<&str> = sync.visible_fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["DestinationHost", "Verbose"]);
    }

    #[test]
    fn fields_outside_the_variant_list_are_not_rendered() {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        sync.start();
        sync.on_read::<String>(Ok(descriptor(json!({ "Verbose": true, "Secret": "x" }))));
        let names: Vec<&str> = sync.visible_fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Verbose"]);
    }

    #[test]
    fn edit_to_absent_field_changes_nothing() {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        sync.start();
        sync.on_read::<String>(Ok(descriptor(json!({ "Verbose": true }))));
        let before = sync.draft().cloned();

        let err = sync.edit("ReadOnly", FieldEdit::Toggle(true)).unwrap_err();
        assert_eq!(err, ConfigError::UnknownField("ReadOnly".into()));
        assert_eq!(sync.draft().cloned(), before);
        assert_eq!(sync.visible_fields().len(), 1);
    }

    #[test]
    fn edit_before_first_read_is_rejected() {
        let mut sync = ConfigSync::new(DISPATCHER_FIELDS);
        assert_eq!(
            sync.edit("Verbose", FieldEdit::Toggle(true)),
            Err(ConfigError::NoDraft)
        );
    }

    #[test]
    fn edit_kind_must_match_value_kind() {
        let mut sync = ready_dispatcher();
        let err = sync.edit("Verbose", FieldEdit::Text("yes".into())).unwrap_err();
        assert!(matches!(err, ConfigError::KindMismatch { .. }));
        let err = sync.edit("DestinationHost", FieldEdit::Toggle(true)).unwrap_err();
        assert!(matches!(err, ConfigError::KindMismatch { .. }));
        assert_eq!(sync.draft(), Some(&dispatcher_config()));
    }

    #[test]
    fn encoding_edit_matches_case_insensitively() {
        let mut sync = ready_collector();
        sync.edit("Encoding", FieldEdit::Choose("Ascii".into())).unwrap();
        assert_eq!(
            sync.draft().unwrap().get("Encoding"),
            Some(&FieldValue::Choice("ASCII".into()))
        );

        let err = sync.edit("Encoding", FieldEdit::Choose("latin1".into())).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedEncoding("latin1".into()));
        assert_eq!(
            sync.draft().unwrap().get("Encoding"),
            Some(&FieldValue::Choice("ASCII".into()))
        );
    }

    #[test]
    fn last_read_to_land_wins() {
        let mut sync = ready_dispatcher();
        sync.read();
        sync.apply();
        sync.on_read::<String>(Ok(descriptor(json!({ "Verbose": false }))));
        sync.on_read::<String>(Ok(descriptor(json!({ "Verbose": true, "ReadOnly": true }))));
        assert_eq!(sync.visible_fields().len(), 2);
        assert_eq!(sync.state(), SyncState::Ready);
    }
}
