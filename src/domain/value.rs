use std::collections::BTreeMap;
use std::fmt;

/// Free-form string metadata attached to customers, runs and events.
pub type Metadata = BTreeMap<String, String>;

#[derive(Clone, PartialEq, Eq, Hash)]
/// Drip API key (`sk_...` or `pk_...`).
///
/// Invariant: non-empty after trimming. Surrounding whitespace is dropped.
pub struct ApiKey(String);

impl ApiKey {
    /// Environment variable consulted when no key is configured explicitly.
    pub const ENV: &'static str = "DRIP_API_KEY";

    /// Create an [`ApiKey`], returning `None` for empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Classify the key by its `sk_` / `pk_` prefix.
    pub fn key_type(&self) -> KeyType {
        KeyType::detect(&self.0)
    }

    /// Borrow the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(KeyType::PREFIX_LEN).collect();
        write!(f, "ApiKey({prefix}***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Kind of API key, detected from its prefix.
pub enum KeyType {
    /// `sk_live_...` / `sk_test_...`
    Secret,
    /// `pk_live_...` / `pk_test_...`
    Public,
    /// Legacy or unrecognized key.
    Unknown,
}

impl KeyType {
    const PREFIX_LEN: usize = 3;

    /// Detect the key type. Keys shorter than the prefix are [`KeyType::Unknown`].
    pub fn detect(key: &str) -> Self {
        match key.get(..Self::PREFIX_LEN) {
            Some("sk_") => Self::Secret,
            Some("pk_") => Self::Public,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Reference to a workflow: either a slug (`"training-run"`) or a server id (`"wf_..."`).
pub struct WorkflowRef(String);

impl WorkflowRef {
    /// Prefix of server-assigned workflow ids.
    pub const ID_PREFIX: &'static str = "wf_";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Whether the reference already has the server-id shape and needs no lookup.
    pub fn is_workflow_id(&self) -> bool {
        self.0.starts_with(Self::ID_PREFIX)
    }

    /// Human display name derived from a slug: `my-flow` / `my_flow` become `My Flow`.
    pub fn display_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len());
        let mut capitalize_next = true;
        for ch in self.0.chars() {
            let ch = if ch == '_' || ch == '-' { ' ' } else { ch };
            if capitalize_next {
                name.push(ch.to_ascii_uppercase());
            } else {
                name.push(ch);
            }
            capitalize_next = ch == ' ';
        }
        name
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkflowRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WorkflowRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Lifecycle status of a run.
pub enum RunStatus {
    Pending,
    Running,
    #[default]
    Completed,
    Failed,
    Cancelled,
    Timeout,
}

impl RunStatus {
    /// Wire representation (`"COMPLETED"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// Parse the wire representation. Unrecognized values map to [`RunStatus::Pending`].
    pub fn from_wire(value: &str) -> Self {
        match value {
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            "TIMEOUT" => Self::Timeout,
            _ => Self::Pending,
        }
    }

    /// Whether the status ends a run.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Customer account status.
pub enum CustomerStatus {
    Active,
    LowBalance,
    Paused,
    /// Status string not known to this client version, kept verbatim.
    Other(String),
}

impl CustomerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::LowBalance => "LOW_BALANCE",
            Self::Paused => "PAUSED",
            Self::Other(value) => value,
        }
    }

    pub fn from_wire(value: &str) -> Self {
        match value {
            "ACTIVE" => Self::Active,
            "LOW_BALANCE" => Self::LowBalance,
            "PAUSED" => Self::Paused,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_trims_and_rejects_blank() {
        assert!(ApiKey::new("").is_none());
        assert!(ApiKey::new("   \t").is_none());
        assert_eq!(ApiKey::new(" sk_test_abc ").unwrap().as_str(), "sk_test_abc");
    }

    #[test]
    fn api_key_debug_hides_secret() {
        let key = ApiKey::new("sk_live_secret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(sk_***)");
    }

    #[test]
    fn key_type_detects_prefixes() {
        assert_eq!(KeyType::detect("sk_test_abc"), KeyType::Secret);
        assert_eq!(KeyType::detect("pk_live_abc"), KeyType::Public);
        assert_eq!(KeyType::detect("legacy_key"), KeyType::Unknown);
        assert_eq!(KeyType::detect("sk"), KeyType::Unknown);
        assert_eq!(KeyType::detect("x"), KeyType::Unknown);
        assert_eq!(KeyType::detect("é"), KeyType::Unknown);
    }

    #[test]
    fn workflow_ref_detects_server_ids() {
        assert!(WorkflowRef::new("wf_123").is_workflow_id());
        assert!(!WorkflowRef::new("training-run").is_workflow_id());
        assert!(!WorkflowRef::new("wf").is_workflow_id());
    }

    #[test]
    fn workflow_display_name_capitalizes_words() {
        assert_eq!(WorkflowRef::new("my-flow").display_name(), "My Flow");
        assert_eq!(WorkflowRef::new("data_sync-job").display_name(), "Data Sync Job");
        assert_eq!(WorkflowRef::new("Already Nice").display_name(), "Already Nice");
        assert_eq!(WorkflowRef::new("v2-run").display_name(), "V2 Run");
        assert_eq!(WorkflowRef::new("").display_name(), "");
    }

    #[test]
    fn run_status_round_trips_wire_strings() {
        for status in [
            RunStatus::Pending,
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Failed,
            RunStatus::Cancelled,
            RunStatus::Timeout,
        ] {
            assert_eq!(RunStatus::from_wire(status.as_str()), status);
        }
        assert_eq!(RunStatus::from_wire("bogus"), RunStatus::Pending);
        assert!(RunStatus::Timeout.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
    }

    #[test]
    fn customer_status_keeps_unknown_values() {
        assert_eq!(CustomerStatus::from_wire("LOW_BALANCE"), CustomerStatus::LowBalance);
        let other = CustomerStatus::from_wire("SUSPENDED");
        assert_eq!(other.as_str(), "SUSPENDED");
    }
}
