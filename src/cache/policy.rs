//! Namespace Policy Module
//!
//! Maps key prefixes to TTL and capacity policies. Every key is governed by
//! exactly one policy: the first declared prefix that matches, or the default.

// == Namespace Policy ==
/// TTL and capacity bounds for one key namespace.
#[derive(Debug, Clone)]
pub struct NamespacePolicy {
    /// Key prefix identifying the namespace (empty for the default policy)
    pub prefix: String,
    /// Default lifetime in milliseconds for entries in this namespace
    pub ttl_ms: u64,
    /// Maximum number of live entries permitted in this namespace
    pub max_entries: usize,
}

impl NamespacePolicy {
    /// Creates a policy for the given prefix.
    pub fn new(prefix: impl Into<String>, ttl_ms: u64, max_entries: usize) -> Self {
        Self {
            prefix: prefix.into(),
            ttl_ms,
            max_entries,
        }
    }
}

// == Policy Table ==
/// Ordered set of namespace policies plus a mandatory default.
///
/// Resolution is first-prefix-match in declaration order; keys matching no
/// declared prefix fall through to the default policy. The table is fixed
/// once the store is constructed.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    policies: Vec<NamespacePolicy>,
    default_policy: NamespacePolicy,
}

impl PolicyTable {
    // == Constructor ==
    /// Creates a table from an ordered policy list and a default.
    pub fn new(policies: Vec<NamespacePolicy>, default_policy: NamespacePolicy) -> Self {
        Self {
            policies,
            default_policy,
        }
    }

    // == Resolve ==
    /// Returns the policy governing `key`.
    pub fn resolve(&self, key: &str) -> &NamespacePolicy {
        self.policies
            .iter()
            .find(|policy| key.starts_with(&policy.prefix))
            .unwrap_or(&self.default_policy)
    }

    /// Returns the index of the declared policy matching `key`, or `None`
    /// for the default namespace. Used to decide whether two keys share a
    /// namespace for capacity accounting.
    pub fn resolve_index(&self, key: &str) -> Option<usize> {
        self.policies
            .iter()
            .position(|policy| key.starts_with(&policy.prefix))
    }

    /// Returns the declared policies, default excluded.
    pub fn policies(&self) -> &[NamespacePolicy] {
        &self.policies
    }

    /// Returns the default policy.
    pub fn default_policy(&self) -> &NamespacePolicy {
        &self.default_policy
    }
}

impl Default for PolicyTable {
    /// The dashboard namespace table: TTLs and capacities for each data
    /// family served by the backend.
    fn default() -> Self {
        Self::new(
            vec![
                NamespacePolicy::new("admin-stats", 5 * 60 * 1000, 10),
                NamespacePolicy::new("user-activity", 10 * 60 * 1000, 50),
                NamespacePolicy::new("bean-submissions", 2 * 60 * 1000, 100),
                NamespacePolicy::new("images", 15 * 60 * 1000, 200),
                NamespacePolicy::new("annotations", 5 * 60 * 1000, 100),
                NamespacePolicy::new("farm-data", 30 * 60 * 1000, 50),
                NamespacePolicy::new("user-management", 10 * 60 * 1000, 100),
                NamespacePolicy::new("activity-logs", 60 * 1000, 50),
                NamespacePolicy::new("locations", 60 * 60 * 1000, 20),
            ],
            NamespacePolicy::new("", 5 * 60 * 1000, 100),
        )
    }
}
