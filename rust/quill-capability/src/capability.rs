use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Sentinel capability that no principal ever holds. A requirement list that
/// contains it is an unconditional denial.
pub const DO_NOT_ALLOW: &str = "do_not_allow";

/// Capability held by every non-anonymous principal. Actions that are always
/// allowed for a signed-in user (editing one's own profile) resolve to it.
pub const EXIST: &str = "exist";

/// Name of the virtual role that carries network wide authority.
pub const SUPER_ADMIN_ROLE: &str = "superadmin";

/// Capabilities that only exist at network level in a multi-tenant
/// installation. They are granted through the virtual super-admin role and
/// never through a per-tenant role.
pub const NETWORK_CAPABILITIES: [&str; 10] = [
    "manage_network",
    "manage_sites",
    "manage_network_users",
    "manage_network_plugins",
    "manage_network_themes",
    "manage_network_options",
    "upgrade_network",
    "setup_network",
    "create_sites",
    "delete_sites",
];

/// The ordered list of primitive capabilities an action requires.
///
/// The list is never empty. Order is meaningful for introspection only: a
/// principal must hold every entry, and a list that contains
/// [`DO_NOT_ALLOW`] denies regardless of what the principal holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Requirements(Vec<String>);

impl From<Vec<String>> for Requirements {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<Requirements> for Vec<String> {
    fn from(requirements: Requirements) -> Self {
        requirements.0
    }
}

impl Requirements {
    /// A single requirement
    pub fn one(capability: impl Into<String>) -> Self {
        Self(vec![capability.into()])
    }

    /// The unconditional denial, `[do_not_allow]`
    pub fn deny() -> Self {
        Self::one(DO_NOT_ALLOW)
    }

    /// Requirement list from any sequence of names. An empty sequence
    /// becomes a denial.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            Self::deny()
        } else {
            Self(names)
        }
    }

    /// Whether this list denies unconditionally
    pub fn is_denied(&self) -> bool {
        self.0.iter().any(|name| name == DO_NOT_ALLOW)
    }

    /// Append a requirement
    pub fn push(&mut self, capability: impl Into<String>) {
        self.0.push(capability.into());
    }

    /// Append every requirement of another list, keeping order
    pub fn extend(&mut self, other: Requirements) {
        self.0.extend(other.0);
    }

    /// Remove every occurrence of `capability`. Removing the last entry
    /// leaves a denial in its place.
    pub fn remove(&mut self, capability: &str) {
        self.0.retain(|name| name != capability);
        if self.0.is_empty() {
            self.0.push(DO_NOT_ALLOW.to_string());
        }
    }

    /// Whether `capability` is part of the list
    pub fn contains(&self, capability: &str) -> bool {
        self.0.iter().any(|name| name == capability)
    }

    /// Iterate over the names in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Borrow the names as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; present for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying names
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Display for Requirements {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for Requirements {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::from_names(iter)
    }
}

impl PartialEq<[&str]> for Requirements {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for Requirements {
    fn eq(&self, other: &[&str; N]) -> bool {
        self == other.as_slice()
    }
}

/// A principal's effective set of primitive capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    /// An empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the set grants `capability`. [`DO_NOT_ALLOW`] is never
    /// granted, even if something inserted it.
    pub fn has(&self, capability: &str) -> bool {
        capability != DO_NOT_ALLOW && self.0.contains(capability)
    }

    /// Whether the set satisfies a requirement list
    pub fn satisfies(&self, requirements: &Requirements) -> bool {
        !requirements.is_denied() && requirements.iter().all(|name| self.has(name))
    }

    /// The requirements this set does not satisfy, in order
    pub fn missing<'a>(&self, requirements: &'a Requirements) -> Vec<&'a str> {
        requirements.iter().filter(|name| !self.has(name)).collect()
    }

    /// Grant a capability
    pub fn insert(&mut self, capability: impl Into<String>) {
        self.0.insert(capability.into());
    }

    /// Withdraw a capability
    pub fn remove(&mut self, capability: &str) {
        self.0.remove(capability);
    }

    /// Union another sequence of capabilities into this set
    pub fn union_with<'a>(&mut self, capabilities: impl IntoIterator<Item = &'a String>) {
        self.0.extend(capabilities.into_iter().cloned());
    }

    /// Iterate over the granted names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of granted capabilities
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is granted
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
