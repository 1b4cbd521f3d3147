use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::SUPER_ADMIN_ROLE;

/// A named set of primitive capabilities.
///
/// Roles are values: edits produce a new role rather than changing the one
/// a running check may be looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: String,
    display_name: String,
    capabilities: BTreeSet<String>,
}

impl Role {
    /// Create a role granting `capabilities`. Empty names are dropped.
    pub fn new<I, S>(name: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        Self {
            display_name: display_name_for(&name),
            name,
            capabilities: capabilities
                .into_iter()
                .map(Into::into)
                .filter(|capability: &String| !capability.is_empty())
                .collect(),
        }
    }

    /// Build a role from its persisted definition. Only capabilities stored
    /// as `true` are granted.
    pub fn from_definition(definition: RoleDefinition) -> Self {
        let granted = definition
            .capabilities
            .into_iter()
            .filter_map(|(capability, granted)| granted.then_some(capability));
        let mut role = Role::new(definition.name, granted);
        if let Some(display_name) = definition.display_name {
            role.display_name = display_name;
        }
        role
    }

    /// Replace the human readable name
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// A copy of this role that also grants `capability`
    pub fn with_capability(&self, capability: impl Into<String>) -> Self {
        let capability = capability.into();
        let mut role = self.clone();
        if !capability.is_empty() {
            role.capabilities.insert(capability);
        }
        role
    }

    /// A copy of this role that no longer grants `capability`
    pub fn without_capability(&self, capability: &str) -> Self {
        let mut role = self.clone();
        role.capabilities.remove(capability);
        role
    }

    /// Unique name of the role within its tenant
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Capabilities granted by the role
    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    /// Exact, case-sensitive membership
    pub fn has(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    /// Whether this is the virtual network super-admin role
    pub fn is_super_admin(&self) -> bool {
        self.name == SUPER_ADMIN_ROLE
    }
}

fn display_name_for(name: &str) -> String {
    let mut characters = name.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

/// Persisted shape of a role, as stored per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Unique role name
    pub name: String,
    /// Optional human readable name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Capability name to grant flag
    #[serde(default)]
    pub capabilities: IndexMap<String, bool>,
}

impl RoleDefinition {
    /// A definition granting every capability in `capabilities`
    pub fn granting<I, S>(name: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            display_name: None,
            capabilities: capabilities.into_iter().map(|c| (c.into(), true)).collect(),
        }
    }
}

const SUBSCRIBER: &[&str] = &["read"];

const CONTRIBUTOR: &[&str] = &["edit_posts", "read", "delete_posts"];

const AUTHOR: &[&str] = &[
    "upload_files",
    "edit_posts",
    "edit_published_posts",
    "publish_posts",
    "read",
    "delete_posts",
    "delete_published_posts",
];

const EDITOR: &[&str] = &[
    "moderate_comments",
    "manage_categories",
    "manage_links",
    "upload_files",
    "unfiltered_html",
    "edit_posts",
    "edit_others_posts",
    "edit_published_posts",
    "publish_posts",
    "edit_pages",
    "read",
    "edit_others_pages",
    "edit_published_pages",
    "publish_pages",
    "delete_pages",
    "delete_others_pages",
    "delete_published_pages",
    "delete_posts",
    "delete_others_posts",
    "delete_published_posts",
    "delete_private_posts",
    "edit_private_posts",
    "read_private_posts",
    "delete_private_pages",
    "edit_private_pages",
    "read_private_pages",
];

const ADMINISTRATOR_EXTRA: &[&str] = &[
    "switch_themes",
    "edit_themes",
    "activate_plugins",
    "edit_plugins",
    "edit_users",
    "edit_files",
    "manage_options",
    "import",
    "delete_users",
    "create_users",
    "unfiltered_upload",
    "edit_dashboard",
    "update_plugins",
    "delete_plugins",
    "install_plugins",
    "update_themes",
    "install_themes",
    "update_core",
    "list_users",
    "remove_users",
    "promote_users",
    "edit_theme_options",
    "delete_themes",
    "export",
    "install_languages",
    "resume_plugins",
    "resume_themes",
];

/// The built-in roles, in the order callers enumerating roles rely on.
pub fn builtin_roles() -> Vec<Role> {
    vec![
        Role::new(
            "administrator",
            EDITOR.iter().chain(ADMINISTRATOR_EXTRA).copied(),
        ),
        Role::new("editor", EDITOR.iter().copied()),
        Role::new("author", AUTHOR.iter().copied()),
        Role::new("contributor", CONTRIBUTOR.iter().copied()),
        Role::new("subscriber", SUBSCRIBER.iter().copied()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_answers_membership_exactly() {
        let role = Role::new("editor", ["edit_posts", "read"]);

        assert!(role.has("edit_posts"));
        assert!(!role.has("Edit_Posts"));
        assert!(!role.has("manage_options"));
        assert!(!role.is_super_admin());
        assert_eq!(role.display_name(), "Editor");
    }

    #[test]
    fn it_produces_new_snapshots_on_edit() {
        let role = Role::new("author", ["read"]);
        let extended = role.with_capability("upload_files");
        let reduced = extended.without_capability("read");

        assert!(!role.has("upload_files"));
        assert!(extended.has("upload_files") && extended.has("read"));
        assert!(!reduced.has("read"));
    }

    #[test]
    fn it_only_grants_true_entries_of_a_definition() {
        let mut definition = RoleDefinition::granting("shop_manager", ["read", "", "manage_shop"]);
        definition.capabilities.insert("edit_posts".into(), false);
        definition.display_name = Some("Shop Manager".into());

        let role = Role::from_definition(definition);

        assert!(role.has("manage_shop"));
        assert!(!role.has("edit_posts"));
        assert!(!role.has(""));
        assert_eq!(role.display_name(), "Shop Manager");
    }

    #[test]
    fn it_ships_builtins_in_a_fixed_order() {
        let names: Vec<_> = builtin_roles()
            .iter()
            .map(|role| role.name().to_string())
            .collect();

        assert_eq!(
            names,
            ["administrator", "editor", "author", "contributor", "subscriber"]
        );
    }

    #[test]
    fn it_recognises_the_super_admin_role() {
        assert!(Role::new(SUPER_ADMIN_ROLE, ["manage_network"]).is_super_admin());
    }
}
