//! Registered content types: post types, post statuses, taxonomies and the
//! authorization rules attached to individual meta keys.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

mod post_type;
pub use post_type::*;

pub mod status;
pub use status::PostStatus;

mod taxonomy;
pub use taxonomy::*;

/// Kinds of object that carry meta data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Posts of any type
    Post,
    /// Comments
    Comment,
    /// Taxonomy terms
    Term,
    /// Users
    User,
}

impl ObjectKind {
    /// Name used in action names, e.g. `post` in `edit_post_meta`
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Post => "post",
            ObjectKind::Comment => "comment",
            ObjectKind::Term => "term",
            ObjectKind::User => "user",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every post type, post status and taxonomy the engine knows about.
///
/// The registry starts out with the built-ins and is extended by
/// registration at startup. It is read-only while checks run.
#[derive(Debug, Clone)]
pub struct ContentRegistry {
    post_types: HashMap<String, PostType>,
    statuses: HashMap<String, PostStatus>,
    taxonomies: HashMap<String, Taxonomy>,
    meta_aliases: HashMap<String, String>,
    meta_rules: BTreeMap<(ObjectKind, String, Option<String>), bool>,
}

impl Default for ContentRegistry {
    fn default() -> Self {
        let mut registry = Self {
            post_types: HashMap::new(),
            statuses: HashMap::new(),
            taxonomies: HashMap::new(),
            meta_aliases: HashMap::new(),
            meta_rules: BTreeMap::new(),
        };
        for post_type in PostType::builtins() {
            registry.register_post_type(post_type);
        }
        for status in PostStatus::builtins() {
            registry.register_status(status);
        }
        for taxonomy in Taxonomy::builtins() {
            registry.register_taxonomy(taxonomy);
        }
        registry
    }
}

impl ContentRegistry {
    /// Register (or replace) a post type.
    ///
    /// When the type maps meta capabilities, its singular meta capability
    /// names become aliases of `edit_post`, `read_post` and `delete_post`,
    /// so that e.g. `edit_book` for a `book` type resolves like `edit_post`.
    pub fn register_post_type(&mut self, post_type: PostType) {
        if post_type.map_meta_cap {
            let caps = &post_type.capabilities;
            for (alias, target) in [
                (&caps.edit_post, "edit_post"),
                (&caps.read_post, "read_post"),
                (&caps.delete_post, "delete_post"),
            ] {
                if alias != target {
                    self.meta_aliases.insert(alias.clone(), target.to_string());
                }
            }
        }
        self.post_types.insert(post_type.name.clone(), post_type);
    }

    /// Register (or replace) a post status
    pub fn register_status(&mut self, status: PostStatus) {
        self.statuses.insert(status.name.clone(), status);
    }

    /// Register (or replace) a taxonomy
    pub fn register_taxonomy(&mut self, taxonomy: Taxonomy) {
        self.taxonomies.insert(taxonomy.name.clone(), taxonomy);
    }

    /// Decide whether `key` may be edited on objects of `kind` by anyone who
    /// may edit the object. With a `subtype` (a post type or taxonomy) the
    /// rule applies to that subtype only and takes precedence over a rule
    /// without one.
    pub fn register_meta(
        &mut self,
        kind: ObjectKind,
        key: impl Into<String>,
        subtype: Option<&str>,
        allowed: bool,
    ) {
        self.meta_rules
            .insert((kind, key.into(), subtype.map(str::to_string)), allowed);
    }

    /// Look up a post type
    pub fn post_type(&self, name: &str) -> Option<&PostType> {
        self.post_types.get(name)
    }

    /// Look up a post status
    pub fn status(&self, name: &str) -> Option<&PostStatus> {
        self.statuses.get(name)
    }

    /// Look up a taxonomy
    pub fn taxonomy(&self, name: &str) -> Option<&Taxonomy> {
        self.taxonomies.get(name)
    }

    /// The generic meta capability a post-type specific one stands for
    pub fn meta_alias(&self, action: &str) -> Option<&str> {
        self.meta_aliases.get(action).map(String::as_str)
    }

    /// Whether a meta key may be changed by anyone allowed to edit the
    /// object. Keys starting with an underscore are protected unless a
    /// registered rule says otherwise.
    pub fn meta_allowed(&self, kind: ObjectKind, key: &str, subtype: &str) -> bool {
        let specific = self
            .meta_rules
            .get(&(kind, key.to_string(), Some(subtype.to_string())));
        let general = self.meta_rules.get(&(kind, key.to_string(), None));

        match specific.or(general) {
            Some(allowed) => *allowed,
            None => !is_protected_meta(key),
        }
    }
}

/// Meta keys starting with an underscore are internal to the application.
pub fn is_protected_meta(key: &str) -> bool {
    key.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_registers_aliases_for_mapped_post_types() {
        let mut registry = ContentRegistry::default();
        registry.register_post_type(PostType::new("book", "book"));
        registry.register_post_type(PostType::new("legacy", "legacy_item").map_meta_cap(false));

        assert_eq!(registry.meta_alias("edit_book"), Some("edit_post"));
        assert_eq!(registry.meta_alias("read_book"), Some("read_post"));
        assert_eq!(registry.meta_alias("edit_post"), None);
        assert_eq!(registry.meta_alias("edit_legacy_item"), None);
        assert_eq!(registry.meta_alias("edit_page"), Some("edit_post"));
    }

    #[test]
    fn it_protects_underscored_meta_keys() {
        let registry = ContentRegistry::default();

        assert!(registry.meta_allowed(ObjectKind::Post, "subtitle", "post"));
        assert!(!registry.meta_allowed(ObjectKind::Post, "_edit_lock", "post"));
    }

    #[test]
    fn it_prefers_subtype_specific_meta_rules() {
        let mut registry = ContentRegistry::default();
        registry.register_meta(ObjectKind::Post, "_price", None, true);
        registry.register_meta(ObjectKind::Post, "_price", Some("page"), false);
        registry.register_meta(ObjectKind::User, "nickname", None, false);

        assert!(registry.meta_allowed(ObjectKind::Post, "_price", "post"));
        assert!(!registry.meta_allowed(ObjectKind::Post, "_price", "page"));
        assert!(!registry.meta_allowed(ObjectKind::User, "nickname", "user"));
    }

    #[test]
    fn it_knows_the_builtin_content() {
        let registry = ContentRegistry::default();

        assert!(registry.post_type("page").is_some());
        assert!(registry.status("publish").unwrap().public);
        assert!(registry.status("private").unwrap().private);
        assert_eq!(
            registry.taxonomy("category").unwrap().capability("delete_terms"),
            Some("delete_categories")
        );
        assert!(registry.taxonomy("genre").is_none());
    }
}
