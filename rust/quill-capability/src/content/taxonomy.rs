use serde::{Deserialize, Serialize};

/// Capability names guarding the terms of a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyCapabilities {
    /// Manage the taxonomy as a whole
    pub manage_terms: String,
    /// Edit terms
    pub edit_terms: String,
    /// Delete terms
    pub delete_terms: String,
    /// Assign terms to posts
    pub assign_terms: String,
}

impl Default for TaxonomyCapabilities {
    fn default() -> Self {
        Self {
            manage_terms: "manage_categories".to_string(),
            edit_terms: "manage_categories".to_string(),
            delete_terms: "manage_categories".to_string(),
            assign_terms: "edit_posts".to_string(),
        }
    }
}

/// A registered taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Taxonomy name, e.g. `category`
    pub name: String,
    /// Capability names guarding its terms
    #[serde(default)]
    pub capabilities: TaxonomyCapabilities,
}

impl Taxonomy {
    /// A taxonomy with the default capabilities
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: TaxonomyCapabilities::default(),
        }
    }

    /// A taxonomy with explicit capabilities
    pub fn with_capabilities(mut self, capabilities: TaxonomyCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The capability for a `manage_terms`/`edit_terms`/`delete_terms`/
    /// `assign_terms` style name
    pub fn capability(&self, name: &str) -> Option<&str> {
        match name {
            "manage_terms" => Some(&self.capabilities.manage_terms),
            "edit_terms" => Some(&self.capabilities.edit_terms),
            "delete_terms" => Some(&self.capabilities.delete_terms),
            "assign_terms" => Some(&self.capabilities.assign_terms),
            _ => None,
        }
    }

    /// The built-in taxonomies
    pub fn builtins() -> Vec<Taxonomy> {
        vec![
            Taxonomy::new("category").with_capabilities(TaxonomyCapabilities {
                manage_terms: "manage_categories".to_string(),
                edit_terms: "edit_categories".to_string(),
                delete_terms: "delete_categories".to_string(),
                assign_terms: "assign_categories".to_string(),
            }),
            Taxonomy::new("post_tag").with_capabilities(TaxonomyCapabilities {
                manage_terms: "manage_post_tags".to_string(),
                edit_terms: "edit_post_tags".to_string(),
                delete_terms: "delete_post_tags".to_string(),
                assign_terms: "assign_post_tags".to_string(),
            }),
            Taxonomy::new("nav_menu"),
            Taxonomy::new("post_format"),
        ]
    }
}
