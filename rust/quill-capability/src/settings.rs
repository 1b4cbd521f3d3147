use serde::{Deserialize, Serialize};

use crate::{QuillCapabilityError, TenantId};

/// Deployment topology of the installation being authorized.
///
/// The topology changes what "administrator" means: in a multi-tenant
/// network the network wide authority belongs to super-admins, and several
/// actions that a site administrator may perform on a single site are
/// reserved for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// One site, no network and no super-admins
    #[default]
    SingleTenant,
    /// A network of sites sharing one user base
    MultiTenant,
}

impl Topology {
    /// Whether this is a multi-tenant network
    pub fn is_multi_tenant(&self) -> bool {
        matches!(self, Topology::MultiTenant)
    }
}

/// Installation wide settings consumed by the engine.
///
/// These correspond to constants fixed at deploy time. Options that vary
/// per tenant (the front page, the default category, whether the link
/// manager is enabled) are read through [`crate::DataAccess::config_value`]
/// instead.
///
/// ```
/// use quill_capability::{Settings, Topology};
///
/// let settings = Settings::from_json(
///     r#"{ "topology": "multi_tenant", "disallow_file_edit": true }"#,
/// ).unwrap();
///
/// assert_eq!(settings.topology, Topology::MultiTenant);
/// assert!(settings.disallow_file_edit);
/// assert!(!settings.allow_unfiltered_uploads);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Deployment topology
    pub topology: Topology,
    /// Tenant used when a caller does not name one
    pub default_tenant: TenantId,
    /// Forbid editing plugin and theme files from the dashboard
    pub disallow_file_edit: bool,
    /// Forbid installing, updating and deleting plugins, themes and core
    pub disallow_file_mods: bool,
    /// Forbid unfiltered HTML for everyone, administrators included
    pub disallow_unfiltered_html: bool,
    /// Permit uploads that bypass the file type allow list
    pub allow_unfiltered_uploads: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            topology: Topology::SingleTenant,
            default_tenant: TenantId::MAIN,
            disallow_file_edit: false,
            disallow_file_mods: false,
            disallow_unfiltered_html: false,
            allow_unfiltered_uploads: false,
        }
    }
}

impl Settings {
    /// Settings for a network of sites
    pub fn multi_tenant() -> Self {
        Self {
            topology: Topology::MultiTenant,
            ..Self::default()
        }
    }

    /// Parse settings from a JSON document. Missing fields take their
    /// default value.
    pub fn from_json(source: &str) -> Result<Self, QuillCapabilityError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Whether the installation is a multi-tenant network
    pub fn is_multi_tenant(&self) -> bool {
        self.topology.is_multi_tenant()
    }

    /// Whether plugin, theme and core files may be modified at all
    pub fn file_mods_allowed(&self) -> bool {
        !self.disallow_file_mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_defaults_to_a_permissive_single_tenant_install() {
        let settings = Settings::from_json("{}").unwrap();

        assert_eq!(settings, Settings::default());
        assert!(!settings.is_multi_tenant());
        assert!(settings.file_mods_allowed());
        assert_eq!(settings.default_tenant, TenantId::MAIN);
    }

    #[test]
    fn it_rejects_unknown_topologies() {
        let error = Settings::from_json(r#"{ "topology": "galactic" }"#).unwrap_err();

        assert!(matches!(error, QuillCapabilityError::Settings(_)));
    }
}
