use crate::{Argument, DataAccess, QuillCapabilityError, Requirements, TenantId, is_truthy};

use super::{Actor, MetaCapabilityResolver};

impl<D> MetaCapabilityResolver<D>
where
    D: DataAccess,
{
    /// Network administration actions and `manage_options`.
    ///
    /// On a single tenant every network action collapses into the site
    /// administration capability closest to it.
    pub(super) async fn network(
        &self,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        if !self.settings.is_multi_tenant() {
            return Ok(Requirements::one(match action {
                "manage_network_users" => "edit_users",
                "manage_network_plugins" => "activate_plugins",
                "manage_network_themes" => "switch_themes",
                _ => "manage_options",
            }));
        }

        for argument in arguments {
            if !self.tenants_exist(argument).await? {
                tracing::debug!(action, argument = ?argument, "Denying action on an unknown tenant");
                return Ok(Requirements::deny());
            }
        }

        if action == "manage_options" || actor.principal.is_super_admin() {
            Ok(Requirements::one(action))
        } else {
            Ok(Requirements::deny())
        }
    }

    pub(super) fn setup_network(&self) -> Requirements {
        if self.settings.is_multi_tenant() {
            Requirements::one("manage_network_options")
        } else {
            Requirements::one("manage_options")
        }
    }

    pub(super) fn delete_site(&self) -> Requirements {
        if self.settings.is_multi_tenant() {
            Requirements::one("manage_options")
        } else {
            Requirements::deny()
        }
    }

    pub(super) fn privacy(&self) -> Requirements {
        if self.settings.is_multi_tenant() {
            Requirements::one("manage_network")
        } else {
            Requirements::one("manage_options")
        }
    }

    /// `activate_plugins` and its singular and `deactivate_` forms. In a
    /// network the plugin screen may be withheld from site administrators.
    pub(super) async fn activate_plugins(&self) -> Result<Requirements, QuillCapabilityError> {
        let mut requirements = Requirements::one("activate_plugins");
        if self.settings.is_multi_tenant() {
            let menu = self.network_option("menu_items").await?;
            let plugins_menu = menu
                .as_ref()
                .and_then(|menu| menu.get("plugins"))
                .is_some_and(is_truthy);
            if !plugins_menu {
                requirements.push("manage_network_plugins");
            }
        }
        Ok(requirements)
    }

    /// Whether every tenant id carried by `argument` names an existing
    /// tenant
    async fn tenants_exist(&self, argument: &Argument) -> Result<bool, QuillCapabilityError> {
        let ids = match argument {
            Argument::Text(text) => match text.trim().parse::<i64>() {
                Ok(id) => vec![id],
                Err(_) => return Ok(false),
            },
            other => other.integers(),
        };

        for id in ids {
            if id <= 0 {
                return Ok(false);
            }
            let exists = self
                .data
                .tenant_exists(TenantId(id as u64))
                .await
                .map_err(Into::into)?;
            if !exists {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
