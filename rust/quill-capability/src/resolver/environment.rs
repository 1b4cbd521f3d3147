use crate::{DataAccess, QuillCapabilityError, Requirements, is_truthy};

use super::{Actor, MetaCapabilityResolver};

impl<D> MetaCapabilityResolver<D>
where
    D: DataAccess,
{
    /// In a network, only super-admins pass environment gated actions
    fn network_reserved(&self, actor: Actor<'_>) -> bool {
        self.settings.is_multi_tenant() && !actor.principal.is_super_admin()
    }

    pub(super) fn unfiltered_html(&self, actor: Actor<'_>) -> Requirements {
        if self.settings.disallow_unfiltered_html || self.network_reserved(actor) {
            Requirements::deny()
        } else {
            Requirements::one("unfiltered_html")
        }
    }

    pub(super) fn edit_files(&self, action: &str, actor: Actor<'_>) -> Requirements {
        if self.settings.disallow_file_edit
            || !self.settings.file_mods_allowed()
            || self.network_reserved(actor)
        {
            Requirements::deny()
        } else {
            Requirements::one(action)
        }
    }

    pub(super) fn file_mods(&self, action: &str, actor: Actor<'_>) -> Requirements {
        if !self.settings.file_mods_allowed() || self.network_reserved(actor) {
            return Requirements::deny();
        }
        Requirements::one(match action {
            "upload_plugins" => "install_plugins",
            "upload_themes" => "install_themes",
            other => other,
        })
    }

    pub(super) fn languages(&self, actor: Actor<'_>) -> Requirements {
        if !self.settings.file_mods_allowed() || self.network_reserved(actor) {
            Requirements::deny()
        } else {
            Requirements::one("install_languages")
        }
    }

    /// `update_php`, `update_https`
    pub(super) fn update_environment(&self, actor: Actor<'_>) -> Requirements {
        if self.network_reserved(actor) {
            Requirements::deny()
        } else {
            Requirements::one("update_core")
        }
    }

    pub(super) fn unfiltered_upload(&self, actor: Actor<'_>) -> Requirements {
        if self.settings.allow_unfiltered_uploads && !self.network_reserved(actor) {
            Requirements::one("unfiltered_upload")
        } else {
            Requirements::deny()
        }
    }

    pub(super) async fn manage_links(
        &self,
        actor: Actor<'_>,
    ) -> Result<Requirements, QuillCapabilityError> {
        let enabled = self
            .tenant_option(actor.scope(), "link_manager_enabled")
            .await?;
        Ok(if enabled.as_ref().is_some_and(is_truthy) {
            Requirements::one("manage_links")
        } else {
            Requirements::deny()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::helpers::*;
    use crate::{
        Argument, AuthorizationChecker, CapabilitySet, ConfigScope, PrincipalId, Settings, TenantId,
        TenantScope,
    };

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    use wasm_bindgen_test::wasm_bindgen_test;

    async fn resolve(
        checker: &AuthorizationChecker<impl DataAccess>,
        principal: PrincipalId,
        action: &str,
    ) -> Result<Requirements, QuillCapabilityError> {
        let principal = checker.principal(principal, TenantScope::default()).await?;
        let capabilities = CapabilitySet::new();
        checker
            .resolver()
            .resolve(action, Actor::new(&principal, &capabilities), &[] as &[Argument])
            .await
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_toggles_unfiltered_html() -> anyhow::Result<()> {
        let fixture = Fixture::single_tenant().await;
        let locked = AuthorizationChecker::new(
            fixture.data.clone(),
            Settings {
                disallow_unfiltered_html: true,
                ..Settings::default()
            },
        );

        assert_eq!(
            resolve(&fixture.checker, ADMINISTRATOR, "unfiltered_html").await?,
            ["unfiltered_html"]
        );
        assert_eq!(
            resolve(&fixture.checker, ADMINISTRATOR, "edit_css").await?,
            ["unfiltered_html"]
        );
        assert!(resolve(&locked, ADMINISTRATOR, "unfiltered_html").await?.is_denied());

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_honours_file_modification_switches() -> anyhow::Result<()> {
        let fixture = Fixture::single_tenant().await;
        let no_edit = AuthorizationChecker::new(
            fixture.data.clone(),
            Settings {
                disallow_file_edit: true,
                ..Settings::default()
            },
        );
        let no_mods = AuthorizationChecker::new(
            fixture.data.clone(),
            Settings {
                disallow_file_mods: true,
                ..Settings::default()
            },
        );

        assert_eq!(resolve(&fixture.checker, ADMINISTRATOR, "edit_themes").await?, ["edit_themes"]);
        assert_eq!(
            resolve(&fixture.checker, ADMINISTRATOR, "upload_plugins").await?,
            ["install_plugins"]
        );
        assert_eq!(
            resolve(&fixture.checker, ADMINISTRATOR, "update_languages").await?,
            ["install_languages"]
        );
        assert!(resolve(&no_edit, ADMINISTRATOR, "edit_plugins").await?.is_denied());
        assert_eq!(resolve(&no_edit, ADMINISTRATOR, "update_core").await?, ["update_core"]);
        assert!(resolve(&no_mods, ADMINISTRATOR, "edit_files").await?.is_denied());
        assert!(resolve(&no_mods, ADMINISTRATOR, "install_themes").await?.is_denied());
        assert!(resolve(&no_mods, ADMINISTRATOR, "install_languages").await?.is_denied());
        assert_eq!(resolve(&no_mods, ADMINISTRATOR, "update_https").await?, ["update_core"]);

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_reserves_environment_actions_to_super_admins_in_networks() -> anyhow::Result<()> {
        let fixture = Fixture::multi_tenant().await;

        for action in [
            "unfiltered_html",
            "edit_plugins",
            "update_plugins",
            "install_languages",
            "update_php",
        ] {
            assert!(resolve(&fixture.checker, ADMINISTRATOR, action).await?.is_denied());
            assert!(!resolve(&fixture.checker, SUPER_ADMIN, action).await?.is_denied());
        }

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_gates_unfiltered_uploads_and_links() -> anyhow::Result<()> {
        let fixture = Fixture::single_tenant().await;
        let uploads = AuthorizationChecker::new(
            fixture.data.clone(),
            Settings {
                allow_unfiltered_uploads: true,
                ..Settings::default()
            },
        );

        assert!(
            resolve(&fixture.checker, ADMINISTRATOR, "unfiltered_upload")
                .await?
                .is_denied()
        );
        assert_eq!(
            resolve(&uploads, ADMINISTRATOR, "unfiltered_upload").await?,
            ["unfiltered_upload"]
        );

        assert!(resolve(&fixture.checker, ADMINISTRATOR, "manage_links").await?.is_denied());
        fixture
            .data
            .set_config(ConfigScope::Tenant(TenantId::MAIN), "link_manager_enabled", json!(1))
            .await;
        assert_eq!(
            resolve(&fixture.checker, ADMINISTRATOR, "manage_links").await?,
            ["manage_links"]
        );

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_maps_fixed_actions() -> anyhow::Result<()> {
        let fixture = Fixture::single_tenant().await;

        for (action, expected) in [
            ("customize", "edit_theme_options"),
            ("resume_plugin", "resume_plugins"),
            ("resume_theme", "resume_themes"),
            ("view_site_health_checks", "install_plugins"),
        ] {
            assert_eq!(resolve(&fixture.checker, ADMINISTRATOR, action).await?, [expected]);
        }

        Ok(())
    }
}
