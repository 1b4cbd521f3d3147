use crate::{Argument, DataAccess, EXIST, PrincipalId, QuillCapabilityError, Requirements, is_truthy};

use super::{Actor, MetaCapabilityResolver};

impl<D> MetaCapabilityResolver<D>
where
    D: DataAccess,
{
    /// `edit_user`, `edit_users`
    pub(super) async fn edit_user(
        &self,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let target = if action == "edit_user" {
            let Some(id) = super::object_id(action, arguments, 0)? else {
                return Ok(Requirements::deny());
            };
            let target = PrincipalId(id);
            if self
                .data
                .user_roles(target, actor.scope())
                .await
                .map_err(Into::into)?
                .is_none()
            {
                return Ok(Requirements::deny());
            }
            if target == actor.principal.id() {
                return Ok(Requirements::one(EXIST));
            }
            Some(target)
        } else {
            None
        };

        if self.settings.is_multi_tenant() {
            if self.protects(actor, target).await? {
                return Ok(Requirements::deny());
            }
            if !self.actor_can(actor, "manage_network_users").await? {
                return Ok(Requirements::deny());
            }
        }

        Ok(Requirements::one("edit_users"))
    }

    /// `delete_user`, `delete_users`
    pub(super) async fn delete_user(
        &self,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        if self.settings.is_multi_tenant() && !actor.principal.is_super_admin() {
            return Ok(Requirements::deny());
        }
        if self.protects(actor, optional_target(arguments)).await? {
            return Ok(Requirements::deny());
        }
        Ok(Requirements::one("delete_users"))
    }

    /// `remove_user`
    pub(super) async fn remove_user(
        &self,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let target = optional_target(arguments);
        if target == Some(actor.principal.id()) && !self.has_network_authority(actor) {
            return Ok(Requirements::deny());
        }
        if self.protects(actor, target).await? {
            return Ok(Requirements::deny());
        }
        Ok(Requirements::one("remove_users"))
    }

    /// `promote_user`, `add_users`
    pub(super) async fn promote_user(
        &self,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        if action == "promote_user" && self.protects(actor, optional_target(arguments)).await? {
            return Ok(Requirements::deny());
        }
        Ok(Requirements::one("promote_users"))
    }

    /// `create_users`
    pub(super) async fn create_users(
        &self,
        actor: Actor<'_>,
    ) -> Result<Requirements, QuillCapabilityError> {
        if !self.settings.is_multi_tenant() || actor.principal.is_super_admin() {
            return Ok(Requirements::one("create_users"));
        }
        let open = self.network_option("add_new_users").await?;
        Ok(if open.as_ref().is_some_and(is_truthy) {
            Requirements::one("create_users")
        } else {
            Requirements::deny()
        })
    }

    /// Application password management defers to editing the user
    pub(super) async fn app_password(
        &self,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let target = crate::argument::required(action, arguments, 0)?;
        self.resolve("edit_user", actor, std::slice::from_ref(target))
            .await
    }

    /// Whether `target` is a super-admin the actor may not touch
    async fn protects(
        &self,
        actor: Actor<'_>,
        target: Option<PrincipalId>,
    ) -> Result<bool, QuillCapabilityError> {
        let Some(target) = target else {
            return Ok(false);
        };
        if self.has_network_authority(actor) {
            return Ok(false);
        }
        self.is_super_admin(target).await
    }

    /// Super-admins in a network. On a single tenant the notion collapses
    /// into whoever may delete users.
    fn has_network_authority(&self, actor: Actor<'_>) -> bool {
        if self.settings.is_multi_tenant() {
            actor.principal.is_super_admin()
        } else {
            actor.capabilities.has("delete_users")
        }
    }
}

fn optional_target(arguments: &[Argument]) -> Option<PrincipalId> {
    arguments
        .first()
        .and_then(Argument::as_object_id)
        .map(PrincipalId)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::helpers::*;
    use crate::{ConfigScope, TenantScope};

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    use wasm_bindgen_test::wasm_bindgen_test;

    async fn resolve(
        fixture: &Fixture,
        principal: PrincipalId,
        action: &str,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let principal = fixture.principal(principal).await?;
        let registry = fixture.checker.roles(TenantScope::default()).await?;
        let capabilities = principal.capabilities(&registry).await;
        fixture
            .checker
            .resolver()
            .resolve(action, Actor::new(&principal, &capabilities), arguments)
            .await
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_lets_users_edit_themselves() -> anyhow::Result<()> {
        let fixture = Fixture::single_tenant().await;

        assert_eq!(
            resolve(&fixture, SUBSCRIBER, "edit_user", &[SUBSCRIBER.0.into()]).await?,
            ["exist"]
        );
        assert_eq!(
            resolve(&fixture, SUBSCRIBER, "edit_user", &[EDITOR.0.into()]).await?,
            ["edit_users"]
        );
        assert!(
            resolve(&fixture, ADMINISTRATOR, "edit_user", &[404.into()])
                .await?
                .is_denied()
        );
        assert_eq!(
            resolve(&fixture, SUBSCRIBER, "create_app_password", &[SUBSCRIBER.0.into()]).await?,
            ["exist"]
        );

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_reserves_user_management_to_super_admins_in_networks() -> anyhow::Result<()> {
        let fixture = Fixture::multi_tenant().await;

        assert!(
            resolve(&fixture, ADMINISTRATOR, "edit_user", &[EDITOR.0.into()])
                .await?
                .is_denied()
        );
        assert!(
            resolve(&fixture, ADMINISTRATOR, "edit_user", &[SUPER_ADMIN.0.into()])
                .await?
                .is_denied()
        );
        assert_eq!(
            resolve(&fixture, SUPER_ADMIN, "edit_user", &[EDITOR.0.into()]).await?,
            ["edit_users"]
        );
        assert!(resolve(&fixture, ADMINISTRATOR, "delete_users", &[]).await?.is_denied());
        assert_eq!(
            resolve(&fixture, SUPER_ADMIN, "delete_user", &[EDITOR.0.into()]).await?,
            ["delete_users"]
        );
        assert!(
            resolve(&fixture, ADMINISTRATOR, "promote_user", &[SUPER_ADMIN.0.into()])
                .await?
                .is_denied()
        );
        assert_eq!(
            resolve(&fixture, ADMINISTRATOR, "add_users", &[SUPER_ADMIN.0.into()]).await?,
            ["promote_users"]
        );

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_guards_removing_users() -> anyhow::Result<()> {
        let single = Fixture::single_tenant().await;
        let network = Fixture::multi_tenant().await;

        assert_eq!(
            resolve(&single, ADMINISTRATOR, "remove_user", &[ADMINISTRATOR.0.into()]).await?,
            ["remove_users"]
        );
        assert!(
            resolve(&single, EDITOR, "remove_user", &[EDITOR.0.into()])
                .await?
                .is_denied()
        );
        assert!(
            resolve(&network, ADMINISTRATOR, "remove_user", &[ADMINISTRATOR.0.into()])
                .await?
                .is_denied()
        );
        assert!(
            resolve(&network, ADMINISTRATOR, "remove_user", &[SUPER_ADMIN.0.into()])
                .await?
                .is_denied()
        );
        assert_eq!(
            resolve(&network, ADMINISTRATOR, "remove_user", &[EDITOR.0.into()]).await?,
            ["remove_users"]
        );

        Ok(())
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_gates_user_creation_on_the_network_option() -> anyhow::Result<()> {
        let single = Fixture::single_tenant().await;
        let network = Fixture::multi_tenant().await;

        assert_eq!(
            resolve(&single, ADMINISTRATOR, "create_users", &[]).await?,
            ["create_users"]
        );
        assert!(
            resolve(&network, ADMINISTRATOR, "create_users", &[])
                .await?
                .is_denied()
        );
        assert_eq!(
            resolve(&network, SUPER_ADMIN, "create_users", &[]).await?,
            ["create_users"]
        );

        network
            .data
            .set_config(ConfigScope::Network, "add_new_users", json!("1"))
            .await;
        assert_eq!(
            resolve(&network, ADMINISTRATOR, "create_users", &[]).await?,
            ["create_users"]
        );

        Ok(())
    }
}
