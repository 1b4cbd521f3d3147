use crate::{Argument, DataAccess, ObjectKind, QuillCapabilityError, Requirements, TenantScope};

use super::{Actor, MetaCapabilityResolver, object_id};

impl<D> MetaCapabilityResolver<D>
where
    D: DataAccess,
{
    /// `{add,edit,delete}_{post,comment,term,user}_meta`
    ///
    /// Changing meta requires editing the object. Protected keys, and keys a
    /// registered rule forbids, additionally require the meta action itself.
    pub(super) async fn object_meta(
        &self,
        kind: ObjectKind,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let Some(id) = object_id(action, arguments, 0)? else {
            return Ok(Requirements::deny());
        };
        let Some(subtype) = self.object_subtype(kind, id, actor.scope()).await? else {
            return Ok(Requirements::deny());
        };

        let edit = format!("edit_{kind}");
        let object = [Argument::from(id)];
        let mut requirements = self.resolve(&edit, actor, &object).await?;

        let key = arguments
            .get(1)
            .and_then(Argument::as_text)
            .filter(|key| !key.is_empty());
        if let Some(key) = key {
            if !self.content.meta_allowed(kind, key, &subtype) {
                requirements.push(action);
            }
        }

        Ok(requirements)
    }

    async fn object_subtype(
        &self,
        kind: ObjectKind,
        id: u64,
        scope: TenantScope,
    ) -> Result<Option<String>, QuillCapabilityError> {
        Ok(match kind {
            ObjectKind::Post => self.post(id).await?.map(|post| post.post_type),
            ObjectKind::Comment => self
                .data
                .comment(id)
                .await
                .map_err(Into::into)?
                .map(|_| kind.to_string()),
            ObjectKind::Term => self
                .data
                .term(id)
                .await
                .map_err(Into::into)?
                .map(|term| term.taxonomy),
            ObjectKind::User => self
                .data
                .user_roles(crate::PrincipalId(id), scope)
                .await
                .map_err(Into::into)?
                .map(|_| kind.to_string()),
        })
    }
}
