use crate::{Argument, DataAccess, QuillCapabilityError, Requirements, as_id};

use super::{Actor, MetaAction, MetaCapabilityResolver, TermOperation, object_id};

/// Whether a taxonomy capability names a term or taxonomy rule itself. Such
/// a capability is required literally, since resolving it would lead back
/// here.
fn names_term_rule(capability: &str) -> bool {
    matches!(
        MetaAction::from_name(capability),
        Some(MetaAction::Term(_) | MetaAction::Taxonomy(_))
    )
}

impl<D> MetaCapabilityResolver<D>
where
    D: DataAccess,
{
    /// `edit_term`, `delete_term`, `assign_term`
    pub(super) async fn term(
        &self,
        operation: TermOperation,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let Some(id) = object_id(action, arguments, 0)? else {
            return Ok(Requirements::deny());
        };
        let Some(term) = self.data.term(id).await.map_err(Into::into)? else {
            return Ok(Requirements::deny());
        };
        let Some(taxonomy) = self.content.taxonomy(&term.taxonomy) else {
            return Ok(Requirements::deny());
        };

        if operation == TermOperation::Delete {
            for option in [
                format!("default_{}", taxonomy.name),
                format!("default_term_{}", taxonomy.name),
            ] {
                let default = self.tenant_option(actor.scope(), &option).await?;
                if default.as_ref().and_then(as_id) == Some(term.id) {
                    return Ok(Requirements::deny());
                }
            }
        }

        let Some(capability) = taxonomy.capability(operation.capability_slot()) else {
            return Ok(Requirements::deny());
        };
        if names_term_rule(capability) {
            return Ok(Requirements::one(capability));
        }

        let object = [Argument::from(term.id)];
        self.resolve(capability, actor, &object).await
    }

    /// `manage_terms`, `edit_terms`, `delete_terms`, `assign_terms`, with
    /// the taxonomy name as first argument
    pub(super) async fn taxonomy(
        &self,
        operation: TermOperation,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let name = crate::argument::required(action, arguments, 0)?;
        let Some(taxonomy) = name.as_text().and_then(|name| self.content.taxonomy(name)) else {
            return Ok(Requirements::deny());
        };
        let Some(capability) = taxonomy.capability(operation.capability_slot()) else {
            return Ok(Requirements::deny());
        };
        if names_term_rule(capability) {
            return Ok(Requirements::one(capability));
        }

        self.resolve(capability, actor, &[]).await
    }
}
