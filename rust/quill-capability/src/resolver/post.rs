use crate::content::status::{self, is_published};
use crate::{
    Argument, DataAccess, PostRecord, PostType, QuillCapabilityError, Requirements, as_id,
};

use super::{Actor, MetaCapabilityResolver, PostChange, object_id};

const REVISION: &str = "revision";
const ATTACHMENT: &str = "attachment";

impl<D> MetaCapabilityResolver<D>
where
    D: DataAccess,
{
    /// `edit_post`, `edit_page`, `delete_post`, `delete_page`
    pub(super) async fn change_post(
        &self,
        change: PostChange,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let Some(id) = object_id(action, arguments, 0)? else {
            return Ok(Requirements::deny());
        };
        let Some(mut post) = self.post(id).await? else {
            return Ok(Requirements::deny());
        };

        if post.post_type == REVISION {
            if change == PostChange::Delete {
                return Ok(Requirements::deny());
            }
            match self.parent_of(&post).await? {
                Some(parent) => post = parent,
                None => return Ok(Requirements::deny()),
            }
        }

        if change == PostChange::Delete {
            let scope = actor.scope();
            for option in ["page_for_posts", "page_on_front"] {
                let page = self.tenant_option(scope, option).await?;
                if page.as_ref().and_then(as_id) == Some(post.id) {
                    return Ok(Requirements::one("manage_options"));
                }
            }
        }

        let Some(post_type) = self.registered_type(&post, action) else {
            return Ok(Requirements::one("edit_others_posts"));
        };
        let caps = &post_type.capabilities;

        if !post_type.map_meta_cap {
            return Ok(Requirements::one(match change {
                PostChange::Edit => &caps.edit_post,
                PostChange::Delete => &caps.delete_post,
            }));
        }

        let (own, published, others, private) = match change {
            PostChange::Edit => (
                &caps.edit_posts,
                &caps.edit_published_posts,
                &caps.edit_others_posts,
                &caps.edit_private_posts,
            ),
            PostChange::Delete => (
                &caps.delete_posts,
                &caps.delete_published_posts,
                &caps.delete_others_posts,
                &caps.delete_private_posts,
            ),
        };

        let mut requirements = if post.is_authored_by(actor.principal.id()) {
            let status = if post.status == status::TRASH {
                post.trashed_status.as_deref().unwrap_or(status::DRAFT)
            } else {
                post.status.as_str()
            };
            if is_published(status) {
                Requirements::one(published)
            } else {
                Requirements::one(own)
            }
        } else {
            let mut requirements = Requirements::one(others);
            if is_published(&post.status) {
                requirements.push(published);
            } else if post.status == status::PRIVATE {
                requirements.push(private);
            }
            requirements
        };

        let privacy_page = self
            .tenant_option(actor.scope(), "wp_page_for_privacy_policy")
            .await?;
        if privacy_page.as_ref().and_then(as_id) == Some(post.id) {
            requirements.extend(self.resolve("manage_privacy_options", actor, &[]).await?);
        }

        Ok(requirements)
    }

    /// `read_post`, `read_page`
    pub(super) async fn read_post(
        &self,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let Some(id) = object_id(action, arguments, 0)? else {
            return Ok(Requirements::deny());
        };
        let Some(mut post) = self.post(id).await? else {
            return Ok(Requirements::deny());
        };

        if post.post_type == REVISION {
            match self.parent_of(&post).await? {
                Some(parent) => post = parent,
                None => return Ok(Requirements::deny()),
            }
        }

        let Some(post_type) = self.registered_type(&post, action) else {
            return Ok(Requirements::one("edit_others_posts"));
        };
        let caps = &post_type.capabilities;

        if !post_type.map_meta_cap {
            return Ok(Requirements::one(&caps.read_post));
        }

        let status_name = self.effective_status(&post).await?;
        let Some(status) = self.content.status(&status_name) else {
            tracing::warn!(post = post.id, status = %status_name, "Post has an unregistered status");
            return Ok(Requirements::one("edit_others_posts"));
        };

        if status.public || post.is_authored_by(actor.principal.id()) {
            return Ok(Requirements::one(&caps.read));
        }
        if status.private {
            return Ok(Requirements::one(&caps.read_private_posts));
        }

        let arguments = [Argument::from(post.id)];
        self.resolve("edit_post", actor, &arguments).await
    }

    /// `publish_post`
    pub(super) async fn publish_post(
        &self,
        action: &str,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let Some(id) = object_id(action, arguments, 0)? else {
            return Ok(Requirements::deny());
        };
        let Some(post) = self.post(id).await? else {
            return Ok(Requirements::deny());
        };

        Ok(match self.registered_type(&post, action) {
            Some(post_type) => Requirements::one(&post_type.capabilities.publish_posts),
            None => Requirements::one("edit_others_posts"),
        })
    }

    /// `edit_comment`
    pub(super) async fn edit_comment(
        &self,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let Some(id) = object_id(action, arguments, 0)? else {
            return Ok(Requirements::deny());
        };
        let Some(comment) = self.data.comment(id).await.map_err(Into::into)? else {
            return Ok(Requirements::deny());
        };

        if self.post(comment.post_id).await?.is_some() {
            let arguments = [Argument::from(comment.post_id)];
            self.resolve("edit_post", actor, &arguments).await
        } else {
            self.resolve("edit_posts", actor, &[]).await
        }
    }

    async fn parent_of(&self, post: &PostRecord) -> Result<Option<PostRecord>, QuillCapabilityError> {
        if post.parent == 0 {
            return Ok(None);
        }
        self.post(post.parent).await
    }

    fn registered_type(&self, post: &PostRecord, action: &str) -> Option<&PostType> {
        let post_type = self.content.post_type(&post.post_type);
        if post_type.is_none() {
            tracing::warn!(
                post = post.id,
                post_type = %post.post_type,
                action,
                "Post type is not registered; requiring edit_others_posts"
            );
        }
        post_type
    }

    /// The status that decides readability: attachments inheriting their
    /// status take the parent's, trashed parents their pre-trash status.
    async fn effective_status(&self, post: &PostRecord) -> Result<String, QuillCapabilityError> {
        if post.post_type != ATTACHMENT || post.status != status::INHERIT {
            return Ok(post.status.clone());
        }
        if post.parent == post.id {
            return Ok(status::PUBLISH.to_string());
        }

        Ok(match self.parent_of(post).await? {
            None => status::PUBLISH.to_string(),
            Some(parent) if parent.status == status::TRASH => parent
                .trashed_status
                .unwrap_or_else(|| status::PUBLISH.to_string()),
            Some(parent) => parent.status,
        })
    }
}
