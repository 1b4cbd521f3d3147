use serde::{Deserialize, Serialize};

/// Capability names attached to a post type.
///
/// The first three (`edit_post`, `read_post`, `delete_post`) are meta
/// capabilities naming an action on a single post; the rest are primitive
/// capabilities held by roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTypeCapabilities {
    /// Meta capability for editing one post
    pub edit_post: String,
    /// Meta capability for reading one post
    pub read_post: String,
    /// Meta capability for deleting one post
    pub delete_post: String,
    /// Edit one's own posts
    pub edit_posts: String,
    /// Edit posts authored by others
    pub edit_others_posts: String,
    /// Delete one's own posts
    pub delete_posts: String,
    /// Publish posts
    pub publish_posts: String,
    /// Read private posts
    pub read_private_posts: String,
    /// Read public posts
    pub read: String,
    /// Delete private posts
    pub delete_private_posts: String,
    /// Delete published posts
    pub delete_published_posts: String,
    /// Delete posts authored by others
    pub delete_others_posts: String,
    /// Edit private posts
    pub edit_private_posts: String,
    /// Edit published posts
    pub edit_published_posts: String,
    /// Create new posts
    pub create_posts: String,
}

impl PostTypeCapabilities {
    /// Derive the capability names from a singular/plural capability type,
    /// e.g. `("book", "books")` gives `edit_book`, `edit_others_books`...
    pub fn derive(singular: &str, plural: &str) -> Self {
        Self {
            edit_post: format!("edit_{singular}"),
            read_post: format!("read_{singular}"),
            delete_post: format!("delete_{singular}"),
            edit_posts: format!("edit_{plural}"),
            edit_others_posts: format!("edit_others_{plural}"),
            delete_posts: format!("delete_{plural}"),
            publish_posts: format!("publish_{plural}"),
            read_private_posts: format!("read_private_{plural}"),
            read: "read".to_string(),
            delete_private_posts: format!("delete_private_{plural}"),
            delete_published_posts: format!("delete_published_{plural}"),
            delete_others_posts: format!("delete_others_{plural}"),
            edit_private_posts: format!("edit_private_{plural}"),
            edit_published_posts: format!("edit_published_{plural}"),
            create_posts: format!("edit_{plural}"),
        }
    }
}

/// A registered content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostType {
    /// Type name, e.g. `post` or `page`
    pub name: String,
    /// Singular and plural base used to derive capability names
    pub capability_type: (String, String),
    /// Whether single-post meta capabilities are mapped through ownership
    /// and status rules. When false, they resolve to the type's own
    /// singular capability name as-is.
    pub map_meta_cap: bool,
    /// The derived (possibly overridden) capability names
    pub capabilities: PostTypeCapabilities,
}

impl PostType {
    /// A post type whose capability type is `singular` with an `s` appended
    /// for the plural
    pub fn new(name: impl Into<String>, singular: &str) -> Self {
        Self::with_capability_type(name, singular, &format!("{singular}s"))
    }

    /// A post type with an explicit singular/plural capability type
    pub fn with_capability_type(name: impl Into<String>, singular: &str, plural: &str) -> Self {
        Self {
            name: name.into(),
            capability_type: (singular.to_string(), plural.to_string()),
            map_meta_cap: true,
            capabilities: PostTypeCapabilities::derive(singular, plural),
        }
    }

    /// Toggle meta capability mapping
    pub fn map_meta_cap(mut self, map_meta_cap: bool) -> Self {
        self.map_meta_cap = map_meta_cap;
        self
    }

    /// Override individual capability names
    pub fn with_capabilities(mut self, edit: impl FnOnce(&mut PostTypeCapabilities)) -> Self {
        edit(&mut self.capabilities);
        self
    }

    /// The built-in post types
    pub fn builtins() -> Vec<PostType> {
        vec![
            PostType::new("post", "post"),
            PostType::new("page", "page"),
            PostType::new("attachment", "post").with_capabilities(|caps| {
                caps.create_posts = "upload_files".to_string();
            }),
            PostType::new("revision", "post"),
            PostType::new("wp_block", "block").with_capabilities(|caps| {
                let post = PostTypeCapabilities::derive("post", "posts");
                *caps = PostTypeCapabilities {
                    edit_post: caps.edit_post.clone(),
                    read_post: caps.read_post.clone(),
                    delete_post: caps.delete_post.clone(),
                    read: post.edit_posts.clone(),
                    create_posts: post.publish_posts.clone(),
                    ..post
                };
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_derives_capabilities_from_the_capability_type() {
        let book = PostType::new("book", "book");

        assert_eq!(book.capabilities.edit_post, "edit_book");
        assert_eq!(book.capabilities.edit_others_posts, "edit_others_books");
        assert_eq!(book.capabilities.read, "read");
        assert_eq!(book.capabilities.create_posts, "edit_books");
    }

    #[test]
    fn it_supports_irregular_plurals() {
        let story = PostType::with_capability_type("story", "story", "stories");

        assert_eq!(story.capabilities.publish_posts, "publish_stories");
        assert_eq!(story.capabilities.delete_post, "delete_story");
    }

    #[test]
    fn it_lets_attachments_be_created_by_uploaders() {
        let attachment = PostType::builtins()
            .into_iter()
            .find(|post_type| post_type.name == "attachment")
            .unwrap();

        assert_eq!(attachment.capabilities.create_posts, "upload_files");
        assert_eq!(attachment.capabilities.edit_posts, "edit_posts");
    }

    #[test]
    fn it_guards_reusable_blocks_with_post_capabilities() {
        let block = PostType::builtins()
            .into_iter()
            .find(|post_type| post_type.name == "wp_block")
            .unwrap();

        assert_eq!(block.capabilities.edit_post, "edit_block");
        assert_eq!(block.capabilities.edit_others_posts, "edit_others_posts");
        assert_eq!(block.capabilities.delete_published_posts, "delete_published_posts");
        assert_eq!(block.capabilities.read, "edit_posts");
        assert_eq!(block.capabilities.create_posts, "publish_posts");
    }
}
