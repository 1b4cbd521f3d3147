//! Fixtures shared by unit and integration tests.

use serde_json::json;

use crate::{
    AuthorizationChecker, ConfigScope, MemoryDataAccess, PostRecord, Principal, PrincipalId,
    QuillCapabilityError, Settings, TenantId, TenantScope,
};

/// Holds the `administrator` role
pub const ADMINISTRATOR: PrincipalId = PrincipalId(1);
/// Holds the `editor` role (and `subscriber` on the second tenant of a
/// network)
pub const EDITOR: PrincipalId = PrincipalId(2);
/// Holds the `author` role
pub const AUTHOR: PrincipalId = PrincipalId(3);
/// Holds the `contributor` role
pub const CONTRIBUTOR: PrincipalId = PrincipalId(4);
/// Holds the `subscriber` role
pub const SUBSCRIBER: PrincipalId = PrincipalId(5);
/// A network super-admin without any per-tenant role
pub const SUPER_ADMIN: PrincipalId = PrincipalId(9);

/// The second tenant of a network
pub const SECOND_TENANT: TenantId = TenantId(2);

/// Published post by [AUTHOR]
pub const PUBLISHED_POST: u64 = 1;
/// Draft by [AUTHOR]
pub const DRAFT_POST: u64 = 2;
/// Private post by [AUTHOR]
pub const PRIVATE_POST: u64 = 3;
/// Pending post by [CONTRIBUTOR]
pub const PENDING_POST: u64 = 4;
/// Published page by [EDITOR]
pub const FRONT_PAGE: u64 = 5;
/// Trashed post by [AUTHOR], published before it was trashed
pub const TRASHED_POST: u64 = 6;
/// Revision of [DRAFT_POST]
pub const REVISION_POST: u64 = 7;
/// Attachment of [PUBLISHED_POST] inheriting its status
pub const ATTACHMENT_POST: u64 = 8;

/// Comment on [PUBLISHED_POST]
pub const COMMENT: u64 = 1;
/// Comment whose post no longer exists
pub const ORPHAN_COMMENT: u64 = 2;

/// The default category
pub const DEFAULT_CATEGORY: u64 = 1;
/// Another category
pub const CATEGORY: u64 = 2;
/// A tag
pub const TAG: u64 = 3;

/// A populated in-memory installation together with a checker over it.
///
/// The checker and [Fixture::data] share their records, so tests may change
/// object state between checks.
pub struct Fixture {
    /// Handle on the records the checker reads
    pub data: MemoryDataAccess,
    /// Checker over [Fixture::data]
    pub checker: AuthorizationChecker<MemoryDataAccess>,
}

impl Fixture {
    /// A single site with one user per built-in role and a little content
    pub async fn single_tenant() -> Self {
        Self::populate(Settings::default()).await
    }

    /// A network of two sites with a super-admin on top of the single site
    /// fixture
    pub async fn multi_tenant() -> Self {
        let fixture = Self::populate(Settings::multi_tenant()).await;
        let data = &fixture.data;

        data.insert_tenant(SECOND_TENANT).await;
        data.insert_super_admin(SUPER_ADMIN).await;
        data.insert_user(EDITOR, TenantScope::new(SECOND_TENANT), ["subscriber"])
            .await;

        fixture
    }

    /// Load one of the fixture's principals in the main tenant
    pub async fn principal(&self, id: PrincipalId) -> Result<Principal, QuillCapabilityError> {
        self.checker.principal(id, TenantScope::default()).await
    }

    async fn populate(settings: Settings) -> Self {
        let data = MemoryDataAccess::default();
        let main = TenantScope::new(TenantId::MAIN);

        for (id, role) in [
            (ADMINISTRATOR, "administrator"),
            (EDITOR, "editor"),
            (AUTHOR, "author"),
            (CONTRIBUTOR, "contributor"),
            (SUBSCRIBER, "subscriber"),
        ] {
            data.insert_user(id, main, [role]).await;
        }

        for post in [
            PostRecord::new(PUBLISHED_POST, AUTHOR, "post", "publish"),
            PostRecord::new(DRAFT_POST, AUTHOR, "post", "draft"),
            PostRecord::new(PRIVATE_POST, AUTHOR, "post", "private"),
            PostRecord::new(PENDING_POST, CONTRIBUTOR, "post", "pending"),
            PostRecord::new(FRONT_PAGE, EDITOR, "page", "publish"),
            PostRecord::new(TRASHED_POST, AUTHOR, "post", "trash").with_trashed_status("publish"),
            PostRecord::new(REVISION_POST, AUTHOR, "revision", "inherit").with_parent(DRAFT_POST),
            PostRecord::new(ATTACHMENT_POST, AUTHOR, "attachment", "inherit")
                .with_parent(PUBLISHED_POST),
        ] {
            data.insert_post(post).await;
        }

        data.insert_comment(COMMENT, PUBLISHED_POST).await;
        data.insert_comment(ORPHAN_COMMENT, 404).await;

        data.insert_term(DEFAULT_CATEGORY, "category").await;
        data.insert_term(CATEGORY, "category").await;
        data.insert_term(TAG, "post_tag").await;
        data.set_config(
            ConfigScope::Tenant(TenantId::MAIN),
            "default_category",
            json!(DEFAULT_CATEGORY),
        )
        .await;

        let checker = AuthorizationChecker::new(data.clone(), settings);
        Self { data, checker }
    }
}
