use pretty_assertions::assert_eq;
use quill_capability::{
    ADMINISTRATOR, AUTHOR, Argument, AuthorizationChecker, CONTRIBUTOR, CapabilityFilter,
    CapabilityRequest, DEFAULT_PRIORITY, DRAFT_POST, EDITOR, PENDING_POST, FilterContext, FilterPipeline,
    Fixture, PRIVATE_POST, PUBLISHED_POST, PostRecord, PrincipalId, QuillCapabilityError,
    RoleDefinition, Requirements, SUBSCRIBER, Settings, TenantScope,
};
use testresult::TestResult;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_test::wasm_bindgen_test;

#[cfg(target_arch = "wasm32")]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_dedicated_worker);

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_follows_post_ownership() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let checker = &fixture.checker;
    let author = fixture.principal(AUTHOR).await?;
    let editor = fixture.principal(EDITOR).await?;

    assert_eq!(
        checker.check("edit_post", &author, &[DRAFT_POST.into()]).await?,
        ["edit_posts"]
    );
    assert_eq!(
        checker.check("edit_post", &editor, &[PUBLISHED_POST.into()]).await?,
        ["edit_others_posts", "edit_published_posts"]
    );
    assert_eq!(
        checker.check("edit_post", &editor, &[PRIVATE_POST.into()]).await?,
        ["edit_others_posts", "edit_private_posts"]
    );

    assert!(checker.can("edit_post", &author, &[DRAFT_POST.into()]).await?);
    assert!(checker.can("edit_post", &editor, &[PRIVATE_POST.into()]).await?);

    let contributor = fixture.principal(CONTRIBUTOR).await?;
    assert!(!checker.can("edit_post", &contributor, &[DRAFT_POST.into()]).await?);

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_reads_object_state_fresh_on_every_check() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let contributor = fixture.principal(CONTRIBUTOR).await?;
    let post = PostRecord::new(20, CONTRIBUTOR, "post", "draft");
    fixture.data.insert_post(post.clone()).await;

    assert!(fixture.checker.can("edit_post", &contributor, &[20.into()]).await?);

    fixture
        .data
        .insert_post(PostRecord {
            status: "publish".into(),
            ..post
        })
        .await;
    assert!(!fixture.checker.can("edit_post", &contributor, &[20.into()]).await?);

    fixture.data.remove_post(20).await;
    assert_eq!(
        fixture.checker.check("edit_post", &contributor, &[20.into()]).await?,
        Requirements::deny()
    );

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_denies_nonexistent_and_negative_object_ids() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let administrator = fixture.principal(ADMINISTRATOR).await?;

    for action in ["edit_post", "delete_post", "read_post", "publish_post", "edit_comment", "edit_term"] {
        for id in [-7i64, 0, 9_999] {
            let required = fixture
                .checker
                .check(action, &administrator, &[Argument::from(id)])
                .await?;
            assert!(required.is_denied(), "{action} {id} resolved to {required}");
            assert!(!fixture.checker.can(action, &administrator, &[Argument::from(id)]).await?);
        }
    }

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_reports_missing_arguments_as_errors() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let editor = fixture.principal(EDITOR).await?;

    let error = fixture.checker.can("edit_post", &editor, &[]).await.unwrap_err();

    assert_eq!(
        error,
        QuillCapabilityError::MissingArgument {
            action: "edit_post".into(),
            position: 0,
        }
    );

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_keeps_subscribers_out_of_site_administration() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let subscriber = fixture.principal(SUBSCRIBER).await?;
    let administrator = fixture.principal(ADMINISTRATOR).await?;

    assert_eq!(
        fixture.checker.check("activate_plugins", &subscriber, &[]).await?,
        ["activate_plugins"]
    );
    assert!(!fixture.checker.can("activate_plugins", &subscriber, &[]).await?);
    assert!(fixture.checker.can("activate_plugins", &administrator, &[]).await?);
    assert!(fixture.checker.can("read", &subscriber, &[]).await?);

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_toggles_unfiltered_html_with_the_settings() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let locked = AuthorizationChecker::new(
        fixture.data.clone(),
        Settings::from_json(r#"{ "disallow_unfiltered_html": true }"#)?,
    );
    let administrator = fixture.principal(ADMINISTRATOR).await?;

    assert_eq!(
        fixture.checker.check("unfiltered_html", &administrator, &[]).await?,
        ["unfiltered_html"]
    );
    assert_eq!(
        locked.check("unfiltered_html", &administrator, &[]).await?,
        ["do_not_allow"]
    );

    let subscriber = fixture.principal(SUBSCRIBER).await?;
    assert_eq!(
        fixture.checker.check("unfiltered_html", &subscriber, &[]).await?,
        ["unfiltered_html"]
    );
    assert!(!fixture.checker.can("unfiltered_html", &subscriber, &[]).await?);
    assert!(!locked.can("unfiltered_html", &subscriber, &[]).await?);

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_applies_persisted_roles_and_user_overrides() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let scope = TenantScope::default();
    fixture
        .data
        .insert_role_definition(scope, RoleDefinition::granting("shop_manager", ["manage_shop", "read"]))
        .await;
    fixture
        .data
        .insert_user(PrincipalId(30), scope, ["shop_manager", "contributor"])
        .await;
    fixture
        .data
        .insert_override(PrincipalId(30), "edit_posts", false)
        .await;

    let manager = fixture.principal(PrincipalId(30)).await?;

    assert!(fixture.checker.can("manage_shop", &manager, &[]).await?);
    assert!(!fixture.checker.can("edit_posts", &manager, &[]).await?);
    assert!(!fixture.checker.can("edit_post", &manager, &[DRAFT_POST.into()]).await?);

    let registry = fixture.checker.roles(scope).await?;
    let counts = registry.count_by_role(&fixture.data, scope).await?;
    assert_eq!(counts.by_role.get("shop_manager"), Some(&1));
    assert_eq!(counts.by_role.get("contributor"), Some(&2));
    assert_eq!(counts.total, 6);

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_treats_unknown_principals_as_anonymous() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let stranger = fixture.principal(PrincipalId(777)).await?;

    assert!(stranger.is_anonymous());
    assert!(!fixture.checker.can("read", &stranger, &[]).await?);
    assert!(!fixture.checker.can("exist", &stranger, &[]).await?);

    Ok(())
}

struct AuditLog;

#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
impl CapabilityFilter for AuditLog {
    async fn filter(
        &self,
        mut requirements: Requirements,
        context: &FilterContext<'_>,
    ) -> Result<Requirements, QuillCapabilityError> {
        if context.action == "export" {
            requirements.push("export_audit_log");
        }
        Ok(requirements)
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_lets_filters_extend_namespaced_actions() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let mut filters = FilterPipeline::new();
    filters
        .register(DEFAULT_PRIORITY, AuditLog)
        .register_fn(1, |requirements, context| {
            if context.action == "acme_publish_feed" {
                Requirements::one("publish_posts")
            } else {
                requirements
            }
        });
    let checker = AuthorizationChecker::new(fixture.data.clone(), Settings::default()).with_filters(filters);
    let author = fixture.principal(AUTHOR).await?;
    let administrator = fixture.principal(ADMINISTRATOR).await?;

    assert_eq!(
        checker.check("acme_publish_feed", &author, &[]).await?,
        ["publish_posts"]
    );
    assert!(checker.can("acme_publish_feed", &author, &[]).await?);
    assert_eq!(
        checker.check("export", &administrator, &[]).await?,
        ["export", "export_audit_log"]
    );
    assert!(!checker.can("export", &administrator, &[]).await?);

    Ok(())
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen_test)]
#[cfg_attr(not(target_arch = "wasm32"), test_log::test(tokio::test))]
async fn it_answers_bulk_requests_in_order() -> TestResult {
    let fixture = Fixture::single_tenant().await;
    let author = fixture.principal(AUTHOR).await?;

    let decisions = fixture
        .checker
        .bulk_can(
            &author,
            [
                CapabilityRequest::from(("edit_post", [PUBLISHED_POST])),
                CapabilityRequest::from(("edit_post", [PENDING_POST])),
                CapabilityRequest::from(("manage_options", Vec::<u64>::new())),
            ],
        )
        .await?;

    assert_eq!(
        decisions.iter().map(|decision| decision.allowed).collect::<Vec<_>>(),
        vec![true, false, false]
    );
    assert_eq!(decisions[1].request.arguments, vec![Argument::from(PENDING_POST)]);

    Ok(())
}
