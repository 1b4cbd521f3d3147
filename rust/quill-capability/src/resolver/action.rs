use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ObjectKind;

/// The three ways meta data can be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaOperation {
    /// `add_*_meta`
    Add,
    /// `edit_*_meta`
    Edit,
    /// `delete_*_meta`
    Delete,
}

/// Operations guarded by a taxonomy's capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermOperation {
    /// `manage_terms`
    Manage,
    /// `edit_term` / `edit_terms`
    Edit,
    /// `delete_term` / `delete_terms`
    Delete,
    /// `assign_term` / `assign_terms`
    Assign,
}

impl TermOperation {
    /// Name of the matching taxonomy capability slot, e.g. `edit_terms`
    pub fn capability_slot(&self) -> &'static str {
        match self {
            TermOperation::Manage => "manage_terms",
            TermOperation::Edit => "edit_terms",
            TermOperation::Delete => "delete_terms",
            TermOperation::Assign => "assign_terms",
        }
    }
}

/// Whether a post rule edits or deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostChange {
    /// `edit_post` / `edit_page`
    Edit,
    /// `delete_post` / `delete_page`
    Delete,
}

/// Every recognised meta capability, grouped by the rule that resolves it.
///
/// Several action names share one variant; rules that behave differently
/// per name receive the name alongside the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaAction {
    /// `edit_post`, `edit_page`, `delete_post`, `delete_page`
    ChangePost(PostChange),
    /// `read_post`, `read_page`
    ReadPost,
    /// `publish_post`
    PublishPost,
    /// `{add,edit,delete}_{post,comment,term,user}_meta`
    ObjectMeta(MetaOperation, ObjectKind),
    /// `edit_comment`
    EditComment,
    /// `edit_term`, `delete_term`, `assign_term`
    Term(TermOperation),
    /// `manage_terms`, `edit_terms`, `delete_terms`, `assign_terms`
    Taxonomy(TermOperation),
    /// Actions that always map to one fixed capability
    Fixed(&'static str),
    /// `edit_user`, `edit_users`
    EditUser,
    /// `delete_user`, `delete_users`
    DeleteUser,
    /// `remove_user`
    RemoveUser,
    /// `promote_user`, `add_users`
    PromoteUser,
    /// `create_users`
    CreateUsers,
    /// Application password management
    AppPassword,
    /// Network administration and `manage_options`
    Network,
    /// `setup_network`
    SetupNetwork,
    /// `delete_site`
    DeleteSite,
    /// Privacy tooling
    Privacy,
    /// `unfiltered_html`, `edit_css`
    UnfilteredHtml,
    /// `edit_files`, `edit_plugins`, `edit_themes`
    EditFiles,
    /// Installing, updating and deleting plugins, themes and core
    FileMods,
    /// `install_languages`, `update_languages`
    Languages,
    /// `update_php`, `update_https`
    UpdateEnvironment,
    /// `unfiltered_upload`
    UnfilteredUpload,
    /// `activate_plugins` and friends
    ActivatePlugins,
    /// `manage_links`
    ManageLinks,
}

const META_KINDS: [ObjectKind; 4] = [
    ObjectKind::Post,
    ObjectKind::Comment,
    ObjectKind::Term,
    ObjectKind::User,
];

static ACTIONS: LazyLock<HashMap<String, MetaAction>> = LazyLock::new(|| {
    use MetaAction::*;

    let mut table: Vec<(String, MetaAction)> = [
        ("edit_post", ChangePost(PostChange::Edit)),
        ("edit_page", ChangePost(PostChange::Edit)),
        ("delete_post", ChangePost(PostChange::Delete)),
        ("delete_page", ChangePost(PostChange::Delete)),
        ("read_post", ReadPost),
        ("read_page", ReadPost),
        ("publish_post", PublishPost),
        ("edit_comment", EditComment),
        ("edit_term", Term(TermOperation::Edit)),
        ("delete_term", Term(TermOperation::Delete)),
        ("assign_term", Term(TermOperation::Assign)),
        ("manage_terms", Taxonomy(TermOperation::Manage)),
        ("edit_terms", Taxonomy(TermOperation::Edit)),
        ("delete_terms", Taxonomy(TermOperation::Delete)),
        ("assign_terms", Taxonomy(TermOperation::Assign)),
        ("manage_post_tags", Fixed("manage_categories")),
        ("edit_categories", Fixed("manage_categories")),
        ("edit_post_tags", Fixed("manage_categories")),
        ("delete_categories", Fixed("manage_categories")),
        ("delete_post_tags", Fixed("manage_categories")),
        ("assign_categories", Fixed("edit_posts")),
        ("assign_post_tags", Fixed("edit_posts")),
        ("customize", Fixed("edit_theme_options")),
        ("resume_plugin", Fixed("resume_plugins")),
        ("resume_theme", Fixed("resume_themes")),
        ("view_site_health_checks", Fixed("install_plugins")),
        ("edit_user", EditUser),
        ("edit_users", EditUser),
        ("delete_user", DeleteUser),
        ("delete_users", DeleteUser),
        ("remove_user", RemoveUser),
        ("promote_user", PromoteUser),
        ("add_users", PromoteUser),
        ("create_users", CreateUsers),
        ("create_app_password", AppPassword),
        ("list_app_passwords", AppPassword),
        ("read_app_password", AppPassword),
        ("edit_app_password", AppPassword),
        ("delete_app_passwords", AppPassword),
        ("delete_app_password", AppPassword),
        ("manage_network", Network),
        ("manage_sites", Network),
        ("manage_network_users", Network),
        ("manage_network_plugins", Network),
        ("manage_network_themes", Network),
        ("manage_network_options", Network),
        ("upgrade_network", Network),
        ("create_sites", Network),
        ("delete_sites", Network),
        ("manage_options", Network),
        ("setup_network", SetupNetwork),
        ("delete_site", DeleteSite),
        ("manage_privacy_options", Privacy),
        ("export_others_personal_data", Privacy),
        ("erase_others_personal_data", Privacy),
        ("unfiltered_html", UnfilteredHtml),
        ("edit_css", UnfilteredHtml),
        ("edit_files", EditFiles),
        ("edit_plugins", EditFiles),
        ("edit_themes", EditFiles),
        ("update_plugins", FileMods),
        ("delete_plugins", FileMods),
        ("install_plugins", FileMods),
        ("upload_plugins", FileMods),
        ("update_themes", FileMods),
        ("delete_themes", FileMods),
        ("install_themes", FileMods),
        ("upload_themes", FileMods),
        ("update_core", FileMods),
        ("install_languages", Languages),
        ("update_languages", Languages),
        ("update_php", UpdateEnvironment),
        ("update_https", UpdateEnvironment),
        ("unfiltered_upload", UnfilteredUpload),
        ("activate_plugins", ActivatePlugins),
        ("deactivate_plugins", ActivatePlugins),
        ("activate_plugin", ActivatePlugins),
        ("deactivate_plugin", ActivatePlugins),
        ("manage_links", ManageLinks),
    ]
    .into_iter()
    .map(|(name, action)| (name.to_string(), action))
    .collect();

    for (operation, verb) in [
        (MetaOperation::Add, "add"),
        (MetaOperation::Edit, "edit"),
        (MetaOperation::Delete, "delete"),
    ] {
        for kind in META_KINDS {
            table.push((format!("{verb}_{kind}_meta"), ObjectMeta(operation, kind)));
        }
    }

    table.into_iter().collect()
});

impl MetaAction {
    /// The rule responsible for `name`, if `name` is a recognised meta
    /// capability
    pub fn from_name(name: &str) -> Option<MetaAction> {
        ACTIONS.get(name).copied()
    }

    /// Every recognised action name, sorted
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = ACTIONS.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_recognises_the_action_vocabulary() {
        assert_eq!(
            MetaAction::from_name("edit_post"),
            Some(MetaAction::ChangePost(PostChange::Edit))
        );
        assert_eq!(
            MetaAction::from_name("delete_term_meta"),
            Some(MetaAction::ObjectMeta(MetaOperation::Delete, ObjectKind::Term))
        );
        assert_eq!(
            MetaAction::from_name("assign_post_tags"),
            Some(MetaAction::Fixed("edit_posts"))
        );
        assert_eq!(MetaAction::from_name("Edit_Post"), None);
        assert_eq!(MetaAction::from_name("edit_posts"), None);
        assert_eq!(MetaAction::from_name("custom_cap"), None);
    }

    #[test]
    fn it_covers_every_meta_combination() {
        let names = MetaAction::names();

        for verb in ["add", "edit", "delete"] {
            for kind in ["post", "comment", "term", "user"] {
                assert!(names.contains(&format!("{verb}_{kind}_meta").as_str()));
            }
        }
        assert!(names.len() > 80);
    }
}
