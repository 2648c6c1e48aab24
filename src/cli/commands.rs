use std::path::Path;

use dialoguer::{Confirm, Input, Password};
use tracing::info;

use crate::api::{Credentials, NewAccount, PasswordChange};
use crate::app::{AppContext, InkpostError, Result};
use crate::authz::{
    can_edit_or_delete_owned, can_toggle_publish, is_admin, is_admin_or_author, GuardState,
    PostControls, Route,
};
use crate::domain::{
    Comment, PageQuery, Post, PostDraft, PostFlag, ProfileUpdate, ReactionState, ReactionType,
    Role, TermKind, User,
};
use crate::reaction::{ReactionEngine, LOGIN_PROMPT};

// Session

pub async fn login(
    ctx: &mut AppContext,
    username: Option<String>,
    next: Option<String>,
) -> Result<()> {
    if let GuardState::Forbidden(_) = ctx.guard(Route::Login) {
        if let Some(user) = ctx.user() {
            println!("Already signed in as {}", user.username);
        }
        print_return_target(ctx, next.as_deref());
        return Ok(());
    }

    let username = match username {
        Some(name) => name,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let user = ctx.login(&Credentials { username, password }).await?;
    println!("Signed in as {} ({})", user.username, user.role);
    print_return_target(ctx, next.as_deref());
    Ok(())
}

fn print_return_target(ctx: &AppContext, next: Option<&str>) {
    if let Some(location) = next {
        println!("Continuing at {}", ctx.return_target(location));
    }
}

/// What to tell the viewer when a guard turned them away.
///
/// `None` for errors that are real failures rather than redirects.
pub fn redirect_notice(err: &InkpostError) -> Option<String> {
    match err {
        InkpostError::NotAuthenticated => {
            Some("Not signed in. Run `inkpost login` first.".to_string())
        }
        InkpostError::LoginRequired(redirect) => {
            let location = redirect.location();
            Some(format!(
                "Not signed in. Redirecting to {}\nRun `inkpost login --next '{}'` to come back here.",
                location, location
            ))
        }
        InkpostError::RouteForbidden { path, redirect } => Some(format!(
            "{} is not available to your role. Redirecting to {}",
            path,
            redirect.location()
        )),
        InkpostError::Forbidden(reason) => Some(format!("Permission denied: {}", reason)),
        _ => None,
    }
}

pub async fn register(
    ctx: &mut AppContext,
    username: String,
    email: String,
    role: &str,
) -> Result<()> {
    if let GuardState::Forbidden(_) = ctx.guard(Route::Register) {
        println!("Sign out before registering a new account");
        return Ok(());
    }

    let role = registrable_role(role)?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let user = ctx
        .register(&NewAccount {
            username,
            email,
            password,
            role,
        })
        .await?;
    println!("Account created. Signed in as {} ({})", user.username, user.role);
    Ok(())
}

/// Only reader and author accounts can be requested at sign-up.
fn registrable_role(role: &str) -> Result<Role> {
    match Role::parse(role) {
        role @ (Role::User | Role::Author) => Ok(role),
        _ => Err(InkpostError::Other(format!(
            "Cannot register with role '{}', use USER or AUTHOR",
            role
        ))),
    }
}

pub fn logout(ctx: &mut AppContext) -> Result<()> {
    if ctx.logout()? {
        println!("Signed out");
    } else {
        println!("Not signed in");
    }
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.user() {
        Some(user) => {
            println!("{} ({})", user.username, user.role);
            if let Some(email) = &user.email {
                println!("  {}", email);
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

// Public content

pub async fn list_posts(
    ctx: &AppContext,
    page: u32,
    search: Option<String>,
    category: Option<i64>,
) -> Result<()> {
    let query = PageQuery {
        search,
        category: category.filter(|id| *id != 0),
        ..PageQuery::page(page)
    };
    let result = ctx.api.list_posts(&query).await?;

    if result.results.is_empty() {
        println!("No posts found");
        return Ok(());
    }

    for post in &result.results {
        print_post_line(post);
    }
    print_page_footer(query.page, result.count, result.has_next());
    Ok(())
}

pub async fn list_featured(ctx: &AppContext, page: u32) -> Result<()> {
    let query = PageQuery::page(page);
    let result = ctx.api.featured_posts(&query).await?;

    if result.results.is_empty() {
        println!("No featured posts");
        return Ok(());
    }

    for post in &result.results {
        print_post_line(post);
    }
    print_page_footer(query.page, result.count, result.has_next());
    Ok(())
}

pub async fn show_post(ctx: &AppContext, slug: &str) -> Result<()> {
    let post = ctx.api.get_post(slug).await?;
    let comments = if post.comments.is_empty() {
        ctx.api.list_comments(post.id).await?
    } else {
        post.comments.clone()
    };

    println!("{}", post.title);
    println!("by {}{}", post.author_name(), post_date(&post));
    if let Some(category) = &post.category {
        println!("in {}", category.name);
    }
    if !post.tags.is_empty() {
        let tags: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
        println!("tags: {}", tags.join(", "));
    }
    println!();
    println!("{}", post.display_content());
    println!();
    println!("{}", reaction_summary(&post.reaction_state()));

    if !comments.is_empty() {
        println!();
        println!("Comments ({}):", comments.len());
        for comment in &comments {
            print_comment(ctx.user(), comment, 1);
        }
    }
    Ok(())
}

pub async fn react(ctx: &AppContext, slug: &str, reaction: ReactionType) -> Result<()> {
    if ctx.user().is_none() {
        println!("{}", LOGIN_PROMPT);
        return Ok(());
    }

    let post = ctx.api.get_post(slug).await?;
    let mut engine = ReactionEngine::new(post.id, post.reaction_state());
    let state = engine
        .react(ctx.user(), reaction, ctx.api.as_ref())
        .await?;

    match state.user_reaction {
        Some(current) => println!("Reacted {} to \"{}\"", current.emoji(), post.title),
        None => println!("Removed your reaction from \"{}\"", post.title),
    }
    println!("{}", reaction_summary(&state));
    Ok(())
}

pub async fn comment(ctx: &AppContext, slug: &str, text: &str) -> Result<()> {
    if ctx.user().is_none() {
        return Err(InkpostError::NotAuthenticated);
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(InkpostError::Other("Comment must not be empty".into()));
    }

    let post = ctx.api.get_post(slug).await?;
    ctx.api.create_comment(post.id, text).await?;
    println!("Comment added to \"{}\"", post.title);
    Ok(())
}

// Dashboard: posts

pub async fn list_blogs(ctx: &AppContext, page: u32, search: Option<String>) -> Result<()> {
    let user = ctx.require(Route::Blogs)?;
    let query = PageQuery {
        search,
        ..PageQuery::page(page)
    };
    let result = ctx.api.list_blogs(&query).await?;

    if result.results.is_empty() {
        println!("No posts");
        return Ok(());
    }

    println!("{:>5}  {:<9}  {:<5}  {}", "ID", "STATUS", "CTRL", "TITLE");
    for post in &result.results {
        let controls = PostControls::for_user(Some(user), post);
        println!(
            "{:>5}  {:<9}  {:<5}  {}{}",
            post.id,
            post.status_label(),
            controls_label(&controls),
            post.title,
            if post.is_featured { " *" } else { "" }
        );
    }
    print_page_footer(query.page, result.count, result.has_next());
    Ok(())
}

/// Body text from `--file` or `--content`; the file wins.
fn read_content(file: Option<&Path>, content: Option<String>) -> Result<Option<String>> {
    match file {
        Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
        None => Ok(content),
    }
}

pub async fn create_blog(
    ctx: &AppContext,
    title: String,
    file: Option<&Path>,
    content: Option<String>,
    category: Option<i64>,
    tags: Vec<i64>,
) -> Result<()> {
    let user = ctx.require(Route::Blogs)?;
    if !is_admin_or_author(Some(user)) {
        return Err(InkpostError::Forbidden(
            "only admins and authors can write posts".into(),
        ));
    }

    let draft = PostDraft {
        title: Some(title),
        content: Some(read_content(file, content)?.unwrap_or_default()),
        category_id: category,
        tag_ids: (!tags.is_empty()).then_some(tags),
    };
    let post = ctx.api.create_blog(&draft).await?;
    println!("Created post {} \"{}\" (draft)", post.id, post.title);
    Ok(())
}

pub async fn edit_blog(
    ctx: &AppContext,
    id: i64,
    title: Option<String>,
    file: Option<&Path>,
    content: Option<String>,
    category: Option<i64>,
    tags: Vec<i64>,
) -> Result<()> {
    let user = ctx.require(Route::Blogs)?;
    let post = ctx.api.get_blog(id).await?;
    let controls = PostControls::for_user(Some(user), &post);
    if !controls.edit {
        return Err(denied("edit", &post));
    }

    let draft = PostDraft {
        title,
        content: read_content(file, content)?,
        category_id: category,
        tag_ids: (!tags.is_empty()).then_some(tags),
    };
    if draft.title.is_none()
        && draft.content.is_none()
        && draft.category_id.is_none()
        && draft.tag_ids.is_none()
    {
        println!("Nothing to change");
        return Ok(());
    }

    ctx.api.update_blog(id, &draft).await?;
    println!("Updated post {}", id);
    Ok(())
}

pub async fn delete_blog(ctx: &AppContext, id: i64, yes: bool) -> Result<()> {
    let user = ctx.require(Route::Blogs)?;
    let post = ctx.api.get_blog(id).await?;
    if !PostControls::for_user(Some(user), &post).delete {
        return Err(denied("delete", &post));
    }

    if !yes && !confirm(&format!("Delete \"{}\"?", post.title))? {
        return Ok(());
    }

    ctx.api.delete_blog(id).await?;
    info!("Deleted post {}", id);
    println!("Deleted post {}", id);
    Ok(())
}

/// Flip one of the boolean flags of a post after checking the viewer may.
pub async fn set_blog_flag(ctx: &AppContext, id: i64, flag: PostFlag) -> Result<()> {
    let user = ctx.require(Route::Blogs)?;
    let post = ctx.api.get_blog(id).await?;

    let controls = PostControls::for_user(Some(user), &post);
    let allowed = match flag {
        PostFlag::IsPublished(_) => can_toggle_publish(Some(user), &post),
        PostFlag::IsFeatured(_) => controls.toggle_featured,
        PostFlag::IsActive(_) => controls.toggle_active,
    };
    let (verb, done) = flag_verbs(flag);
    if !allowed {
        return Err(denied(verb, &post));
    }

    ctx.api.set_post_flag(id, flag).await?;
    println!("Post {} {}", id, done);
    Ok(())
}

/// Verb and participle describing a flag change.
fn flag_verbs(flag: PostFlag) -> (&'static str, &'static str) {
    match flag {
        PostFlag::IsPublished(true) => ("publish", "published"),
        PostFlag::IsPublished(false) => ("unpublish", "unpublished"),
        PostFlag::IsFeatured(true) => ("feature", "featured"),
        PostFlag::IsFeatured(false) => ("unfeature", "unfeatured"),
        PostFlag::IsActive(true) => ("activate", "activated"),
        PostFlag::IsActive(false) => ("deactivate", "deactivated"),
    }
}

fn denied(verb: &str, post: &Post) -> InkpostError {
    InkpostError::Forbidden(format!("you cannot {} \"{}\"", verb, post.title))
}

fn controls_label(controls: &PostControls) -> String {
    [
        (controls.edit, 'e'),
        (controls.delete, 'd'),
        (controls.toggle_publish, 'p'),
        (controls.toggle_featured, 'f'),
        (controls.toggle_active, 'a'),
    ]
    .iter()
    .map(|(enabled, c)| if *enabled { *c } else { '-' })
    .collect()
}

// Dashboard: categories and tags

fn term_route(kind: TermKind) -> Route {
    match kind {
        TermKind::Category => Route::Categories,
        TermKind::Tag => Route::Tags,
    }
}

pub async fn list_terms(ctx: &AppContext, kind: TermKind, page: u32) -> Result<()> {
    ctx.require(term_route(kind))?;
    let result = ctx.api.list_terms(kind, &PageQuery::page(page)).await?;

    if result.results.is_empty() {
        println!("No {} entries", kind.label());
        return Ok(());
    }
    for term in &result.results {
        println!(
            "{:>5}  {}{}",
            term.id,
            term.name,
            if term.is_active { "" } else { " (disabled)" }
        );
    }
    print_page_footer(page, result.count, result.has_next());
    Ok(())
}

/// Categories and tags can be viewed by any signed-in user but only
/// changed by admins.
fn require_term_admin(ctx: &AppContext, kind: TermKind) -> Result<()> {
    let user = ctx.require(term_route(kind))?;
    if !is_admin(Some(user)) {
        return Err(InkpostError::Forbidden(format!(
            "only admins can change a {}",
            kind.label()
        )));
    }
    Ok(())
}

pub async fn add_term(ctx: &AppContext, kind: TermKind, name: &str) -> Result<()> {
    require_term_admin(ctx, kind)?;
    let term = ctx.api.create_term(kind, name.trim()).await?;
    println!("Added {} {} \"{}\"", kind.label(), term.id, term.name);
    Ok(())
}

pub async fn rename_term(ctx: &AppContext, kind: TermKind, id: i64, name: &str) -> Result<()> {
    require_term_admin(ctx, kind)?;
    let term = ctx.api.rename_term(kind, id, name.trim()).await?;
    println!("Renamed {} {} to \"{}\"", kind.label(), term.id, term.name);
    Ok(())
}

pub async fn set_term_active(
    ctx: &AppContext,
    kind: TermKind,
    id: i64,
    is_active: bool,
) -> Result<()> {
    require_term_admin(ctx, kind)?;
    ctx.api.set_term_active(kind, id, is_active).await?;
    println!(
        "{} {} {}",
        kind.label(),
        id,
        if is_active { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub async fn delete_term(ctx: &AppContext, kind: TermKind, id: i64, yes: bool) -> Result<()> {
    require_term_admin(ctx, kind)?;
    if !yes && !confirm(&format!("Delete {} {}?", kind.label(), id))? {
        return Ok(());
    }
    ctx.api.delete_term(kind, id).await?;
    println!("Deleted {} {}", kind.label(), id);
    Ok(())
}

// Dashboard: users and account

pub async fn list_users(ctx: &AppContext, page: u32, search: Option<String>) -> Result<()> {
    ctx.require(Route::Users)?;
    let query = PageQuery {
        search,
        ..PageQuery::page(page)
    };
    let result = ctx.api.list_users(&query).await?;

    for user in &result.results {
        println!(
            "{:>5}  {:<7}  {}{}",
            user.id,
            user.role.as_str(),
            user.username,
            if user.is_active { "" } else { " (inactive)" }
        );
    }
    print_page_footer(query.page, result.count, result.has_next());
    Ok(())
}

pub async fn delete_user(ctx: &AppContext, id: i64, yes: bool) -> Result<()> {
    let admin = ctx.require(Route::Users)?;
    if admin.id == id {
        return Err(InkpostError::Forbidden(
            "you cannot delete your own account".into(),
        ));
    }
    if !yes && !confirm(&format!("Delete user {}?", id))? {
        return Ok(());
    }
    ctx.api.delete_user(id).await?;
    println!("Deleted user {}", id);
    Ok(())
}

pub async fn profile(ctx: &AppContext, update: ProfileUpdate) -> Result<()> {
    let user = ctx.require(Route::Profile)?;

    if update.is_empty() {
        println!("{} ({})", user.username, user.role);
        println!("  email: {}", user.email.as_deref().unwrap_or("-"));
        println!("  bio:   {}", user.bio.as_deref().unwrap_or("-"));
        return Ok(());
    }

    let updated = ctx.api.update_profile(user.id, &update).await?;
    println!("Profile updated for {}", updated.username);
    Ok(())
}

pub async fn change_password(ctx: &AppContext) -> Result<()> {
    ctx.require(Route::Settings)?;

    let change = PasswordChange {
        old_password: Password::new().with_prompt("Current password").interact()?,
        new_password: Password::new().with_prompt("New password").interact()?,
        confirm_password: Password::new()
            .with_prompt("Confirm new password")
            .interact()?,
    };
    // Checked here so a typo never reaches the server.
    change.validate().map_err(InkpostError::Other)?;

    ctx.api.change_password(&change).await?;
    println!("Password updated successfully");
    Ok(())
}

// Output helpers

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn post_date(post: &Post) -> String {
    if let Some(since) = &post.time_since_published {
        return format!(", {}", since);
    }
    post.published_at
        .or(post.created_at)
        .map(|d| format!(", {}", d.format("%Y-%m-%d")))
        .unwrap_or_default()
}

fn print_post_line(post: &Post) {
    println!(
        "{:>5}  {:<40}  {}{}",
        post.id,
        post.title,
        post.author_name(),
        post_date(post)
    );
    println!("       {}", post.route_key());
}

fn print_page_footer(page: u32, count: u64, has_next: bool) {
    println!();
    println!(
        "Page {} ({} total){}",
        page,
        count,
        if has_next { ", more with --page" } else { "" }
    );
}

fn print_comment(viewer: Option<&User>, comment: &Comment, depth: usize) {
    let author = comment
        .user
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_else(|| "Anonymous".to_string());
    let mine = if can_edit_or_delete_owned(viewer, comment) {
        " [manage]"
    } else {
        ""
    };
    println!("{}{}{}: {}", "  ".repeat(depth), author, mine, comment.content);
    for reply in &comment.replies {
        print_comment(viewer, reply, depth + 1);
    }
}

/// One-line reaction bar: the viewer's reaction is bracketed.
pub fn reaction_summary(state: &ReactionState) -> String {
    let mut parts: Vec<String> = ReactionType::ALL
        .iter()
        .map(|&reaction| {
            let cell = format!("{} {}", reaction.emoji(), state.counts.display_count(reaction));
            if state.user_reaction == Some(reaction) {
                format!("[{}]", cell)
            } else {
                cell
            }
        })
        .collect();

    let total = state.counts.display_total();
    if !total.is_empty() {
        parts.push(format!("({} total)", total));
    }
    parts.join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::ReactionCounts;
    use crate::session::{Session, TokenPair, TokenStore};
    use mockito::Server;
    use tempfile::TempDir;

    fn context(server: &Server, dir: &TempDir, viewer: Option<User>) -> AppContext {
        let mut config = Config::default();
        config.api.base_url = format!("{}/api/", server.url());
        let mut ctx =
            AppContext::with_token_store(config, TokenStore::new(dir.path().join("s.json")))
                .unwrap();
        ctx.session = match viewer {
            Some(user) => {
                ctx.api.set_access_token(Some("tok".into()));
                Session::signed_in(
                    user,
                    TokenPair {
                        access: "tok".into(),
                        refresh: "ref".into(),
                    },
                )
            }
            None => Session::anonymous(),
        };
        ctx
    }

    const AUTHORED_BY_3: &str =
        r#"{"id": 7, "title": "Mine", "author": {"id": 3, "username": "ana", "role": "AUTHOR"}}"#;

    #[test]
    fn test_reaction_summary_marks_viewer_reaction() {
        let counts: ReactionCounts = [(ReactionType::Like, 2), (ReactionType::Wow, 1)]
            .into_iter()
            .collect();
        let state = ReactionState::new(counts, Some(ReactionType::Wow));
        let summary = reaction_summary(&state);
        assert!(summary.contains("👍 2"));
        assert!(summary.contains("[😮 1]"));
        assert!(summary.ends_with("(3 total)"));
    }

    #[test]
    fn test_reaction_summary_hides_negative_total() {
        let counts: ReactionCounts = [(ReactionType::Sad, -2)].into_iter().collect();
        let summary = reaction_summary(&ReactionState::new(counts, None));
        assert!(summary.contains("😢 0"));
        assert!(!summary.contains("total"));
    }

    #[test]
    fn test_registrable_roles() {
        assert_eq!(registrable_role("author").unwrap(), Role::Author);
        assert_eq!(registrable_role("USER").unwrap(), Role::User);
        assert!(registrable_role("ADMIN").is_err());
        assert!(registrable_role("wizard").is_err());
    }

    #[test]
    fn test_controls_label() {
        let all = PostControls {
            edit: true,
            delete: true,
            toggle_publish: true,
            toggle_featured: true,
            toggle_active: true,
        };
        assert_eq!(controls_label(&all), "edpfa");
        assert_eq!(controls_label(&PostControls::default()), "-----");
    }

    #[test]
    fn test_flag_verbs() {
        assert_eq!(
            flag_verbs(PostFlag::IsPublished(true)),
            ("publish", "published")
        );
        assert_eq!(
            flag_verbs(PostFlag::IsPublished(false)),
            ("unpublish", "unpublished")
        );
        assert_eq!(flag_verbs(PostFlag::IsFeatured(true)).1, "featured");
        assert_eq!(flag_verbs(PostFlag::IsFeatured(false)).1, "unfeatured");
        assert_eq!(flag_verbs(PostFlag::IsActive(true)).1, "activated");
        assert_eq!(
            flag_verbs(PostFlag::IsActive(false)),
            ("deactivate", "deactivated")
        );
    }

    #[tokio::test]
    async fn test_author_cannot_publish_someone_elses_post() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", "/api/blog/blogs/7/")
            .with_status(200)
            .with_body(AUTHORED_BY_3)
            .create_async()
            .await;
        let publish = server
            .mock("PATCH", "/api/blog/blogs/7/publish/")
            .expect(0)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let ctx = context(&server, &dir, Some(User::new(4, "bo", Role::Author)));
        let result = set_blog_flag(&ctx, 7, PostFlag::IsPublished(true)).await;

        assert!(matches!(result, Err(InkpostError::Forbidden(_))));
        publish.assert_async().await;
    }

    #[tokio::test]
    async fn test_author_publishes_own_post() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", "/api/blog/blogs/7/")
            .with_status(200)
            .with_body(AUTHORED_BY_3)
            .create_async()
            .await;
        let publish = server
            .mock("PATCH", "/api/blog/blogs/7/publish/")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let ctx = context(&server, &dir, Some(User::new(3, "ana", Role::Author)));
        set_blog_flag(&ctx, 7, PostFlag::IsPublished(true))
            .await
            .unwrap();
        publish.assert_async().await;
    }

    #[tokio::test]
    async fn test_plain_user_cannot_create_posts() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/blog/blogs/")
            .expect(0)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let ctx = context(&server, &dir, Some(User::new(5, "cy", Role::User)));
        let result = create_blog(&ctx, "Title".into(), None, None, None, vec![]).await;

        assert!(matches!(result, Err(InkpostError::Forbidden(_))));
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_author_cannot_add_categories() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/api/blog/categories/")
            .expect(0)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let ctx = context(&server, &dir, Some(User::new(3, "ana", Role::Author)));
        let result = add_term(&ctx, TermKind::Category, "Rust").await;

        assert!(matches!(result, Err(InkpostError::Forbidden(_))));
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_signed_out_dashboard_is_unauthenticated() {
        let server = Server::new_async().await;
        let dir = TempDir::new().unwrap();
        let ctx = context(&server, &dir, None);
        let err = list_blogs(&ctx, 1, None).await.unwrap_err();
        assert!(matches!(err, InkpostError::LoginRequired(_)));

        let notice = redirect_notice(&err).unwrap();
        assert!(notice.contains("/login?next=%2Fdashboard%2Fblogs"));
        assert!(notice.contains("inkpost login --next"));
    }

    #[test]
    fn test_redirect_notice_names_landing_view() {
        let err = InkpostError::RouteForbidden {
            path: "/dashboard/users".into(),
            redirect: crate::authz::Redirect::to("/dashboard"),
        };
        assert_eq!(
            redirect_notice(&err).as_deref(),
            Some("/dashboard/users is not available to your role. Redirecting to /dashboard")
        );
        assert!(redirect_notice(&InkpostError::ReactionFailed).is_none());
    }

    #[tokio::test]
    async fn test_react_signed_out_sends_nothing() {
        let mut server = Server::new_async().await;
        let any = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let ctx = context(&server, &dir, None);
        react(&ctx, "hello", ReactionType::Like).await.unwrap();
        any.assert_async().await;
    }

    #[tokio::test]
    async fn test_react_failure_reports_error() {
        let mut server = Server::new_async().await;
        let _post = server
            .mock("GET", "/api/blog/posts/hello/")
            .with_status(200)
            .with_body(r#"{"id": 12, "title": "Hello", "reaction_counts": {"like": 1}}"#)
            .create_async()
            .await;
        let _react = server
            .mock("POST", "/api/blog/blogs/12/reactions/")
            .with_status(500)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let ctx = context(&server, &dir, Some(User::new(5, "cy", Role::User)));
        let result = react(&ctx, "hello", ReactionType::Like).await;
        assert!(matches!(result, Err(InkpostError::ReactionFailed)));
    }
}
