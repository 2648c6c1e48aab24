use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::reaction::{ReactionCounts, ReactionState, ReactionType};
use crate::domain::user::User;

/// A category or tag: both are a named, switchable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

pub type Category = Term;
pub type Tag = Term;

/// Which taxonomy a [`Term`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Category,
    Tag,
}

impl TermKind {
    pub fn path(self) -> &'static str {
        match self {
            TermKind::Category => "blog/categories/",
            TermKind::Tag => "blog/tags/",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TermKind::Category => "category",
            TermKind::Tag => "tag",
        }
    }
}

fn default_true() -> bool {
    true
}

/// A blog post, as returned by both the public and the dashboard endpoints.
///
/// The public serializer adds slug, counters, comments and the viewer's
/// reaction; the dashboard one does not, hence the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_since_published: Option<String>,
    #[serde(default)]
    pub likes_count: Option<i64>,
    #[serde(default)]
    pub views_count: Option<i64>,
    #[serde(default)]
    pub comments_count: Option<i64>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reaction_counts: Option<ReactionCounts>,
    #[serde(default)]
    pub user_reaction: Option<ReactionType>,
}

impl Post {
    pub fn author_id(&self) -> Option<i64> {
        self.author.as_ref().map(|a| a.id)
    }

    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("unknown")
    }

    /// Server snapshot used to seed the reaction widget.
    pub fn reaction_state(&self) -> ReactionState {
        ReactionState::new(
            self.reaction_counts.clone().unwrap_or_default(),
            self.user_reaction,
        )
    }

    /// Content as plain text for the terminal: markup dropped, block
    /// elements turned into line breaks, entities decoded.
    pub fn display_content(&self) -> String {
        html_to_text(&self.content)
    }

    pub fn status_label(&self) -> &'static str {
        if !self.is_active {
            "inactive"
        } else if self.is_published {
            "published"
        } else {
            "draft"
        }
    }

    /// Path segment used by the web frontend and the detail endpoint.
    pub fn route_key(&self) -> String {
        self.slug.clone().unwrap_or_else(|| self.id.to_string())
    }
}

const BLOCK_TAGS: &[&str] = &[
    "p", "br", "div", "li", "blockquote", "pre", "h1", "h2", "h3", "h4", "h5", "h6",
];

fn html_to_text(html: &str) -> String {
    let mut text = String::new();
    let mut tag = String::new();
    let mut in_tag = false;
    let mut last_was_space = false;
    // Plain text keeps its own line breaks.
    let plain = !html.contains('<');

    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                if BLOCK_TAGS.contains(&name.as_str()) && !text.ends_with('\n') {
                    text.truncate(text.trim_end_matches(' ').len());
                    text.push('\n');
                    last_was_space = true;
                }
            }
            _ if in_tag => tag.push(c),
            '\n' if plain => {
                text.push('\n');
                last_was_space = true;
            }
            _ if c.is_whitespace() => {
                if !last_was_space {
                    text.push(' ');
                    last_was_space = true;
                }
            }
            _ => {
                text.push(c);
                last_was_space = false;
            }
        }
    }

    html_escape::decode_html_entities(text.trim()).into_owned()
}

/// Minimal ownership view of a content entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    pub id: i64,
    pub author_id: Option<i64>,
    pub is_published: bool,
    pub is_featured: bool,
    pub is_active: bool,
}

impl From<&Post> for Resource {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id(),
            is_published: post.is_published,
            is_featured: post.is_featured,
            is_active: post.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub blog: Option<i64>,
    #[serde(default)]
    pub user: Option<User>,
    pub content: String,
    #[serde(default)]
    pub parent: Option<i64>,
    #[serde(default)]
    pub replies: Vec<Comment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn owner_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Fields sent when creating or editing a post from the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<i64>>,
}

/// Partial update for the boolean flags of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostFlag {
    IsPublished(bool),
    IsFeatured(bool),
    IsActive(bool),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Role;

    fn public_post_json() -> &'static str {
        r#"{
            "id": 12,
            "title": "Borrowing &amp; lifetimes",
            "slug": "borrowing-lifetimes",
            "author": {"id": 3, "username": "ana", "role": "AUTHOR"},
            "category": {"id": 1, "name": "Rust", "is_active": true},
            "tags": [{"id": 2, "name": "ownership", "is_active": true}],
            "content": "Tom &amp; Jerry",
            "image": null,
            "is_featured": true,
            "is_published": true,
            "likes_count": 4,
            "views_count": 100,
            "comments": [],
            "published_at": "2024-05-01T10:00:00Z",
            "time_since_published": "2 days ago",
            "reaction_counts": {"like": 3, "wow": 1},
            "user_reaction": "wow"
        }"#
    }

    #[test]
    fn test_public_post_deserializes() {
        let post: Post = serde_json::from_str(public_post_json()).unwrap();
        assert_eq!(post.author_id(), Some(3));
        assert_eq!(post.author.as_ref().unwrap().role, Role::Author);
        assert_eq!(post.route_key(), "borrowing-lifetimes");
        assert_eq!(post.status_label(), "published");
    }

    #[test]
    fn test_reaction_state_seeded_from_post() {
        let post: Post = serde_json::from_str(public_post_json()).unwrap();
        let state = post.reaction_state();
        assert_eq!(state.counts.get(ReactionType::Like), 3);
        assert_eq!(state.user_reaction, Some(ReactionType::Wow));
    }

    #[test]
    fn test_display_content_decodes_entities() {
        let post: Post = serde_json::from_str(public_post_json()).unwrap();
        assert_eq!(post.display_content(), "Tom & Jerry");
    }

    #[test]
    fn test_display_content_strips_markup() {
        let mut post: Post = serde_json::from_str(public_post_json()).unwrap();
        post.content = "<h2>Intro</h2><p>First   <strong>bold</strong> line</p><p>1 &lt; 2</p>".into();
        assert_eq!(post.display_content(), "Intro\nFirst bold line\n1 < 2");
    }

    #[test]
    fn test_display_content_keeps_plain_text_lines() {
        let mut post: Post = serde_json::from_str(public_post_json()).unwrap();
        post.content = "line one\nline two".into();
        assert_eq!(post.display_content(), "line one\nline two");
    }

    #[test]
    fn test_dashboard_post_without_public_fields() {
        let post: Post =
            serde_json::from_str(r#"{"id": 5, "title": "Draft", "is_published": false}"#).unwrap();
        assert_eq!(post.author_id(), None);
        assert_eq!(post.route_key(), "5");
        assert_eq!(post.status_label(), "draft");
        assert_eq!(post.reaction_state(), ReactionState::default());
    }

    #[test]
    fn test_resource_from_post() {
        let post: Post = serde_json::from_str(public_post_json()).unwrap();
        let resource = Resource::from(&post);
        assert_eq!(resource.author_id, Some(3));
        assert!(resource.is_featured);
    }

    #[test]
    fn test_post_flag_serializes_as_single_field() {
        let json = serde_json::to_string(&PostFlag::IsFeatured(true)).unwrap();
        assert_eq!(json, r#"{"is_featured":true}"#);
    }
}
