use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::api::{Credentials, LoginResponse, NewAccount, PasswordChange, ReactionApi};
use crate::app::{InkpostError, Result};
use crate::domain::{
    Comment, Listing, Page, PageQuery, Post, PostDraft, PostFlag, ProfileUpdate,
    ReactionResponse, ReactionType, Term, TermKind, User,
};
use crate::session::UserResolver;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the blogging backend.
///
/// Holds the current access token and sends it as a bearer token with
/// every request once set.
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
    access_token: RwLock<Option<String>>,
}

/// `/auth/protected/` has answered both with `{"user": {...}}` and with
/// the bare user object.
#[derive(Deserialize)]
#[serde(untagged)]
enum CurrentUserBody {
    Wrapped { user: User },
    Bare(User),
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("inkpost/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Relative joins only keep the last path segment with a trailing slash.
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            access_token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token
            .read()
            .map(|t| t.is_some())
            .unwrap_or(false)
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.access_token.read().ok().and_then(|t| t.clone()) {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        warn!("API request failed with {}: {}", status, message);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InkpostError::NotFound(message));
        }
        Err(InkpostError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_page<T: DeserializeOwned>(&self, path: &str, query: &PageQuery) -> Result<Page<T>> {
        let builder = self.request(Method::GET, path)?.query(&query.to_pairs());
        let listing: Listing<T> = self.send_json(builder).await?;
        Ok(listing.into_page())
    }

    // Auth

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let builder = self.request(Method::POST, "auth/login/")?.json(credentials);
        self.send_json(builder).await
    }

    /// Create an account, then sign in with it.
    pub async fn register(&self, account: &NewAccount) -> Result<LoginResponse> {
        let builder = self.request(Method::POST, "auth/register/")?.json(account);
        self.send(builder).await?;
        self.login(&Credentials {
            username: account.username.clone(),
            password: account.password.clone(),
        })
        .await
    }

    pub async fn refresh_access(&self, refresh: &str) -> Result<String> {
        let builder = self
            .request(Method::POST, "auth/refresh/")?
            .json(&json!({ "refresh": refresh }));
        let response: RefreshResponse = self.send_json(builder).await?;
        Ok(response.access)
    }

    pub async fn current_user(&self) -> Result<User> {
        if !self.has_access_token() {
            return Err(InkpostError::NotAuthenticated);
        }
        let body: CurrentUserBody = self
            .send_json(self.request(Method::GET, "auth/protected/")?)
            .await?;
        Ok(match body {
            CurrentUserBody::Wrapped { user } => user,
            CurrentUserBody::Bare(user) => user,
        })
    }

    pub async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> Result<User> {
        let builder = self
            .request(Method::PUT, &format!("auth/users/{}/", user_id))?
            .json(update);
        self.send_json(builder).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        change.validate().map_err(InkpostError::Other)?;
        let builder = self
            .request(Method::PUT, "auth/change-password/")?
            .json(change);
        self.send(builder).await?;
        Ok(())
    }

    pub async fn list_users(&self, query: &PageQuery) -> Result<Page<User>> {
        self.get_page("auth/users/", query).await
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("auth/users/{}/", user_id))?)
            .await?;
        Ok(())
    }

    // Public content

    pub async fn list_posts(&self, query: &PageQuery) -> Result<Page<Post>> {
        self.get_page("blog/posts/", query).await
    }

    pub async fn featured_posts(&self, query: &PageQuery) -> Result<Page<Post>> {
        self.get_page("blog/blogs/featured/", query).await
    }

    pub async fn get_post(&self, slug: &str) -> Result<Post> {
        self.send_json(self.request(Method::GET, &format!("blog/posts/{}/", slug))?)
            .await
    }

    pub async fn list_comments(&self, blog_id: i64) -> Result<Vec<Comment>> {
        let builder = self.request(Method::GET, &format!("blog/blogs/{}/comments/", blog_id))?;
        let listing: Listing<Comment> = self.send_json(builder).await?;
        Ok(listing.into_page().results)
    }

    pub async fn create_comment(&self, blog_id: i64, content: &str) -> Result<Comment> {
        let builder = self
            .request(Method::POST, &format!("blog/blogs/{}/comments/", blog_id))?
            .json(&json!({ "content": content, "blog": blog_id }));
        self.send_json(builder).await
    }

    // Dashboard

    pub async fn list_blogs(&self, query: &PageQuery) -> Result<Page<Post>> {
        self.get_page("blog/blogs/", query).await
    }

    pub async fn get_blog(&self, blog_id: i64) -> Result<Post> {
        self.send_json(self.request(Method::GET, &format!("blog/blogs/{}/", blog_id))?)
            .await
    }

    pub async fn create_blog(&self, draft: &PostDraft) -> Result<Post> {
        let builder = self.request(Method::POST, "blog/blogs/")?.json(draft);
        self.send_json(builder).await
    }

    pub async fn update_blog(&self, blog_id: i64, draft: &PostDraft) -> Result<Post> {
        let builder = self
            .request(Method::PATCH, &format!("blog/blogs/{}/", blog_id))?
            .json(draft);
        self.send_json(builder).await
    }

    pub async fn delete_blog(&self, blog_id: i64) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("blog/blogs/{}/", blog_id))?)
            .await?;
        Ok(())
    }

    /// Publishing has its own endpoint; the other flags patch the post.
    pub async fn set_post_flag(&self, blog_id: i64, flag: PostFlag) -> Result<()> {
        let path = match flag {
            PostFlag::IsPublished(_) => format!("blog/blogs/{}/publish/", blog_id),
            PostFlag::IsFeatured(_) | PostFlag::IsActive(_) => {
                format!("blog/blogs/{}/", blog_id)
            }
        };
        let builder = self.request(Method::PATCH, &path)?.json(&flag);
        self.send(builder).await?;
        Ok(())
    }

    pub async fn list_terms(&self, kind: TermKind, query: &PageQuery) -> Result<Page<Term>> {
        self.get_page(kind.path(), query).await
    }

    pub async fn create_term(&self, kind: TermKind, name: &str) -> Result<Term> {
        let builder = self
            .request(Method::POST, kind.path())?
            .json(&json!({ "name": name }));
        self.send_json(builder).await
    }

    pub async fn rename_term(&self, kind: TermKind, id: i64, name: &str) -> Result<Term> {
        let builder = self
            .request(Method::PATCH, &format!("{}{}/", kind.path(), id))?
            .json(&json!({ "name": name }));
        self.send_json(builder).await
    }

    pub async fn set_term_active(&self, kind: TermKind, id: i64, is_active: bool) -> Result<Term> {
        let builder = self
            .request(Method::PATCH, &format!("{}{}/", kind.path(), id))?
            .json(&json!({ "is_active": is_active }));
        self.send_json(builder).await
    }

    pub async fn delete_term(&self, kind: TermKind, id: i64) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("{}{}/", kind.path(), id))?)
            .await?;
        Ok(())
    }
}

/// Pull a human readable message out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()))
        .map(String::from)
        .or_else(|| {
            // Field errors: {"field": ["message", ...]}
            value.as_object().and_then(|map| {
                map.iter().find_map(|(field, v)| {
                    v.as_array()
                        .and_then(|a| a.first())
                        .and_then(|m| m.as_str())
                        .map(|m| format!("{}: {}", field, m))
                })
            })
        })
}

#[async_trait]
impl ReactionApi for HttpApiClient {
    async fn submit_reaction(
        &self,
        item_id: i64,
        reaction: ReactionType,
    ) -> Result<ReactionResponse> {
        let builder = self
            .request(Method::POST, &format!("blog/blogs/{}/reactions/", item_id))?
            .json(&json!({ "type": reaction }));
        self.send_json(builder).await
    }
}

#[async_trait]
impl UserResolver for HttpApiClient {
    async fn resolve_current_user(&self) -> Option<User> {
        match self.current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("Could not resolve current user: {}", e);
                None
            }
        }
    }
}
