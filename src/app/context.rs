use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{Credentials, HttpApiClient, LoginResponse, NewAccount};
use crate::app::error::{InkpostError, Result};
use crate::authz::{return_path_from, GuardState, Route};
use crate::config::Config;
use crate::domain::User;
use crate::session::{Session, TokenPair, TokenStore, UserResolver};

/// Everything a command needs: configuration, the API client and the
/// viewer's session.
pub struct AppContext {
    pub config: Config,
    pub api: Arc<HttpApiClient>,
    pub session: Session,
    token_store: TokenStore,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let token_store = TokenStore::new(TokenStore::default_path()?);
        Self::with_token_store(config, token_store)
    }

    pub fn with_token_store(config: Config, token_store: TokenStore) -> Result<Self> {
        let api = Arc::new(HttpApiClient::with_timeout(
            &config.api.base_url,
            config.api.timeout(),
        )?);

        Ok(Self {
            config,
            api,
            session: Session::default(),
            token_store,
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    /// Pick up the stored tokens and find out who they belong to.
    ///
    /// An expired access token is refreshed once. Tokens that resolve to
    /// nobody are discarded.
    pub async fn restore_session(&mut self) {
        let tokens = self.token_store.load();
        self.api
            .set_access_token(tokens.as_ref().map(|t| t.access.clone()));
        self.session = Session::new(tokens.clone());
        self.session.resolve(self.api.as_ref()).await;

        let Some(tokens) = tokens else {
            return;
        };
        if self.session.user().is_some() {
            return;
        }

        match self.api.refresh_access(&tokens.refresh).await {
            Ok(access) => {
                debug!("Access token refreshed");
                let refreshed = TokenPair {
                    access,
                    refresh: tokens.refresh,
                };
                self.api.set_access_token(Some(refreshed.access.clone()));
                let user = self.api.resolve_current_user().await;
                if user.is_some() {
                    if let Err(e) = self.token_store.save(&refreshed) {
                        warn!("Could not store refreshed tokens: {}", e);
                    }
                    self.session.sign_in(refreshed, user);
                    return;
                }
            }
            Err(e) => debug!("Token refresh failed: {}", e),
        }

        info!("Stored session is no longer valid");
        self.discard_tokens();
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<User> {
        let response = self.api.login(credentials).await?;
        self.finish_sign_in(response).await
    }

    pub async fn register(&mut self, account: &NewAccount) -> Result<User> {
        let response = self.api.register(account).await?;
        self.finish_sign_in(response).await
    }

    async fn finish_sign_in(&mut self, response: LoginResponse) -> Result<User> {
        let tokens = TokenPair {
            access: response.access,
            refresh: response.refresh,
        };
        self.api.set_access_token(Some(tokens.access.clone()));
        self.token_store.save(&tokens)?;

        let user = self.api.resolve_current_user().await;
        self.session.sign_in(tokens, user.clone());
        match user {
            Some(user) => {
                info!("Signed in as {} ({})", user.username, user.role);
                Ok(user)
            }
            None => {
                self.discard_tokens();
                Err(InkpostError::Other(
                    "Signed in, but the account details could not be loaded".into(),
                ))
            }
        }
    }

    pub fn logout(&mut self) -> Result<bool> {
        let had_tokens = self.session.sign_out().is_some();
        self.api.set_access_token(None);
        self.token_store.clear()?;
        Ok(had_tokens)
    }

    fn discard_tokens(&mut self) {
        self.session.sign_out();
        self.api.set_access_token(None);
        if let Err(e) = self.token_store.clear() {
            warn!("Could not remove session file: {}", e);
        }
    }

    pub fn guard(&self, route: Route) -> GuardState {
        route.check(
            &self.session,
            &self.config.routes.login,
            &self.config.routes.landing,
        )
    }

    /// The signed-in user, if they may open `route`.
    pub fn require(&self, route: Route) -> Result<&User> {
        match self.guard(route) {
            GuardState::Authorized => self.user().ok_or(InkpostError::NotAuthenticated),
            GuardState::Loading => Err(InkpostError::Other("Session is still loading".into())),
            GuardState::Unauthenticated(redirect) => {
                debug!("{} redirects to {}", route.path(), redirect.location());
                Err(InkpostError::LoginRequired(redirect))
            }
            GuardState::Forbidden(redirect) => {
                debug!("{} redirects to {}", route.path(), redirect.location());
                Err(InkpostError::RouteForbidden {
                    path: route.path().to_string(),
                    redirect,
                })
            }
        }
    }

    /// Where to continue after signing in from a login `location`.
    ///
    /// Falls back to the landing view when the location carries no usable
    /// return path, or when the viewer may not open it.
    pub fn return_target(&self, location: &str) -> String {
        let landing = self.config.routes.landing.clone();
        let Some(path) = return_path_from(location) else {
            return landing;
        };
        match Route::from_path(&path) {
            Some(route) if !self.guard(route).is_authorized() => landing,
            _ => path,
        }
    }
}
