use std::sync::Arc;
use std::time::Instant;

use crate::auth::SessionManager;
use crate::config::AppConfig;
use crate::oauth::GoogleOAuth;
use crate::repository::categories::CategoryRepository;
use crate::repository::items::ItemRepository;
use crate::store::DocumentStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub items: ItemRepository,
    pub categories: CategoryRepository,
    pub sessions: Arc<SessionManager>,
    /// `None` when Google credentials are not configured
    pub google: Option<Arc<GoogleOAuth>>,
    pub items_require_auth: bool,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: &AppConfig) -> Self {
        let google = config
            .google
            .clone()
            .map(|google| Arc::new(GoogleOAuth::new(google)));

        Self {
            items: ItemRepository::new(Arc::clone(&store)),
            categories: CategoryRepository::new(Arc::clone(&store)),
            store,
            sessions: Arc::new(SessionManager::new(&config.session)),
            google,
            items_require_auth: config.items_require_auth,
            started_at: Instant::now(),
        }
    }

    pub fn with_google(mut self, google: GoogleOAuth) -> Self {
        self.google = Some(Arc::new(google));
        self
    }
}
