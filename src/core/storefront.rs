use crate::adapters::http::ApiClient;
use crate::core::catalog::{sort_cars, CarFilter, SortOrder};
use crate::core::comparison::{AddOutcome, ComparisonSet, ComparisonTable};
use crate::core::currency::context::PLACEHOLDER;
use crate::core::currency::{format_amount, CurrencyContext, CurrencyStatus};
use crate::core::session::Session;
use crate::domain::model::{Car, Credentials, Registration, User};
use crate::domain::ports::{ConfigProvider, GeoLocator, Storage};
use crate::utils::error::Result;
use crate::utils::retry::RetryPolicy;

/// Application state created once at start-up: API client, session,
/// currency context and the current comparison selection.
pub struct Storefront<S: Storage> {
    api: ApiClient,
    session: Session<S>,
    currency: CurrencyContext,
    comparison: ComparisonSet,
    detection_policy: RetryPolicy,
}

impl<S: Storage> Storefront<S> {
    pub fn new<C: ConfigProvider>(config: &C, storage: S) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config.api_base_url(), config.retry_policy())?,
            session: Session::new(storage),
            currency: CurrencyContext::new(config.default_currency()),
            comparison: ComparisonSet::new(config.max_comparison_items()),
            detection_policy: config.detection_policy(),
        })
    }

    /// Restores a stored session, if any.
    pub async fn start(&mut self) -> Result<bool> {
        let restored = self.session.restore().await?;
        self.api.set_token(self.session.token().map(str::to_string));
        Ok(restored)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn currency(&self) -> &CurrencyContext {
        &self.currency
    }

    pub fn comparison(&self) -> &ComparisonSet {
        &self.comparison
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Single short attempt; safe to run alongside [`browse`](Self::browse).
    pub async fn detect_currency(&self, locator: &dyn GeoLocator) -> Result<&'static str> {
        self.currency.detect(locator, &self.detection_policy).await
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<User> {
        let auth = self.api.login(credentials).await?;
        let user = auth.user.clone();
        self.api.set_token(Some(auth.token.clone()));
        self.session.establish(auth).await?;
        Ok(user)
    }

    pub async fn register(&mut self, registration: &Registration) -> Result<User> {
        let auth = self.api.register(registration).await?;
        let user = auth.user.clone();
        self.api.set_token(Some(auth.token.clone()));
        self.session.establish(auth).await?;
        Ok(user)
    }

    /// The server call is best-effort; local state is always reset.
    pub async fn logout(&mut self) -> Result<()> {
        if self.api.has_token() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }
        self.api.set_token(None);
        self.session.clear().await?;
        self.currency.reset().await;
        self.comparison.clear();
        tracing::info!("Signed out");
        Ok(())
    }

    /// Fetches listings and applies the filter locally as well, since the
    /// server may ignore criteria it does not support.
    pub async fn browse(&self, filter: &CarFilter, order: Option<SortOrder>) -> Result<Vec<Car>> {
        let currency = self.currency.current().await;
        let cars = self.api.list_cars(filter, Some(currency)).await?;
        let mut view = filter.apply(&cars);
        if let Some(order) = order {
            sort_cars(&mut view, order);
        }
        Ok(view.into_iter().cloned().collect())
    }

    /// Placeholder while detection is pending, else the listing's own price.
    pub async fn price_label(&self, car: &Car) -> String {
        if self.currency.snapshot().await.status == CurrencyStatus::Loading {
            return PLACEHOLDER.to_string();
        }
        format_amount(car.price, &car.currency)
    }

    pub fn add_to_comparison(&mut self, car: Car) -> AddOutcome {
        self.comparison.add(car)
    }

    pub fn remove_from_comparison(&mut self, id: &str) -> bool {
        self.comparison.remove(id)
    }

    /// Fetches each id not already selected, then builds the table.
    pub async fn compare(&mut self, ids: &[String]) -> Result<ComparisonTable> {
        for id in ids {
            if self.comparison.contains(id) {
                continue;
            }
            if self.comparison.is_full() {
                tracing::warn!(
                    "Comparison limited to {} cars, skipping {}",
                    self.comparison.max_items(),
                    id
                );
                continue;
            }
            let car = self.api.get_car(id).await?;
            self.comparison.add(car);
        }
        self.comparison.generate()
    }
}
