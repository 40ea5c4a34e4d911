//! Scenario session: the lifecycle of one logical browser identity across a
//! scenario group.
//!
//! The session owns no browser logic of its own; every transition delegates
//! to the action library and, on success, replaces the whole state snapshot.
//! A half-finished action therefore never leaves a half-updated snapshot
//! behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::actions::{
    AuthActions, CartActions, CheckoutActions, CommonActions, ProductActions, LOGIN_PATH,
};
use crate::browser::BrowserDriver;
use crate::errors::{ActionError, SessionError};
use crate::fixtures::{CheckoutProfile, FixtureSet, UserFixture, UserKind};
use crate::selectors::SelectorRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    CartPopulated,
    CheckoutInProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product_key: String,
    pub price_cents: u32,
}

/// Immutable view of the session at a point in time.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub authenticated_user: Option<UserKind>,
    pub cart_items: Vec<CartItem>,
    pub last_checkout_total_cents: Option<u32>,
}

impl SessionSnapshot {
    fn fresh() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            authenticated_user: None,
            cart_items: Vec::new(),
            last_checkout_total_cents: None,
        }
    }
}

pub struct Session {
    driver: Arc<dyn BrowserDriver>,
    selectors: Arc<SelectorRegistry>,
    fixtures: Arc<FixtureSet>,
    timeout_ms: u64,
    output_dir: PathBuf,
    snapshot: SessionSnapshot,
}

impl Session {
    /// Open a session for a scenario group: navigate to the login entry
    /// point with a fresh snapshot.
    pub async fn begin_group(
        driver: Arc<dyn BrowserDriver>,
        selectors: Arc<SelectorRegistry>,
        fixtures: Arc<FixtureSet>,
        timeout_ms: u64,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, SessionError> {
        let session = Self {
            driver,
            selectors,
            fixtures,
            timeout_ms,
            output_dir: output_dir.into(),
            snapshot: SessionSnapshot::fresh(),
        };
        let base = session.fixtures.steps().base_url.trim_end_matches('/');
        let url = format!("{base}{LOGIN_PATH}");
        session
            .driver
            .goto(&url)
            .await
            .map_err(ActionError::from)?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.snapshot.state
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Sum of the tracked cart item prices, in cents.
    pub fn cart_total_cents(&self) -> u32 {
        self.snapshot.cart_items.iter().map(|i| i.price_cents).sum()
    }

    fn auth(&self) -> AuthActions<'_> {
        AuthActions::new(
            self.driver.as_ref(),
            &self.selectors,
            &self.fixtures,
            self.timeout_ms,
        )
    }

    fn products(&self) -> ProductActions<'_> {
        ProductActions::new(
            self.driver.as_ref(),
            &self.selectors,
            &self.fixtures,
            self.timeout_ms,
        )
    }

    fn cart(&self) -> CartActions<'_> {
        CartActions::new(
            self.driver.as_ref(),
            &self.selectors,
            &self.fixtures,
            self.timeout_ms,
        )
    }

    fn checkout(&self) -> CheckoutActions<'_> {
        CheckoutActions::new(
            self.driver.as_ref(),
            &self.selectors,
            &self.fixtures,
            self.timeout_ms,
        )
    }

    fn common(&self) -> CommonActions<'_> {
        CommonActions::new(
            self.driver.as_ref(),
            &self.selectors,
            &self.fixtures,
            self.timeout_ms,
            self.output_dir.clone(),
        )
    }

    fn replace(&mut self, snapshot: SessionSnapshot) {
        self.snapshot = snapshot;
    }

    /// Log in as the fixture user of the given kind. A classified login
    /// failure leaves the snapshot untouched; the caller decides whether it
    /// was expected.
    pub async fn login(&mut self, kind: UserKind) -> Result<(), SessionError> {
        let user = self
            .fixtures
            .user(kind)
            .map_err(ActionError::from)?
            .clone();
        self.login_user(&user).await
    }

    /// Log in with explicit credentials, fixture-backed or not.
    pub async fn login_user(&mut self, user: &UserFixture) -> Result<(), SessionError> {
        self.auth().login(user).await?;
        self.replace(SessionSnapshot {
            state: SessionState::Authenticated,
            authenticated_user: Some(user.kind),
            cart_items: Vec::new(),
            last_checkout_total_cents: self.snapshot.last_checkout_total_cents,
        });
        Ok(())
    }

    /// Log in as the given kind unless the session is already authenticated
    /// as that user. A session held by a different user is logged out first.
    pub async fn ensure_logged_in(&mut self, kind: UserKind) -> Result<(), SessionError> {
        match self.snapshot.authenticated_user {
            Some(current) if current == kind && self.snapshot.state != SessionState::Failed => {
                Ok(())
            }
            Some(_) => {
                self.logout().await?;
                self.login(kind).await
            }
            None => self.login(kind).await,
        }
    }

    /// Log out via the menu. The storefront drops the cart on logout, so the
    /// tracked items go with it.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        self.auth().logout().await?;
        self.replace(SessionSnapshot {
            last_checkout_total_cents: self.snapshot.last_checkout_total_cents,
            ..SessionSnapshot::fresh()
        });
        Ok(())
    }

    /// Add a product from the inventory page, tracking its rendered price.
    /// The inventory button toggles between Add and Remove, so re-adding a
    /// tracked product is rejected rather than clicked.
    pub async fn add_to_cart(&mut self, product_key: &str) -> Result<u32, SessionError> {
        if self
            .snapshot
            .cart_items
            .iter()
            .any(|i| i.product_key == product_key)
        {
            return Err(ActionError::assertion(
                "product not yet in the cart",
                format!("'{product_key}' absent from the cart"),
                "an already-tracked cart item",
            )
            .into());
        }
        let price_cents = self.products().add_to_cart(product_key).await?;
        let mut snapshot = self.snapshot.clone();
        snapshot.cart_items.push(CartItem {
            product_key: product_key.to_string(),
            price_cents,
        });
        snapshot.state = SessionState::CartPopulated;
        self.replace(snapshot);
        Ok(price_cents)
    }

    /// Assert the cart badge agrees with the tracked item count.
    pub async fn verify_cart_badge(&self) -> Result<(), SessionError> {
        self.products()
            .verify_cart_badge(self.snapshot.cart_items.len())
            .await?;
        Ok(())
    }

    pub async fn select_filter(&self, filter_key: &str) -> Result<(), SessionError> {
        self.products().select_filter(filter_key).await?;
        Ok(())
    }

    pub async fn product_names(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.products().product_names().await?)
    }

    pub async fn product_prices(&self) -> Result<Vec<u32>, SessionError> {
        Ok(self.products().product_prices().await?)
    }

    pub async fn verify_product_listed(&self, product_key: &str) -> Result<(), SessionError> {
        self.products().verify_product_listed(product_key).await?;
        Ok(())
    }

    pub async fn open_product(&self, product_key: &str) -> Result<(), SessionError> {
        self.products().open_product(product_key).await?;
        Ok(())
    }

    pub async fn product_detail(&self) -> Result<(String, u32), SessionError> {
        Ok(self.products().product_detail().await?)
    }

    pub async fn back_to_products(&self) -> Result<(), SessionError> {
        self.products().back_to_products().await?;
        Ok(())
    }

    pub async fn go_to_cart(&self) -> Result<(), SessionError> {
        self.cart().go_to_cart().await?;
        Ok(())
    }

    pub async fn verify_product_in_cart(&self, product_key: &str) -> Result<(), SessionError> {
        self.cart().verify_product_in_cart(product_key).await?;
        Ok(())
    }

    /// Remove a product on the cart page, untracking it. An empty cart
    /// drops the session back to plain Authenticated.
    pub async fn remove_from_cart(&mut self, product_key: &str) -> Result<(), SessionError> {
        self.cart().remove_product(product_key).await?;
        let mut snapshot = self.snapshot.clone();
        if let Some(pos) = snapshot
            .cart_items
            .iter()
            .position(|i| i.product_key == product_key)
        {
            snapshot.cart_items.remove(pos);
        }
        if snapshot.cart_items.is_empty() {
            snapshot.state = SessionState::Authenticated;
        }
        self.replace(snapshot);
        Ok(())
    }

    /// Move from the cart page into the checkout information step.
    pub async fn begin_checkout(&mut self) -> Result<(), SessionError> {
        self.cart().proceed_to_checkout().await?;
        let mut snapshot = self.snapshot.clone();
        snapshot.state = SessionState::CheckoutInProgress;
        self.replace(snapshot);
        Ok(())
    }

    /// Fill the checkout information form without submitting it.
    pub async fn fill_checkout_info(&self, profile: &CheckoutProfile) -> Result<(), SessionError> {
        self.checkout().fill_info(profile).await?;
        Ok(())
    }

    /// Submit the checkout information form. A rejected form surfaces as an
    /// assertion failure carrying the banner text.
    pub async fn continue_to_overview(&self) -> Result<(), SessionError> {
        self.checkout().continue_to_overview().await?;
        Ok(())
    }

    /// Drive the checkout to completion with the fixture customer profile,
    /// verifying overview totals against the tracked cart and the
    /// confirmation header against the fixture text.
    pub async fn complete_purchase(&mut self) -> Result<u32, SessionError> {
        let checkout = self.checkout();
        let profile = self.fixtures.steps().checkout_customer.clone();
        checkout.fill_info(&profile).await?;
        checkout.continue_to_overview().await?;
        checkout.verify_totals(self.cart_total_cents()).await?;
        let total = checkout.total().await?;
        checkout.finish_purchase().await?;
        checkout.verify_confirmation().await?;

        self.replace(SessionSnapshot {
            state: SessionState::Completed,
            authenticated_user: self.snapshot.authenticated_user,
            cart_items: Vec::new(),
            last_checkout_total_cents: Some(total),
        });
        Ok(total)
    }

    /// Bring an authenticated session back to a clean inventory page without
    /// re-login: empty the browser cart through the UI and return to the
    /// listing. Idempotent over an already-clean session.
    pub async fn reset_between_scenarios(&mut self) -> Result<(), SessionError> {
        if self.snapshot.state == SessionState::Unauthenticated
            || self.snapshot.authenticated_user.is_none()
        {
            return Err(SessionError::ResetPrecondition);
        }

        let cart = self.cart();
        cart.go_to_cart().await?;
        cart.clear().await?;
        cart.continue_shopping().await?;

        self.replace(SessionSnapshot {
            state: SessionState::Authenticated,
            authenticated_user: self.snapshot.authenticated_user,
            cart_items: Vec::new(),
            last_checkout_total_cents: self.snapshot.last_checkout_total_cents,
        });
        Ok(())
    }

    /// Close the group: attempt logout whatever state the session ended in.
    /// The attempt is unconditional because the browser may hold an identity
    /// the snapshot lost track of. Teardown failures are logged, never
    /// surfaced.
    pub async fn end_group(&mut self) {
        if let Err(e) = self.auth().logout().await {
            log::debug!("group teardown logout failed: {e}");
        }
        self.replace(SessionSnapshot {
            last_checkout_total_cents: self.snapshot.last_checkout_total_cents,
            ..SessionSnapshot::fresh()
        });
    }

    /// Re-open the group from scratch: back to the login entry point with a
    /// fresh snapshot. Used when a selective reset is not possible.
    pub async fn restart_group(&mut self) -> Result<(), SessionError> {
        let base = self.fixtures.steps().base_url.trim_end_matches('/');
        let url = format!("{base}{LOGIN_PATH}");
        self.driver.goto(&url).await.map_err(ActionError::from)?;
        self.replace(SessionSnapshot::fresh());
        Ok(())
    }

    /// Record that the running scenario failed. The browser is left as-is
    /// for artifact capture.
    pub fn mark_failed(&mut self) {
        let mut snapshot = self.snapshot.clone();
        snapshot.state = SessionState::Failed;
        self.replace(snapshot);
    }

    pub async fn take_screenshot(&self, label: &str) -> Result<PathBuf, SessionError> {
        Ok(self.common().take_screenshot(label).await?)
    }

    pub async fn dismiss_error_banner(&self) -> Result<bool, SessionError> {
        Ok(self.common().dismiss_error_banner().await?)
    }

    pub async fn wait_for_page_load(&self) -> Result<(), SessionError> {
        self.common().wait_for_page_load().await?;
        Ok(())
    }
}
