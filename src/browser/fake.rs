//! In-memory storefront double used by the test suite.
//!
//! Models just enough of the Swag Labs shop for the action layer to drive it
//! through the same `BrowserDriver` interface as the real backend: login
//! validation with the site's error banners, a sortable six-product
//! inventory, a cart, and the three-step checkout.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::browser::traits::BrowserDriver;
use crate::errors::DriverError;
use crate::selectors::Locator;

const CATALOG: [(&str, u32); 6] = [
    ("Sauce Labs Backpack", 2999),
    ("Sauce Labs Bike Light", 999),
    ("Sauce Labs Bolt T-Shirt", 1599),
    ("Sauce Labs Fleece Jacket", 4999),
    ("Sauce Labs Onesie", 799),
    ("Test.allTheThings() T-Shirt (Red)", 1599),
];

const VALID_PASSWORD: &str = "secret_sauce";

fn format_cents(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Login,
    Inventory,
    ProductDetail(usize),
    Cart,
    CheckoutInfo,
    CheckoutOverview,
    CheckoutComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sort {
    NameAsc,
    NameDesc,
    PriceLowHigh,
    PriceHighLow,
}

struct StoreState {
    route: Route,
    authed: Option<String>,
    menu_open: bool,
    error_banner: Option<String>,
    sort: Sort,
    /// catalog indices, insertion order
    cart: Vec<usize>,
    username_input: String,
    password_input: String,
    first_name: String,
    last_name: String,
    zip_code: String,
}

impl StoreState {
    fn new() -> Self {
        Self {
            route: Route::Login,
            authed: None,
            menu_open: false,
            error_banner: None,
            sort: Sort::NameAsc,
            cart: Vec::new(),
            username_input: String::new(),
            password_input: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            zip_code: String::new(),
        }
    }

    /// Catalog indices in current render order.
    fn ordered(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..CATALOG.len()).collect();
        match self.sort {
            Sort::NameAsc => indices.sort_by_key(|&i| CATALOG[i].0),
            Sort::NameDesc => {
                indices.sort_by_key(|&i| CATALOG[i].0);
                indices.reverse();
            }
            Sort::PriceLowHigh => indices.sort_by_key(|&i| (CATALOG[i].1, CATALOG[i].0)),
            Sort::PriceHighLow => {
                indices.sort_by_key(|&i| (CATALOG[i].1, CATALOG[i].0));
                indices.reverse();
            }
        }
        indices
    }

    fn subtotal(&self) -> u32 {
        self.cart.iter().map(|&i| CATALOG[i].1).sum()
    }

    fn tax(&self) -> u32 {
        // 8% sales tax, rounded to the nearest cent.
        (self.subtotal() * 8 + 50) / 100
    }

    fn login_outcome(&self) -> Result<(), String> {
        if self.username_input.is_empty() {
            return Err("Epic sadface: Username is required".to_string());
        }
        if self.password_input.is_empty() {
            return Err("Epic sadface: Password is required".to_string());
        }
        if self.password_input != VALID_PASSWORD {
            return Err(
                "Epic sadface: Username and password do not match any user in this service"
                    .to_string(),
            );
        }
        match self.username_input.as_str() {
            "locked_out_user" => {
                Err("Epic sadface: Sorry, this user has been locked out.".to_string())
            }
            "standard_user" | "problem_user" => Ok(()),
            _ => Err(
                "Epic sadface: Username and password do not match any user in this service"
                    .to_string(),
            ),
        }
    }

    fn path(&self) -> &'static str {
        match self.route {
            Route::Login => "/",
            Route::Inventory => "/inventory.html",
            Route::ProductDetail(_) => "/inventory-item.html",
            Route::Cart => "/cart.html",
            Route::CheckoutInfo => "/checkout-step-one.html",
            Route::CheckoutOverview => "/checkout-step-two.html",
            Route::CheckoutComplete => "/checkout-complete.html",
        }
    }
}

pub struct FakeStorefront {
    base_url: String,
    state: Mutex<StoreState>,
    fail_screenshots: AtomicBool,
    screenshots: Mutex<Vec<PathBuf>>,
}

impl FakeStorefront {
    pub fn new() -> Self {
        Self {
            base_url: "https://www.saucedemo.com".to_string(),
            state: Mutex::new(StoreState::new()),
            fail_screenshots: AtomicBool::new(false),
            screenshots: Mutex::new(Vec::new()),
        }
    }

    /// Make every subsequent screenshot call fail, for exercising the
    /// capture-failure-swallowing path.
    pub fn break_screenshots(&self) {
        self.fail_screenshots.store(true, Ordering::SeqCst);
    }

    pub fn screenshots_taken(&self) -> Vec<PathBuf> {
        self.screenshots.lock().unwrap().clone()
    }

    /// True browser-side cart size, for divergence checks against the
    /// session's tracked model.
    pub fn browser_cart_len(&self) -> usize {
        self.state.lock().unwrap().cart.len()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().unwrap().authed.is_some()
    }

    fn visible(&self, state: &StoreState, locator: &str) -> bool {
        match locator {
            "#inventory_container" => state.route == Route::Inventory,
            "#login-button" | "#user-name" | "#password" => state.route == Route::Login,
            "[data-test='error']" => state.error_banner.is_some(),
            ".shopping_cart_badge" => state.authed.is_some() && !state.cart.is_empty(),
            "#logout_sidebar_link" => state.menu_open,
            "#react-burger-menu-btn" => state.authed.is_some(),
            "#checkout" | "#continue-shopping" => state.route == Route::Cart,
            "#first-name" | "#last-name" | "#postal-code" | "#continue" | "#cancel" => {
                state.route == Route::CheckoutInfo
            }
            "#finish" | ".summary_subtotal_label" | ".summary_tax_label"
            | ".summary_total_label" => state.route == Route::CheckoutOverview,
            ".complete-header" => state.route == Route::CheckoutComplete,
            ".inventory_details_name" | ".inventory_details_price" => {
                matches!(state.route, Route::ProductDetail(_))
            }
            "#back-to-products" => matches!(
                state.route,
                Route::ProductDetail(_) | Route::CheckoutComplete
            ),
            ".shopping_cart_link" => state.authed.is_some(),
            _ => false,
        }
    }
}

impl Default for FakeStorefront {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserDriver for FakeStorefront {
    fn name(&self) -> &str {
        "fake"
    }

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.menu_open = false;
        state.error_banner = None;
        let path = url.strip_prefix(self.base_url.as_str()).unwrap_or(url);
        state.route = match path.trim_end_matches('/') {
            "" => Route::Login,
            "/inventory.html" => Route::Inventory,
            "/cart.html" => Route::Cart,
            "/checkout-step-one.html" => Route::CheckoutInfo,
            "/checkout-step-two.html" => Route::CheckoutOverview,
            "/checkout-complete.html" => Route::CheckoutComplete,
            other => {
                return Err(DriverError::Navigation {
                    url: url.to_string(),
                    reason: format!("no such page '{other}'"),
                })
            }
        };
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(format!("{}{}", self.base_url, state.path()))
    }

    async fn click(&self, locator: &Locator) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        match locator.as_str() {
            "#login-button" if state.route == Route::Login => {
                match state.login_outcome() {
                    Ok(()) => {
                        state.authed = Some(state.username_input.clone());
                        state.error_banner = None;
                        state.route = Route::Inventory;
                        state.username_input.clear();
                        state.password_input.clear();
                    }
                    Err(banner) => state.error_banner = Some(banner),
                }
                Ok(())
            }
            ".error-button" => {
                state.error_banner = None;
                Ok(())
            }
            "#react-burger-menu-btn" if state.authed.is_some() => {
                state.menu_open = true;
                Ok(())
            }
            "#logout_sidebar_link" if state.menu_open => {
                state.authed = None;
                state.menu_open = false;
                state.cart.clear();
                state.route = Route::Login;
                Ok(())
            }
            ".shopping_cart_link" if state.authed.is_some() => {
                state.route = Route::Cart;
                Ok(())
            }
            "#checkout" if state.route == Route::Cart => {
                state.route = Route::CheckoutInfo;
                state.first_name.clear();
                state.last_name.clear();
                state.zip_code.clear();
                state.error_banner = None;
                Ok(())
            }
            "#continue" if state.route == Route::CheckoutInfo => {
                if state.first_name.is_empty() {
                    state.error_banner = Some("Error: First Name is required".to_string());
                } else if state.last_name.is_empty() {
                    state.error_banner = Some("Error: Last Name is required".to_string());
                } else if state.zip_code.is_empty() {
                    state.error_banner = Some("Error: Postal Code is required".to_string());
                } else {
                    state.error_banner = None;
                    state.route = Route::CheckoutOverview;
                }
                Ok(())
            }
            "#cancel" if state.route == Route::CheckoutInfo => {
                state.route = Route::Cart;
                Ok(())
            }
            "#continue-shopping" if state.route == Route::Cart => {
                state.route = Route::Inventory;
                Ok(())
            }
            "#finish" if state.route == Route::CheckoutOverview => {
                state.cart.clear();
                state.route = Route::CheckoutComplete;
                Ok(())
            }
            "#back-to-products" => {
                state.route = Route::Inventory;
                Ok(())
            }
            other => Err(DriverError::ElementNotFound(other.to_string())),
        }
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        match locator.as_str() {
            "button.btn_inventory" if state.route == Route::Inventory => {
                let ordered = state.ordered();
                let catalog_idx = *ordered
                    .get(index)
                    .ok_or_else(|| DriverError::ElementNotFound(format!("{locator} [{index}]")))?;
                // The inventory button toggles between Add and Remove.
                if let Some(pos) = state.cart.iter().position(|&i| i == catalog_idx) {
                    state.cart.remove(pos);
                } else {
                    state.cart.push(catalog_idx);
                }
                Ok(())
            }
            ".inventory_item_name" if state.route == Route::Inventory => {
                let ordered = state.ordered();
                let catalog_idx = *ordered
                    .get(index)
                    .ok_or_else(|| DriverError::ElementNotFound(format!("{locator} [{index}]")))?;
                state.route = Route::ProductDetail(catalog_idx);
                Ok(())
            }
            ".cart_button" if state.route == Route::Cart => {
                if index < state.cart.len() {
                    state.cart.remove(index);
                    Ok(())
                } else {
                    Err(DriverError::ElementNotFound(format!("{locator} [{index}]")))
                }
            }
            other => Err(DriverError::ElementNotFound(format!("{other} [{index}]"))),
        }
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        let field = match locator.as_str() {
            "#user-name" => &mut state.username_input,
            "#password" => &mut state.password_input,
            "#first-name" => &mut state.first_name,
            "#last-name" => &mut state.last_name,
            "#postal-code" => &mut state.zip_code,
            other => return Err(DriverError::ElementNotFound(other.to_string())),
        };
        *field = text.to_string();
        Ok(())
    }

    async fn text_of(&self, locator: &Locator) -> Result<String, DriverError> {
        let state = self.state.lock().unwrap();
        match locator.as_str() {
            "[data-test='error']" => state
                .error_banner
                .clone()
                .ok_or_else(|| DriverError::ElementNotFound(locator.to_string())),
            ".shopping_cart_badge" => {
                if state.cart.is_empty() {
                    Err(DriverError::ElementNotFound(locator.to_string()))
                } else {
                    Ok(state.cart.len().to_string())
                }
            }
            ".summary_subtotal_label" if state.route == Route::CheckoutOverview => {
                Ok(format!("Item total: {}", format_cents(state.subtotal())))
            }
            ".summary_tax_label" if state.route == Route::CheckoutOverview => {
                Ok(format!("Tax: {}", format_cents(state.tax())))
            }
            ".summary_total_label" if state.route == Route::CheckoutOverview => Ok(format!(
                "Total: {}",
                format_cents(state.subtotal() + state.tax())
            )),
            ".complete-header" if state.route == Route::CheckoutComplete => {
                Ok("Thank you for your order!".to_string())
            }
            ".inventory_details_name" => match state.route {
                Route::ProductDetail(i) => Ok(CATALOG[i].0.to_string()),
                _ => Err(DriverError::ElementNotFound(locator.to_string())),
            },
            ".inventory_details_price" => match state.route {
                Route::ProductDetail(i) => Ok(format_cents(CATALOG[i].1)),
                _ => Err(DriverError::ElementNotFound(locator.to_string())),
            },
            other => Err(DriverError::ElementNotFound(other.to_string())),
        }
    }

    async fn texts_of(&self, locator: &Locator) -> Result<Vec<String>, DriverError> {
        let state = self.state.lock().unwrap();
        match (locator.as_str(), state.route) {
            (".inventory_item_name", Route::Inventory) => Ok(state
                .ordered()
                .iter()
                .map(|&i| CATALOG[i].0.to_string())
                .collect()),
            (".inventory_item_price", Route::Inventory) => Ok(state
                .ordered()
                .iter()
                .map(|&i| format_cents(CATALOG[i].1))
                .collect()),
            (".inventory_item_name", Route::Cart) => Ok(state
                .cart
                .iter()
                .map(|&i| CATALOG[i].0.to_string())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError> {
        let state = self.state.lock().unwrap();
        Ok(self.visible(&state, locator.as_str()))
    }

    async fn wait_for(&self, locator: &Locator, timeout_ms: u64) -> Result<(), DriverError> {
        if self.is_visible(locator).await? {
            Ok(())
        } else {
            Err(DriverError::Timeout {
                locator: locator.to_string(),
                timeout_ms,
            })
        }
    }

    async fn wait_for_gone(&self, locator: &Locator, timeout_ms: u64) -> Result<(), DriverError> {
        if !self.is_visible(locator).await? {
            Ok(())
        } else {
            Err(DriverError::Timeout {
                locator: format!("absence of {locator}"),
                timeout_ms,
            })
        }
    }

    async fn select_option(&self, locator: &Locator, label: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if locator.as_str() != "[data-test='product_sort_container']"
            || state.route != Route::Inventory
        {
            return Err(DriverError::ElementNotFound(locator.to_string()));
        }
        state.sort = match label {
            "Name (A to Z)" => Sort::NameAsc,
            "Name (Z to A)" => Sort::NameDesc,
            "Price (low to high)" => Sort::PriceLowHigh,
            "Price (high to low)" => Sort::PriceHighLow,
            other => {
                return Err(DriverError::ElementNotFound(format!(
                    "{locator} option '{other}'"
                )))
            }
        };
        Ok(())
    }

    async fn wait_for_load(&self, _timeout_ms: u64) -> Result<(), DriverError> {
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        if self.fail_screenshots.load(Ordering::SeqCst) {
            return Err(DriverError::Backend("screenshot failure injected".into()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"fake-png")?;
        self.screenshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}
