//! Selector registry: one source of truth for where elements live.
//!
//! Semantic keys are scoped by logical page and resolve to opaque locator
//! strings. The registry is built once at startup and never mutated, so two
//! scenarios reading the same key can never race.

use std::collections::HashMap;
use std::fmt;

use crate::errors::{ActionError, ConfigError};

/// Logical page scopes of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Inventory,
    ProductDetail,
    Cart,
    CheckoutInfo,
    CheckoutOverview,
    CheckoutComplete,
    Menu,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Login => "login",
            Page::Inventory => "inventory",
            Page::ProductDetail => "product_detail",
            Page::Cart => "cart",
            Page::CheckoutInfo => "checkout_info",
            Page::CheckoutOverview => "checkout_overview",
            Page::CheckoutComplete => "checkout_complete",
            Page::Menu => "menu",
        };
        f.write_str(name)
    }
}

/// An opaque descriptor identifying a renderable UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator(String);

impl Locator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable map from `(page, key)` to locator.
#[derive(Debug)]
pub struct SelectorRegistry {
    entries: HashMap<(Page, String), Locator>,
}

impl SelectorRegistry {
    /// Build a registry from declarative entries. Duplicate keys within a
    /// scope and empty locators are configuration errors, caught here at
    /// startup rather than mid-scenario.
    pub fn from_entries<I, K, L>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (Page, K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        let mut map = HashMap::new();
        for (page, key, locator) in entries {
            let key = key.into();
            let locator = locator.into();
            if locator.trim().is_empty() {
                return Err(ConfigError::EmptyLocator { page, key });
            }
            if map
                .insert((page, key.clone()), Locator(locator))
                .is_some()
            {
                return Err(ConfigError::DuplicateSelector { page, key });
            }
        }
        Ok(Self { entries: map })
    }

    /// Resolve a semantic key within a page scope.
    pub fn resolve(&self, page: Page, key: &str) -> Result<&Locator, ActionError> {
        self.entries
            .get(&(page, key.to_string()))
            .ok_or_else(|| ActionError::UnknownSelector {
                page,
                key: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The built-in selector map for the Swag Labs storefront.
    pub fn storefront() -> Result<Self, ConfigError> {
        use Page::*;
        Self::from_entries([
            // Login page
            (Login, "username_field", "#user-name"),
            (Login, "password_field", "#password"),
            (Login, "login_button", "#login-button"),
            (Login, "error_message", "[data-test='error']"),
            (Login, "error_close_button", ".error-button"),
            // Inventory page
            (Inventory, "page_root", "#inventory_container"),
            (Inventory, "product_item", ".inventory_item"),
            (Inventory, "product_name", ".inventory_item_name"),
            (Inventory, "product_price", ".inventory_item_price"),
            (Inventory, "add_to_cart_button", "button.btn_inventory"),
            (Inventory, "sort_select", "[data-test='product_sort_container']"),
            (Inventory, "cart_badge", ".shopping_cart_badge"),
            (Inventory, "cart_link", ".shopping_cart_link"),
            // Product detail page
            (ProductDetail, "detail_name", ".inventory_details_name"),
            (ProductDetail, "detail_price", ".inventory_details_price"),
            (ProductDetail, "back_button", "#back-to-products"),
            // Cart page
            (Cart, "cart_item", ".cart_item"),
            (Cart, "item_name", ".inventory_item_name"),
            (Cart, "remove_button", ".cart_button"),
            (Cart, "checkout_button", "#checkout"),
            (Cart, "continue_shopping_button", "#continue-shopping"),
            // Checkout: information step
            (CheckoutInfo, "first_name_field", "#first-name"),
            (CheckoutInfo, "last_name_field", "#last-name"),
            (CheckoutInfo, "zip_code_field", "#postal-code"),
            (CheckoutInfo, "continue_button", "#continue"),
            (CheckoutInfo, "cancel_button", "#cancel"),
            (CheckoutInfo, "error_message", "[data-test='error']"),
            // Checkout: overview step
            (CheckoutOverview, "subtotal_label", ".summary_subtotal_label"),
            (CheckoutOverview, "tax_label", ".summary_tax_label"),
            (CheckoutOverview, "total_label", ".summary_total_label"),
            (CheckoutOverview, "finish_button", "#finish"),
            // Checkout: confirmation
            (CheckoutComplete, "confirmation_text", ".complete-header"),
            (CheckoutComplete, "back_home_button", "#back-to-products"),
            // Burger menu
            (Menu, "open_button", "#react-burger-menu-btn"),
            (Menu, "logout_link", "#logout_sidebar_link"),
        ])
    }
}
