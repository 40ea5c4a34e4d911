//! Cart capability: navigation, membership checks, removal.

use super::ActionCtx;
use crate::browser::BrowserDriver;
use crate::errors::ActionError;
use crate::fixtures::FixtureSet;
use crate::selectors::{Page, SelectorRegistry};

pub struct CartActions<'a> {
    ctx: ActionCtx<'a>,
}

impl<'a> CartActions<'a> {
    pub fn new(
        driver: &'a dyn BrowserDriver,
        selectors: &'a SelectorRegistry,
        fixtures: &'a FixtureSet,
        timeout_ms: u64,
    ) -> Self {
        Self {
            ctx: ActionCtx {
                driver,
                selectors,
                fixtures,
                timeout_ms,
            },
        }
    }

    /// Open the cart page via the header cart link.
    pub async fn go_to_cart(&self) -> Result<(), ActionError> {
        let link = self.ctx.selectors.resolve(Page::Inventory, "cart_link")?;
        let checkout = self.ctx.selectors.resolve(Page::Cart, "checkout_button")?;
        self.ctx.driver.click(link).await?;
        self.ctx
            .driver
            .wait_for(checkout, self.ctx.timeout_ms)
            .await?;
        Ok(())
    }

    /// Display names of the items currently in the browser-side cart.
    pub async fn cart_item_names(&self) -> Result<Vec<String>, ActionError> {
        let names = self.ctx.selectors.resolve(Page::Cart, "item_name")?;
        Ok(self.ctx.driver.texts_of(names).await?)
    }

    /// Assert the product addressed by fixture key is listed in the cart.
    pub async fn verify_product_in_cart(&self, product_key: &str) -> Result<(), ActionError> {
        self.cart_index(product_key).await.map(|_| ())
    }

    /// Remove the product addressed by fixture key from the cart.
    pub async fn remove_product(&self, product_key: &str) -> Result<(), ActionError> {
        let index = self.cart_index(product_key).await?;
        let remove = self.ctx.selectors.resolve(Page::Cart, "remove_button")?;
        self.ctx.driver.click_nth(remove, index).await?;
        Ok(())
    }

    /// Remove every item from the browser cart, returning how many were
    /// removed. Safe to call on an already-empty cart.
    pub async fn clear(&self) -> Result<usize, ActionError> {
        let remove = self.ctx.selectors.resolve(Page::Cart, "remove_button")?;
        let mut removed = 0;
        loop {
            let names = self.cart_item_names().await?;
            if names.is_empty() {
                return Ok(removed);
            }
            self.ctx.driver.click_nth(remove, 0).await?;
            removed += 1;
        }
    }

    /// Leave the cart for the checkout information step.
    pub async fn proceed_to_checkout(&self) -> Result<(), ActionError> {
        let checkout = self.ctx.selectors.resolve(Page::Cart, "checkout_button")?;
        let first_name = self
            .ctx
            .selectors
            .resolve(Page::CheckoutInfo, "first_name_field")?;
        self.ctx.driver.click(checkout).await?;
        self.ctx
            .driver
            .wait_for(first_name, self.ctx.timeout_ms)
            .await?;
        Ok(())
    }

    /// Return from the cart to the inventory listing.
    pub async fn continue_shopping(&self) -> Result<(), ActionError> {
        let button = self
            .ctx
            .selectors
            .resolve(Page::Cart, "continue_shopping_button")?;
        let landing = self.ctx.selectors.resolve(Page::Inventory, "page_root")?;
        self.ctx.driver.click(button).await?;
        self.ctx
            .driver
            .wait_for(landing, self.ctx.timeout_ms)
            .await?;
        Ok(())
    }

    async fn cart_index(&self, product_key: &str) -> Result<usize, ActionError> {
        let display = self.ctx.fixtures.product_name(product_key)?;
        let names = self.cart_item_names().await?;
        names.iter().position(|n| n == display).ok_or_else(|| {
            ActionError::assertion(
                "product present in browser cart",
                display,
                if names.is_empty() {
                    "an empty cart".to_string()
                } else {
                    names.join(", ")
                },
            )
        })
    }
}
