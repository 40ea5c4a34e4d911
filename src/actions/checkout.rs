//! Checkout capability: the information form, the overview totals, and the
//! purchase confirmation.

use super::{parse_price_cents, ActionCtx};
use crate::browser::BrowserDriver;
use crate::errors::ActionError;
use crate::fixtures::{CheckoutProfile, FixtureSet};
use crate::selectors::{Page, SelectorRegistry};

pub struct CheckoutActions<'a> {
    ctx: ActionCtx<'a>,
}

impl<'a> CheckoutActions<'a> {
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

    /// Fill the checkout information form from a profile.
    pub async fn fill_info(&self, profile: &CheckoutProfile) -> Result<(), ActionError> {
        let d = self.ctx.driver;
        let first = self
            .ctx
            .selectors
            .resolve(Page::CheckoutInfo, "first_name_field")?;
        let last = self
            .ctx
            .selectors
            .resolve(Page::CheckoutInfo, "last_name_field")?;
        let zip = self
            .ctx
            .selectors
            .resolve(Page::CheckoutInfo, "zip_code_field")?;
        d.fill(first, &profile.first_name).await?;
        d.fill(last, &profile.last_name).await?;
        d.fill(zip, &profile.zip_code).await?;
        Ok(())
    }

    /// Submit the information form. A validation banner instead of the
    /// overview page is an assertion failure carrying the banner text.
    pub async fn continue_to_overview(&self) -> Result<(), ActionError> {
        let d = self.ctx.driver;
        let continue_button = self
            .ctx
            .selectors
            .resolve(Page::CheckoutInfo, "continue_button")?;
        let banner = self
            .ctx
            .selectors
            .resolve(Page::CheckoutInfo, "error_message")?;
        let finish = self
            .ctx
            .selectors
            .resolve(Page::CheckoutOverview, "finish_button")?;

        d.click(continue_button).await?;
        if d.is_visible(banner).await? {
            let observed = d.text_of(banner).await?;
            return Err(ActionError::assertion(
                "checkout information accepted",
                "the order overview page",
                observed,
            ));
        }
        d.wait_for(finish, self.ctx.timeout_ms).await?;
        Ok(())
    }

    /// Item subtotal shown on the overview page, in cents.
    pub async fn subtotal(&self) -> Result<u32, ActionError> {
        self.overview_amount("subtotal_label").await
    }

    /// Tax line shown on the overview page, in cents.
    pub async fn tax(&self) -> Result<u32, ActionError> {
        self.overview_amount("tax_label").await
    }

    /// Grand total shown on the overview page, in cents.
    pub async fn total(&self) -> Result<u32, ActionError> {
        self.overview_amount("total_label").await
    }

    /// Assert the overview totals are internally consistent and that the
    /// subtotal matches the prices collected while shopping.
    pub async fn verify_totals(&self, expected_subtotal: u32) -> Result<(), ActionError> {
        let subtotal = self.subtotal().await?;
        let tax = self.tax().await?;
        let total = self.total().await?;

        if subtotal != expected_subtotal {
            return Err(ActionError::assertion(
                "overview subtotal",
                format!("{expected_subtotal} cents"),
                format!("{subtotal} cents"),
            ));
        }
        if subtotal + tax != total {
            return Err(ActionError::assertion(
                "overview total",
                format!("{} cents (subtotal + tax)", subtotal + tax),
                format!("{total} cents"),
            ));
        }
        Ok(())
    }

    /// Finish the purchase and wait for the confirmation view.
    pub async fn finish_purchase(&self) -> Result<(), ActionError> {
        let finish = self
            .ctx
            .selectors
            .resolve(Page::CheckoutOverview, "finish_button")?;
        let confirmation = self
            .ctx
            .selectors
            .resolve(Page::CheckoutComplete, "confirmation_text")?;
        self.ctx.driver.click(finish).await?;
        self.ctx
            .driver
            .wait_for(confirmation, self.ctx.timeout_ms)
            .await?;
        Ok(())
    }

    /// Assert the confirmation header matches the fixture text exactly.
    pub async fn verify_confirmation(&self) -> Result<(), ActionError> {
        let expected = &self.ctx.fixtures.steps().confirmation_message;
        let confirmation = self
            .ctx
            .selectors
            .resolve(Page::CheckoutComplete, "confirmation_text")?;
        let observed = self.ctx.driver.text_of(confirmation).await?;
        if &observed != expected {
            return Err(ActionError::assertion(
                "order confirmation header",
                expected,
                observed,
            ));
        }
        Ok(())
    }

    /// Abandon the information step and return to the cart.
    pub async fn cancel(&self) -> Result<(), ActionError> {
        let cancel = self
            .ctx
            .selectors
            .resolve(Page::CheckoutInfo, "cancel_button")?;
        let checkout = self.ctx.selectors.resolve(Page::Cart, "checkout_button")?;
        self.ctx.driver.click(cancel).await?;
        self.ctx
            .driver
            .wait_for(checkout, self.ctx.timeout_ms)
            .await?;
        Ok(())
    }

    async fn overview_amount(&self, key: &str) -> Result<u32, ActionError> {
        let label = self.ctx.selectors.resolve(Page::CheckoutOverview, key)?;
        let text = self.ctx.driver.text_of(label).await?;
        parse_price_cents(&text)
    }
}
