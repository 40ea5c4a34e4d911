//! Product capability: inventory browsing, sorting, add-to-cart, the cart
//! badge, and the product detail view.

use super::{parse_price_cents, ActionCtx};
use crate::browser::BrowserDriver;
use crate::errors::ActionError;
use crate::fixtures::FixtureSet;
use crate::selectors::{Page, SelectorRegistry};

pub struct ProductActions<'a> {
    ctx: ActionCtx<'a>,
}

impl<'a> ProductActions<'a> {
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

    /// Apply an inventory sort filter, addressed by fixture key and selected
    /// by its visible label.
    pub async fn select_filter(&self, filter_key: &str) -> Result<(), ActionError> {
        let label = self.ctx.fixtures.filter_label(filter_key)?;
        let select = self.ctx.selectors.resolve(Page::Inventory, "sort_select")?;
        self.ctx.driver.select_option(select, label).await?;
        Ok(())
    }

    /// Product names in current render order.
    pub async fn product_names(&self) -> Result<Vec<String>, ActionError> {
        let names = self.ctx.selectors.resolve(Page::Inventory, "product_name")?;
        Ok(self.ctx.driver.texts_of(names).await?)
    }

    /// Product prices in current render order, in cents.
    pub async fn product_prices(&self) -> Result<Vec<u32>, ActionError> {
        let prices = self
            .ctx
            .selectors
            .resolve(Page::Inventory, "product_price")?;
        let texts = self.ctx.driver.texts_of(prices).await?;
        texts.iter().map(|t| parse_price_cents(t)).collect()
    }

    /// Assert the product is listed on the inventory page.
    pub async fn verify_product_listed(&self, product_key: &str) -> Result<(), ActionError> {
        self.listed_index(product_key).await.map(|_| ())
    }

    /// Click the add-to-cart button of the product addressed by fixture key,
    /// returning its rendered price in cents.
    pub async fn add_to_cart(&self, product_key: &str) -> Result<u32, ActionError> {
        let index = self.listed_index(product_key).await?;
        let prices = self.product_prices().await?;
        let price = *prices.get(index).ok_or_else(|| {
            ActionError::assertion(
                "price rendered for listed product",
                format!("{} prices", index + 1),
                format!("{} prices", prices.len()),
            )
        })?;

        let button = self
            .ctx
            .selectors
            .resolve(Page::Inventory, "add_to_cart_button")?;
        self.ctx.driver.click_nth(button, index).await?;
        Ok(price)
    }

    /// Assert the cart badge shows the expected count; zero means the badge
    /// must be absent, as the storefront renders no badge for an empty cart.
    pub async fn verify_cart_badge(&self, expected: usize) -> Result<(), ActionError> {
        let badge = self.ctx.selectors.resolve(Page::Inventory, "cart_badge")?;
        let visible = self.ctx.driver.is_visible(badge).await?;

        if expected == 0 {
            if visible {
                let observed = self.ctx.driver.text_of(badge).await?;
                return Err(ActionError::assertion(
                    "cart badge",
                    "no badge",
                    format!("badge showing {observed}"),
                ));
            }
            return Ok(());
        }

        if !visible {
            return Err(ActionError::assertion(
                "cart badge",
                expected.to_string(),
                "no badge",
            ));
        }
        let observed = self.ctx.driver.text_of(badge).await?;
        if observed != expected.to_string() {
            return Err(ActionError::assertion(
                "cart badge",
                expected.to_string(),
                observed,
            ));
        }
        Ok(())
    }

    /// Open the detail view of the product addressed by fixture key.
    pub async fn open_product(&self, product_key: &str) -> Result<(), ActionError> {
        let index = self.listed_index(product_key).await?;
        let names = self.ctx.selectors.resolve(Page::Inventory, "product_name")?;
        self.ctx.driver.click_nth(names, index).await?;

        let detail = self
            .ctx
            .selectors
            .resolve(Page::ProductDetail, "detail_name")?;
        self.ctx.driver.wait_for(detail, self.ctx.timeout_ms).await?;
        Ok(())
    }

    /// Name and price (in cents) shown on the detail view.
    pub async fn product_detail(&self) -> Result<(String, u32), ActionError> {
        let name_sel = self
            .ctx
            .selectors
            .resolve(Page::ProductDetail, "detail_name")?;
        let price_sel = self
            .ctx
            .selectors
            .resolve(Page::ProductDetail, "detail_price")?;
        let name = self.ctx.driver.text_of(name_sel).await?;
        let price = parse_price_cents(&self.ctx.driver.text_of(price_sel).await?)?;
        Ok((name, price))
    }

    /// Return from the detail view to the inventory listing.
    pub async fn back_to_products(&self) -> Result<(), ActionError> {
        let back = self
            .ctx
            .selectors
            .resolve(Page::ProductDetail, "back_button")?;
        let landing = self.ctx.selectors.resolve(Page::Inventory, "page_root")?;
        self.ctx.driver.click(back).await?;
        self.ctx
            .driver
            .wait_for(landing, self.ctx.timeout_ms)
            .await?;
        Ok(())
    }

    async fn listed_index(&self, product_key: &str) -> Result<usize, ActionError> {
        let display = self.ctx.fixtures.product_name(product_key)?;
        let names = self.product_names().await?;
        names.iter().position(|n| n == display).ok_or_else(|| {
            ActionError::assertion(
                "product listed on inventory page",
                display,
                names.join(", "),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::AuthActions;
    use crate::browser::fake::FakeStorefront;
    use crate::fixtures::test_data::{STEPS_YAML, USERS_YAML};
    use crate::fixtures::UserKind;

    async fn logged_in() -> (FakeStorefront, SelectorRegistry, FixtureSet) {
        let driver = FakeStorefront::new();
        let selectors = SelectorRegistry::storefront().unwrap();
        let fixtures = FixtureSet::from_yaml(USERS_YAML, STEPS_YAML).unwrap();
        {
            let auth = AuthActions::new(&driver, &selectors, &fixtures, 1000);
            let user = fixtures.user(UserKind::Standard).unwrap();
            auth.login(user).await.unwrap();
        }
        (driver, selectors, fixtures)
    }

    #[tokio::test]
    async fn name_sort_descending_reverses_the_listing() {
        let (driver, selectors, fixtures) = logged_in().await;
        let products = ProductActions::new(&driver, &selectors, &fixtures, 1000);

        products.select_filter("nameDesc").await.unwrap();
        let names = products.product_names().await.unwrap();
        let mut expected = names.clone();
        expected.sort();
        expected.reverse();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn price_sort_ascending_orders_prices() {
        let (driver, selectors, fixtures) = logged_in().await;
        let products = ProductActions::new(&driver, &selectors, &fixtures, 1000);

        products.select_filter("priceLowHigh").await.unwrap();
        let prices = products.product_prices().await.unwrap();
        assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");
        assert_eq!(prices.first(), Some(&799));
        assert_eq!(prices.last(), Some(&4999));
    }

    #[tokio::test]
    async fn add_to_cart_returns_the_listed_price() {
        let (driver, selectors, fixtures) = logged_in().await;
        let products = ProductActions::new(&driver, &selectors, &fixtures, 1000);

        let price = products.add_to_cart("backpack").await.unwrap();
        assert_eq!(price, 2999);
        assert_eq!(driver.browser_cart_len(), 1);
        products.verify_cart_badge(1).await.unwrap();
    }

    #[tokio::test]
    async fn add_to_cart_targets_the_right_product_after_sorting() {
        let (driver, selectors, fixtures) = logged_in().await;
        let products = ProductActions::new(&driver, &selectors, &fixtures, 1000);

        products.select_filter("priceHighLow").await.unwrap();
        let price = products.add_to_cart("onesie").await.unwrap();
        assert_eq!(price, 799);
    }

    #[tokio::test]
    async fn missing_product_is_an_assertion_failure() {
        let (driver, selectors, fixtures) = logged_in().await;
        let products = ProductActions::new(&driver, &selectors, &fixtures, 1000);

        let err = products.add_to_cart("hoverboard").await.unwrap_err();
        assert!(matches!(err, ActionError::Fixture(_)), "{err:?}");
    }

    #[tokio::test]
    async fn empty_cart_expects_no_badge() {
        let (driver, selectors, fixtures) = logged_in().await;
        let products = ProductActions::new(&driver, &selectors, &fixtures, 1000);

        products.verify_cart_badge(0).await.unwrap();
        products.add_to_cart("bike_light").await.unwrap();
        let err = products.verify_cart_badge(0).await.unwrap_err();
        assert!(matches!(err, ActionError::Assertion { .. }));
    }

    #[tokio::test]
    async fn detail_view_round_trip_preserves_name_and_price() {
        let (driver, selectors, fixtures) = logged_in().await;
        let products = ProductActions::new(&driver, &selectors, &fixtures, 1000);

        products.open_product("fleece_jacket").await.unwrap();
        let (name, price) = products.product_detail().await.unwrap();
        assert_eq!(name, "Sauce Labs Fleece Jacket");
        assert_eq!(price, 4999);

        products.back_to_products().await.unwrap();
        products.verify_product_listed("fleece_jacket").await.unwrap();
    }
}
