//! Action library: five capability groups performing multi-step browser
//! interactions.
//!
//! Every group resolves element keys through the selector registry and reads
//! values through the fixture set; none of them touch session state. Failures
//! are typed: assertion failures (the UI behaved unexpectedly) are distinct
//! from infrastructure failures (the UI never appeared), and callers choose
//! which are fatal.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod common;
pub mod product;

pub use auth::AuthActions;
pub use cart::CartActions;
pub use checkout::CheckoutActions;
pub use common::CommonActions;
pub use product::ProductActions;

use crate::browser::BrowserDriver;
use crate::errors::ActionError;
use crate::fixtures::FixtureSet;
use crate::selectors::SelectorRegistry;

/// Login entry point, relative to the fixture base URL.
pub(crate) const LOGIN_PATH: &str = "/";

/// Shared borrow bundle every capability group is constructed over.
#[derive(Clone, Copy)]
pub(crate) struct ActionCtx<'a> {
    pub driver: &'a dyn BrowserDriver,
    pub selectors: &'a SelectorRegistry,
    pub fixtures: &'a FixtureSet,
    /// Budget for each element-appearance wait.
    pub timeout_ms: u64,
}

impl<'a> ActionCtx<'a> {
    pub fn url(&self, path: &str) -> String {
        let base = self.fixtures.steps().base_url.trim_end_matches('/');
        format!("{base}{path}")
    }
}

/// Parse a rendered price like `$29.99` or `Item total: $32.39` into cents.
/// The price is whatever the browser rendered; a shape we cannot read is the
/// UI misbehaving, so this reports an assertion failure.
pub(crate) fn parse_price_cents(text: &str) -> Result<u32, ActionError> {
    let malformed = || ActionError::assertion("rendered price", "$<dollars>.<cents>", text);

    let after_sign = text.split('$').nth(1).ok_or_else(malformed)?.trim();
    let (dollars, cents) = after_sign.split_once('.').ok_or_else(malformed)?;
    let dollars: u32 = dollars.parse().map_err(|_| malformed())?;
    if cents.len() != 2 {
        return Err(malformed());
    }
    let cents: u32 = cents.parse().map_err(|_| malformed())?;
    Ok(dollars * 100 + cents)
}
