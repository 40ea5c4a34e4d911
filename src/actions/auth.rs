//! Auth capability: login with outcome classification, logout.

use std::time::{Duration, Instant};

use super::{ActionCtx, LOGIN_PATH};
use crate::browser::BrowserDriver;
use crate::errors::{ActionError, DriverError, LoginError};
use crate::fixtures::{FixtureSet, UserFixture};
use crate::selectors::{Page, SelectorRegistry};

pub struct AuthActions<'a> {
    ctx: ActionCtx<'a>,
}

impl<'a> AuthActions<'a> {
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

    /// Navigate to the login entry point, submit the user's credentials and
    /// classify the outcome by the rendered error banner.
    pub async fn login(&self, user: &UserFixture) -> Result<(), LoginError> {
        let d = self.ctx.driver;
        let banner = self.ctx.selectors.resolve(Page::Login, "error_message")?;

        d.goto(&self.ctx.url(LOGIN_PATH))
            .await
            .map_err(ActionError::from)?;

        // A banner left over from an earlier attempt would confuse
        // classification below.
        if d.is_visible(banner).await.map_err(ActionError::from)? {
            let close = self
                .ctx
                .selectors
                .resolve(Page::Login, "error_close_button")?;
            let _ = d.click(close).await;
        }

        let username = self.ctx.selectors.resolve(Page::Login, "username_field")?;
        let password = self.ctx.selectors.resolve(Page::Login, "password_field")?;
        let submit = self.ctx.selectors.resolve(Page::Login, "login_button")?;
        d.fill(username, &user.username)
            .await
            .map_err(ActionError::from)?;
        d.fill(password, &user.password)
            .await
            .map_err(ActionError::from)?;
        d.click(submit).await.map_err(ActionError::from)?;

        // Success is the redirect to the authenticated landing view; failure
        // is an error banner. Poll for whichever renders first.
        let landing = self.ctx.selectors.resolve(Page::Inventory, "page_root")?;
        let start = Instant::now();
        loop {
            if d.is_visible(landing).await.map_err(ActionError::from)? {
                return Ok(());
            }
            if d.is_visible(banner).await.map_err(ActionError::from)? {
                let text = d.text_of(banner).await.map_err(ActionError::from)?;
                return Err(self.classify(text));
            }
            if start.elapsed().as_millis() >= self.ctx.timeout_ms as u128 {
                return Err(ActionError::from(DriverError::Timeout {
                    locator: landing.to_string(),
                    timeout_ms: self.ctx.timeout_ms,
                })
                .into());
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    fn classify(&self, text: String) -> LoginError {
        let messages = &self.ctx.fixtures.steps().messages;
        if text == messages.locked_out {
            LoginError::Locked { message: text }
        } else if text == messages.username_required || text == messages.password_required {
            LoginError::MissingField { message: text }
        } else if text == messages.no_match {
            LoginError::InvalidCredentials { message: text }
        } else {
            LoginError::Action(ActionError::assertion(
                "login error classification",
                "a known login error banner",
                text,
            ))
        }
    }

    /// Open the navigation menu, trigger logout and assert return to the
    /// login view.
    pub async fn logout(&self) -> Result<(), ActionError> {
        let d = self.ctx.driver;
        let open = self.ctx.selectors.resolve(Page::Menu, "open_button")?;
        let logout = self.ctx.selectors.resolve(Page::Menu, "logout_link")?;
        let login_button = self.ctx.selectors.resolve(Page::Login, "login_button")?;

        d.click(open).await?;
        d.wait_for(logout, self.ctx.timeout_ms).await?;
        d.click(logout).await?;
        d.wait_for(login_button, self.ctx.timeout_ms).await?;
        Ok(())
    }
}
