pub mod traits;
pub mod web;

#[cfg(test)]
pub mod fake;

pub use traits::BrowserDriver;
pub use web::{BrowserKind, WebDriver, WebDriverConfig};
