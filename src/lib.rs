pub mod actions;
pub mod artifacts;
pub mod browser;
pub mod errors;
pub mod fixtures;
pub mod runner;
pub mod scenarios;
pub mod selectors;
pub mod session;

// Re-export common items
pub use browser::{BrowserDriver, BrowserKind, WebDriver, WebDriverConfig};
pub use fixtures::{FixtureSet, UserKind};
pub use runner::{RunConfig, RunSummary, Runner, Scenario};
pub use selectors::SelectorRegistry;
pub use session::{Session, SessionState};
