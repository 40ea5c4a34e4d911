//! Data loader: externalized fixture sets parsed into typed, queryable
//! in-memory structures.
//!
//! Two YAML documents drive a run: `users.yaml` (credential fixtures, one per
//! declared user kind) and `steps.yaml` (product names, checkout profile,
//! expected texts, filter labels). Both are validated completely at load
//! time; a missing required key fails the whole run at startup, not lazily
//! mid-scenario. The loaded set is never mutated afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::errors::FixtureError;

/// Declared user account kinds. Lookup over these must be total: every kind
/// resolves after a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserKind {
    Standard,
    Locked,
    Problem,
}

impl UserKind {
    pub const ALL: [UserKind; 3] = [UserKind::Standard, UserKind::Locked, UserKind::Problem];

    fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(UserKind::Standard),
            "locked" => Some(UserKind::Locked),
            "problem" => Some(UserKind::Problem),
            _ => None,
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserKind::Standard => "standard",
            UserKind::Locked => "locked",
            UserKind::Problem => "problem",
        };
        f.write_str(name)
    }
}

/// One credential fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFixture {
    pub kind: UserKind,
    pub username: String,
    pub password: String,
}

/// Checkout information profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutProfile {
    pub first_name: String,
    pub last_name: String,
    pub zip_code: String,
}

/// Login error banner texts, used by Auth to classify outcomes.
#[derive(Debug, Clone)]
pub struct MessageFixtures {
    pub locked_out: String,
    pub username_required: String,
    pub password_required: String,
    pub no_match: String,
    pub first_name_required: String,
}

/// The typed view of `steps.yaml`.
#[derive(Debug, Clone)]
pub struct StepFixtures {
    pub base_url: String,
    /// product key -> display name, render-exact
    pub products: BTreeMap<String, String>,
    pub checkout_customer: CheckoutProfile,
    pub confirmation_message: String,
    /// filter key -> visible option label
    pub filters: BTreeMap<String, String>,
    pub messages: MessageFixtures,
}

/// Loaded, validated, read-only fixture set.
#[derive(Debug)]
pub struct FixtureSet {
    users: HashMap<UserKind, UserFixture>,
    steps: StepFixtures,
    steps_raw: serde_yaml::Value,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(rename = "type")]
    kind: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl FixtureSet {
    /// Load and validate both fixture documents from disk.
    pub fn load(users_path: &Path, steps_path: &Path) -> Result<Self, FixtureError> {
        let users_src = std::fs::read_to_string(users_path)
            .map_err(|e| FixtureError::parse(&users_path.display().to_string(), e))?;
        let steps_src = std::fs::read_to_string(steps_path)
            .map_err(|e| FixtureError::parse(&steps_path.display().to_string(), e))?;
        Self::from_yaml(&users_src, &steps_src)
    }

    /// Parse and validate fixture documents from in-memory YAML.
    pub fn from_yaml(users_src: &str, steps_src: &str) -> Result<Self, FixtureError> {
        let users = parse_users(users_src)?;
        let steps_raw: serde_yaml::Value = serde_yaml::from_str(steps_src)
            .map_err(|e| FixtureError::parse("steps", e))?;
        let steps = parse_steps(&steps_raw)?;
        Ok(Self {
            users,
            steps,
            steps_raw,
        })
    }

    /// Look up the credential fixture for a user kind. Absence is fatal to
    /// the requesting scenario, not retryable.
    pub fn user(&self, kind: UserKind) -> Result<&UserFixture, FixtureError> {
        self.users
            .get(&kind)
            .ok_or_else(|| FixtureError::not_found(format!("user kind '{kind}'")))
    }

    pub fn steps(&self) -> &StepFixtures {
        &self.steps
    }

    /// Display name for a product key.
    pub fn product_name(&self, key: &str) -> Result<&str, FixtureError> {
        self.steps
            .products
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| FixtureError::not_found(format!("product '{key}'")))
    }

    /// Visible label for a filter key.
    pub fn filter_label(&self, key: &str) -> Result<&str, FixtureError> {
        self.steps
            .filters
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| FixtureError::not_found(format!("filter '{key}'")))
    }

    /// Dot-path lookup into the raw steps document, e.g.
    /// `checkout.testCustomer.zipCode`. Scalars only.
    pub fn step(&self, path: &str) -> Result<String, FixtureError> {
        let mut node = &self.steps_raw;
        for segment in path.split('.') {
            node = node
                .get(segment)
                .ok_or_else(|| FixtureError::not_found(format!("step path '{path}'")))?;
        }
        scalar_to_string(node)
            .ok_or_else(|| FixtureError::not_found(format!("step path '{path}' (not a scalar)")))
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_users(src: &str) -> Result<HashMap<UserKind, UserFixture>, FixtureError> {
    let raw: Vec<RawUser> =
        serde_yaml::from_str(src).map_err(|e| FixtureError::parse("users", e))?;

    let mut users = HashMap::new();
    for (idx, entry) in raw.into_iter().enumerate() {
        let kind_str = entry
            .kind
            .ok_or_else(|| FixtureError::schema("users", format!("entry {idx}: missing 'type'")))?;
        let kind = UserKind::parse(&kind_str).ok_or_else(|| {
            FixtureError::schema("users", format!("entry {idx}: unknown type '{kind_str}'"))
        })?;
        let username = require_non_empty(entry.username, "users", idx, "username")?;
        let password = require_non_empty(entry.password, "users", idx, "password")?;

        if users
            .insert(
                kind,
                UserFixture {
                    kind,
                    username,
                    password,
                },
            )
            .is_some()
        {
            return Err(FixtureError::schema(
                "users",
                format!("duplicate user type '{kind}'"),
            ));
        }
    }

    // Lookup by kind must be total.
    for kind in UserKind::ALL {
        if !users.contains_key(&kind) {
            return Err(FixtureError::schema(
                "users",
                format!("no fixture declared for user type '{kind}'"),
            ));
        }
    }
    Ok(users)
}

fn require_non_empty(
    value: Option<String>,
    source: &str,
    idx: usize,
    field: &str,
) -> Result<String, FixtureError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s),
        Some(_) => Err(FixtureError::schema(
            source,
            format!("entry {idx}: empty '{field}'"),
        )),
        None => Err(FixtureError::schema(
            source,
            format!("entry {idx}: missing '{field}'"),
        )),
    }
}

fn parse_steps(root: &serde_yaml::Value) -> Result<StepFixtures, FixtureError> {
    let base_url = require_str(root, "config.baseURL")?;

    let products = require_string_map(root, "products")?;
    let filters = require_string_map(root, "filters")?;

    let checkout_customer = CheckoutProfile {
        first_name: require_str(root, "checkout.testCustomer.firstName")?,
        last_name: require_str(root, "checkout.testCustomer.lastName")?,
        zip_code: require_str(root, "checkout.testCustomer.zipCode")?,
    };
    let confirmation_message = require_str(root, "checkout.confirmationMessage")?;

    let messages = MessageFixtures {
        locked_out: require_str(root, "messages.lockedOut")?,
        username_required: require_str(root, "messages.usernameRequired")?,
        password_required: require_str(root, "messages.passwordRequired")?,
        no_match: require_str(root, "messages.noMatch")?,
        first_name_required: require_str(root, "messages.firstNameRequired")?,
    };

    Ok(StepFixtures {
        base_url,
        products,
        checkout_customer,
        confirmation_message,
        filters,
        messages,
    })
}

fn lookup<'a>(root: &'a serde_yaml::Value, path: &str) -> Option<&'a serde_yaml::Value> {
    let mut node = root;
    for segment in path.split('.') {
        node = node.get(segment)?;
    }
    Some(node)
}

fn require_str(root: &serde_yaml::Value, path: &str) -> Result<String, FixtureError> {
    let node = lookup(root, path)
        .ok_or_else(|| FixtureError::schema("steps", format!("missing required key '{path}'")))?;
    match node.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(FixtureError::schema(
            "steps",
            format!("key '{path}' must be a non-empty string"),
        )),
    }
}

fn require_string_map(
    root: &serde_yaml::Value,
    path: &str,
) -> Result<BTreeMap<String, String>, FixtureError> {
    let node = lookup(root, path)
        .ok_or_else(|| FixtureError::schema("steps", format!("missing required key '{path}'")))?;
    let mapping = node.as_mapping().ok_or_else(|| {
        FixtureError::schema("steps", format!("key '{path}' must be a mapping"))
    })?;

    let mut out = BTreeMap::new();
    for (k, v) in mapping {
        let key = k.as_str().ok_or_else(|| {
            FixtureError::schema("steps", format!("non-string key under '{path}'"))
        })?;
        let value = v.as_str().filter(|s| !s.trim().is_empty()).ok_or_else(|| {
            FixtureError::schema(
                "steps",
                format!("'{path}.{key}' must be a non-empty string"),
            )
        })?;
        out.insert(key.to_string(), value.to_string());
    }
    if out.is_empty() {
        return Err(FixtureError::schema(
            "steps",
            format!("'{path}' must declare at least one entry"),
        ));
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod test_data {
    pub const USERS_YAML: &str = r#"
- type: standard
  username: standard_user
  password: secret_sauce
- type: locked
  username: locked_out_user
  password: secret_sauce
- type: problem
  username: problem_user
  password: secret_sauce
"#;

    pub const STEPS_YAML: &str = r#"
config:
  baseURL: "https://www.saucedemo.com"
products:
  backpack: "Sauce Labs Backpack"
  bike_light: "Sauce Labs Bike Light"
  bolt_tshirt: "Sauce Labs Bolt T-Shirt"
  fleece_jacket: "Sauce Labs Fleece Jacket"
  onesie: "Sauce Labs Onesie"
  red_tshirt: "Test.allTheThings() T-Shirt (Red)"
checkout:
  testCustomer:
    firstName: "Test"
    lastName: "User"
    zipCode: "12345"
  confirmationMessage: "Thank you for your order!"
filters:
  nameAsc: "Name (A to Z)"
  nameDesc: "Name (Z to A)"
  priceLowHigh: "Price (low to high)"
  priceHighLow: "Price (high to low)"
messages:
  lockedOut: "Epic sadface: Sorry, this user has been locked out."
  usernameRequired: "Epic sadface: Username is required"
  passwordRequired: "Epic sadface: Password is required"
  noMatch: "Epic sadface: Username and password do not match any user in this service"
  firstNameRequired: "Error: First Name is required"
"#;
}

#[cfg(test)]
mod tests {
    use super::test_data::{STEPS_YAML, USERS_YAML};
    use super::*;

    fn load() -> FixtureSet {
        FixtureSet::from_yaml(USERS_YAML, STEPS_YAML).unwrap()
    }

    #[test]
    fn every_declared_kind_resolves_with_credentials() {
        let fixtures = load();
        for kind in UserKind::ALL {
            let user = fixtures.user(kind).unwrap();
            assert!(!user.username.is_empty());
            assert!(!user.password.is_empty());
        }
    }

    #[test]
    fn missing_password_is_a_schema_error() {
        let users = "- type: standard\n  username: standard_user\n";
        let err = FixtureSet::from_yaml(users, STEPS_YAML).unwrap_err();
        assert!(matches!(err, FixtureError::Schema { .. }), "{err:?}");
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = FixtureSet::from_yaml("[:::", STEPS_YAML).unwrap_err();
        assert!(matches!(err, FixtureError::Parse { .. }));
    }

    #[test]
    fn absent_user_kind_fails_the_load() {
        let users = "- type: standard\n  username: u\n  password: p\n";
        let err = FixtureSet::from_yaml(users, STEPS_YAML).unwrap_err();
        assert!(matches!(err, FixtureError::Schema { .. }));
    }

    #[test]
    fn duplicate_user_kind_fails_the_load() {
        let users = concat!(
            "- {type: standard, username: a, password: p}\n",
            "- {type: standard, username: b, password: p}\n",
            "- {type: locked, username: c, password: p}\n",
            "- {type: problem, username: d, password: p}\n",
        );
        let err = FixtureSet::from_yaml(users, STEPS_YAML).unwrap_err();
        assert!(matches!(err, FixtureError::Schema { .. }));
    }

    #[test]
    fn step_path_lookup_reaches_nested_scalars() {
        let fixtures = load();
        assert_eq!(fixtures.step("checkout.testCustomer.zipCode").unwrap(), "12345");
        assert_eq!(
            fixtures.step("config.baseURL").unwrap(),
            "https://www.saucedemo.com"
        );
        let err = fixtures.step("checkout.nonexistent").unwrap_err();
        assert!(matches!(err, FixtureError::NotFound { .. }));
    }

    #[test]
    fn missing_checkout_customer_field_fails_the_load() {
        let steps = STEPS_YAML.replace("    zipCode: \"12345\"\n", "");
        let err = FixtureSet::from_yaml(USERS_YAML, &steps).unwrap_err();
        match err {
            FixtureError::Schema { detail, .. } => assert!(detail.contains("zipCode")),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn product_and_filter_lookups() {
        let fixtures = load();
        assert_eq!(fixtures.product_name("backpack").unwrap(), "Sauce Labs Backpack");
        assert_eq!(fixtures.filter_label("nameDesc").unwrap(), "Name (Z to A)");
        assert!(matches!(
            fixtures.product_name("hoverboard").unwrap_err(),
            FixtureError::NotFound { .. }
        ));
    }
}
