//! The built-in scenario catalog: login matrix, inventory sorting, product
//! navigation, cart edits, and the full purchase flow.
//!
//! Scenario bodies are plain functions over the session so the catalog stays
//! a static table the runner can filter by tag.

use crate::errors::{ActionError, LoginError, SessionError};
use crate::fixtures::{UserFixture, UserKind};
use crate::runner::{Scenario, ScenarioFuture};
use crate::session::Session;

pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "login_standard_user",
            tags: &["login", "smoke"],
            run: login_standard_user,
        },
        Scenario {
            name: "login_locked_out_user",
            tags: &["login", "negative"],
            run: login_locked_out_user,
        },
        Scenario {
            name: "login_invalid_credentials",
            tags: &["login", "negative"],
            run: login_invalid_credentials,
        },
        Scenario {
            name: "login_empty_username",
            tags: &["login", "negative"],
            run: login_empty_username,
        },
        Scenario {
            name: "login_empty_password",
            tags: &["login", "negative"],
            run: login_empty_password,
        },
        Scenario {
            name: "inventory_sort_names_descending",
            tags: &["product"],
            run: inventory_sort_names_descending,
        },
        Scenario {
            name: "inventory_sort_prices_ascending",
            tags: &["product"],
            run: inventory_sort_prices_ascending,
        },
        Scenario {
            name: "all_products_listed",
            tags: &["product", "smoke"],
            run: all_products_listed,
        },
        Scenario {
            name: "product_detail_round_trip",
            tags: &["product"],
            run: product_detail_round_trip,
        },
        Scenario {
            name: "cart_add_and_remove",
            tags: &["cart"],
            run: cart_add_and_remove,
        },
        Scenario {
            name: "complete_purchase",
            tags: &["cart", "checkout", "smoke"],
            run: complete_purchase,
        },
        Scenario {
            name: "empty_checkout_form_rejected",
            tags: &["checkout", "negative"],
            run: empty_checkout_form_rejected,
        },
    ]
}

async fn ensure_logged_out(session: &mut Session) -> Result<(), SessionError> {
    if session.snapshot().authenticated_user.is_some() {
        session.logout().await?;
    }
    Ok(())
}

fn assertion(check: &str, expected: &str, observed: &str) -> SessionError {
    ActionError::assertion(check, expected, observed).into()
}

fn login_standard_user(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ensure_logged_out(session).await?;
        session.login(UserKind::Standard).await
    })
}

fn login_locked_out_user(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ensure_logged_out(session).await?;
        match session.login(UserKind::Locked).await {
            Err(SessionError::Login(LoginError::Locked { .. })) => Ok(()),
            Err(e) => Err(e),
            Ok(()) => Err(assertion(
                "locked-out login rejected",
                "a locked-out error banner",
                "a successful login",
            )),
        }
    })
}

fn login_invalid_credentials(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ensure_logged_out(session).await?;
        let bogus = UserFixture {
            kind: UserKind::Standard,
            username: "invalid_user".to_string(),
            password: "wrong_password".to_string(),
        };
        match session.login_user(&bogus).await {
            Err(SessionError::Login(LoginError::InvalidCredentials { .. })) => Ok(()),
            Err(e) => Err(e),
            Ok(()) => Err(assertion(
                "unknown credentials rejected",
                "a no-match error banner",
                "a successful login",
            )),
        }
    })
}

fn login_empty_username(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ensure_logged_out(session).await?;
        let user = UserFixture {
            kind: UserKind::Standard,
            username: String::new(),
            password: "secret_sauce".to_string(),
        };
        expect_missing_field(session.login_user(&user).await)
    })
}

fn login_empty_password(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        ensure_logged_out(session).await?;
        let user = UserFixture {
            kind: UserKind::Standard,
            username: "standard_user".to_string(),
            password: String::new(),
        };
        expect_missing_field(session.login_user(&user).await)
    })
}

fn expect_missing_field(result: Result<(), SessionError>) -> Result<(), SessionError> {
    match result {
        Err(SessionError::Login(LoginError::MissingField { .. })) => Ok(()),
        Err(e) => Err(e),
        Ok(()) => Err(assertion(
            "incomplete login form rejected",
            "a required-field error banner",
            "a successful login",
        )),
    }
}

fn inventory_sort_names_descending(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        session.ensure_logged_in(UserKind::Standard).await?;
        session.select_filter("nameDesc").await?;
        let names = session.product_names().await?;
        let mut expected = names.clone();
        expected.sort();
        expected.reverse();
        if names != expected {
            return Err(assertion(
                "inventory sorted Z to A",
                &expected.join(", "),
                &names.join(", "),
            ));
        }
        Ok(())
    })
}

fn inventory_sort_prices_ascending(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        session.ensure_logged_in(UserKind::Standard).await?;
        session.select_filter("priceLowHigh").await?;
        let prices = session.product_prices().await?;
        if !prices.windows(2).all(|w| w[0] <= w[1]) {
            return Err(assertion(
                "inventory sorted by ascending price",
                "a non-decreasing price column",
                &format!("{prices:?}"),
            ));
        }
        Ok(())
    })
}

fn all_products_listed(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        session.ensure_logged_in(UserKind::Standard).await?;
        let keys: Vec<String> = session
            .fixtures()
            .steps()
            .products
            .keys()
            .cloned()
            .collect();
        for key in keys {
            session.verify_product_listed(&key).await?;
        }
        Ok(())
    })
}

fn product_detail_round_trip(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        session.ensure_logged_in(UserKind::Standard).await?;
        let listed_name = session
            .fixtures()
            .product_name("bolt_tshirt")
            .map_err(ActionError::from)?
            .to_string();
        let names = session.product_names().await?;
        let prices = session.product_prices().await?;
        let index = names
            .iter()
            .position(|n| n == &listed_name)
            .ok_or_else(|| assertion("product listed", &listed_name, &names.join(", ")))?;
        let listed_price = prices
            .get(index)
            .copied()
            .ok_or_else(|| assertion("price rendered", &listed_name, "no price column entry"))?;

        session.open_product("bolt_tshirt").await?;
        let (detail_name, detail_price) = session.product_detail().await?;
        if detail_name != listed_name || detail_price != listed_price {
            return Err(assertion(
                "detail view matches the listing",
                &format!("{listed_name} at {listed_price} cents"),
                &format!("{detail_name} at {detail_price} cents"),
            ));
        }

        session.back_to_products().await?;
        session.verify_product_listed("bolt_tshirt").await
    })
}

fn cart_add_and_remove(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        session.ensure_logged_in(UserKind::Standard).await?;
        session.add_to_cart("backpack").await?;
        session.add_to_cart("bolt_tshirt").await?;
        session.verify_cart_badge().await?;

        session.go_to_cart().await?;
        session.remove_from_cart("bolt_tshirt").await?;
        session.verify_product_in_cart("backpack").await?;
        if session.verify_product_in_cart("bolt_tshirt").await.is_ok() {
            return Err(assertion(
                "removed product gone from the cart",
                "no Bolt T-Shirt entry",
                "an entry still present",
            ));
        }
        session.verify_cart_badge().await
    })
}

fn complete_purchase(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        session.ensure_logged_in(UserKind::Standard).await?;
        session.add_to_cart("backpack").await?;
        session.add_to_cart("bike_light").await?;
        session.verify_cart_badge().await?;

        session.go_to_cart().await?;
        session.verify_product_in_cart("backpack").await?;
        session.verify_product_in_cart("bike_light").await?;

        session.begin_checkout().await?;
        session.complete_purchase().await?;
        Ok(())
    })
}

fn empty_checkout_form_rejected(session: &mut Session) -> ScenarioFuture<'_> {
    Box::pin(async move {
        session.ensure_logged_in(UserKind::Standard).await?;
        session.add_to_cart("onesie").await?;
        session.go_to_cart().await?;
        session.begin_checkout().await?;

        match session.continue_to_overview().await {
            Err(SessionError::Action(ActionError::Assertion { observed, .. })) => {
                let expected = &session.fixtures().steps().messages.first_name_required;
                if &observed == expected {
                    Ok(())
                } else {
                    Err(assertion(
                        "empty form error banner",
                        expected,
                        &observed,
                    ))
                }
            }
            Err(e) => Err(e),
            Ok(()) => Err(assertion(
                "empty checkout form rejected",
                "a first-name-required banner",
                "the order overview page",
            )),
        }
    })
}
