//! A backend failure reverts only the affected lines.
//!
//! GREEN when:
//! - after an Err completion the displayed cart equals the confirmed cart
//!   for the affected line (optimistic flag gone);
//! - an unrelated in-flight mutation is untouched by the failure.

use nb_cart::{
    AddLineInput, BackendError, CartCoordinator, Completion, LineUpdateInput, MutationRequest,
};
use nb_schemas::{Cart, CartCost, CartLine, Merchandise, Money};

fn variant(id: &str, price: &str) -> Merchandise {
    Merchandise {
        id: id.into(),
        product_title: "Body Cream".into(),
        product_handle: "noabea-body-cream".into(),
        title: "50ml".into(),
        selected_options: vec![],
        image: None,
        available_for_sale: true,
        price: Money::new(price, "EUR"),
    }
}

fn confirmed_cart() -> Cart {
    Cart {
        id: "cart-1".into(),
        lines: vec![CartLine {
            id: "line-1".into(),
            merchandise: variant("var-1", "24.95"),
            quantity: 2,
            cost: Money::new("49.9", "EUR"),
            optimistic: false,
        }],
        total_quantity: 2,
        cost: CartCost {
            subtotal: Money::new("49.9", "EUR"),
        },
        checkout_url: None,
    }
}

#[test]
fn failure_reverts_affected_line_only() {
    let mut c = CartCoordinator::new(confirmed_cart());

    // An add for a second variant is in flight alongside the failing update.
    let _t_add = c.submit(MutationRequest::AddLines {
        lines: vec![AddLineInput {
            merchandise: variant("var-2", "12.5"),
            quantity: 1,
        }],
    });
    let t_update = c.submit(MutationRequest::UpdateLines {
        lines: vec![LineUpdateInput {
            id: "line-1".into(),
            quantity: 3,
        }],
    });

    let outcome = c.complete(
        &t_update,
        Err(BackendError::Rejected("quantity not available".into())),
    );
    let Completion::Failed(err) = outcome else {
        panic!("expected Failed, got {outcome:?}");
    };
    assert_eq!(err, BackendError::Rejected("quantity not available".into()));

    let displayed = c.displayed();
    // line-1 reverted to confirmed quantity, no longer optimistic.
    let line1 = displayed.line("line-1").unwrap();
    assert_eq!(line1.quantity, 2);
    assert!(!line1.optimistic);
    // The unrelated add is still optimistically visible.
    assert!(displayed.line_for_merchandise("var-2").is_some());
    assert_eq!(c.in_flight(), 1);
}

#[test]
fn failure_of_sole_mutation_restores_confirmed_state() {
    let mut c = CartCoordinator::new(confirmed_cart());
    let t = c.submit(MutationRequest::UpdateLines {
        lines: vec![LineUpdateInput {
            id: "line-1".into(),
            quantity: 9,
        }],
    });
    c.complete(&t, Err(BackendError::Unavailable("timeout".into())));
    assert_eq!(c.displayed(), c.confirmed().clone());
}
