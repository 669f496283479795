//! Quantity-control affordance policy for a cart line.

use nb_schemas::CartLine;
use serde::{Deserialize, Serialize};

/// Which of a line's controls are currently usable.
///
/// All controls are disabled while the line is optimistic — stacking a
/// second mutation on an unconfirmed one would compound state the backend
/// has never seen. Decrement is additionally disabled at quantity 1:
/// going below 1 is a removal, performed through the remove action, never
/// an update to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineControls {
    pub increment: bool,
    pub decrement: bool,
    pub remove: bool,
}

impl LineControls {
    pub fn for_line(line: &CartLine) -> Self {
        if line.optimistic {
            return Self {
                increment: false,
                decrement: false,
                remove: false,
            };
        }
        Self {
            increment: true,
            decrement: line.quantity > 1,
            remove: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_schemas::{Merchandise, Money};

    fn line(quantity: u32, optimistic: bool) -> CartLine {
        CartLine {
            id: "line-1".into(),
            merchandise: Merchandise {
                id: "var-1".into(),
                product_title: "Body Cream".into(),
                product_handle: "body-cream".into(),
                title: "50ml".into(),
                selected_options: vec![],
                image: None,
                available_for_sale: true,
                price: Money::new("24.95", "EUR"),
            },
            quantity,
            cost: Money::new("24.95", "EUR"),
            optimistic,
        }
    }

    #[test]
    fn confirmed_line_above_one_enables_everything() {
        let c = LineControls::for_line(&line(2, false));
        assert!(c.increment && c.decrement && c.remove);
    }

    #[test]
    fn decrement_disabled_at_quantity_one() {
        let c = LineControls::for_line(&line(1, false));
        assert!(c.increment);
        assert!(!c.decrement);
        assert!(c.remove);
    }

    #[test]
    fn optimistic_line_disables_all_controls() {
        let c = LineControls::for_line(&line(5, true));
        assert!(!c.increment && !c.decrement && !c.remove);
    }
}
