use crate::db_types::Order;

/// The result of applying a provider payment confirmation to an order. Webhook redelivery and poller/webhook races
/// make "the order is already paid" a normal outcome rather than an error.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// The order transitioned to `Paid` as a result of this confirmation.
    NewlyPaid(Order),
    /// The order was already `Paid`. The same absolute values were re-applied, which is a no-op.
    AlreadyPaid(Order),
    /// The order cannot accept a payment (it was cancelled). The row was left untouched.
    NotPayable(Order),
}

impl PaymentOutcome {
    pub fn order(&self) -> &Order {
        match self {
            PaymentOutcome::NewlyPaid(o) | PaymentOutcome::AlreadyPaid(o) | PaymentOutcome::NotPayable(o) => o,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            PaymentOutcome::NewlyPaid(o) | PaymentOutcome::AlreadyPaid(o) | PaymentOutcome::NotPayable(o) => o,
        }
    }
}
