//! Payment command handlers.

mod cancel_payment;
mod register_payment;

pub use cancel_payment::{CancelPaymentCommand, CancelPaymentHandler};
pub use register_payment::{
    RegisterPaymentCommand, RegisterPaymentHandler, RegisterPaymentResult,
};
