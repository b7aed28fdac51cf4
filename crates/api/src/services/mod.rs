//! Business logic services.
//!
//! Services sit between the route handlers and the repositories: auth owns
//! password and token handling, checkout owns the order-placement
//! transaction, and flow talks to the payment gateway.

pub mod auth;
pub mod checkout;
pub mod flow;
