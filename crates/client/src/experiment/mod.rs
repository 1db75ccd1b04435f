//! Boundary to the experimentation / feature-flag system.
//!
//! The stores never ask for decisions themselves. The presentation layer
//! evaluates flags through a [`DecisionProvider`], derives display values
//! such as the [`CheckoutButton`] label, and hands the checkout store an
//! opaque snapshot to attach to the `order_placed` event sent to the
//! [`EventSink`].

mod decision;
mod sink;
mod user;

pub use decision::{
    CheckoutButton, DEFAULT_CHECKOUT_BUTTON_TEXT, Decision, DecisionProvider, StaticDecisions,
    flags, resolve_ui_config, variables,
};
pub use sink::{
    EventSink, LoggingEventSink, NoopEventSink, ORDER_PLACED_EVENT, TrackingError, TrackingEvent,
};
pub use user::{ANONYMOUS_USER_ID, ExperimentUser};
