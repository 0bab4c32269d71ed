//! Domain model: payments, presets, split requests, and the rules that
//! govern how they change. Nothing in here touches a runtime or a store.

pub mod destination;
pub mod ids;
pub mod money;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod preset;
pub mod split;
pub mod split_request;
