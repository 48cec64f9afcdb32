//! Application layer orchestrating the payment flow.
//!
//! `PaymentFormController` drives a single payment from draft to outcome, the
//! progress ticker animates the processing phase, and `HistoryService` serves
//! the transaction history views. `EnrollmentService` and `ReviewService`
//! cover card applications and their review by administrators.

pub mod controller;
pub mod enrollment;
pub mod history;
pub mod progress;
pub mod review;
