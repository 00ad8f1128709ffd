pub mod outcome_simulator;
pub mod ownership_verifier;
pub mod payments;
pub mod processing_dispatcher;
