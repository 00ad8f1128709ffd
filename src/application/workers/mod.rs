pub mod settlement_worker;
