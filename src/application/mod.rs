pub mod usecases;
pub mod workers;
