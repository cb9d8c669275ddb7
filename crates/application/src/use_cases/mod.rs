pub mod dns;

pub use dns::{DispatchOutcome, DispatchQueryUseCase};
