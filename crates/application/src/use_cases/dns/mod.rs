mod dispatch_query;

pub use dispatch_query::{DispatchOutcome, DispatchQueryUseCase};
