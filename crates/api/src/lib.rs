pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_admin_routes;
pub use state::AdminState;
