pub mod error;
pub mod health;
pub mod login;
pub mod register;
pub mod session;
pub mod state;
pub mod tokens;
pub mod types;
pub mod user_info;
pub mod widget;

pub(crate) mod utils;

pub use error::HandlerError;
pub use session::SESSION_COOKIE_NAME;
pub use state::AjaxConfig;
