//! Client side of the widget: the popup state machine and how it reaches the
//! server.

mod controller;
mod http;
mod state;
mod transport;
mod view;

pub use controller::{Outcome, PopupController, PopupSettings, Step, SubmitRejected};
pub use http::HttpTransport;
pub use state::{FormKind, PopupState};
pub use transport::{ActionRequest, Transport, TransportError};
pub use view::{PopupElements, PopupView};
