//! Typed client for the inventory API and the view logic of the login,
//! dashboard and admin screens, without any rendering.

pub mod api;
pub mod routes;
pub mod session;
pub mod views;

pub use api::{ApiClient, ClientError, ListRequest};
pub use routes::{guard, Navigation, Route};
pub use session::{AuthContext, CredentialStore, FileCredentialStore, Session};
pub use views::{AdminPortalView, DashboardView, LoginView, ViewState};
