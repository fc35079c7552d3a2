//! Use cases.
//!
//! 用例层：编排 ports 与 app store。
//!
//! ```text
//! [AppStore session] ──▶ ProfileBootstrapCoordinator ──▶ AppStore profile
//!          │                       │
//!          └──────────▶ NavigationGate ◀┘
//! ```
//!
//! Auth use cases only write the session; the coordinator follows it.

pub mod auth;
pub mod bootstrap;
mod errors;
pub mod navigation_gate;
pub mod notifications;
pub mod profile;

pub use auth::{DeleteAccount, RefreshSession, ResendOtp, SignIn, SignOut, SignUp, VerifyOtp};
pub use errors::SessionError;
pub use notifications::GetUnreadNotificationCount;
pub use profile::CompleteProfile;
