//! Authentication use cases.
//!
//! Each use case talks to the [`AuthPort`](ch_core::ports::AuthPort) and then
//! records the outcome in the [`AppStore`](crate::store::AppStore). The
//! profile bootstrap follows the store's session on its own.

mod otp;
mod refresh_session;
mod sign_in;
mod sign_out;

pub use otp::{ResendOtp, VerifyOtp};
pub use refresh_session::RefreshSession;
pub use sign_in::{SignIn, SignUp};
pub use sign_out::{DeleteAccount, SignOut};
