pub mod auth;
pub mod ramp;
pub mod upload;
pub mod user;

pub use auth::{AuthResponse, RefreshResponse, SignInPayload, SignUpPayload};
pub use ramp::{CreateRampDto, DeleteRampsDto, RampRecord, RampWidth, RampsPage};
pub use upload::{PresignRequest, PresignedUpload};
pub use user::User;
