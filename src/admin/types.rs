use serde::{Deserialize, Serialize};

use crate::login::SignupRequest;
use crate::media::OwnedMedia;
use crate::store::UserSummary;

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub users: Vec<UserSummary>,
    pub media: Vec<OwnedMedia>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub imagebb_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(flatten)]
    pub account: SignupRequest,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}
