// Admin module - user management and application settings
mod error;
mod handlers;
mod types;

pub use error::AdminError;
pub use handlers::{
    admin_dashboard, change_password, create_user, delete_user, get_settings, toggle_admin,
    update_settings,
};
pub use types::*;
