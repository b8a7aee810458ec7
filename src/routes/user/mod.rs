mod handler;
mod model;

pub use handler::{
    add_to_wishlist, list_users, login, logout, me, register, remove_from_wishlist,
    update_password, update_profile, update_role, user_details,
};
