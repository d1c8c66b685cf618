mod root;
pub use root::{parse, Command, Credentials, PortalCommand, PortalOptions};

mod delete;
mod list;
mod reset;
mod signup;
mod status;
mod submit;
mod upload;
