mod deploy;
mod destroy;
mod detect;
mod doctor;

pub use deploy::{DeployArgs, deploy};
pub use destroy::destroy;
pub use detect::detect;
pub use doctor::doctor;
