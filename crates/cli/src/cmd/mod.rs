mod add;
mod fura;

pub use add::{AddArgs, cmd_add};
pub use fura::{FuraArgs, FuraCommand, cmd_fura};
