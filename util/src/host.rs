//! Host platform utility functions

use std::path::PathBuf;

/// Name of the environment variable giving the software root directory.
pub const SW_ROOT_ENV_VAR: &str = "TRITON_SW_ROOT";

/// Get the root directory of the software installation.
///
/// The root is read from the `TRITON_SW_ROOT` environment variable, and is
/// used to locate the `params`, `sessions` and `scripts` directories.
pub fn get_triton_sw_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var(SW_ROOT_ENV_VAR)?))
}
