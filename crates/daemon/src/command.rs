//! babeld command line assembly

use crate::config::BabeldConfig;
use tracing::debug;

/// Assemble the full babeld invocation.
///
/// The result is `[daemon_path] + common_opts + unique_opts + interfaces`.
/// Interfaces keep the order they were given in.
pub fn build_command(
    daemon_path: &str,
    common_opts: &[String],
    unique_opts: &[String],
    interfaces: &[String],
) -> Vec<String> {
    let mut command =
        Vec::with_capacity(1 + common_opts.len() + unique_opts.len() + interfaces.len());
    command.push(daemon_path.to_string());
    command.extend_from_slice(common_opts);
    command.extend_from_slice(unique_opts);
    command.extend_from_slice(interfaces);

    debug!("babeld command to be executed: {}", command.join(" "));
    command
}

impl BabeldConfig {
    /// Build the invocation for `interfaces` using the configured options
    pub fn command_for(&self, interfaces: &[String]) -> Vec<String> {
        build_command(
            &self.binary(),
            &self.common_opts(),
            &self.unique_opts,
            interfaces,
        )
    }
}
