//! Shell completion for the `blockpool` command.

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::config::AppConfig;

/// Write the completion script for `shell`, derived from [`AppConfig`]'s flags.
pub fn write_completion(shell: Shell, out: &mut dyn io::Write) {
    let mut cmd = AppConfig::command();
    let bin = cmd.get_name().to_owned();
    generate(shell, &mut cmd, bin, out);
}
