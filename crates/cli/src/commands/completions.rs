//! `cstash completions <shell>`

use std::io::Write;

use clap::{Command, CommandFactory};
use clap_complete::{Generator, Shell};

use super::Cli;
use crate::exit_code::ExitCode;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> ExitCode {
    let mut stdout = std::io::stdout().lock();
    emit(args.shell, &mut Cli::command(), &mut stdout);
    ExitCode::Success
}

fn emit(shell: impl Generator, cmd: &mut Command, out: &mut dyn Write) {
    let bin = cmd.get_name().to_owned();
    clap_complete::generate(shell, cmd, bin, out);
}
