mod check;
mod compile;
mod wave;

use check::run_check;
use compile::run_compile;

use anyhow::Result;

use crate::cli::Command;
use crate::display::Context;

pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::Compile(args) => run_compile(args, ctx),
        Command::Check(args) => run_check(args, ctx),
    }
}
