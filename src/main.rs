use clap::Parser;
use grove::Result;
use grove::cli::{self, Verb};
use grove::commands::{create, pull, push, remove, status};

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Manage git worktrees as sibling directories of this repository")]
#[command(version)]
pub struct Cli {
    /// A verb (create, status, pull, pull-all, push, remove) followed by an
    /// optional branch or worktree name
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let raw = cli.args.join(" ");

    let Some(request) = cli::parse_request(&raw) else {
        println!("{}", cli::usage());
        return Ok(());
    };

    match request.verb {
        Verb::Create => create::create_worktree(request.operand.as_deref())?,
        Verb::Status => status::show_status()?,
        Verb::Pull => match request.operand.as_deref() {
            Some(branch) => pull::pull_branch(branch)?,
            None => pull::pull_interactive()?,
        },
        Verb::PullAll => pull::pull_all()?,
        Verb::Push => push::push_to_default()?,
        Verb::Remove => remove::remove_worktree(request.operand.as_deref())?,
    }

    Ok(())
}
