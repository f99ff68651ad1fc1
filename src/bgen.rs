use argh::FromArgs;

mod cmd_generate;
mod cmd_lex;

#[derive(FromArgs)]
/// A PCFG-driven generator for brick placement programs
struct Args {
    #[argh(subcommand)]
    subcommand: Subcommand,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Subcommand {
    Generate(cmd_generate::Generate),
    Lex(cmd_lex::Lex),
}

impl Subcommand {
    fn run(self) -> i32 {
        match self {
            Subcommand::Generate(cmd) => cmd.run(),
            Subcommand::Lex(cmd) => cmd.run(),
        }
    }
}

fn main() {
    env_logger::init();
    let code = argh::from_env::<Args>().subcommand.run();
    std::process::exit(code);
}
