use argh::FromArgs;
use brickgrammar::lexer::lex;
use std::ffi::OsString;
use std::fs;

/// Lex a placement-language file and print the resulting operations, one
/// per line. Useful for checking a grammar's terminal lexemes by hand.
#[derive(FromArgs)]
#[argh(subcommand, name = "lex")]
pub struct Lex {
    /// input file containing whitespace-separated placement lexemes
    #[argh(option, short = 'i')]
    input: OsString,
}

impl Lex {
    pub fn run(self) -> i32 {
        let text = match fs::read_to_string(&self.input) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error: could not read {:?}: {e}", self.input);
                return 1;
            }
        };

        match lex(&text) {
            Ok(ops) => {
                for op in ops {
                    println!("{op:?}");
                }
                0
            }
            Err(e) => {
                eprintln!("Error: {e}");
                1
            }
        }
    }
}
