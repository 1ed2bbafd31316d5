use crate::Interpreter;
use std::io::{stdout, Write};

/// Read-print-evaluation loop.
/// It prompts the user to enter lox code and then interprets it on the fly.
///
/// The interpreter lives across inputs: definitions from earlier lines stay
/// visible, while errors only abort the line that raised them. A line equal
/// to `quit` (or the end of the input stream) terminates the loop.
pub fn repl() -> Result<(), std::io::Error> {
    let mut interpreter = Interpreter::new(stdout());
    loop {
        print!(">>");
        stdout().flush()?;
        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err() || input.is_empty() {
            break Ok(());
        }
        let input = input.trim().to_string();
        if input.eq_ignore_ascii_case("quit") {
            break Ok(());
        }
        if let Err(e) = interpreter.execute_raw(&input) {
            eprintln!("{}", e);
        }
    }
}
