use rlox::{repl, Interpreter};
use std::io::stdout;
use std::path::PathBuf;

fn main() -> Result<(), std::io::Error> {
    let args: Vec<String> = std::env::args().collect();
    // The first element in the arguments list is the name of the binary.
    // Then the actual binary arguments, flags and options.
    if args.len() == 1 {
        repl()?;
    } else if args.len() == 2 {
        let filepath = PathBuf::from(&args[1]);
        let file = std::fs::read_to_string(filepath)?;
        if let Err(e) = Interpreter::new(stdout()).execute_raw(&file) {
            eprintln!("{}", e);
            // Following `/usr/include/sysexits.h`: EX_DATAERR (65) for
            // malformed input, EX_SOFTWARE (70) for a failure at runtime.
            let code = if e.is_runtime() { 70 } else { 65 };
            std::process::exit(code);
        }
    } else {
        println!("Usage: rlox [script]");
        std::process::exit(1);
    }
    Ok(())
}
