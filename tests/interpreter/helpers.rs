use rlox::Interpreter;

/// Execute the provided lox source code.
/// It returns the program's output stream.
pub fn execute(source: &str) -> String {
    let mut buffer = Vec::new();
    let _ = Interpreter::new(&mut buffer).execute_raw(source);
    String::from_utf8(buffer).unwrap()
}

/// Execute the provided lox source code, expecting it to fail.
/// It returns the program's output stream and the rendered error.
pub fn execute_with_error(source: &str) -> (String, String) {
    let mut buffer = Vec::new();
    let error = Interpreter::new(&mut buffer)
        .execute_raw(source)
        .expect_err("The program was expected to fail");
    (String::from_utf8(buffer).unwrap(), error.to_string())
}
