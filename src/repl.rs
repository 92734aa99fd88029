//! Line-oriented front-ends
//!
//! [`start`] reads one line at a time and either evaluates it against a
//! persistent environment or dumps its tokens as JSON. Both work over any
//! reader/writer pair so they can be driven from tests as well as a terminal.

use std::io::{self, BufRead, Write};

use crate::error::ParseError;
use crate::lexer::{Lexer, TokenKind};
use crate::parser::{self, Statement};
use crate::runtime::{Environment, Evaluator};

/// Drawn above the banner when a line fails to parse
pub const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// Printed before the diagnostics of a line that failed to parse
pub const PARSE_ERROR_BANNER: &str = "Woops! We ran into some monkey business here!";

/// What the REPL does with each line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplMode {
    /// Parse and evaluate, printing the result
    #[default]
    Evaluate,
    /// Print every token as a JSON record
    Tokens,
}

/// REPL settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplOptions {
    /// Prompt written before each line is read
    pub prompt: String,
    /// Line handling mode
    pub mode: ReplMode,
}

impl Default for ReplOptions {
    fn default() -> Self {
        ReplOptions {
            prompt: ">> ".to_string(),
            mode: ReplMode::Evaluate,
        }
    }
}

/// Runs the read-eval-print loop until end of input or an `exit` line
pub fn start<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    options: &ReplOptions,
) -> io::Result<()> {
    let session = Session::new();
    let mut line = String::new();

    loop {
        write!(output, "{}", options.prompt)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        let source = line.trim();
        if source == "exit" || source == "exit()" {
            return Ok(());
        }
        tracing::debug!(mode = ?options.mode, source, "repl line");

        match options.mode {
            ReplMode::Evaluate => session.eval_line(source, &mut output)?,
            ReplMode::Tokens => dump_tokens(source, &mut output)?,
        }
    }
}

/// Evaluation state shared by all lines of one REPL run
pub struct Session {
    evaluator: Evaluator,
    env: Environment,
}

impl Session {
    /// Creates a session with the standard builtins and an empty environment
    pub fn new() -> Self {
        Session {
            evaluator: Evaluator::new(),
            env: Environment::new(),
        }
    }

    /// Parses and evaluates one line, writing what the user should see
    ///
    /// Nothing is printed when the line ends with a `let`.
    pub fn eval_line<W: Write>(&self, source: &str, output: &mut W) -> io::Result<()> {
        let (program, err) = parser::parse(source);
        if let Some(err) = err {
            return print_parse_errors(&err, output);
        }

        let result = self.evaluator.eval(&program, &self.env);
        if matches!(program.statements.last(), Some(Statement::Let { .. })) && !result.is_error() {
            return Ok(());
        }
        writeln!(output, "{}", result.display())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the monkey face, the banner, then one tab-indented line per diagnostic
pub fn print_parse_errors<W: Write>(err: &ParseError, output: &mut W) -> io::Result<()> {
    write!(output, "{}", MONKEY_FACE)?;
    writeln!(output, "{}", PARSE_ERROR_BANNER)?;
    writeln!(output, " parser errors:")?;
    for diagnostic in err.diagnostics() {
        writeln!(output, "\t{}", diagnostic)?;
    }
    Ok(())
}

/// Writes `{"Type":...,"Literal":...}` for each token up to (not including) EOF
pub fn dump_tokens<W: Write>(source: &str, output: &mut W) -> io::Result<()> {
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token();
        if token.kind == TokenKind::Eof {
            return Ok(());
        }
        let json = serde_json::to_string(&token).map_err(io::Error::from)?;
        writeln!(output, "{}", ascii_escape(&json))?;
    }
}

/// Replaces every non-ASCII character with its `\uXXXX` escape (UTF-16 units)
fn ascii_escape(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str, options: &ReplOptions) -> String {
        let mut output = Vec::new();
        start(input.as_bytes(), &mut output, options).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_bindings_persist_across_lines() {
        let out = run("let a = 5;\na * 2\n", &ReplOptions::default());
        assert_eq!(out, ">> >> 10\n>> ");
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let out = run("1\nexit\n2\n", &ReplOptions::default());
        assert_eq!(out, ">> 1\n>> ");
        let out = run("exit()\n", &ReplOptions::default());
        assert_eq!(out, ">> ");
    }

    #[test]
    fn test_parse_errors_use_banner() {
        let options = ReplOptions {
            prompt: String::new(),
            mode: ReplMode::Evaluate,
        };
        let out = run("let = 1\n", &options);
        let report = out
            .strip_prefix(MONKEY_FACE)
            .expect("report starts with the monkey face");
        assert!(report.starts_with("Woops! We ran into some monkey business here!\n parser errors:\n\t"));
        assert!(out.contains("expecting token IDENT, but got = with literal = instead"));
    }

    #[test]
    fn test_runtime_errors_are_printed() {
        let options = ReplOptions {
            prompt: String::new(),
            mode: ReplMode::Evaluate,
        };
        assert_eq!(run("foo\n", &options), "ERROR: identifier not found: foo\n");
        assert_eq!(run("let x = foo;\n", &options), "ERROR: identifier not found: foo\n");
    }

    #[test]
    fn test_token_mode() {
        let options = ReplOptions {
            prompt: String::new(),
            mode: ReplMode::Tokens,
        };
        let out = run("let x = \"é\";\n", &options);
        assert_eq!(
            out,
            concat!(
                "{\"Type\":\"LET\",\"Literal\":\"let\"}\n",
                "{\"Type\":\"IDENT\",\"Literal\":\"x\"}\n",
                "{\"Type\":\"=\",\"Literal\":\"=\"}\n",
                "{\"Type\":\"STRING\",\"Literal\":\"\\u00e9\"}\n",
                "{\"Type\":\";\",\"Literal\":\";\"}\n",
            )
        );
    }

    #[test]
    fn test_ascii_escape_uses_surrogate_pairs() {
        assert_eq!(ascii_escape("a😀"), "a\\ud83d\\ude00");
    }
}
