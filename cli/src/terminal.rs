use std::io::{self, BufRead, StdinLock, Stdout, Write};

use melee_engine::{ExitToMenu, Prompt, Reply};

/// Typing this at any prompt abandons the current action.
pub const EXIT_TO_MENU: &str = "@@";

/// Line-oriented prompt over any reader/writer pair. End of input behaves
/// like the exit token.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self, question: &str) -> Reply<String> {
        let _ = write!(self.output, "{question} ");
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => Err(ExitToMenu),
            Ok(_) => {
                let line = line.trim();
                if line == EXIT_TO_MENU {
                    Err(ExitToMenu)
                } else {
                    Ok(line.to_uppercase())
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn ask_yes_no(&mut self, question: &str, default_yes: bool) -> Reply<bool> {
        let hint = if default_yes {
            "(<Enter> for Yes, N for No)"
        } else {
            "(<Enter> for No, Y for Yes)"
        };
        loop {
            match self.read_line(&format!("{question} {hint}"))?.as_str() {
                "" => return Ok(default_yes),
                "Y" | "YES" => return Ok(true),
                "N" | "NO" => return Ok(false),
                other => self.announce(&format!("'{other}' is not Y or N. Try again")),
            }
        }
    }

    fn ask_number(&mut self, question: &str, min: i32, max: i32) -> Reply<i32> {
        loop {
            let raw = self.read_line(&format!("{question} [{min}..{max}]"))?;
            match raw.parse::<i32>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(n),
                Ok(n) => {
                    self.announce(&format!("Value must be between {min} and {max}. Entered {n}."))
                }
                Err(_) => self.announce(&format!("'{raw}' is not a number. Try again")),
            }
        }
    }

    fn ask_text(&mut self, question: &str) -> Reply<String> {
        self.read_line(question)
    }

    fn announce(&mut self, message: &str) {
        let _ = writeln!(self.output, "{message}");
    }
}
