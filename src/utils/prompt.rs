use std::io::{self, BufRead, Write};

/// Yes/no question asked before a destructive step.
pub trait Confirm {
    fn ask(&mut self, question: &str, default: bool) -> io::Result<bool>;
}

pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
}

impl TerminalConfirm<io::StdinLock<'static>, io::Stderr> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn ask(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            write!(self.output, "{} {}: ", question, hint)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // EOF, nobody is there to answer
                return Ok(default);
            }

            match line.trim().to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer yes or no.")?,
            }
        }
    }
}

/// Scripted answers for workflow tests.
#[cfg(test)]
pub struct FixedAnswer {
    pub answer: bool,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl FixedAnswer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Confirm for FixedAnswer {
    fn ask(&mut self, question: &str, _default: bool) -> io::Result<bool> {
        self.asked.push(question.to_string());
        Ok(self.answer)
    }
}
