use std::io::{BufRead, Write};

use log::trace;

use crate::error::SessionError;

// ---------------------------------------------------------------------------
// Console – line input plus text output
// ---------------------------------------------------------------------------

/// Interactive console over any line source and text sink. The binary wires
/// it to stdin/stdout; tests feed canned answers.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one answer. Only the line terminator is
    /// stripped. End of input is [`SessionError::InputClosed`].
    pub fn ask(&mut self, question: &str) -> Result<String, SessionError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SessionError::InputClosed);
        }
        let answer = line.trim_end_matches(['\n', '\r']).to_string();
        trace!("answer to {question:?}: {answer:?}");
        Ok(answer)
    }

    /// Ask until `parse` accepts the answer. The first attempt shows
    /// `question`, every later one `retry`.
    pub fn ask_until<T>(
        &mut self,
        question: &str,
        retry: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, SessionError> {
        let mut prompt = question;
        loop {
            let answer = self.ask(prompt)?;
            if let Some(value) = parse(&answer) {
                return Ok(value);
            }
            prompt = retry;
        }
    }

    /// Whether the answer to `question` is exactly "yes".
    pub fn confirm(&mut self, question: &str) -> Result<bool, SessionError> {
        Ok(self.ask(question)? == "yes")
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
