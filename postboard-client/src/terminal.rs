//! Line input for the `postboard` binary, read through Reedline.

use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    Signal as ReedlineSignal,
};
use std::{borrow::Cow, io};

/// What the user did at a prompt.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Input {
    Line(String),
    /// Ctrl-C: the current line is dropped.
    Interrupt,
    /// Ctrl-D or a closed stdin.
    Eof,
}

struct TerminalPrompt<'a> {
    text: &'a str,
}

impl Prompt for TerminalPrompt<'_> {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.text)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed(" ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(": ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({prefix}reverse-search: {}) ", history_search.term))
    }
}

pub struct Terminal {
    line_editor: Reedline,
}

impl Terminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_editor: Reedline::create(),
        }
    }

    /// Blocks until the user finishes a line. Must run on a multi-threaded tokio runtime.
    pub fn read(&mut self, prompt: &str) -> io::Result<Input> {
        let prompt = TerminalPrompt { text: prompt };
        let signal = tokio::task::block_in_place(|| self.line_editor.read_line(&prompt))?;

        Ok(match signal {
            ReedlineSignal::Success(line) => Input::Line(line),
            ReedlineSignal::CtrlC => Input::Interrupt,
            ReedlineSignal::CtrlD => Input::Eof,
        })
    }

    /// Asks a yes/no question. Anything but `y` or `yes`, including Ctrl-C, means no.
    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        Ok(match self.read(question)? {
            Input::Line(answer) => is_yes(&answer),
            Input::Interrupt | Input::Eof => false,
        })
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
