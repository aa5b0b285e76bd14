use ::linefeed::{DefaultTerminal, Interface, ReadResult, Signal};
use std::io::{BufRead, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Keyboard input for `INPUT$`. A terminal gets line editing and history;
/// piped input is read plainly.
pub struct Console {
    interface: Option<Interface<DefaultTerminal>>,
    interrupted: Arc<AtomicBool>,
}

impl Console {
    pub fn new(interrupted: Arc<AtomicBool>) -> Console {
        Console {
            interface: None,
            interrupted,
        }
    }

    /// One line without its line ending. End of input reads as "".
    pub fn read_line(&mut self, prompt: &str) -> std::io::Result<String> {
        if !std::io::stdin().is_terminal() {
            let mut stdout = std::io::stdout();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            return Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string());
        }
        let interface = match self.interface.take() {
            Some(interface) => interface,
            None => {
                let interface = Interface::new("musl")?;
                interface.set_report_signal(Signal::Interrupt, true);
                interface
            }
        };
        let result = self.edit(&interface, prompt);
        self.interface = Some(interface);
        result
    }

    fn edit(&self, interface: &Interface<DefaultTerminal>, prompt: &str) -> std::io::Result<String> {
        interface.set_prompt(prompt)?;
        match interface.read_line()? {
            ReadResult::Input(line) => {
                if !line.is_empty() {
                    interface.add_history_unique(line.clone());
                }
                Ok(line)
            }
            ReadResult::Signal(Signal::Interrupt) => {
                interface.set_buffer("")?;
                self.interrupted.store(true, Ordering::SeqCst);
                Ok(String::new())
            }
            ReadResult::Signal(_) | ReadResult::Eof => Ok(String::new()),
        }
    }
}
