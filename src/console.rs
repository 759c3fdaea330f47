use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::config::parse_positive;
use crate::error::Error;
use crate::item::{Item, Priority};
use crate::observer::Actor;
use crate::warehouse::{Admission, Warehouse};
use crate::worker::{ControlFlow, Worker};

/* ---------- */

/// A line typed at the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `add <item> [urgent|normal]`: stock an item by hand.
    Add(Item),
    /// `remove`: take the next item out by hand.
    Remove,
    /// `status`: print the current snapshot.
    Status,
    /// `exit`: stop the warehouse.
    Exit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let unknown = || Error::UnknownCommand(line.trim().to_owned());

        let command = match words.next().ok_or_else(unknown)? {
            "add" => {
                let value = words.next().ok_or_else(unknown)?;
                let value = u32::try_from(parse_positive(value).or_else(|err| {
                    // Zero is a fine item value, unlike a thread count.
                    if value == "0" {
                        Ok(0)
                    } else {
                        Err(err)
                    }
                })?)
                .map_err(Error::config)?;

                let priority = match words.next() {
                    None | Some("normal") | Some("0") => Priority::Normal,
                    Some("urgent") | Some("1") => Priority::Urgent,
                    Some(_) => return Err(unknown()),
                };

                Self::Add(Item::new(value, priority))
            }
            "remove" => Self::Remove,
            "status" => Self::Status,
            "exit" => Self::Exit,
            _ => return Err(unknown()),
        };

        match words.next() {
            Some(_) => Err(unknown()),
            None => Ok(command),
        }
    }
}

/* ---------- */

/// The interactive prompt: reads commands from `input`, answers on `output`.
///
/// Manual operations go through the gate without waiting: adding to a full store
/// or removing from an empty one is refused instead of blocking the prompt.
pub struct Console {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
    line: String,
}

impl Console {
    /// Returns a console reading `input` and writing to `output`.
    pub fn new<R, W>(input: R, output: W) -> Self
    where
        R: BufRead + Send + 'static,
        W: Write + Send + 'static,
    {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            line: String::new(),
        }
    }

    /// Returns a console on the process' stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }

    /// Carries out `command` and tells whether the console should keep reading.
    pub fn execute(&mut self, command: Command, warehouse: &Warehouse) -> io::Result<ControlFlow> {
        let actor = Actor::console();

        match command {
            Command::Add(item) => match warehouse.stock(actor, item) {
                Ok(Admission::Committed(())) => writeln!(
                    self.output,
                    "added item {} ({})",
                    item.value(),
                    item.priority()
                )?,
                Ok(Admission::Stopped) => return Ok(ControlFlow::Break),
                Err(err) => writeln!(self.output, "cannot add: {err}")?,
            },
            Command::Remove => match warehouse.unstock(actor) {
                Ok(Admission::Committed(item)) => writeln!(
                    self.output,
                    "removed item {} ({})",
                    item.value(),
                    item.priority()
                )?,
                Ok(Admission::Stopped) => return Ok(ControlFlow::Break),
                Err(Error::Underflow) => writeln!(self.output, "No items to remove!")?,
                Err(err) => writeln!(self.output, "cannot remove: {err}")?,
            },
            Command::Status => writeln!(self.output, "{}", warehouse.snapshot())?,
            Command::Exit => {
                writeln!(self.output, "Exiting simulation...")?;
                warehouse.shutdown();
                return Ok(ControlFlow::Break);
            }
        }

        Ok(ControlFlow::Continue)
    }

    fn step(&mut self, warehouse: &Warehouse) -> io::Result<ControlFlow> {
        write!(self.output, "\nEnter command: [add <item> [urgent], remove, status, exit] ")?;
        self.output.flush()?;

        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            // Stdin closed. The warehouse keeps running without a console.
            return Ok(ControlFlow::Break);
        }

        if !warehouse.is_running() {
            return Ok(ControlFlow::Break);
        }

        match self.line.parse::<Command>() {
            Ok(command) => self.execute(command, warehouse),
            Err(err) => {
                writeln!(self.output, "{err}. Try again.")?;
                Ok(ControlFlow::Continue)
            }
        }
    }
}

impl Worker for Console {
    fn on_update(&mut self, warehouse: &Warehouse) -> ControlFlow {
        self.step(warehouse).unwrap_or_else(|err| {
            tracing::warn!(%err, "console I/O failed, closing the console");
            ControlFlow::Break
        })
    }
}

/* ---------- */
