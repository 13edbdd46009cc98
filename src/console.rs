//! Interactive console.
//!
//! A numbered menu loop over any `BufRead`/`Write` pair, so tests can script
//! a session. Every progress change is saved immediately; leaving the menu
//! (option 7 or end of input) saves once more.

use anyhow::Result;
use std::io::{BufRead, Write};

use pokedex_core::Record;

use crate::display;
use crate::session::{Action, Dex};
use crate::views::{list_records, ListFilter, ProgressSummary};

pub struct Console<'a, R, W> {
    dex: &'a Dex,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(dex: &'a Dex, input: R, out: W) -> Self {
        Self { dex, input, out }
    }

    /// Runs the menu loop until the user exits or input ends.
    pub fn run(mut self) -> Result<()> {
        loop {
            self.main_menu()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            match line.trim().parse::<u32>() {
                Ok(1) => self.search_by_id()?,
                Ok(2) => self.search_by_name()?,
                Ok(3) => self.list(ListFilter::All)?,
                Ok(4) => self.list(ListFilter::Caught)?,
                Ok(5) => self.list(ListFilter::Encountered)?,
                Ok(6) => {
                    let summary = self.dex.read(ProgressSummary::new);
                    display::write_statistics(&mut self.out, &summary)?;
                }
                Ok(7) => break,
                Ok(_) => writeln!(self.out, "  Invalid choice!")?,
                Err(_) => writeln!(self.out, "  Invalid input!")?,
            }
        }

        self.dex.save()?;
        writeln!(self.out, "\n  Progress saved. Goodbye, Trainer!\n")?;
        self.out.flush()?;
        Ok(())
    }

    fn main_menu(&mut self) -> Result<()> {
        let summary = self.dex.read(ProgressSummary::new);
        writeln!(self.out)?;
        display::separator(&mut self.out)?;
        writeln!(self.out, "            KANTO POKEDEX")?;
        display::separator(&mut self.out)?;
        writeln!(
            self.out,
            "  Progress: {}/{} Seen | {}/{} Caught",
            summary.total_seen, summary.total, summary.total_caught, summary.total
        )?;
        display::separator(&mut self.out)?;
        writeln!(self.out, "  1. Search by Dex Number")?;
        writeln!(self.out, "  2. Search by Name")?;
        writeln!(self.out, "  3. List All Pokemon")?;
        writeln!(self.out, "  4. List Caught Pokemon")?;
        writeln!(self.out, "  5. List Encountered Pokemon")?;
        writeln!(self.out, "  6. View Statistics")?;
        writeln!(self.out, "  7. Exit")?;
        display::separator(&mut self.out)?;
        write!(self.out, "  Enter choice: ")?;
        self.out.flush()?;
        Ok(())
    }

    fn search_by_id(&mut self) -> Result<()> {
        let capacity = self.dex.catalog().capacity();
        write!(self.out, "\n  Enter Dex Number (1-{}): ", capacity)?;
        self.out.flush()?;
        let Some(line) = self.read_line()? else {
            return Ok(());
        };

        let dex = self.dex;
        match line.trim().parse::<u32>() {
            Ok(id) => match dex.catalog().lookup_by_id(id) {
                Some(record) => self.record_actions(record)?,
                None => writeln!(self.out, "  Pokemon not found!")?,
            },
            Err(_) => writeln!(self.out, "  Invalid input!")?,
        }
        Ok(())
    }

    fn search_by_name(&mut self) -> Result<()> {
        write!(self.out, "\n  Enter Pokemon Name: ")?;
        self.out.flush()?;
        let Some(line) = self.read_line()? else {
            return Ok(());
        };

        let dex = self.dex;
        match dex.catalog().lookup_by_name(line.trim()) {
            Some(record) => self.record_actions(record)?,
            None => writeln!(self.out, "  Pokemon not found!")?,
        }
        Ok(())
    }

    fn record_actions(&mut self, record: &Record) -> Result<()> {
        let entry = self
            .dex
            .read(|progress| progress.entry(record.id))
            .unwrap_or_default();
        display::write_details(&mut self.out, record, entry)?;

        writeln!(self.out, "\n  1. Mark as Encountered")?;
        writeln!(self.out, "  2. Mark as Caught")?;
        writeln!(self.out, "  3. Reset Progress")?;
        writeln!(self.out, "  4. Back to Menu")?;
        write!(self.out, "  Enter choice: ")?;
        self.out.flush()?;
        let Some(line) = self.read_line()? else {
            return Ok(());
        };

        let (action, message) = match line.trim().parse::<u32>() {
            Ok(1) => (Action::Encounter, "+ Marked as encountered!"),
            Ok(2) => (Action::Catch, "* Marked as caught!"),
            Ok(3) => (Action::Reset, "- Progress reset!"),
            _ => return Ok(()),
        };
        self.dex.apply(action, record.id)?;
        writeln!(self.out, "\n  {}", message)?;
        Ok(())
    }

    fn list(&mut self, filter: ListFilter) -> Result<()> {
        let catalog = self.dex.catalog();
        let views = self
            .dex
            .read(|progress| list_records(catalog, progress, filter));
        display::write_listing(&mut self.out, filter, &views)?;
        Ok(())
    }

    /// Next input line, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
