use std::io::{BufRead, Write};

use crate::{
    core::allocator::{Allocator, Handle},
    display::write_status,
};

use anyhow::{Context, Result};
use log::*;

const MENU: &str = "\nChoose an option:\n\
                    1. Allocate Memory\n\
                    2. Free Memory\n\
                    3. Display Memory Status\n\
                    4. Exit";

/// Whether the menu loop keeps going after a command.
enum Flow {
    Continue,
    Stop,
}

/// Interactive menu on top of an allocator. Every successful
/// allocation gets the next user-facing index; freeing by
/// index looks the handle up in `handles`.
pub struct Driver<R, W> {
    allocator: Allocator,
    /// Handles by user-facing index. Freed entries are set to
    /// the null handle rather than removed, so indices never
    /// shift.
    handles: Vec<Handle>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Driver<R, W> {
    pub fn new(allocator: Allocator, input: R, output: W) -> Self {
        Self {
            allocator,
            handles: Vec::new(),
            input,
            output,
        }
    }

    /// Run the menu until the user exits or the input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(choice) = self.prompt(MENU)? else {
                break;
            };

            let flow = match choice.trim() {
                "1" => self.allocate()?,
                "2" => self.free()?,
                "3" => {
                    write_status(&mut self.output, &self.allocator)?;
                    Flow::Continue
                }
                "4" => Flow::Stop,
                _ => {
                    writeln!(self.output, "Invalid input.")?;
                    Flow::Continue
                }
            };

            if let Flow::Stop = flow {
                break;
            }
        }

        info!("Exiting with {} live allocations.", self.allocator.allocated_list().len());
        self.output.flush().context("Failed to flush output.")
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn allocate(&mut self) -> Result<Flow> {
        let Some(line) = self.prompt("Enter memory size to allocate:")? else {
            return Ok(Flow::Stop);
        };
        let Ok(size) = line.trim().parse::<isize>() else {
            writeln!(self.output, "Invalid input.")?;
            return Ok(Flow::Continue);
        };

        match self.allocator.allocate(size) {
            Ok(handle) => {
                writeln!(self.output, "Memory allocated at index {}", self.handles.len())?;
                self.handles.push(handle);
            }
            Err(error) => {
                warn!("Allocation of {} bytes failed: {}", size, error);
                writeln!(self.output, "Allocation failed. Insufficient memory.")?;
            }
        }

        Ok(Flow::Continue)
    }

    fn free(&mut self) -> Result<Flow> {
        let Some(line) = self.prompt("Enter index of memory to free:")? else {
            return Ok(Flow::Stop);
        };

        // Anything that is not one of the indices handed out
        // so far is refused before touching the allocator.
        let index = match line.trim().parse::<usize>() {
            Ok(index) if index < self.handles.len() => index,
            _ => {
                writeln!(self.output, "Invalid index.")?;
                return Ok(Flow::Continue);
            }
        };

        // The slot is cleared whatever the outcome, so freeing
        // the same index again is reported as a null handle.
        let handle = std::mem::replace(&mut self.handles[index], Handle::NULL);
        match self.allocator.release(handle) {
            Ok(()) => writeln!(self.output, "Memory at index {index} freed.")?,
            Err(error) if error.is_warning() => writeln!(self.output, "Warning: {error}")?,
            Err(error) => writeln!(self.output, "Error: {error}")?,
        }

        Ok(Flow::Continue)
    }

    /// Print `text` and read one line of input. Returns `None`
    /// at the end of the input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input.")?;

        Ok((read > 0).then_some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::allocator::Segment;

    fn run(script: &str) -> Driver<&[u8], Vec<u8>> {
        let allocator = Allocator::initialize(1024).unwrap();
        let mut driver = Driver::new(allocator, script.as_bytes(), Vec::new());
        driver.run().unwrap();
        driver
    }

    fn output(driver: &Driver<&[u8], Vec<u8>>) -> String {
        String::from_utf8(driver.output().clone()).unwrap()
    }

    #[test]
    fn allocations_get_increasing_indices() {
        let driver = run("1\n100\n1\n200\n4\n");
        let text = output(&driver);

        assert!(text.contains("Memory allocated at index 0"));
        assert!(text.contains("Memory allocated at index 1"));
        assert_eq!(
            driver.allocator().allocated_list(),
            vec![Segment::new(0, 100), Segment::new(100, 200)],
        );
    }

    #[test]
    fn failed_allocation_takes_no_index() {
        let driver = run("1\n2000\n1\n0\n1\n-5\n4\n");

        assert_eq!(
            output(&driver).matches("Allocation failed. Insufficient memory.").count(),
            3,
        );
        assert!(driver.handles().is_empty());
    }

    #[test]
    fn free_by_index_then_again() {
        let driver = run("1\n100\n2\n0\n2\n0\n2\n7\n4\n");
        let text = output(&driver);

        assert!(text.contains("Memory at index 0 freed."));
        assert!(text.contains("Error: attempted to free a null handle"));
        assert!(text.contains("Invalid index."));
        assert_eq!(driver.allocator().free_list(), vec![Segment::new(0, 1024)]);
    }

    #[test]
    fn display_prints_both_lists() {
        let driver = run("1\n100\n3\n4\n");

        assert!(output(&driver).contains(
            "Free Memory Blocks\nAddress\tSize\n100\t924\n\n\
             Allocated Memory Blocks\nAddress\tSize\n0\t100\n\n"
        ));
    }

    #[test]
    fn stops_at_end_of_input() {
        let driver = run("1\n100\n");

        assert_eq!(driver.handles().len(), 1);
    }

    #[test]
    fn garbage_is_rejected() {
        let driver = run("hello\n9\n1\nmany\n4\n");

        assert_eq!(output(&driver).matches("Invalid input.").count(), 3);
        assert!(driver.handles().is_empty());
    }
}
