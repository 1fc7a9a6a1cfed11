use std::io::{self, Write};

use crate::core::allocator::{Allocator, Segment};

/// Print a list of segments as an `Address`/`Size` table,
/// followed by a blank line.
pub fn write_segments<W: Write>(out: &mut W, segments: &[Segment]) -> io::Result<()> {
    writeln!(out, "Address\tSize")?;
    for segment in segments {
        writeln!(out, "{}\t{}", segment.address, segment.size)?;
    }
    writeln!(out)
}

/// Print both lists of the allocator. Nothing is modified.
pub fn write_status<W: Write>(out: &mut W, allocator: &Allocator) -> io::Result<()> {
    writeln!(out, "\nFree Memory Blocks")?;
    write_segments(out, &allocator.free_list())?;
    writeln!(out, "Allocated Memory Blocks")?;
    write_segments(out, &allocator.allocated_list())
}
