use anyhow::Result;

use vibits::logging::LogBuffer;

/// Print the newest `limit` entries of the log buffer, oldest first.
pub fn logs(buffer: &LogBuffer, limit: Option<usize>) -> Result<()> {
    let entries = buffer.snapshot();
    if entries.is_empty() {
        println!("No log entries.");
        return Ok(());
    }

    let skip = limit.map_or(0, |n| entries.len().saturating_sub(n));
    for entry in &entries[skip..] {
        println!("{entry}");
    }
    Ok(())
}
