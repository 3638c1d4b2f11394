/// Stats from one ingest run.
#[derive(Debug, Default)]
pub struct IngestStats {
    pub pages_fetched: u32,
    pub mentions_fetched: u32,
    pub mentions_normalized: u32,
    pub mentions_skipped: u32,
    pub mentions_written: u32,
    pub write_failures: u32,
    pub mentions_reaped: u64,
    pub resumed_from_cursor: bool,
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Ingest Run Complete ===")?;
        if self.resumed_from_cursor {
            writeln!(f, "(resumed from saved cursor)")?;
        }
        writeln!(f, "Pages fetched:      {}", self.pages_fetched)?;
        writeln!(f, "Mentions fetched:   {}", self.mentions_fetched)?;
        writeln!(f, "Mentions normalized:{}", self.mentions_normalized)?;
        writeln!(f, "Mentions skipped:   {}", self.mentions_skipped)?;
        writeln!(f, "Mentions written:   {}", self.mentions_written)?;
        writeln!(f, "Write failures:     {}", self.write_failures)?;
        writeln!(f, "Mentions reaped:    {}", self.mentions_reaped)?;
        Ok(())
    }
}
