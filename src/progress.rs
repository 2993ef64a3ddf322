use std::io::Write;

/// Prints download progress as a single overwritten line of integer
/// percentages. Only strictly increasing values are written, so repeated or
/// decreasing callbacks (fragment restarts, merged phases) never make the
/// displayed percentage move backwards.
pub struct ProgressPrinter<W: Write> {
    out: W,
    last: Option<u64>,
}

impl<W: Write> ProgressPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn update(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0) as u64;
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            let _ = write!(self.out, "\r{}%", percent);
            let _ = self.out.flush();
        }
    }

    /// Terminate the progress line once the download is done. Writes nothing
    /// if no progress was ever reported.
    pub fn finish(&mut self) {
        if self.last.is_some() {
            let _ = writeln!(self.out);
        }
    }
}
