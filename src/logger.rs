use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Receives a notification after every finished epoch.
pub trait Logger<P> {
    fn epoch_error(&mut self, epoch: usize, params: &P, error: f64);

    /// Called before `epoch_error` when the epoch left out `count` degenerate examples.
    fn skipped_examples(&mut self, _epoch: usize, _count: usize) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MockLogger;

impl<P> Logger<P> for MockLogger {
    fn epoch_error(&mut self, _epoch: usize, _params: &P, _error: f64) {}
}

/// Writes one `epoch<TAB>error` line per epoch. Write failures are reported on stderr and
/// don't interrupt the optimization.
#[derive(Debug)]
pub struct LogFile {
    file: PathBuf,
    writer: BufWriter<File>,
}

impl LogFile {
    pub fn new<Q: AsRef<Path>>(path: Q) -> io::Result<Self> {
        Ok(Self {
            file: path.as_ref().to_owned(),
            writer: BufWriter::new(File::create(path)?),
        })
    }

    fn report(&self, e: io::Error) {
        eprintln!(
            "Error while logging error to file: {}\nError: {}",
            self.file.display(),
            e
        );
    }
}

impl<P> Logger<P> for LogFile {
    fn epoch_error(&mut self, epoch: usize, _params: &P, error: f64) {
        if let Err(e) = writeln!(self.writer, "{}\t{}", epoch, error) {
            self.report(e);
        }
    }

    fn skipped_examples(&mut self, epoch: usize, count: usize) {
        if let Err(e) = writeln!(self.writer, "# {}\tskipped {}", epoch, count) {
            self.report(e);
        }
    }
}

impl Drop for LogFile {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            self.report(e);
        }
    }
}

/// Forwards every notification to a closure.
pub struct Callback<F>(pub F);

impl<P, F: FnMut(usize, &P, f64)> Logger<P> for Callback<F> {
    fn epoch_error(&mut self, epoch: usize, params: &P, error: f64) {
        (self.0)(epoch, params, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn callback_sees_every_epoch() {
        let mut seen = Vec::new();
        {
            let mut logger = Callback(|epoch: usize, _: &(), error: f64| seen.push((epoch, error)));
            logger.epoch_error(0, &(), 2.);
            logger.epoch_error(1, &(), 1.5);
        }
        assert_eq!(seen, vec![(0, 2.), (1, 1.5)]);
    }

    #[test]
    fn log_file_lines() {
        let path = std::env::temp_dir().join(format!("grlvq-log-{}.tsv", std::process::id()));
        {
            let mut log = LogFile::new(&path).unwrap();
            Logger::<()>::epoch_error(&mut log, 0, &(), -0.5);
            Logger::<()>::epoch_error(&mut log, 1, &(), -0.75);
        }
        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(contents, "0\t-0.5\n1\t-0.75\n");
    }
}
