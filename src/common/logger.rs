use std::{
  fs::{self, File, OpenOptions},
  io::{self, BufRead, BufReader, Write},
  path::{Path, PathBuf},
  sync::{Arc, Mutex},
};

use tracing_subscriber::{EnvFilter, fmt::{self, time::LocalTime}, prelude::*};

use crate::configs::{LogFileConfig, LoggingConfig};

/// Prints a line before the subscriber exists (config loading, banner).
#[macro_export]
macro_rules! log_println {
    () => {{
        std::println!();
    }};
    ($($arg:tt)*) => {{
        std::println!($($arg)*);
    }};
}

fn filter_directives(logging: Option<&LoggingConfig>) -> String {
  let level = logging
    .and_then(|l| l.level.as_deref())
    .unwrap_or("info");

  match logging.and_then(|l| l.filters.as_deref()) {
    Some(filters) if !filters.is_empty() => format!("{},{}", level, filters),
    _ => level.to_string(),
  }
}

pub fn init(logging: Option<&LoggingConfig>) {
  // RUST_LOG wins over the configured level
  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(filter_directives(logging)));

  let stdout_layer = fmt::layer()
    .with_timer(LocalTime::rfc_3339())
    .with_target(true)
    .with_thread_ids(true)
    .with_line_number(true)
    .with_file(false);

  let file_layer = logging.and_then(|l| l.file.as_ref()).map(|file| {
    fmt::layer()
      .with_writer(PrunedFileWriter::open(file))
      .with_timer(LocalTime::rfc_3339())
      .with_target(true)
      .with_line_number(true)
      .with_ansi(false)
  });

  tracing_subscriber::registry()
    .with(env_filter)
    .with(stdout_layer)
    .with(file_layer)
    .init();
}

/// Routes panics through `tracing` so they land in the same sinks as every
/// other log line. With `exit_on_panic` the process terminates afterwards;
/// otherwise only the panicking task is lost.
pub fn install_panic_hook(exit_on_panic: bool) {
  std::panic::set_hook(Box::new(move |info| {
    let location = info
      .location()
      .map(|l| format!("{}:{}", l.file(), l.line()))
      .unwrap_or_else(|| "unknown".to_string());
    let message = info
      .payload()
      .downcast_ref::<&str>()
      .map(|s| s.to_string())
      .or_else(|| info.payload().downcast_ref::<String>().cloned())
      .unwrap_or_else(|| "non-string panic payload".to_string());

    tracing::error!("Uncaught defect at {}: {}", location, message);

    if exit_on_panic {
      std::process::exit(1);
    }
  }));
}

/// Appends to a log file and trims it back to `max_lines` every so often.
#[derive(Clone)]
pub(crate) struct PrunedFileWriter {
  path: PathBuf,
  max_lines: u32,
  lines_since_prune: Arc<Mutex<u32>>,
}

impl PrunedFileWriter {
  fn open(config: &LogFileConfig) -> Self {
    let path = PathBuf::from(&config.path);
    if let Some(parent) = path.parent() {
      if let Err(e) = fs::create_dir_all(parent) {
        eprintln!("Failed to create log directory: {}", e);
      }
    }

    Self {
      path,
      max_lines: config.max_lines,
      lines_since_prune: Arc::new(Mutex::new(0)),
    }
  }

  fn prune_threshold(&self) -> u32 {
    (self.max_lines / 10).max(50)
  }

  fn prune(&self) -> io::Result<()> {
    if !Path::new(&self.path).exists() {
      return Ok(());
    }

    let lines: Vec<String> = BufReader::new(File::open(&self.path)?)
      .lines()
      .collect::<Result<_, _>>()?;

    let keep = self.max_lines as usize;
    if lines.len() > keep {
      let mut file = File::create(&self.path)?;
      for line in &lines[lines.len() - keep..] {
        writeln!(file, "{}", line)?;
      }
    }
    Ok(())
  }
}

impl io::Write for PrunedFileWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)?
      .write_all(buf)?;

    let mut pending = self.lines_since_prune.lock().unwrap_or_else(|e| e.into_inner());
    *pending += buf.iter().filter(|&&b| b == b'\n').count() as u32;

    if *pending >= self.prune_threshold() {
      if let Err(e) = self.prune() {
        eprintln!("Failed to prune log file: {}", e);
      }
      *pending = 0;
    }

    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl<'a> fmt::MakeWriter<'a> for PrunedFileWriter {
  type Writer = Self;

  fn make_writer(&'a self) -> Self::Writer {
    self.clone()
  }
}
