use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

/// Destination for JSON results: stdout, or a file given on the command line.
#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path`, or to stdout if none.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => {
                let file = File::create(&path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Output::File {
                    writer: BufWriter::new(file),
                    path,
                }
            }
            None => Output::Stdout {
                writer: io::stdout().lock(),
            },
        };
        output.write_json(value)?;
        eprintln!("Wrote result to {}", output.display_path());
        Ok(())
    }

    fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_owned(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self)
            .with_context(|| format!("Failed to write newline to {}", self.display_path()))?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

/// Reads and parses a JSON file; `file_kind` names the file in error messages.
pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))?;

    Ok(value)
}
