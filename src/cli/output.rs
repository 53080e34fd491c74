//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Print a value as JSON or YAML
///
/// Returns `false` when the format is not a structured one, leaving the
/// caller to render text or delimited output.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Field delimiter for the delimited formats
pub fn delimiter(format: OutputFormat) -> Option<u8> {
    match format {
        OutputFormat::Csv => Some(b','),
        OutputFormat::Tsv => Some(b'\t'),
        _ => None,
    }
}

/// Write a header and records as CSV or TSV to stdout
pub fn print_delimited<I, R>(delim: u8, header: &[&str], records: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let stdout = std::io::stdout();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delim)
        .from_writer(stdout.lock());
    writer.write_record(header).into_diagnostic()?;
    for record in records {
        writer.write_record(record).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter() {
        assert_eq!(delimiter(OutputFormat::Csv), Some(b','));
        assert_eq!(delimiter(OutputFormat::Tsv), Some(b'\t'));
        assert_eq!(delimiter(OutputFormat::Auto), None);
        assert_eq!(delimiter(OutputFormat::Json), None);
    }

    #[test]
    fn test_print_structured_declines_text() {
        assert!(!print_structured(&1, OutputFormat::Auto).unwrap());
        assert!(!print_structured(&1, OutputFormat::Csv).unwrap());
    }
}
