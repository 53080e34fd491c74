//! Contributor table rendering

use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};

use crate::cli::helpers::{fmt_num, truncate_str};
use crate::core::stack::effective_cpk;
use crate::entities::stackup::Stackup;

/// Longest description shown before truncation
const DESCRIPTION_WIDTH: usize = 32;

/// Render the contributor list as a table
///
/// Optional columns follow the stack's display settings: Cpk in advanced
/// mode, tolerance type and float-shifted when switched on.
pub fn contributor_table(stackup: &Stackup, precision: usize) -> String {
    let settings = stackup.settings;
    let advanced = settings.advanced_statistical_mode;

    let mut header = vec!["#", "Description", "Nominal", "Dir", "Tolerance", "Adj. Nominal", "±Adj"];
    if settings.show_tolerance_type {
        header.push("Type");
    }
    if advanced {
        header.push("Cpk");
    }
    if settings.show_float_shifted {
        header.push("Float");
    }

    let mut builder = Builder::default();
    builder.push_record(header);

    for (i, c) in stackup.stack_data.iter().enumerate() {
        let normalized = c.normalized();
        let mut record = vec![
            (i + 1).to_string(),
            truncate_str(c.display_name(), DESCRIPTION_WIDTH),
            fmt_num(c.nominal, precision),
            c.direction.to_string(),
            c.tol.to_string(),
            fmt_num(normalized.nominal_adj, precision),
            fmt_num(normalized.tol_adj, precision),
        ];
        if settings.show_tolerance_type {
            record.push(c.tol_type.to_string());
        }
        if advanced {
            record.push(match c.cpk {
                Some(cpk) if cpk != 0.0 => format!("{:.2}", cpk),
                _ => format!("({:.2})", effective_cpk(c.cpk)),
            });
        }
        if settings.show_float_shifted {
            record.push(if c.float_shifted { "yes" } else { "" }.to_string());
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..)).with(Alignment::right()));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::stackup::{Contributor, Direction};

    #[test]
    fn test_basic_table_columns() {
        let mut stackup = Stackup::new("Table", "Author");
        stackup.add_contributor(Contributor::new("Housing", 20.0, Direction::Positive, 0.2, None));
        stackup.add_contributor(Contributor::new("", 4.0, Direction::Negative, "4 +0.2/-0.1", None));

        let text = contributor_table(&stackup, 3);
        assert!(text.contains("Housing"));
        assert!(text.contains("Unnamed"));
        assert!(text.contains("4.050"));
        assert!(text.contains("±0.2"));
        assert!(!text.contains("Cpk"));
    }

    #[test]
    fn test_advanced_table_shows_default_cpk() {
        let mut stackup = Stackup::new("Table", "Author");
        stackup.settings.advanced_statistical_mode = true;
        stackup.add_contributor(Contributor::new("A", 1.0, Direction::Positive, 0.1, None));
        stackup.add_contributor(Contributor::new("B", 1.0, Direction::Positive, 0.1, Some(1.67)));

        let text = contributor_table(&stackup, 2);
        assert!(text.contains("Cpk"));
        assert!(text.contains("(1.33)"));
        assert!(text.contains("1.67"));
    }
}
