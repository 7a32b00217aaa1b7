//! Plain-text mapping report for manual review

use super::MappingStore;
use std::io::{self, Write};

/// Write the mapping report: unrecognized items first, then the current
/// sheet and header mappings
pub fn write_report(store: &MappingStore, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Mapping Report")?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out)?;

    if store.unrecognized().is_empty() {
        writeln!(out, "No unrecognized items found.")?;
        writeln!(out)?;
    } else {
        writeln!(out, "Unrecognized Items and Suggestions:")?;
        writeln!(out, "{}", "-".repeat(40))?;
        for item in store.unrecognized() {
            writeln!(out, "- {}", item)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Current Sheet Mappings:")?;
    writeln!(out, "{}", "-".repeat(25))?;
    for (raw, canonical) in store.sheet_name_mappings() {
        writeln!(out, "'{}' -> '{}'", raw, canonical)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Current Header Mappings ({} total):",
        store.header_mappings().len()
    )?;
    writeln!(out, "{}", "-".repeat(25))?;
    for (raw, id) in store.header_mappings() {
        writeln!(out, "'{}' -> '{}'", raw, id)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_contents() {
        let mut store = MappingStore::in_memory();
        store.add_sheet_mapping("INV", "Invoice");
        store.add_header_mapping("Amount", "col_amount");
        store.note_unrecognized("Header: Mystery");

        let mut buf = Vec::new();
        write_report(&store, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Mapping Report"));
        assert!(text.contains("- Header: Mystery"));
        assert!(text.contains("'INV' -> 'Invoice'"));
        assert!(text.contains("'Amount' -> 'col_amount'"));
        assert!(text.contains("1 total"));
    }
}
