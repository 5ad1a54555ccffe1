#![no_main]

use exostat::filter::{filter, FilterSpec};
use exostat::table::{Column, Table};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Parsing must never panic, and a parsed spec must evaluate cleanly or
    // fail with an error
    if let Ok(spec) = FilterSpec::from_expr(input) {
        if let Ok(table) = Table::new(vec![
            Column::text("pl_hostname", vec![Some("a".to_string()), None]),
            Column::numeric("pl_radj", vec![Some(0.1), None]),
        ]) {
            if let Ok(filtered) = filter(&table, &spec) {
                assert!(filtered.row_count() <= table.row_count());
            }
        }
    }
});
