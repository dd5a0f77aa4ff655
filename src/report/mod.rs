pub mod history;
pub mod json;
pub mod table;

use crate::recorder::RecordResult;
use crate::util::format_bytes;

pub struct ReportOptions {
    pub json: bool,
    pub verbose: bool,
}

pub fn print(result: &RecordResult, options: &ReportOptions) {
    if options.json {
        println!("{}", json::render(result));
    } else {
        print!("{}", table::render(result));
        if options.verbose {
            print_run_info(result);
        }
        print_diagnostics(result, options.verbose);
    }
}

fn print_run_info(result: &RecordResult) {
    println!();
    println!("directories sized: {}", result.directories);
    println!("unchanged: {}", result.unchanged);
    if result.unreadable > 0 {
        println!("unreadable entries: {}", result.unreadable);
    }
    if let Some(duration_ms) = result.duration_ms {
        println!("completed in {:.2}s", duration_ms as f64 / 1000.0);
    }
    if let Some(peak_bytes) = result.peak_memory_bytes {
        println!("peak memory: {}", format_bytes(peak_bytes as u64));
    }
}

fn print_diagnostics(result: &RecordResult, verbose: bool) {
    if result.diagnostics.is_empty() {
        return;
    }

    println!();
    if verbose {
        println!("Diagnostics:");
        println!("{}", "-".repeat(40));
        for diagnostic in &result.diagnostics {
            println!("  {diagnostic}");
        }
    } else {
        for diagnostic in &result.diagnostics {
            println!("[diagnostic] {diagnostic}");
        }
    }
}
