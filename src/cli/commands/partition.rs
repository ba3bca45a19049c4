use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use std::fs;

use grid_export::config::Config;
use grid_export::partition::{RangePolicy, partition};
use grid_export::table::FlattenedTable;

use crate::cli::app::PartitionArgs;

pub fn partition_command(args: PartitionArgs, config: Config) -> Result<()> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read table file: {:?}", args.file))?;
    let table: FlattenedTable = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse table file: {:?}", args.file))?;

    let policy = if args.legacy_ranges {
        RangePolicy::Legacy
    } else {
        config.export.range_policy
    };
    debug!("Partitioning {:?} with {:?} ranges", args.file, policy);

    let ranges = partition(table.header(), policy)?;
    println!(
        "{} columns, {} rows, {} tabs",
        table.width(),
        table.height(),
        ranges.len()
    );
    for (index, range) in ranges.iter().enumerate() {
        println!(
            "  {} columns {}..={}  {}",
            format!("Tab{}", index + 1).bold(),
            range.start,
            range.end,
            table.header()[range.start].cyan()
        );
    }

    Ok(())
}
