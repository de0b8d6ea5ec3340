//! diskdock CLI
//!
//! Inspect disk images the way the mount subsystem sees a device: walk the
//! partition tables and print what discovery would register.

use anyhow::Context;
use clap::{Parser, Subcommand};
use diskdock_core::{BlockDevice, FileDevice, SECTOR_SIZE};
use diskdock_tables::mbr::types::TYPE_GPT_PROTECTIVE;
use diskdock_tables::mbr::BootRecord;
use diskdock_tables::{discover, WbfsHeader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "diskdock", version, about = "Partition discovery for disk images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the partitions discovery finds on an image
    List {
        /// Raw sector image
        image: PathBuf,

        /// Emit records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Summarize what sector 0 of an image claims to be
    Info {
        /// Raw sector image
        image: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::List { image, json } => cmd_list(&image, json),
        Command::Info { image } => cmd_info(&image),
    }
}

fn open_device(image: &PathBuf) -> anyhow::Result<FileDevice> {
    FileDevice::open(image).with_context(|| format!("cannot open {}", image.display()))
}

fn cmd_list(image: &PathBuf, json: bool) -> anyhow::Result<()> {
    let mut device = open_device(image)?;
    let records = discover(&mut device).context("partition discovery failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No partitions found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<9} {:>12} {:>12} {:>6} {:>5}",
        "Index", "FS", "Start LBA", "Sectors", "Type", "Boot"
    );
    println!("{}", "-".repeat(56));
    for record in &records {
        println!(
            "{:<6} {:<9} {:>12} {:>12}  0x{:02X} {:>5}",
            record.table_index,
            record.fs.label(),
            record.lba_start,
            record.sector_count,
            record.raw_type,
            if record.bootable { "*" } else { "" }
        );
    }
    Ok(())
}

fn cmd_info(image: &PathBuf) -> anyhow::Result<()> {
    let mut device = open_device(image)?;
    let sectors = device.sector_count();

    println!("Image:   {}", image.display());
    println!(
        "Size:    {} sectors ({:.2} MB)",
        sectors,
        (sectors * SECTOR_SIZE as u64) as f64 / 1_048_576.0
    );

    let mut sector0 = [0u8; SECTOR_SIZE];
    if !device.read_sectors(0, 1, &mut sector0) {
        anyhow::bail!("cannot read sector 0");
    }

    if let Some(head) = WbfsHeader::probe(&sector0) {
        println!("Format:  WBFS container, {} sectors", head.sector_count);
        return Ok(());
    }

    let Some(table) = BootRecord::parse(&sector0) else {
        println!("Format:  no boot signature at sector 0");
        return Ok(());
    };

    let scheme = if table.entries()[0].type_byte == TYPE_GPT_PROTECTIVE {
        "GPT (protective MBR)"
    } else {
        "MBR"
    };
    let records = discover(&mut device).context("partition discovery failed")?;
    println!("Format:  {scheme}, {} partition(s)", records.len());
    Ok(())
}
