//! Pakfs CLI - Browse and read pak archives through their projected tree.
//!
//! Every command goes through the same callbacks a projection host uses, so
//! what the CLI prints is what a mounted archive shows.

use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pakfs::prelude::*;

/// Pakfs - pak archive browser
#[derive(Parser)]
#[command(name = "pakfs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the pak archive
    #[arg(short, long, global = true, env = "PAKFS_ARCHIVE")]
    archive: Option<PathBuf>,

    /// Memory-map the archive instead of reading through a buffered file
    #[arg(long, global = true)]
    mmap: bool,

    /// Name of the synthetic metadata file in the root
    #[arg(long, global = true, default_value = "_metadata")]
    metadata_name: String,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "pakfs_vfs=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory
    Ls {
        /// Directory to list
        #[arg(default_value = "/")]
        dir: String,

        /// Name filter (wildcards: * and ?)
        #[arg(short, long)]
        filter: Option<String>,

        /// Entries requested per listing call
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Recursively list a directory
    Tree {
        /// Directory to start from
        #[arg(default_value = "/")]
        dir: String,
    },

    /// Show placeholder information for a path
    Stat {
        /// Path inside the archive
        path: String,
    },

    /// Write a file's contents to stdout
    Cat {
        /// Path inside the archive
        path: String,

        /// Byte offset to start at
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Number of bytes to read (default: to the end)
        #[arg(long)]
        length: Option<u64>,
    },

    /// Print the archive metadata as JSON
    Metadata,

    /// Print the default projection root for the archive
    Target,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let archive = cli
        .archive
        .as_deref()
        .context("No archive given (use --archive or PAKFS_ARCHIVE)")?;
    let options = ProviderOptions {
        metadata_name: cli.metadata_name.clone(),
    };

    if cli.mmap {
        let pak = PakArchive::open_mapped(archive).context("Failed to map pak archive")?;
        let provider = PakProvider::new(pak, options).context("Failed to index pak archive")?;
        run(&provider, archive, &cli.command)
    } else {
        let provider = PakProvider::open(archive, options).context("Failed to open pak archive")?;
        run(&provider, archive, &cli.command)
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run<R: Read + Seek>(provider: &PakProvider<R>, archive: &Path, command: &Commands) -> Result<()> {
    match command {
        Commands::Ls {
            dir,
            filter,
            page_size,
        } => cmd_ls(provider, dir, filter.as_deref(), *page_size),
        Commands::Tree { dir } => cmd_tree(provider, dir),
        Commands::Stat { path } => cmd_stat(provider, path),
        Commands::Cat {
            path,
            offset,
            length,
        } => cmd_cat(provider, path, *offset, *length),
        Commands::Metadata => cmd_metadata(provider),
        Commands::Target => {
            println!("{}", default_target_root(archive).display());
            Ok(())
        }
    }
}

fn cmd_ls<P: ProjectionCallbacks>(
    provider: &P,
    dir: &str,
    filter: Option<&str>,
    page_size: usize,
) -> Result<()> {
    let mut count = 0;
    for_each_page(provider, dir, filter, page_size, |page| {
        for entry in page {
            println!("{}", format_entry(entry));
        }
        count += page.len();
    })?;

    println!("\nTotal: {} entries", count);
    Ok(())
}

fn cmd_tree<P: ProjectionCallbacks>(provider: &P, dir: &str) -> Result<()> {
    println!("{}", dir);
    print_tree(provider, dir, 1)
}

fn print_tree<P: ProjectionCallbacks>(provider: &P, dir: &str, depth: usize) -> Result<()> {
    for entry in list_dir(provider, dir, None, DEFAULT_PAGE_SIZE)? {
        let indent = "  ".repeat(depth);
        if entry.is_directory {
            println!("{}{}/", indent, entry.name);
            print_tree(provider, &child_path(dir, &entry.name), depth + 1)?;
        } else {
            println!("{}{} ({} bytes)", indent, entry.name, entry.size);
        }
    }
    Ok(())
}

fn cmd_stat<P: ProjectionCallbacks>(provider: &P, path: &str) -> Result<()> {
    let info = provider
        .entry_info(path)
        .map_err(|status| status_error(status, path))?;

    println!("Name:      {}", info.name);
    println!(
        "Type:      {}",
        if info.is_directory { "directory" } else { "file" }
    );
    println!("Size:      {}", info.size);
    println!("Read-only: {}", info.read_only);
    Ok(())
}

fn cmd_cat<P: ProjectionCallbacks>(
    provider: &P,
    path: &str,
    offset: u64,
    length: Option<u64>,
) -> Result<()> {
    let info = provider
        .entry_info(path)
        .map_err(|status| status_error(status, path))?;
    if info.is_directory {
        bail!("{} is a directory", path);
    }

    let length = length.unwrap_or_else(|| info.size.saturating_sub(offset));
    let data = provider
        .read_range(path, offset, length)
        .map_err(|status| status_error(status, path))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&data).context("Failed to write to stdout")?;
    stdout.flush()?;
    Ok(())
}

fn cmd_metadata<R: Read + Seek>(provider: &PakProvider<R>) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(provider.content().metadata_blob())
        .context("Failed to write to stdout")?;
    writeln!(stdout)?;
    Ok(())
}

const DEFAULT_PAGE_SIZE: usize = 64;

static NEXT_LISTING: AtomicU64 = AtomicU64::new(1);

fn next_listing_id() -> ListingId {
    ListingId(u128::from(NEXT_LISTING.fetch_add(1, Ordering::Relaxed)))
}

/// Drive one listing to completion, handing each page to `on_page`.
fn for_each_page<P, F>(
    provider: &P,
    dir: &str,
    filter: Option<&str>,
    page_size: usize,
    mut on_page: F,
) -> Result<()>
where
    P: ProjectionCallbacks,
    F: FnMut(&[EntryInfo]),
{
    let id = next_listing_id();
    let status = provider.begin_listing(id, dir);
    if !status.is_ok() {
        return Err(status_error(status, dir));
    }

    let mut sink = BoundedSink::new(page_size.max(1));
    let result = loop {
        let status = provider.continue_listing(id, filter, false, &mut sink);
        if !status.is_ok() {
            break Err(status_error(status, dir));
        }
        let page = sink.take();
        if page.is_empty() {
            break Ok(());
        }
        on_page(&page);
    };

    provider.end_listing(id);
    result
}

fn list_dir<P: ProjectionCallbacks>(
    provider: &P,
    dir: &str,
    filter: Option<&str>,
    page_size: usize,
) -> Result<Vec<EntryInfo>> {
    let mut entries = Vec::new();
    for_each_page(provider, dir, filter, page_size, |page| {
        entries.extend_from_slice(page)
    })?;
    Ok(entries)
}

fn child_path(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches(['/', '\\']), name)
}

fn format_entry(entry: &EntryInfo) -> String {
    if entry.is_directory {
        format!("{:>12} {}/", "<dir>", entry.name)
    } else {
        format!("{:>12} {}", entry.size, entry.name)
    }
}

fn status_error(status: Status, path: &str) -> anyhow::Error {
    match status {
        Status::FileNotFound => anyhow!("{}: not found", path),
        other => anyhow!("{}: {:?}", path, other),
    }
}

/// Default projection root: `_<stem>_pak` next to the archive.
fn default_target_root(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let name = format!("_{}_pak", stem);
    match archive.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}
