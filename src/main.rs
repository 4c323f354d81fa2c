//! bookfold - Flatten EPUB sections into text and image runs

use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};

use bookfold::content::{ImageLookup, ImageMediaType};
use bookfold::{Book, Options, SectionErrors, SectionOrder, read_epub_with};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Order {
    /// Manifest declaration order
    Manifest,
    /// Spine (reading) order
    Spine,
    /// Sorted by href
    Href,
}

impl From<Order> for SectionOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Manifest => SectionOrder::Manifest,
            Order::Spine => SectionOrder::Spine,
            Order::Href => SectionOrder::Href,
        }
    }
}

#[derive(Parser)]
#[command(name = "bookfold")]
#[command(version, about = "Flatten EPUB sections into text and image runs", long_about = None)]
#[command(after_help = "EXAMPLES:
    bookfold book.epub                  Print the book as JSON
    bookfold book.epub -o book.json     Write the book to a file
    bookfold -i book.epub               Show book metadata")]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "INPUT")]
    input: String,

    /// Write JSON to this file instead of stdout
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Show book metadata and counts instead of content
    #[arg(short, long)]
    info: bool,

    /// Keep image references without embedding their data
    #[arg(long)]
    no_images: bool,

    /// Section order
    #[arg(long, value_enum, default_value_t = Order::Manifest)]
    order: Order,

    /// Leave sections that fail to parse empty instead of failing
    #[arg(long)]
    skip_broken: bool,

    /// Resolve image references by exact relative path
    #[arg(long)]
    exact_images: bool,

    /// Sniff image media types instead of assuming JPEG
    #[arg(long)]
    detect_mime: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> Options {
        let mut options = Options::new()
            .with_section_order(self.order.into())
            .with_embed_images(!self.no_images);

        if self.skip_broken {
            options = options.with_section_errors(SectionErrors::Skip);
        }
        if self.exact_images {
            options = options.with_image_lookup(ImageLookup::Exact);
        }
        if self.detect_mime {
            options = options.with_image_media_type(ImageMediaType::Detect);
        }
        options
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            (false, 2) => "debug",
            (false, _) => "trace",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .target(env_logger::Target::Stderr)
        .init();

    let result = read_epub_with(&cli.input, &cli.options())
        .map_err(|e| e.to_string())
        .and_then(|book| {
            if cli.info {
                show_info(&cli.input, &book);
                Ok(())
            } else {
                write_json(&book, cli.output.as_deref(), cli.quiet)
            }
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_info(path: &str, book: &Book) {
    let meta = &book.metadata;
    println!("File: {path}");
    println!("Title: {}", meta.title);
    if !meta.authors.is_empty() {
        println!("Authors: {}", meta.authors.join(", "));
    }
    if !meta.language.is_empty() {
        println!("Language: {}", meta.language);
    }
    if let Some(ref publisher) = meta.publisher {
        println!("Publisher: {publisher}");
    }
    if let Some(ref desc) = meta.description {
        let desc = desc.trim();
        match desc.char_indices().nth(200) {
            Some((end, _)) => println!("Description: {}...", &desc[..end]),
            None => println!("Description: {desc}"),
        }
    }
    println!("Cover: {}", if book.cover.is_some() { "yes" } else { "no" });
    println!("Sections: {}", book.sections.len());
    println!("Images: {}", book.images.len());
    println!("TOC entries: {}", book.toc.len());

    let items = book.content().count();
    let images = book.content().filter(|item| item.is_image()).count();
    println!("Content items: {items} ({images} images)");

    let broken = book.sections.iter().filter(|s| s.error.is_some()).count();
    if broken > 0 {
        println!("Unreadable sections: {broken}");
    }
}

fn write_json(book: &Book, output: Option<&str>, quiet: bool) -> Result<(), String> {
    let json = serde_json::to_string_pretty(book).map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            std::fs::write(path, json).map_err(|e| format!("{path}: {e}"))?;
            if !quiet {
                eprintln!("Wrote {path}");
            }
        }
        None => println!("{json}"),
    }
    Ok(())
}
