//! Store large generated files in a grid and stream them back.
//!
//! Run: cargo run -q --example large_content -p grid_core

use grid_core::core::{Grid, PutOptions};
use grid_core::types::{Config, GridConfig, Metadata};
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

const TEST_SIZES_MB: &[usize] = &[1, 10, 50];

fn main() {
    let config = Config {
        base_path: get_data_path(),
    };
    let grid_config =
        GridConfig::load(&config.grid_config_path()).expect("Failed to load grid config");

    let grid = Grid::open(&config, &grid_config).expect("Failed to open grid");

    println!(
        "Storing large files in bucket '{}' ({} byte chunks)...\n",
        grid.prefix(),
        grid.default_chunk_size()
    );

    for &size_mb in TEST_SIZES_MB {
        let filename = format!("large-test-{}mb.md", size_mb);
        print!("  {} ... ", filename);

        for old in grid.find_by_filename(&filename).expect("Failed to look up file") {
            grid.delete(&old.id).expect("Failed to delete old file");
        }

        let content = generate_markdown_content(size_mb);
        let mut metadata = Metadata::new();
        metadata.insert("size_mb".to_string(), size_mb.into());

        let started = Instant::now();
        let id = grid
            .put_bytes(
                content.as_bytes(),
                &filename,
                PutOptions::new()
                    .metadata(metadata)
                    .content_type("text/markdown"),
            )
            .expect("Failed to store file");
        let stored_in = started.elapsed();

        let started = Instant::now();
        let mut file = grid.get(&id).expect("Failed to open file");
        let mut read_back = Vec::with_capacity(content.len());
        file.read_to_end(&mut read_back)
            .expect("Failed to stream file");
        let read_in = started.elapsed();

        assert_eq!(read_back, content.as_bytes());
        println!(
            "{} bytes in {} chunks, put {:?}, read {:?}",
            file.length(),
            file.info().chunk_count(),
            stored_in,
            read_in
        );
    }

    let outcome = grid.sweep_orphans().expect("Failed to sweep orphans");
    println!(
        "\nDone. {} files stored, {} orphaned chunks removed.",
        grid.list().expect("Failed to list files").len(),
        outcome.chunks_removed
    );
}

fn generate_markdown_content(size_mb: usize) -> String {
    let target_bytes = size_mb * 1024 * 1024;
    let mut content = String::with_capacity(target_bytes + 1024);

    content.push_str("# Large File Test\n\n");
    content.push_str(&format!("Target size: {}MB\n\n", size_mb));

    let mut section = 1;
    while content.len() < target_bytes {
        content.push_str(&format!(
            "## Section {section}\n\nLorem ipsum dolor sit amet, consectetur adipiscing elit.\n\n\
             | Column A | Column B |\n|----------|----------|\n| Cell {section} | Value |\n\n"
        ));
        section += 1;
    }

    content.push_str("\n## End of File\n");
    content
}

fn get_data_path() -> PathBuf {
    std::env::var("GRID_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("grid-large-content"))
}
