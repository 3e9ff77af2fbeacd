//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = wikilinks_cli::run() {
        eprintln!("wikilinks: {err}");
        std::process::exit(1);
    }
}
