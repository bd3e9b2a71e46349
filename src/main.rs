use anyhow::Result;

mod app;
mod logging;
mod progress;

fn main() -> Result<()> {
    let args = pattern_move::cli::parse();
    app::run(args)
}
