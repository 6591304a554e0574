use anyhow::Result;

fn main() -> Result<()> {
    corepin::cli::run()
}
