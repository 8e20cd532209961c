fn main() -> anyhow::Result<()> {
    tr7ae::cli::run_cli()
}
