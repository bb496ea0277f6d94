fn main() -> anyhow::Result<()> {
    report_cli::cli::run()
}
