fn main() -> anyhow::Result<()> {
    swimmer_cli::cli::run()
}
