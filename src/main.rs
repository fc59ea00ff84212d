fn main() -> anyhow::Result<()> {
    plinth::default().run()
}
