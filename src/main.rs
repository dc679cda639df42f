fn main() -> Result<(), anyhow::Error> {
    banewfn::run()
}
